//! # HUSK
//!
//! Finds exported symbols in a JavaScript/TypeScript source tree that are
//! never imported anywhere else in that tree (test files included), and can
//! rewrite the offending files to strip the dead export qualifiers.
//!
//! ## Pipeline
//!
//! - **Scan**: enumerate the configured source and test path sets
//! - **Extract**: per-file export/import/re-export symbols (tree-sitter)
//! - **Resolve**: specifiers → local files, external packages, or failures
//! - **Graph**: export nodes plus re-export pass-through edges
//! - **Unused**: reachability from every import reference, to fixpoint
//! - **Fix** (optional): strip export qualifiers from dead declarations
//!
//! ## Known limitation
//!
//! A namespace import (`import * as ns from './m'`), a side-effect import,
//! or a dynamic `import()` marks every export of the target module used.
//! Member-level tracing would need full type information; over-approximating
//! trades false negatives for the absence of false positives, which is the
//! safe direction for a tool that rewrites code.

pub mod config;
pub mod core;
pub mod formatters;
pub mod parsers;
