pub mod analyzer;
pub mod fixer;
pub mod graph;
pub mod resolver;
pub mod scanner;
pub mod unused;

pub use analyzer::{AnalysisReport, ProjectAnalyzer};
pub use fixer::{ExportFixer, FixSummary};
pub use graph::{
    ExportGraph, ExportName, ExportSymbol, GraphBuilder, ImportName, ImportReference, RawReExport,
    ResolvedImport, ResolvedModule,
};
pub use resolver::{normalize_path, Diagnostics, ModuleResolver, ResolvedSpecifier};
pub use scanner::FileScanner;
pub use unused::{compute_unused, FileUnusedExports};
