use anyhow::Result;
use regex::RegexSet;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use super::graph::{ResolvedImportRef, ResolvedModule, ResolvedReExport};
use crate::config::Config;
use crate::parsers::ModuleSymbols;

/// Outcome of mapping a raw specifier to a file identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSpecifier {
    LocalFile(PathBuf),
    ExternalPackage(String),
    Unresolved,
}

/// Soft-warning counters accumulated over one run. Workers each fill their
/// own instance; partials are combined by key-wise summation so the final
/// counts do not depend on how the file set was split across threads.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Bare package specifiers not present in the declared dependency set,
    /// keyed by package name, counting every occurrence.
    pub unknown_packages: HashMap<String, u64>,
    /// Specifiers (or unparseable files, keyed by their own path) that could
    /// not be resolved, counting every occurrence.
    pub failed_resolutions: HashMap<String, u64>,
}

impl Diagnostics {
    pub fn record_unknown_package(&mut self, package: &str) {
        *self.unknown_packages.entry(package.to_string()).or_insert(0) += 1;
    }

    pub fn record_failed_resolution(&mut self, specifier: &str) {
        *self
            .failed_resolutions
            .entry(specifier.to_string())
            .or_insert(0) += 1;
    }

    pub fn merge(mut self, other: Diagnostics) -> Diagnostics {
        for (key, count) in other.unknown_packages {
            *self.unknown_packages.entry(key).or_insert(0) += count;
        }
        for (key, count) in other.failed_resolutions {
            *self.failed_resolutions.entry(key).or_insert(0) += count;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.unknown_packages.is_empty() && self.failed_resolutions.is_empty()
    }
}

/// Node built-in modules resolve as external without an unknown-package
/// warning; nobody lists `fs` in package.json.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Maps `(importing file, raw specifier)` pairs to canonical file
/// identities. Deterministic and side-effect-free apart from the
/// diagnostics partial handed in by the caller.
pub struct ModuleResolver {
    root: PathBuf,
    /// Alias prefixes sorted longest-first so the most specific one wins.
    aliases: Vec<(String, String)>,
    ignore_patterns: RegexSet,
    extensions: Vec<String>,
    packages: HashSet<String>,
}

impl ModuleResolver {
    pub fn new(config: &Config) -> Result<Self> {
        let mut aliases: Vec<(String, String)> = config
            .alias
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Ok(Self {
            root: normalize_path(&config.root),
            aliases,
            ignore_patterns: RegexSet::new(&config.ignore_import_patterns)?,
            extensions: config.extensions.clone(),
            packages: config.packages.iter().cloned().collect(),
        })
    }

    /// Resolution order: alias substitution, ignore patterns, relative
    /// paths, bare package classification.
    pub fn resolve(
        &self,
        from_file: &Path,
        specifier: &str,
        diagnostics: &mut Diagnostics,
    ) -> ResolvedSpecifier {
        for (prefix, target) in &self.aliases {
            let Some(rest) = specifier.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if !rest.is_empty() && !rest.starts_with('/') {
                continue;
            }
            let base = self.root.join(target);
            let candidate = if rest.is_empty() {
                base
            } else {
                base.join(rest.trim_start_matches('/'))
            };
            return match self.probe(&candidate) {
                Some(file) => ResolvedSpecifier::LocalFile(file),
                None => {
                    diagnostics.record_failed_resolution(specifier);
                    ResolvedSpecifier::Unresolved
                }
            };
        }

        if !self.ignore_patterns.is_empty() && self.ignore_patterns.is_match(specifier) {
            // Intentionally unverifiable imports; no diagnostics.
            return ResolvedSpecifier::ExternalPackage(specifier.to_string());
        }

        if specifier.starts_with("./") || specifier.starts_with("../") {
            let base = from_file.parent().unwrap_or_else(|| Path::new(""));
            let candidate = normalize_path(&base.join(specifier));
            return match self.probe(&candidate) {
                Some(file) => ResolvedSpecifier::LocalFile(file),
                None => {
                    diagnostics.record_failed_resolution(specifier);
                    ResolvedSpecifier::Unresolved
                }
            };
        }

        if let Some(stripped) = specifier.strip_prefix("node:") {
            return ResolvedSpecifier::ExternalPackage(package_root(stripped).to_string());
        }
        let package = package_root(specifier);
        if !NODE_BUILTINS.contains(&package) && !self.packages.contains(package) {
            diagnostics.record_unknown_package(package);
        }
        ResolvedSpecifier::ExternalPackage(package.to_string())
    }

    /// Resolves every import and re-export of one extracted file. A file
    /// that failed to parse contributes nothing and is itself counted as a
    /// failed resolution, so callers can tell it apart from an empty file.
    pub fn resolve_module(
        &self,
        module: &ModuleSymbols,
        diagnostics: &mut Diagnostics,
    ) -> ResolvedModule {
        if module.parse_failed {
            diagnostics.record_failed_resolution(&module.file.to_string_lossy());
            return ResolvedModule {
                file: module.file.clone(),
                imports: Vec::new(),
                re_exports: Vec::new(),
            };
        }

        let imports = module
            .imports
            .iter()
            .map(|import| ResolvedImportRef {
                name: import.name.clone(),
                specifier: import.specifier.clone(),
                resolved: self.resolve(&module.file, &import.specifier, diagnostics),
            })
            .collect();

        let mut re_exports = Vec::new();
        for re_export in &module.re_exports {
            match self.resolve(&module.file, &re_export.specifier, diagnostics) {
                ResolvedSpecifier::LocalFile(source_file) => re_exports.push(ResolvedReExport {
                    exported_name: re_export.exported_name.clone(),
                    source_file,
                    source_name: re_export.source_name.clone(),
                    line: re_export.line,
                }),
                // Re-exports from packages have no local export nodes to
                // pass through to; unresolved sources were already counted.
                ResolvedSpecifier::ExternalPackage(_) | ResolvedSpecifier::Unresolved => {}
            }
        }

        ResolvedModule {
            file: module.file.clone(),
            imports,
            re_exports,
        }
    }

    /// Probes a path candidate: the exact path, then each configured
    /// extension appended, then `index.<ext>` inside it. First hit wins.
    fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        if candidate.is_file() {
            return Some(normalize_path(candidate));
        }
        for ext in &self.extensions {
            let mut with_ext = candidate.as_os_str().to_os_string();
            with_ext.push(format!(".{ext}"));
            let with_ext = PathBuf::from(with_ext);
            if with_ext.is_file() {
                return Some(normalize_path(&with_ext));
            }
        }
        for ext in &self.extensions {
            let index = candidate.join(format!("index.{ext}"));
            if index.is_file() {
                return Some(normalize_path(&index));
            }
        }
        None
    }
}

/// First path segment of a bare specifier, or the first two for scoped
/// packages (`@scope/name/sub` → `@scope/name`).
fn package_root(specifier: &str) -> &str {
    let mut segments = specifier.splitn(3, '/');
    match (segments.next(), segments.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => {
            &specifier[..scope.len() + 1 + name.len()]
        }
        (Some(first), _) => first,
        (None, _) => specifier,
    }
}

/// Lexical `.`/`..` folding so one canonical spelling is used for file
/// identity everywhere (no symlink resolution, no disk access).
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
