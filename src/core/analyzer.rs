use anyhow::Result;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::graph::{GraphBuilder, ResolvedImport, ResolvedModule};
use super::resolver::{Diagnostics, ModuleResolver};
use super::scanner::FileScanner;
use super::unused::{compute_unused, FileUnusedExports};
use crate::config::Config;
use crate::parsers::{ModuleSymbols, SymbolExtractor};

/// Everything one run produces, handed to reporting, fixing, and JSON
/// output. Nothing here survives past the run.
pub struct AnalysisReport {
    pub exported_names: BTreeMap<PathBuf, Vec<String>>,
    pub imported_names: BTreeMap<PathBuf, Vec<ResolvedImport>>,
    pub imported_names_test: BTreeMap<PathBuf, Vec<ResolvedImport>>,
    pub unused_exports: Vec<FileUnusedExports>,
    pub diagnostics: Diagnostics,
    pub source_file_count: usize,
    pub test_file_count: usize,
}

impl AnalysisReport {
    pub fn unused_export_count(&self) -> usize {
        self.unused_exports
            .iter()
            .map(|entry| entry.unused_exports.len())
            .sum()
    }
}

/// Runs the whole pipeline: scan, extract per file in parallel, resolve
/// specifiers with per-worker diagnostic partials, build the export graph
/// once, and compute the unused set.
pub struct ProjectAnalyzer {
    config: Config,
    extractor: SymbolExtractor,
}

impl ProjectAnalyzer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            extractor: SymbolExtractor::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analyze(&self) -> Result<AnalysisReport> {
        let config = &self.config;
        let scanner = FileScanner::new();

        println!("Scanning files...");
        let source_files = scanner.scan(&config.root, &config.source_paths, &config.extensions)?;
        let test_files = scanner.scan(&config.root, &config.test_paths, &config.extensions)?;
        println!(
            "Found {} source files, {} test files",
            source_files.len(),
            test_files.len()
        );

        let resolver = ModuleResolver::new(config)?;

        println!("Extracting symbols...");
        let source_modules = self.extract_all(&source_files);
        let test_modules = self.extract_all(&test_files);

        println!("Resolving import specifiers...");
        let (resolved_source, source_diag) = resolve_all(&resolver, &source_modules);
        let (resolved_test, test_diag) = resolve_all(&resolver, &test_modules);
        let diagnostics = source_diag.merge(test_diag);

        println!("Building export graph...");
        let mut builder = GraphBuilder::new();
        for module in &source_modules {
            builder.add_module_exports(module);
        }
        for module in &resolved_source {
            builder.add_module_refs(module, false);
        }
        for module in &resolved_test {
            builder.add_module_refs(module, true);
        }
        let graph = builder.build();

        println!("Resolving unused exports...");
        let unused_exports = compute_unused(&graph);

        Ok(AnalysisReport {
            exported_names: graph.exported_names,
            imported_names: graph.imported_names,
            imported_names_test: graph.imported_names_test,
            unused_exports,
            diagnostics,
            source_file_count: source_files.len(),
            test_file_count: test_files.len(),
        })
    }

    fn extract_all(&self, files: &[PathBuf]) -> Vec<ModuleSymbols> {
        files
            .par_iter()
            .map(|file| match self.extractor.extract(file) {
                Ok(symbols) => symbols,
                Err(err) => {
                    eprintln!("Warning: failed to parse {}: {}", file.display(), err);
                    ModuleSymbols::failed(file.clone())
                }
            })
            .collect()
    }
}

/// Per-worker diagnostics partials, reduced by key-wise summation; the
/// final counts are independent of how rayon splits the module list.
fn resolve_all(
    resolver: &ModuleResolver,
    modules: &[ModuleSymbols],
) -> (Vec<ResolvedModule>, Diagnostics) {
    modules
        .par_iter()
        .fold(
            || (Vec::new(), Diagnostics::default()),
            |(mut resolved, mut diag), module| {
                resolved.push(resolver.resolve_module(module, &mut diag));
                (resolved, diag)
            },
        )
        .reduce(
            || (Vec::new(), Diagnostics::default()),
            |(mut left, left_diag), (mut right, right_diag)| {
                left.append(&mut right);
                (left, left_diag.merge(right_diag))
            },
        )
}
