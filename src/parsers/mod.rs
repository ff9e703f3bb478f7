pub mod common;
pub mod javascript;
pub mod typescript;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tree_sitter::Language;

use crate::core::{ExportSymbol, ImportReference, RawReExport};

/// Everything the extractor learned about one file. `parse_failed`
/// distinguishes a file that could not be read or parsed from one that
/// legitimately declares nothing.
#[derive(Debug, Clone)]
pub struct ModuleSymbols {
    pub file: PathBuf,
    pub exports: Vec<ExportSymbol>,
    pub imports: Vec<ImportReference>,
    pub re_exports: Vec<RawReExport>,
    pub parse_failed: bool,
}

impl ModuleSymbols {
    pub fn empty(file: PathBuf) -> Self {
        Self {
            file,
            exports: Vec::new(),
            imports: Vec::new(),
            re_exports: Vec::new(),
            parse_failed: false,
        }
    }

    pub fn failed(file: PathBuf) -> Self {
        Self {
            parse_failed: true,
            ..Self::empty(file)
        }
    }
}

pub trait LanguageParser {
    fn extract_file(&self, file_path: &Path) -> Result<ModuleSymbols>;
    #[allow(dead_code)]
    fn language_name(&self) -> &str;
}

/// The grammar the given file parses with, selected by extension.
pub fn language_for(file_path: &Path) -> Result<Language> {
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match ext {
        "ts" => Ok(tree_sitter_typescript::language_typescript()),
        "tsx" => Ok(tree_sitter_typescript::language_tsx()),
        "js" | "jsx" | "mjs" => Ok(tree_sitter_javascript::language()),
        other => anyhow::bail!("unsupported file extension: {other:?}"),
    }
}

/// Per-file front of the extraction stage. Stateless, so one instance can
/// be shared across rayon workers.
pub struct SymbolExtractor;

impl SymbolExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, file_path: &Path) -> Result<ModuleSymbols> {
        let parser: Box<dyn LanguageParser> = match file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
        {
            "ts" => Box::new(typescript::TypeScriptParser::new()),
            "tsx" => Box::new(typescript::TypeScriptParser::new_tsx()),
            "js" | "jsx" | "mjs" => Box::new(javascript::JavaScriptParser::new()),
            other => anyhow::bail!("unsupported file extension: {other:?}"),
        };
        parser.extract_file(file_path)
    }
}

impl Default for SymbolExtractor {
    fn default() -> Self {
        Self::new()
    }
}
