use anyhow::Result;
use std::path::Path;

use super::common::TreeSitterParser;
use super::javascript::collect_symbols;
use super::{LanguageParser, ModuleSymbols};

/// TypeScript extraction rides on the shared ES-module walker; the TS
/// grammar only adds declaration kinds (interfaces, enums, type aliases,
/// namespaces) which the walker already knows. `import type` / `export
/// type` statements carry the same clause shapes and need no special
/// handling — a type-only use is still a use.
pub struct TypeScriptParser {
    language: tree_sitter::Language,
}

impl TypeScriptParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_typescript::language_typescript(),
        }
    }

    /// `.tsx` files need the JSX-aware dialect of the grammar.
    pub fn new_tsx() -> Self {
        Self {
            language: tree_sitter_typescript::language_tsx(),
        }
    }
}

impl Default for TypeScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for TypeScriptParser {
    fn extract_file(&self, file_path: &Path) -> Result<ModuleSymbols> {
        let source = TreeSitterParser::read_source(file_path)?;
        let mut parser = TreeSitterParser::new(self.language)?;
        let tree = parser.parse_source(&source)?;
        Ok(collect_symbols(
            &tree.root_node(),
            source.as_bytes(),
            file_path,
        ))
    }

    fn language_name(&self) -> &str {
        "typescript"
    }
}
