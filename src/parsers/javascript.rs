use anyhow::Result;
use std::path::Path;
use tree_sitter::Node as TSNode;

use super::common::{
    extract_text, find_child_by_kind, has_child_of_kind, string_literal_value, TreeSitterParser,
};
use super::{LanguageParser, ModuleSymbols};
use crate::core::{ExportName, ExportSymbol, ImportName, ImportReference, RawReExport};

pub struct JavaScriptParser {
    language: tree_sitter::Language,
}

impl JavaScriptParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_javascript::language(),
        }
    }
}

impl Default for JavaScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for JavaScriptParser {
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
        "javascript"
    }
}

/// Walks the top-level statements of a parsed module and classifies every
/// export/import declaration. The TypeScript grammar is a superset of the
/// JavaScript one for the module surface, so both parsers share this walker;
/// the TS-only declaration kinds simply never occur in JS trees.
pub(crate) fn collect_symbols(root: &TSNode, source: &[u8], file_path: &Path) -> ModuleSymbols {
    let mut symbols = ModuleSymbols::empty(file_path.to_path_buf());

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "import_statement" => process_import(&child, source, &mut symbols),
            "export_statement" => process_export(&child, source, &mut symbols),
            _ => {}
        }
    }

    collect_dynamic_imports(root, source, &mut symbols);
    symbols
}

fn process_import(node: &TSNode, source: &[u8], out: &mut ModuleSymbols) {
    let Some(source_node) = node.child_by_field_name("source") else {
        return;
    };
    let specifier = string_literal_value(&source_node, source);
    let line = node.start_position().row + 1;

    let Some(clause) = find_child_by_kind(node, "import_clause") else {
        // `import './m'`: a side-effect import loads the whole module, so it
        // keeps every export of the target alive.
        out.imports.push(ImportReference {
            name: ImportName::NamespaceAll,
            specifier,
            line,
        });
        return;
    };

    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        match child.kind() {
            "identifier" => out.imports.push(ImportReference {
                name: ImportName::Default,
                specifier: specifier.clone(),
                line,
            }),
            "namespace_import" => out.imports.push(ImportReference {
                name: ImportName::NamespaceAll,
                specifier: specifier.clone(),
                line,
            }),
            "named_imports" => {
                let mut specs = child.walk();
                for spec in child.children(&mut specs) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name_node) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    // The imported name, not the local alias, is identity;
                    // `import { default as x }` targets the default export.
                    let imported = extract_text(&name_node, source);
                    let name = if imported == "default" {
                        ImportName::Default
                    } else {
                        ImportName::Named(imported.to_string())
                    };
                    out.imports.push(ImportReference {
                        name,
                        specifier: specifier.clone(),
                        line,
                    });
                }
            }
            _ => {}
        }
    }
}

fn process_export(node: &TSNode, source: &[u8], out: &mut ModuleSymbols) {
    let line = node.start_position().row + 1;
    let source_spec = node
        .child_by_field_name("source")
        .map(|s| string_literal_value(&s, source));

    if let Some(specifier) = source_spec {
        if let Some(ns) = find_child_by_kind(node, "namespace_export") {
            // `export * as ns from './m'`
            if let Some(name_node) = find_child_by_kind(&ns, "identifier")
                .or_else(|| find_child_by_kind(&ns, "string"))
            {
                let exported = if name_node.kind() == "string" {
                    string_literal_value(&name_node, source)
                } else {
                    extract_text(&name_node, source).to_string()
                };
                out.re_exports.push(RawReExport {
                    exported_name: ExportName::Named(exported),
                    specifier,
                    source_name: ExportName::Namespace,
                    line,
                });
            }
            return;
        }
        if has_child_of_kind(node, "*") {
            out.re_exports.push(RawReExport {
                exported_name: ExportName::Namespace,
                specifier,
                source_name: ExportName::Namespace,
                line,
            });
            return;
        }
        if let Some(clause) = find_child_by_kind(node, "export_clause") {
            for (local, exported) in export_specifiers(&clause, source) {
                out.re_exports.push(RawReExport {
                    exported_name: export_name_for(&exported),
                    specifier: specifier.clone(),
                    source_name: export_name_for(&local),
                    line,
                });
            }
        }
        return;
    }

    if let Some(clause) = find_child_by_kind(node, "export_clause") {
        for (_, exported) in export_specifiers(&clause, source) {
            out.exports.push(ExportSymbol {
                name: export_name_for(&exported),
                line,
            });
        }
        return;
    }

    if has_child_of_kind(node, "default") {
        // Covers `export default <expr>` and `export default function f(){}`
        // alike: the local name, if any, is not a separate export.
        out.exports.push(ExportSymbol {
            name: ExportName::Default,
            line,
        });
        return;
    }

    if let Some(declaration) = node.child_by_field_name("declaration") {
        for (name, decl_line) in declaration_names(&declaration, source) {
            out.exports.push(ExportSymbol {
                name: ExportName::Named(name),
                line: decl_line,
            });
        }
    }
}

/// `export { a as default }` re-exports the default slot, not a name.
fn export_name_for(name: &str) -> ExportName {
    if name == "default" {
        ExportName::Default
    } else {
        ExportName::Named(name.to_string())
    }
}

/// Yields `(local, exported)` name pairs of an export clause.
fn export_specifiers(clause: &TSNode, source: &[u8]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut cursor = clause.walk();
    for spec in clause.children(&mut cursor) {
        if spec.kind() != "export_specifier" {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else {
            continue;
        };
        let local = extract_text(&name_node, source).to_string();
        let exported = spec
            .child_by_field_name("alias")
            .map(|alias| extract_text(&alias, source).to_string())
            .unwrap_or_else(|| local.clone());
        pairs.push((local, exported));
    }
    pairs
}

/// Names bound by an exported declaration, with the line each binding
/// starts on. Handles the JS declaration kinds plus the TS-only ones.
pub(crate) fn declaration_names(declaration: &TSNode, source: &[u8]) -> Vec<(String, usize)> {
    match declaration.kind() {
        "function_declaration"
        | "generator_function_declaration"
        | "class_declaration"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "enum_declaration"
        | "type_alias_declaration"
        | "internal_module"
        | "module" => declaration
            .child_by_field_name("name")
            .map(|name| {
                vec![(
                    extract_text(&name, source).to_string(),
                    declaration.start_position().row + 1,
                )]
            })
            .unwrap_or_default(),
        "lexical_declaration" | "variable_declaration" => {
            let mut names = Vec::new();
            let mut cursor = declaration.walk();
            for declarator in declaration.children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(pattern) = declarator.child_by_field_name("name") {
                    let line = declarator.start_position().row + 1;
                    pattern_identifiers(&pattern, source, line, &mut names);
                }
            }
            names
        }
        // `export declare const x` wraps the real declaration.
        "ambient_declaration" => {
            let mut names = Vec::new();
            let mut cursor = declaration.walk();
            for child in declaration.children(&mut cursor) {
                names.extend(declaration_names(&child, source));
            }
            names
        }
        _ => Vec::new(),
    }
}

/// Collects every identifier a binding pattern introduces, descending into
/// destructuring forms but not into default-value expressions.
fn pattern_identifiers(node: &TSNode, source: &[u8], line: usize, out: &mut Vec<(String, usize)>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            out.push((extract_text(node, source).to_string(), line));
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                pattern_identifiers(&child, source, line, out);
            }
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                pattern_identifiers(&value, source, line, out);
            }
        }
        "assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                pattern_identifiers(&left, source, line, out);
            }
        }
        _ => {}
    }
}

/// `import('./m')` with a literal argument, at any nesting depth. Treated
/// like a namespace import: the members actually touched are unknowable
/// without type information, so everything in the target stays alive.
fn collect_dynamic_imports(root: &TSNode, source: &[u8], out: &mut ModuleSymbols) {
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "call_expression" {
                if let Some(callee) = child.child_by_field_name("function").or_else(|| child.child(0)) {
                    if callee.kind() == "import" {
                        if let Some(args) = child.child_by_field_name("arguments") {
                            if let Some(arg) = find_child_by_kind(&args, "string") {
                                out.imports.push(ImportReference {
                                    name: ImportName::NamespaceAll,
                                    specifier: string_literal_value(&arg, source),
                                    line: child.start_position().row + 1,
                                });
                            }
                        }
                    }
                }
            }
            stack.push(child);
        }
    }
}
