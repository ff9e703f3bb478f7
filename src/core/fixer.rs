use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tree_sitter::Node as TSNode;

use super::unused::FileUnusedExports;
use crate::parsers::common::{
    extract_text, find_child_by_kind, has_child_of_kind, TreeSitterParser,
};
use crate::parsers::javascript::declaration_names;
use crate::parsers::language_for;

/// Rewrites files to strip the export qualifier from dead exports.
///
/// Declaration bodies and local bindings always survive — whether a value is
/// also dead inside its own module is outside this tool's scope. Each file
/// is committed whole via a temp file and rename, or left untouched on any
/// error; partial edits are never persisted.
pub struct ExportFixer;

#[derive(Debug, Default, Clone, Copy)]
pub struct FixSummary {
    pub files_changed: usize,
    pub files_failed: usize,
}

struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

impl ExportFixer {
    pub fn new() -> Self {
        Self
    }

    /// Applies the unused-export report. Failures are isolated per file:
    /// the file is reported unchanged and the rest keep going.
    pub fn apply(&self, report: &[FileUnusedExports]) -> FixSummary {
        let mut summary = FixSummary::default();
        for entry in report {
            match self.fix_file(&entry.file, &entry.unused_exports) {
                Ok(true) => summary.files_changed += 1,
                Ok(false) => {}
                Err(err) => {
                    eprintln!("Warning: failed to fix {}: {err}", entry.file.display());
                    summary.files_failed += 1;
                }
            }
        }
        summary
    }

    pub fn fix_file(&self, file: &Path, unused: &[String]) -> Result<bool> {
        let source = fs::read_to_string(file)
            .with_context(|| format!("unable to read {}", file.display()))?;
        match self.rewrite(file, &source, unused)? {
            None => Ok(false),
            Some(text) => {
                write_atomic(file, &text)?;
                Ok(true)
            }
        }
    }

    /// Produces the rewritten source, or `None` when nothing applies (which
    /// is what makes a second pass over the same report a no-op).
    pub fn rewrite(&self, file: &Path, source: &str, unused: &[String]) -> Result<Option<String>> {
        let flagged: HashSet<&str> = unused.iter().map(String::as_str).collect();
        let mut parser = TreeSitterParser::new(language_for(file)?)?;
        let tree = parser.parse_source(source)?;
        let src = source.as_bytes();

        let mut edits = Vec::new();
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "export_statement" {
                if let Some(edit) = edit_for_statement(&child, src, &flagged) {
                    edits.push(edit);
                }
            }
        }
        if edits.is_empty() {
            return Ok(None);
        }

        edits.sort_by(|a, b| b.start.cmp(&a.start));
        let mut text = source.to_string();
        for edit in edits {
            text.replace_range(edit.start..edit.end, &edit.replacement);
        }
        Ok(Some(text))
    }
}

impl Default for ExportFixer {
    fn default() -> Self {
        Self::new()
    }
}

fn edit_for_statement(node: &TSNode, src: &[u8], flagged: &HashSet<&str>) -> Option<Edit> {
    let has_source = node.child_by_field_name("source").is_some();

    if has_source {
        if let Some(ns) = find_child_by_kind(node, "namespace_export") {
            // `export * as ns from './m'` is pure export syntax: there is no
            // body to keep, so the whole statement goes.
            let name_node = find_child_by_kind(&ns, "identifier")?;
            if flagged.contains(extract_text(&name_node, src)) {
                return Some(delete_statement(node, src));
            }
            return None;
        }
        if has_child_of_kind(node, "*") {
            // Bare `export *` has no per-name source text; never flagged.
            return None;
        }
        return edit_clause_statement(node, src, flagged);
    }

    if find_child_by_kind(node, "export_clause").is_some() {
        return edit_clause_statement(node, src, flagged);
    }

    if has_child_of_kind(node, "default") {
        if !flagged.contains("default") {
            return None;
        }
        let body = node
            .child_by_field_name("declaration")
            .or_else(|| node.child_by_field_name("value"))?;
        return Some(Edit {
            start: node.start_byte(),
            end: body.start_byte(),
            replacement: String::new(),
        });
    }

    if let Some(declaration) = node.child_by_field_name("declaration") {
        let names = declaration_names(&declaration, src);
        if names.is_empty() {
            return None;
        }
        // A statement binding several names is only stripped when every one
        // of them is dead; splitting declarator lists is not attempted.
        if !names.iter().all(|(name, _)| flagged.contains(name.as_str())) {
            return None;
        }
        return Some(Edit {
            start: node.start_byte(),
            end: declaration.start_byte(),
            replacement: String::new(),
        });
    }

    None
}

/// Rewrites `export { a, b as c }` / `export { a } from './m'`: flagged
/// specifiers are dropped, and the statement disappears once empty.
fn edit_clause_statement(node: &TSNode, src: &[u8], flagged: &HashSet<&str>) -> Option<Edit> {
    let clause = find_child_by_kind(node, "export_clause")?;

    let mut kept = Vec::new();
    let mut dropped = 0usize;
    let mut cursor = clause.walk();
    for spec in clause.children(&mut cursor) {
        if spec.kind() != "export_specifier" {
            continue;
        }
        let name_node = spec.child_by_field_name("name")?;
        let exported = spec
            .child_by_field_name("alias")
            .map(|alias| extract_text(&alias, src))
            .unwrap_or_else(|| extract_text(&name_node, src));
        if flagged.contains(exported) {
            dropped += 1;
        } else {
            kept.push(extract_text(&spec, src).to_string());
        }
    }
    if dropped == 0 {
        return None;
    }
    if kept.is_empty() {
        return Some(delete_statement(node, src));
    }

    let keyword = if has_child_of_kind(node, "type") {
        "export type"
    } else {
        "export"
    };
    let mut text = format!("{keyword} {{ {} }}", kept.join(", "));
    if let Some(source_node) = node.child_by_field_name("source") {
        text.push_str(" from ");
        text.push_str(extract_text(&source_node, src));
    }
    text.push(';');
    Some(Edit {
        start: node.start_byte(),
        end: node.end_byte(),
        replacement: text,
    })
}

fn delete_statement(node: &TSNode, src: &[u8]) -> Edit {
    let mut end = node.end_byte();
    if src.get(end) == Some(&b'\n') {
        end += 1;
    }
    Edit {
        start: node.start_byte(),
        end,
        replacement: String::new(),
    }
}

/// Full-content temp file in the same directory, then rename: readers see
/// the old text or the new text, never an interleaving.
fn write_atomic(file: &Path, text: &str) -> Result<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    let tmp = file.with_file_name(format!(".{name}.husk-tmp"));
    fs::write(&tmp, text).with_context(|| format!("unable to write {}", tmp.display()))?;
    fs::rename(&tmp, file).with_context(|| format!("unable to replace {}", file.display()))?;
    Ok(())
}
