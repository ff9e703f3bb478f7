use husk::core::{ExportFixer, FileUnusedExports};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn rewrite(name: &str, source: &str, unused: &[&str]) -> Option<String> {
    let unused: Vec<String> = unused.iter().map(|s| s.to_string()).collect();
    ExportFixer::new()
        .rewrite(Path::new(name), source, &unused)
        .unwrap()
}

#[test]
fn strips_export_keyword_from_dead_const() {
    let out = rewrite("a.js", "export const X = 1;\nexport const Y = 2;\n", &["X"]);
    assert_eq!(out.as_deref(), Some("const X = 1;\nexport const Y = 2;\n"));
}

#[test]
fn strips_default_from_named_function() {
    let out = rewrite(
        "a.js",
        "export default function main() { return 1; }\n",
        &["default"],
    );
    assert_eq!(out.as_deref(), Some("function main() { return 1; }\n"));
}

#[test]
fn strips_default_expression_export() {
    let out = rewrite("a.js", "export default 42;\n", &["default"]);
    assert_eq!(out.as_deref(), Some("42;\n"));
}

#[test]
fn rewrites_clause_keeping_live_specifiers() {
    let out = rewrite(
        "a.js",
        "const a = 1;\nconst b = 2;\nexport { a, b };\n",
        &["a"],
    );
    assert_eq!(out.as_deref(), Some("const a = 1;\nconst b = 2;\nexport { b };\n"));
}

#[test]
fn clause_alias_is_matched_by_exported_name() {
    let out = rewrite(
        "a.js",
        "const local = 1;\nconst other = 2;\nexport { local as dead, other };\n",
        &["dead"],
    );
    assert_eq!(
        out.as_deref(),
        Some("const local = 1;\nconst other = 2;\nexport { other };\n")
    );
}

#[test]
fn deletes_clause_statement_once_empty() {
    let out = rewrite("a.js", "const a = 1;\nexport { a };\nconst b = 2;\n", &["a"]);
    assert_eq!(out.as_deref(), Some("const a = 1;\nconst b = 2;\n"));
}

#[test]
fn rewrites_re_export_clause_and_keeps_the_source() {
    let out = rewrite(
        "a.js",
        "export { dead, live } from './m';\n",
        &["dead"],
    );
    assert_eq!(out.as_deref(), Some("export { live } from './m';\n"));
}

#[test]
fn deletes_re_export_statement_once_empty() {
    let out = rewrite(
        "a.js",
        "export { dead } from './m';\nexport const keep = 1;\n",
        &["dead"],
    );
    assert_eq!(out.as_deref(), Some("export const keep = 1;\n"));
}

#[test]
fn deletes_namespace_re_export_whole() {
    let out = rewrite(
        "a.js",
        "export * as ns from './m';\nconst after = 1;\n",
        &["ns"],
    );
    assert_eq!(out.as_deref(), Some("const after = 1;\n"));
}

#[test]
fn bare_star_re_export_is_never_touched() {
    let out = rewrite("a.js", "export * from './m';\n", &["*", "anything"]);
    assert!(out.is_none());
}

#[test]
fn multi_declarator_statement_needs_every_name_dead() {
    let source = "export const a = 1, b = 2;\n";
    assert!(rewrite("a.js", source, &["a"]).is_none());
    assert_eq!(
        rewrite("a.js", source, &["a", "b"]).as_deref(),
        Some("const a = 1, b = 2;\n")
    );
}

#[test]
fn type_only_clause_keeps_the_type_keyword() {
    let out = rewrite(
        "a.ts",
        "export type { Dead, Live } from './types';\n",
        &["Dead"],
    );
    assert_eq!(out.as_deref(), Some("export type { Live } from './types';\n"));
}

#[test]
fn strips_typescript_declaration_kinds() {
    let out = rewrite(
        "a.ts",
        "export interface Shape {}\nexport type Alias = string;\nexport enum Color { Red }\n",
        &["Shape", "Alias", "Color"],
    );
    assert_eq!(
        out.as_deref(),
        Some("interface Shape {}\ntype Alias = string;\nenum Color { Red }\n")
    );
}

#[test]
fn rewriting_is_idempotent() {
    let source = "export const dead = 1;\nexport const live = 2;\n";
    let first = rewrite("a.js", source, &["dead"]).unwrap();
    assert!(rewrite("a.js", &first, &["dead"]).is_none());
}

#[test]
fn multiple_edits_apply_without_overlap() {
    let out = rewrite(
        "a.js",
        "export const a = 1;\nexport const keep = 2;\nexport default a;\nexport { b } from './m';\n",
        &["a", "default", "b"],
    );
    assert_eq!(
        out.as_deref(),
        Some("const a = 1;\nexport const keep = 2;\na;\n")
    );
}

#[test]
fn fix_file_rewrites_in_place_and_second_run_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.js");
    fs::write(&file, "export const dead = 1;\nexport const live = 2;\n").unwrap();

    let fixer = ExportFixer::new();
    assert!(fixer.fix_file(&file, &["dead".to_string()]).unwrap());
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "const dead = 1;\nexport const live = 2;\n"
    );
    // no leftover temp file
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);

    assert!(!fixer.fix_file(&file, &["dead".to_string()]).unwrap());
}

#[test]
fn apply_isolates_missing_files() {
    let dir = TempDir::new().unwrap();
    let present = dir.path().join("a.js");
    fs::write(&present, "export const dead = 1;\n").unwrap();

    let report = vec![
        FileUnusedExports {
            file: dir.path().join("gone.js"),
            unused_exports: vec!["x".to_string()],
        },
        FileUnusedExports {
            file: present.clone(),
            unused_exports: vec!["dead".to_string()],
        },
    ];
    let summary = ExportFixer::new().apply(&report);
    assert_eq!(summary.files_changed, 1);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(fs::read_to_string(&present).unwrap(), "const dead = 1;\n");
}
