use husk::config::Config;
use husk::core::{AnalysisReport, ProjectAnalyzer};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn analyze(files: &[(&str, &str)]) -> (TempDir, AnalysisReport) {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::create_dir_all(dir.path().join("tests")).unwrap();
    for (rel, contents) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
    }
    let config = Config::new(
        dir.path(),
        vec!["src".to_string()],
        vec!["tests".to_string()],
    );
    let report = ProjectAnalyzer::new(config).analyze().unwrap();
    (dir, report)
}

fn unused_for<'a>(report: &'a AnalysisReport, dir: &Path, rel: &str) -> Option<&'a Vec<String>> {
    let path = dir.join(rel);
    report
        .unused_exports
        .iter()
        .find(|entry| entry.file == path)
        .map(|entry| &entry.unused_exports)
}

#[test]
fn unimported_exports_are_flagged_in_declaration_order() {
    let (dir, report) = analyze(&[(
        "src/a.js",
        "export const X = 1;\nexport default function () {}\n",
    )]);

    assert_eq!(
        unused_for(&report, dir.path(), "src/a.js"),
        Some(&vec!["X".to_string(), "default".to_string()])
    );
    assert_eq!(report.source_file_count, 1);
}

#[test]
fn imported_names_are_not_flagged() {
    let (dir, report) = analyze(&[
        ("src/a.js", "export const X = 1;\nexport const Y = 2;\n"),
        ("src/b.js", "import { Y } from './a';\nconsole.log(Y);\n"),
    ]);

    assert_eq!(
        unused_for(&report, dir.path(), "src/a.js"),
        Some(&vec!["X".to_string()])
    );
}

#[test]
fn usage_flows_through_named_re_export_chains() {
    let (dir, report) = analyze(&[
        ("src/c.js", "export const v = 1;\nexport const w = 2;\n"),
        ("src/b.js", "export { v, w } from './c';\n"),
        ("src/a.js", "import { v } from './b';\nconsole.log(v);\n"),
    ]);

    // `v` is used through the chain; `w` is dead on both hops.
    assert_eq!(
        unused_for(&report, dir.path(), "src/b.js"),
        Some(&vec!["w".to_string()])
    );
    assert_eq!(
        unused_for(&report, dir.path(), "src/c.js"),
        Some(&vec!["w".to_string()])
    );
}

#[test]
fn unimported_re_export_flags_both_ends() {
    let (dir, report) = analyze(&[
        ("src/c.js", "export const v = 1;\n"),
        ("src/b.js", "export { v } from './c';\n"),
    ]);

    assert_eq!(
        unused_for(&report, dir.path(), "src/b.js"),
        Some(&vec!["v".to_string()])
    );
    assert_eq!(
        unused_for(&report, dir.path(), "src/c.js"),
        Some(&vec!["v".to_string()])
    );
}

#[test]
fn namespace_import_keeps_every_export_of_the_target() {
    let (dir, report) = analyze(&[
        ("src/a.js", "export const X = 1;\nexport const Y = 2;\n"),
        ("src/b.js", "import * as a from './a';\nconsole.log(a);\n"),
    ]);

    assert_eq!(unused_for(&report, dir.path(), "src/a.js"), None);
}

#[test]
fn side_effect_import_keeps_every_export_of_the_target() {
    let (dir, report) = analyze(&[
        ("src/a.js", "export const X = 1;\n"),
        ("src/b.js", "import './a';\n"),
    ]);

    assert_eq!(unused_for(&report, dir.path(), "src/a.js"), None);
}

#[test]
fn dynamic_import_keeps_every_export_of_the_target() {
    let (dir, report) = analyze(&[
        ("src/a.js", "export const X = 1;\n"),
        ("src/b.js", "export function load() { return import('./a'); }\n"),
        ("src/c.js", "import { load } from './b';\nload();\n"),
    ]);

    assert_eq!(unused_for(&report, dir.path(), "src/a.js"), None);
}

#[test]
fn star_re_export_passes_names_through_without_reporting_the_middle() {
    let (dir, report) = analyze(&[
        ("src/a.js", "export const x = 1;\nexport const y = 2;\n"),
        ("src/b.js", "export * from './a';\n"),
        ("src/c.js", "import { x } from './b';\nconsole.log(x);\n"),
    ]);

    assert_eq!(
        unused_for(&report, dir.path(), "src/a.js"),
        Some(&vec!["y".to_string()])
    );
    // b.js only has synthetic pass-through nodes, never reported
    assert_eq!(unused_for(&report, dir.path(), "src/b.js"), None);
    assert!(!report
        .exported_names
        .contains_key(&dir.path().join("src/b.js")));
}

#[test]
fn star_chains_expand_to_fixpoint() {
    let (dir, report) = analyze(&[
        ("src/a.js", "export const deep = 1;\n"),
        ("src/b.js", "export * from './a';\n"),
        ("src/c.js", "export * from './b';\n"),
        ("src/d.js", "import { deep } from './c';\nconsole.log(deep);\n"),
    ]);

    assert_eq!(unused_for(&report, dir.path(), "src/a.js"), None);
}

#[test]
fn local_declaration_shadows_star_re_export() {
    let (dir, report) = analyze(&[
        ("src/a.js", "export const x = 1;\n"),
        ("src/b.js", "export * from './a';\nexport const x = 2;\n"),
        ("src/c.js", "import { x } from './b';\nconsole.log(x);\n"),
    ]);

    // b's own `x` wins, so a's `x` is never reached
    assert_eq!(unused_for(&report, dir.path(), "src/b.js"), None);
    assert_eq!(
        unused_for(&report, dir.path(), "src/a.js"),
        Some(&vec!["x".to_string()])
    );
}

#[test]
fn self_import_is_not_a_use() {
    let (dir, report) = analyze(&[(
        "src/a.js",
        "import { X } from './a';\nexport const X = 1;\nconsole.log(X);\n",
    )]);

    assert_eq!(
        unused_for(&report, dir.path(), "src/a.js"),
        Some(&vec!["X".to_string()])
    );
}

#[test]
fn test_file_imports_count_as_usage() {
    let (dir, report) = analyze(&[
        ("src/a.js", "export const X = 1;\nexport const Y = 2;\n"),
        (
            "tests/a.test.js",
            "import { X } from '../src/a';\nconsole.log(X);\n",
        ),
    ]);

    assert_eq!(
        unused_for(&report, dir.path(), "src/a.js"),
        Some(&vec!["Y".to_string()])
    );
    assert_eq!(report.test_file_count, 1);
    // test-set references land in the test map, not the source map
    assert!(report
        .imported_names_test
        .contains_key(&dir.path().join("tests/a.test.js")));
}

#[test]
fn test_file_exports_are_not_reported() {
    let (dir, report) = analyze(&[
        ("src/a.js", "export const X = 1;\n"),
        ("src/b.js", "import { X } from './a';\nconsole.log(X);\n"),
        ("tests/helper.js", "export const fixture = 1;\n"),
    ]);

    assert_eq!(unused_for(&report, dir.path(), "tests/helper.js"), None);
    assert!(report.unused_exports.is_empty());
}

#[test]
fn results_are_deterministic_across_runs() {
    let files: &[(&str, &str)] = &[
        ("src/a.js", "export const one = 1;\nexport const two = 2;\n"),
        ("src/b.js", "export * from './a';\nexport const three = 3;\n"),
        ("src/c.js", "import { one } from './b';\nconsole.log(one);\n"),
    ];
    let (_dir_a, first) = analyze(files);
    let (_dir_b, second) = analyze(files);

    let strip = |report: &AnalysisReport| {
        report
            .unused_exports
            .iter()
            .map(|e| {
                (
                    e.file.file_name().unwrap().to_owned(),
                    e.unused_exports.clone(),
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&first), strip(&second));
}

#[test]
fn unknown_packages_count_occurrences_across_files() {
    let (_dir, report) = analyze(&[
        ("src/a.js", "import _ from 'lodash';\nexport const X = _;\n"),
        (
            "src/b.js",
            "import { merge } from 'lodash';\nimport { X } from './a';\nexport const Y = merge(X);\n",
        ),
        ("src/c.js", "import { Y } from './b';\nconsole.log(Y);\n"),
    ]);

    assert_eq!(report.diagnostics.unknown_packages.get("lodash"), Some(&2));
}

#[test]
fn unreadable_file_is_counted_not_fatal() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/ok.js"), "export const X = 1;\n").unwrap();
    // invalid UTF-8, cannot be read as source text
    fs::write(dir.path().join("src/bad.js"), [0xff, 0xfe, 0x00, 0xff]).unwrap();

    let config = Config::new(dir.path(), vec!["src".to_string()], vec![]);
    let report = ProjectAnalyzer::new(config).analyze().unwrap();

    let key = dir.path().join("src/bad.js").to_string_lossy().to_string();
    assert_eq!(report.diagnostics.failed_resolutions.get(&key), Some(&1));
    assert_eq!(
        unused_for(&report, dir.path(), "src/ok.js"),
        Some(&vec!["X".to_string()])
    );
}

#[test]
fn empty_report_when_everything_is_used() {
    let (_dir, report) = analyze(&[
        ("src/a.js", "export const X = 1;\n"),
        ("src/b.js", "import { X } from './a';\nexport default X;\n"),
        ("src/c.js", "import b from './b';\nconsole.log(b);\n"),
    ]);

    // c.js exports nothing; a and b are fully imported
    assert!(report.unused_exports.is_empty());
    assert_eq!(report.unused_export_count(), 0);
}
