use crate::core::{Diagnostics, FileUnusedExports};

const BOX_WIDTH: usize = 60;

pub fn print_box(title: &str) {
    println!("┌{}┐", "─".repeat(BOX_WIDTH));
    println!("|{:^width$}|", title, width = BOX_WIDTH);
    println!("└{}┘", "─".repeat(BOX_WIDTH));
}

pub fn print_report(unused: &[FileUnusedExports]) {
    if unused.is_empty() {
        println!("No unused exports found.");
        return;
    }
    for entry in unused {
        println!("{}", entry.file.display());
        for name in &entry.unused_exports {
            println!("  {name}");
        }
    }
}

pub fn print_warnings(diagnostics: &Diagnostics) {
    if !diagnostics.unknown_packages.is_empty() {
        eprintln!(
            "Unknown packages found. Add the package to the package.json \
             dependency list or specify an alias."
        );
        let mut packages: Vec<_> = diagnostics.unknown_packages.iter().collect();
        packages.sort();
        for (package, count) in packages {
            eprintln!("  {package} ({count})");
        }
    }

    if !diagnostics.failed_resolutions.is_empty() {
        eprintln!(
            "Unable to resolve the following import paths. Specify \"alias\" \
             if needed or add a pattern to \"ignoreImportPatterns\"."
        );
        let mut specifiers: Vec<_> = diagnostics.failed_resolutions.iter().collect();
        specifiers.sort();
        for (specifier, count) in specifiers {
            eprintln!("  {specifier} ({count})");
        }
    }
}

pub struct RunSummary {
    pub unused_export_count: usize,
    pub affected_file_count: usize,
    pub source_file_count: usize,
    pub test_file_count: usize,
    pub elapsed_ms: u128,
}

pub fn print_summary(summary: &RunSummary) {
    print_box("Unused Exports Summary");
    println!("   Unused export count: {}", summary.unused_export_count);
    println!("   Affected file count: {}", summary.affected_file_count);
    println!("    Total source files: {}", summary.source_file_count);
    println!("      Total test files: {}", summary.test_file_count);
    println!("          Completed in: {} ms", summary.elapsed_ms);
}
