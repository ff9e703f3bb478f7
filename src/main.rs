use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use husk::config::Config;
use husk::core::{ExportFixer, ProjectAnalyzer};
use husk::formatters::{
    print_box, print_report, print_summary, print_warnings, ResultsWriter, RunSummary,
};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "husk",
    version = "0.1.0",
    author = "husk developers",
    about = "Find exported symbols nothing imports, and optionally strip the dead export markers"
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Project root (defaults to the config file's directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Rewrite affected files, stripping unused export qualifiers
    #[arg(long)]
    fix: bool,

    /// Directory to write exports.json / imports.json / unused.json into
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let start = Instant::now();

    let config = Config::load(&cli.config, cli.root.as_deref())?;
    print_box("Current Configuration");
    println!("{}", serde_json::to_string_pretty(&config)?);

    let analyzer = ProjectAnalyzer::new(config);
    let report = analyzer.analyze()?;

    print_warnings(&report.diagnostics);

    if cli.fix {
        print_box("Fix Exports");
        let summary = ExportFixer::new().apply(&report.unused_exports);
        println!(
            "Rewrote {} files ({} failed)",
            summary.files_changed, summary.files_failed
        );
    } else {
        print_box("Report");
        print_report(&report.unused_exports);
    }

    if let Some(out_dir) = cli.out_dir {
        print_box("Save Results");
        if out_dir.is_dir() {
            ResultsWriter::new(&out_dir).write(&report)?;
        } else {
            eprintln!(
                "Warning: output dir does not exist - {}",
                out_dir.display()
            );
        }
    }

    print_summary(&RunSummary {
        unused_export_count: report.unused_export_count(),
        affected_file_count: report.unused_exports.len(),
        source_file_count: report.source_file_count,
        test_file_count: report.test_file_count,
        elapsed_ms: start.elapsed().as_millis(),
    });

    Ok(())
}
