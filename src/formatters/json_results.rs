use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::AnalysisReport;

/// Writes the run's result sets as pretty-printed JSON into a
/// caller-chosen directory: `exports.json`, `imports.json`, `unused.json`.
pub struct ResultsWriter {
    out_dir: PathBuf,
}

impl ResultsWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn write(&self, report: &AnalysisReport) -> Result<()> {
        self.write_file("exports.json", &report.exported_names)?;
        self.write_file("imports.json", &report.imported_names)?;
        self.write_file("unused.json", &report.unused_exports)?;
        Ok(())
    }

    fn write_file<T: serde::Serialize>(&self, name: &str, contents: &T) -> Result<()> {
        let path = self.out_dir.join(name);
        let json = serde_json::to_string_pretty(contents)?;
        fs::write(&path, json).with_context(|| format!("unable to write {}", path.display()))?;
        println!("{}", path.display());
        Ok(())
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
