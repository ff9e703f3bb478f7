use anyhow::{bail, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::resolver::normalize_path;

/// Enumerates the configured source/test path sets into concrete file
/// lists. Output is normalized, sorted, and deduplicated so downstream
/// ordering is stable regardless of directory iteration order.
pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan(&self, root: &Path, paths: &[String], extensions: &[String]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in paths {
            let full = normalize_path(&root.join(path));
            if !full.exists() {
                bail!("configured path does not exist: {}", full.display());
            }
            if full.is_file() {
                if matches_extension(&full, extensions) {
                    files.push(full);
                }
                continue;
            }

            let entries: Vec<_> = WalkDir::new(&full)
                .follow_links(false)
                .into_iter()
                .filter_entry(|entry| entry.file_name() != "node_modules")
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .collect();

            let mut matched: Vec<PathBuf> = entries
                .par_iter()
                .filter(|entry| matches_extension(entry.path(), extensions))
                .map(|entry| normalize_path(entry.path()))
                .collect();
            files.append(&mut matched);
        }
        files.sort();
        files.dedup();
        Ok(files)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|candidate| candidate == ext))
        .unwrap_or(false)
}
