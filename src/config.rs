use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::normalize_path;

pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs"];

/// Shape of the JSON config file. `sourcePaths` and `testPaths` are
/// required (an explicitly empty test set is fine, a missing one is not);
/// everything else has defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    source_paths: Option<Vec<String>>,
    test_paths: Option<Vec<String>>,
    alias: Option<BTreeMap<String, String>>,
    ignore_import_patterns: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
    packages: Option<Vec<String>>,
}

/// Effective configuration of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub root: PathBuf,
    pub source_paths: Vec<String>,
    pub test_paths: Vec<String>,
    /// Specifier prefix → root-relative path substitution.
    pub alias: BTreeMap<String, String>,
    /// Regex patterns; matching specifiers are treated as external and
    /// never diagnosed (dynamically constructed imports and the like).
    pub ignore_import_patterns: Vec<String>,
    pub extensions: Vec<String>,
    /// Declared dependency set: config `packages` plus whatever
    /// package.json at the root declares.
    pub packages: BTreeSet<String>,
}

impl Config {
    /// Defaults for the given root and path sets; no package.json harvest.
    pub fn new(root: impl Into<PathBuf>, source_paths: Vec<String>, test_paths: Vec<String>) -> Self {
        Self {
            root: normalize_path(&root.into()),
            source_paths,
            test_paths,
            alias: BTreeMap::new(),
            ignore_import_patterns: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            packages: BTreeSet::new(),
        }
    }

    /// Loads a JSON config file. The project root defaults to the config
    /// file's directory. Unreadable or invalid config aborts the run
    /// before any extraction.
    pub fn load(config_path: &Path, root_override: Option<&Path>) -> Result<Self> {
        let text = fs::read_to_string(config_path)
            .with_context(|| format!("unable to read config file: {}", config_path.display()))?;
        let raw: RawConfig = serde_json::from_str(&text)
            .with_context(|| format!("invalid config file: {}", config_path.display()))?;

        let root = match root_override {
            Some(root) => root.to_path_buf(),
            None => config_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf(),
        };
        Self::from_raw(raw, normalize_path(&root))
    }

    fn from_raw(raw: RawConfig, root: PathBuf) -> Result<Self> {
        let Some(source_paths) = raw.source_paths else {
            bail!("config is missing \"sourcePaths\"");
        };
        let Some(test_paths) = raw.test_paths else {
            bail!("config is missing \"testPaths\"");
        };

        let mut packages: BTreeSet<String> = raw.packages.unwrap_or_default().into_iter().collect();
        packages.extend(read_package_dependencies(&root));

        Ok(Self {
            root,
            source_paths,
            test_paths,
            alias: raw.alias.unwrap_or_default(),
            ignore_import_patterns: raw.ignore_import_patterns.unwrap_or_default(),
            extensions: raw
                .extensions
                .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()),
            packages,
        })
    }
}

/// Package names declared in package.json at the root, across
/// dependencies, devDependencies, and peerDependencies. A missing or
/// malformed package.json yields an empty set; undeclared imports then
/// surface as unknown-package warnings rather than hard errors.
pub fn read_package_dependencies(root: &Path) -> BTreeSet<String> {
    let path = root.join("package.json");
    let Ok(text) = fs::read_to_string(&path) else {
        return BTreeSet::new();
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
        eprintln!("Warning: unable to parse {}", path.display());
        return BTreeSet::new();
    };

    let mut packages = BTreeSet::new();
    for section in ["dependencies", "devDependencies", "peerDependencies"] {
        if let Some(map) = value.get(section).and_then(|v| v.as_object()) {
            packages.extend(map.keys().cloned());
        }
    }
    packages
}
