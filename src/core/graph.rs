use petgraph::{graph::NodeIndex, Directed, Graph};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use super::resolver::ResolvedSpecifier;
use crate::parsers::ModuleSymbols;

/// Identity of one thing a module makes available to importers.
///
/// `Namespace` only occurs on re-export statements (`export * from './m'`);
/// it never becomes a graph node of its own, the builder expands it into
/// per-name pass-through edges instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExportName {
    Default,
    Named(String),
    Namespace,
}

impl ExportName {
    pub fn render(&self) -> String {
        match self {
            ExportName::Default => "default".to_string(),
            ExportName::Named(name) => name.clone(),
            ExportName::Namespace => "*".to_string(),
        }
    }
}

impl fmt::Display for ExportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportName {
    Default,
    Named(String),
    /// `import * as ns from './m'` — can reach every export of the target.
    NamespaceAll,
}

impl ImportName {
    pub fn render(&self) -> String {
        match self {
            ImportName::Default => "default".to_string(),
            ImportName::Named(name) => name.clone(),
            ImportName::NamespaceAll => "*".to_string(),
        }
    }

    /// The export node identity this import targets when resolved locally.
    pub fn as_export_name(&self) -> ExportName {
        match self {
            ImportName::Default => ExportName::Default,
            ImportName::Named(name) => ExportName::Named(name.clone()),
            ImportName::NamespaceAll => ExportName::Namespace,
        }
    }
}

/// One declared export, before graph construction. The owning file lives on
/// the surrounding `ModuleSymbols`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSymbol {
    pub name: ExportName,
    pub line: usize,
}

/// One import reference, still carrying its raw specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    pub name: ImportName,
    pub specifier: String,
    pub line: usize,
}

/// `export { x } from './y'` style statement as the extractor sees it: the
/// source side is an unresolved specifier until the builder runs it through
/// the module resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReExport {
    pub exported_name: ExportName,
    pub specifier: String,
    pub source_name: ExportName,
    pub line: usize,
}

/// An import reference after specifier resolution.
#[derive(Debug, Clone)]
pub struct ResolvedImportRef {
    pub name: ImportName,
    pub specifier: String,
    pub resolved: ResolvedSpecifier,
}

/// A re-export whose source specifier resolved to a local file. Edges whose
/// source failed to resolve are dropped (and counted) by the resolver.
#[derive(Debug, Clone)]
pub struct ResolvedReExport {
    pub exported_name: ExportName,
    pub source_file: PathBuf,
    pub source_name: ExportName,
    pub line: usize,
}

/// Everything resolution produced for one file.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    pub file: PathBuf,
    pub imports: Vec<ResolvedImportRef>,
    pub re_exports: Vec<ResolvedReExport>,
}

/// Graph node: one `(file, name)` export. Synthetic nodes come from
/// `export *` expansion; they propagate usage but are never reported or
/// rewritten since there is no per-name source text behind them.
#[derive(Debug, Clone)]
pub struct ExportNode {
    pub file: PathBuf,
    pub name: ExportName,
    pub line: usize,
    pub synthetic: bool,
}

/// Entry of the `importedNames` / `importedNamesTest` outputs.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolvedImport {
    pub specifier: String,
    pub imported: String,
    pub resolved: Option<PathBuf>,
}

/// Immutable result of one graph-build pass. Edges run from a re-exporting
/// node to the node it passes through to, so usage flows along outgoing
/// edges during the reachability pass.
pub struct ExportGraph {
    pub(crate) graph: Graph<ExportNode, (), Directed>,
    /// Per-file export nodes in first-declaration order.
    pub(crate) file_nodes: BTreeMap<PathBuf, Vec<NodeIndex>>,
    pub(crate) source_refs: HashSet<NodeIndex>,
    pub(crate) test_refs: HashSet<NodeIndex>,
    /// Files targeted by a namespace-style reference; every export of such
    /// a file counts as used.
    pub(crate) namespace_targets: HashSet<PathBuf>,
    pub exported_names: BTreeMap<PathBuf, Vec<String>>,
    pub imported_names: BTreeMap<PathBuf, Vec<ResolvedImport>>,
    pub imported_names_test: BTreeMap<PathBuf, Vec<ResolvedImport>>,
}

impl ExportGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Declared (reportable) exports, synthetic expansion nodes excluded.
    pub fn export_count(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|node| !node.synthetic)
            .count()
    }
}

pub struct GraphBuilder {
    graph: Graph<ExportNode, (), Directed>,
    node_map: HashMap<(PathBuf, ExportName), NodeIndex>,
    file_nodes: BTreeMap<PathBuf, Vec<NodeIndex>>,
    named_edges: Vec<(PathBuf, ExportName, PathBuf, ExportName)>,
    star_edges: Vec<(PathBuf, PathBuf, usize)>,
    ns_edges: Vec<(PathBuf, ExportName, PathBuf)>,
    pending_refs: Vec<(PathBuf, ExportName, bool)>,
    namespace_targets: HashSet<PathBuf>,
    imported_names: BTreeMap<PathBuf, Vec<ResolvedImport>>,
    imported_names_test: BTreeMap<PathBuf, Vec<ResolvedImport>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
            file_nodes: BTreeMap::new(),
            named_edges: Vec::new(),
            star_edges: Vec::new(),
            ns_edges: Vec::new(),
            pending_refs: Vec::new(),
            namespace_targets: HashSet::new(),
            imported_names: BTreeMap::new(),
            imported_names_test: BTreeMap::new(),
        }
    }

    /// Registers the declared export nodes of a source-set file. Named
    /// re-exports are declared exports of the file too; bare `export *`
    /// declares nothing by itself.
    pub fn add_module_exports(&mut self, module: &ModuleSymbols) {
        for export in &module.exports {
            self.ensure_node(&module.file, &export.name, export.line, false);
        }
        for re_export in &module.re_exports {
            if re_export.exported_name != ExportName::Namespace {
                self.ensure_node(&module.file, &re_export.exported_name, re_export.line, false);
            }
        }
    }

    /// Records the resolved references of one file. Same-file references
    /// (self-imports, self re-exports) never count as uses.
    pub fn add_module_refs(&mut self, module: &ResolvedModule, is_test: bool) {
        let names = if is_test {
            &mut self.imported_names_test
        } else {
            &mut self.imported_names
        };
        let entry = names.entry(module.file.clone()).or_default();

        for import in &module.imports {
            let local = match &import.resolved {
                ResolvedSpecifier::LocalFile(file) => Some(file.clone()),
                _ => None,
            };
            entry.push(ResolvedImport {
                specifier: import.specifier.clone(),
                imported: import.name.render(),
                resolved: local.clone(),
            });

            let Some(target) = local else { continue };
            if target == module.file {
                continue;
            }
            match &import.name {
                ImportName::NamespaceAll => {
                    self.namespace_targets.insert(target);
                }
                name => {
                    self.pending_refs
                        .push((target, name.as_export_name(), is_test));
                }
            }
        }

        for re_export in &module.re_exports {
            if re_export.source_file == module.file {
                continue;
            }
            match (&re_export.exported_name, &re_export.source_name) {
                (ExportName::Namespace, _) => {
                    self.star_edges.push((
                        module.file.clone(),
                        re_export.source_file.clone(),
                        re_export.line,
                    ));
                }
                (exported, ExportName::Namespace) => {
                    // `export * as ns from './m'`: using ns uses all of m.
                    self.ns_edges.push((
                        module.file.clone(),
                        exported.clone(),
                        re_export.source_file.clone(),
                    ));
                }
                (exported, source) => {
                    self.named_edges.push((
                        module.file.clone(),
                        exported.clone(),
                        re_export.source_file.clone(),
                        source.clone(),
                    ));
                }
            }
        }
    }

    pub fn build(mut self) -> ExportGraph {
        self.expand_star_edges();

        let ns_edges = std::mem::take(&mut self.ns_edges);
        for (file, name, source_file) in ns_edges {
            let Some(&from) = self.node_map.get(&(file, name)) else {
                continue;
            };
            if let Some(targets) = self.file_nodes.get(&source_file).cloned() {
                for to in targets {
                    if to != from && self.graph.find_edge(from, to).is_none() {
                        self.graph.add_edge(from, to, ());
                    }
                }
            }
        }

        let named_edges = std::mem::take(&mut self.named_edges);
        for (file, name, source_file, source_name) in named_edges {
            let Some(&from) = self.node_map.get(&(file, name)) else {
                continue;
            };
            // The source may legitimately lack the name (typo, stale code);
            // the specifier itself resolved, so this is not a diagnostic.
            let Some(&to) = self.node_map.get(&(source_file, source_name)) else {
                continue;
            };
            if self.graph.find_edge(from, to).is_none() {
                self.graph.add_edge(from, to, ());
            }
        }

        let mut source_refs = HashSet::new();
        let mut test_refs = HashSet::new();
        for (file, name, is_test) in &self.pending_refs {
            if let Some(&idx) = self.node_map.get(&(file.clone(), name.clone())) {
                if *is_test {
                    test_refs.insert(idx);
                } else {
                    source_refs.insert(idx);
                }
            }
        }

        let graph = &self.graph;
        for nodes in self.file_nodes.values_mut() {
            nodes.sort_by_key(|&idx| graph[idx].line);
        }

        let mut exported_names = BTreeMap::new();
        for (file, nodes) in &self.file_nodes {
            let declared: Vec<String> = nodes
                .iter()
                .filter(|&&idx| !self.graph[idx].synthetic)
                .map(|&idx| self.graph[idx].name.render())
                .collect();
            if !declared.is_empty() {
                exported_names.insert(file.clone(), declared);
            }
        }

        ExportGraph {
            graph: self.graph,
            file_nodes: self.file_nodes,
            source_refs,
            test_refs,
            namespace_targets: self.namespace_targets,
            exported_names,
            imported_names: self.imported_names,
            imported_names_test: self.imported_names_test,
        }
    }

    /// Expands `export * from './m'` into per-name pass-through edges.
    /// Chains of star re-exports grow each other's node sets, so iterate to
    /// a fixpoint; membership checks keep cycles from looping forever.
    fn expand_star_edges(&mut self) {
        let stars = std::mem::take(&mut self.star_edges);
        loop {
            let mut changed = false;
            for (file, source_file, line) in &stars {
                let Some(source_nodes) = self.file_nodes.get(source_file).cloned() else {
                    continue;
                };
                for to in source_nodes {
                    let name = self.graph[to].name.clone();
                    let (from, inserted) = self.ensure_node(file, &name, *line, true);
                    // A local declaration of the same name shadows the star
                    // re-export; only synthetic nodes pass through.
                    if !self.graph[from].synthetic {
                        continue;
                    }
                    if self.graph.find_edge(from, to).is_none() {
                        self.graph.add_edge(from, to, ());
                        changed = true;
                    } else if inserted {
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn ensure_node(
        &mut self,
        file: &PathBuf,
        name: &ExportName,
        line: usize,
        synthetic: bool,
    ) -> (NodeIndex, bool) {
        let key = (file.clone(), name.clone());
        if let Some(&idx) = self.node_map.get(&key) {
            return (idx, false);
        }
        let idx = self.graph.add_node(ExportNode {
            file: file.clone(),
            name: name.clone(),
            line,
            synthetic,
        });
        self.node_map.insert(key, idx);
        self.file_nodes.entry(file.clone()).or_default().push(idx);
        (idx, true)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
