use serde::Serialize;
use std::collections::VecDeque;
use std::path::PathBuf;

use super::graph::ExportGraph;

/// One file's dead exports, names in first-declaration order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileUnusedExports {
    pub file: PathBuf,
    pub unused_exports: Vec<String>,
}

/// Computes which export nodes no import can reach.
///
/// Seeds: every cross-file reference plus every export of a
/// namespace-targeted file (namespace imports over-approximate — member
/// access cannot be traced without type information, and false negatives
/// are the safe direction for an auto-fixer). Usage then propagates along
/// re-export edges with an explicit worklist until fixpoint, so a name is
/// never flagged dead merely because only its re-exporter is imported.
///
/// Output is grouped by file (sorted) and deterministic across runs; files
/// with no exports, or none unused, are absent. Synthetic `export *`
/// expansion nodes are never reported.
pub fn compute_unused(graph: &ExportGraph) -> Vec<FileUnusedExports> {
    let mut used = vec![false; graph.graph.node_count()];
    let mut queue = VecDeque::new();

    for &idx in graph.source_refs.iter().chain(graph.test_refs.iter()) {
        if !used[idx.index()] {
            used[idx.index()] = true;
            queue.push_back(idx);
        }
    }
    for file in &graph.namespace_targets {
        let Some(nodes) = graph.file_nodes.get(file) else {
            continue;
        };
        for &idx in nodes {
            if !used[idx.index()] {
                used[idx.index()] = true;
                queue.push_back(idx);
            }
        }
    }

    while let Some(idx) = queue.pop_front() {
        for target in graph.graph.neighbors(idx) {
            if !used[target.index()] {
                used[target.index()] = true;
                queue.push_back(target);
            }
        }
    }

    let mut result = Vec::new();
    for (file, nodes) in &graph.file_nodes {
        let unused: Vec<String> = nodes
            .iter()
            .filter(|&&idx| !used[idx.index()] && !graph.graph[idx].synthetic)
            .map(|&idx| graph.graph[idx].name.render())
            .collect();
        if !unused.is_empty() {
            result.push(FileUnusedExports {
                file: file.clone(),
                unused_exports: unused,
            });
        }
    }
    result
}
