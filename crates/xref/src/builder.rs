use crate::error::{Result, XrefError};
use crate::types::{DependencyGraph, FileEdge, FileNode, RelationshipType};
use filepack_chunker::{EntryKind, SourceFile, StructuralInfo};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Names too generic to identify a definition across files
const GENERIC_FUNCTION_NAMES: &[&str] = &["constructor", "__init__", "main", "get", "set", "toString"];

const MIN_FUNCTION_NAME_LEN: usize = 3;

/// Import keys shorter than this match too many file stems
const MIN_MODULE_KEY_LEN: usize = 2;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("valid regex literal"));

/// Builds the file dependency graph from structural analysis
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    resolve_imports: bool,
    resolve_calls: bool,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl GraphBuilder {
    #[must_use]
    pub const fn new(resolve_imports: bool, resolve_calls: bool) -> Self {
        Self {
            resolve_imports,
            resolve_calls,
        }
    }

    /// Build the graph; `structures[i]` must describe `files[i]`
    pub fn build(&self, files: &[SourceFile], structures: &[StructuralInfo]) -> Result<DependencyGraph> {
        if files.len() != structures.len() {
            return Err(XrefError::StructureMismatch {
                files: files.len(),
                structures: structures.len(),
            });
        }

        let mut graph = DependencyGraph::new();
        let nodes: Vec<_> = files
            .iter()
            .enumerate()
            .map(|(idx, file)| graph.add_file(FileNode::new(idx, file.path())))
            .collect();

        if self.resolve_imports {
            self.add_import_edges(&mut graph, files, structures, &nodes);
        }
        if self.resolve_calls {
            self.add_call_edges(&mut graph, files, structures, &nodes);
        }

        log::debug!(
            "Built dependency graph: {} files, {} edges",
            graph.file_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn add_import_edges(
        &self,
        graph: &mut DependencyGraph,
        files: &[SourceFile],
        structures: &[StructuralInfo],
        nodes: &[petgraph::graph::NodeIndex],
    ) {
        let targets: Vec<(usize, String)> = files
            .iter()
            .enumerate()
            .filter(|(_, file)| file.kind == EntryKind::Text)
            .map(|(idx, _)| (idx, graph.graph[nodes[idx]].stem.clone()))
            .collect();

        for (from, info) in structures.iter().enumerate() {
            for import in &info.imports {
                let Some(key) = module_key(&import.module) else {
                    continue;
                };

                let candidates: Vec<usize> = targets
                    .iter()
                    .filter(|(idx, stem)| *idx != from && (stem.contains(&key) || key.contains(stem.as_str())))
                    .map(|(idx, _)| *idx)
                    .collect();
                // Exact stem matches win over partial ones.
                let exact: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&idx| targets.iter().any(|(t, stem)| *t == idx && *stem == key))
                    .collect();
                let resolved = if exact.is_empty() { candidates } else { exact };

                if resolved.is_empty() {
                    log::trace!("Unresolved import '{}' in {}", import.module, files[from].path());
                }
                for to in resolved {
                    graph.add_edge(
                        nodes[from],
                        nodes[to],
                        FileEdge {
                            relationship: RelationshipType::Imports,
                            detail: import.module.clone(),
                        },
                    );
                }
            }
        }
    }

    fn add_call_edges(
        &self,
        graph: &mut DependencyGraph,
        files: &[SourceFile],
        structures: &[StructuralInfo],
        nodes: &[petgraph::graph::NodeIndex],
    ) {
        let mut definitions: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
        for (idx, info) in structures.iter().enumerate() {
            for function in &info.functions {
                if is_matchable_name(&function.name) {
                    definitions.entry(function.name.as_str()).or_default().insert(idx);
                }
            }
        }
        if definitions.is_empty() {
            return;
        }

        for (from, file) in files.iter().enumerate() {
            if file.kind != EntryKind::Text {
                continue;
            }
            for name in called_names(&file.content) {
                let Some(defined_in) = definitions.get(name.as_str()) else {
                    continue;
                };
                // A local definition shadows the others.
                if defined_in.contains(&from) {
                    continue;
                }
                for &to in defined_in {
                    graph.add_edge(
                        nodes[from],
                        nodes[to],
                        FileEdge {
                            relationship: RelationshipType::Calls,
                            detail: name.clone(),
                        },
                    );
                }
            }
        }
    }
}

/// Reduce an import path to the name compared against file stems.
///
/// `./utils/dates.js` -> `dates`, `com.example.Parser` -> `parser`,
/// `@scope/widgets` -> `widgets`.
pub fn module_key(module: &str) -> Option<String> {
    let module = module.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
    let key = match module.rsplit_once('/') {
        Some((_, last)) => last.rsplit_once('.').map_or(last, |(stem, _)| stem),
        None => module.rsplit('.').next().unwrap_or(module),
    };
    let key = key.trim().to_lowercase();
    (key.len() >= MIN_MODULE_KEY_LEN && key != "*").then_some(key)
}

fn is_matchable_name(name: &str) -> bool {
    name.chars().count() >= MIN_FUNCTION_NAME_LEN && !GENERIC_FUNCTION_NAMES.contains(&name)
}

/// Identifiers directly followed by `(` anywhere in `content`, in first-seen order
fn called_names(content: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut names = Vec::new();
    for m in IDENTIFIER.find_iter(content) {
        let rest = content[m.end()..].trim_start_matches([' ', '\t']);
        if rest.starts_with('(') && seen.insert(m.as_str()) {
            names.push(m.as_str().to_string());
        }
    }
    names
}
