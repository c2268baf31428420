use crate::error::{Result, XrefError};
use crate::types::{DependencyGraph, FileEdge, FileNode, RelationshipType};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file node
    pub fn add_file(&mut self, node: FileNode) -> NodeIndex {
        let file_index = node.file_index;
        let path = node.path.clone();
        let idx = self.graph.add_node(node);
        self.file_nodes.insert(file_index, idx);
        self.path_index.insert(path, idx);
        idx
    }

    /// Add an edge unless the same relationship already links the two files
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: FileEdge) -> bool {
        if from == to
            || self
                .graph
                .edges_connecting(from, to)
                .any(|existing| existing.weight() == &edge)
        {
            return false;
        }
        self.graph.add_edge(from, to, edge);
        true
    }

    pub fn node_for_file(&self, file_index: usize) -> Option<NodeIndex> {
        self.file_nodes.get(&file_index).copied()
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges as (from, to, edge), in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&FileNode, &FileNode, &FileEdge)> {
        self.graph.edge_references().map(|e| {
            (
                &self.graph[e.source()],
                &self.graph[e.target()],
                e.weight(),
            )
        })
    }

    /// Files that `path` depends on, optionally filtered by relationship
    pub fn dependencies(
        &self,
        path: &str,
        relationship: Option<RelationshipType>,
    ) -> Result<Vec<&FileNode>> {
        self.neighbors(path, relationship, Direction::Outgoing)
    }

    /// Files that depend on `path`
    pub fn dependents(
        &self,
        path: &str,
        relationship: Option<RelationshipType>,
    ) -> Result<Vec<&FileNode>> {
        self.neighbors(path, relationship, Direction::Incoming)
    }

    fn neighbors(
        &self,
        path: &str,
        relationship: Option<RelationshipType>,
        direction: Direction,
    ) -> Result<Vec<&FileNode>> {
        let node = *self
            .path_index
            .get(path)
            .ok_or_else(|| XrefError::file_not_found(path))?;

        let mut nodes: Vec<&FileNode> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| relationship.map_or(true, |r| e.weight().relationship == r))
            .map(|e| {
                let other = if e.source() == node { e.target() } else { e.source() };
                &self.graph[other]
            })
            .collect();
        nodes.sort_by_key(|n| n.file_index);
        nodes.dedup_by_key(|n| n.file_index);
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn edge(relationship: RelationshipType, detail: &str) -> FileEdge {
        FileEdge {
            relationship,
            detail: detail.to_string(),
        }
    }

    #[test]
    fn deduplicates_identical_edges() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_file(FileNode::new(0, "src/a.js"));
        let b = graph.add_file(FileNode::new(1, "src/b.js"));

        assert!(graph.add_edge(a, b, edge(RelationshipType::Imports, "./b")));
        assert!(!graph.add_edge(a, b, edge(RelationshipType::Imports, "./b")));
        assert!(graph.add_edge(a, b, edge(RelationshipType::Calls, "run")));
        assert!(!graph.add_edge(a, a, edge(RelationshipType::Calls, "self")));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn queries_neighbors_both_ways() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_file(FileNode::new(0, "src/a.js"));
        let b = graph.add_file(FileNode::new(1, "src/b.js"));
        let c = graph.add_file(FileNode::new(2, "src/c.js"));
        graph.add_edge(a, b, edge(RelationshipType::Imports, "./b"));
        graph.add_edge(a, b, edge(RelationshipType::Calls, "build"));
        graph.add_edge(c, b, edge(RelationshipType::Calls, "build"));

        let deps: Vec<_> = graph
            .dependencies("src/a.js", None)
            .unwrap()
            .into_iter()
            .map(|n| n.path.as_str())
            .collect();
        assert_eq!(deps, vec!["src/b.js"]);

        let callers: Vec<_> = graph
            .dependents("src/b.js", Some(RelationshipType::Calls))
            .unwrap()
            .into_iter()
            .map(|n| n.path.as_str())
            .collect();
        assert_eq!(callers, vec!["src/a.js", "src/c.js"]);

        assert!(matches!(
            graph.dependencies("missing.js", None),
            Err(XrefError::FileNotFound(_))
        ));
    }

    #[test]
    fn stems_ignore_directories_and_extension() {
        assert_eq!(FileNode::new(0, "src/utils/DateFormat.ts").stem, "dateformat");
        assert_eq!(FileNode::new(0, "Makefile").stem, "makefile");
        assert_eq!(FileNode::new(0, r"lib\helpers.py").stem, "helpers");
    }
}
