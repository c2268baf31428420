use filepack_chunker::CrossReferenceKind;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relationship between two files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    /// A imports B (import statement resolved to a file)
    Imports,

    /// A calls a function defined in B
    Calls,
}

impl RelationshipType {
    #[must_use]
    pub const fn reference_kind(self) -> CrossReferenceKind {
        match self {
            Self::Imports => CrossReferenceKind::Import,
            Self::Calls => CrossReferenceKind::Call,
        }
    }
}

/// Node in the file graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Position of the file in the collection
    pub file_index: usize,
    pub path: String,
    /// Lowercased file name without extension, used for import matching
    pub stem: String,
}

impl FileNode {
    pub fn new(file_index: usize, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit(['/', '\\']).next().unwrap_or(path.as_str());
        let stem = name
            .rsplit_once('.')
            .map_or(name, |(stem, _)| stem)
            .to_lowercase();
        Self {
            file_index,
            path,
            stem,
        }
    }
}

/// Edge in the file graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEdge {
    pub relationship: RelationshipType,
    /// Imported module or called function name
    pub detail: String,
}

/// Directed graph of file dependencies
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub graph: DiGraph<FileNode, FileEdge>,

    /// File index -> NodeIndex
    pub file_nodes: HashMap<usize, NodeIndex>,

    /// Path -> NodeIndex
    pub path_index: HashMap<String, NodeIndex>,
}
