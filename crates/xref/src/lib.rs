//! # Filepack Xref
//!
//! Cross-chunk references for a chunked file collection.
//!
//! ## Architecture
//!
//! ```text
//! SourceFile[] + StructuralInfo[]
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Imports: module key ~ file stem
//!     │      └─ Calls: `name(` sites ~ functions defined elsewhere
//!     │
//!     ├──> Dependency Graph (petgraph, one node per file)
//!     │
//!     └──> Resolver
//!            ├─ Map each file to the chunk holding its first byte
//!            ├─ Drop same-chunk edges
//!            └─ Emit sorted, deduplicated CrossReference[] per chunk
//! ```

mod builder;
mod error;
mod graph;
mod resolver;
mod types;

pub use builder::{module_key, GraphBuilder};
pub use error::{Result, XrefError};
pub use resolver::{owning_chunk, CrossReferenceMap, CrossReferenceResolver};
pub use types::{DependencyGraph, FileEdge, FileNode, RelationshipType};
