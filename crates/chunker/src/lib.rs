//! # Filepack Chunker
//!
//! Boundary-aware chunking of a combined file collection for pasting into an
//! LLM chat.
//!
//! ## Architecture
//!
//! ```text
//! Combined text
//!     │
//!     ├──> Collection parsing (file headers → SourceFile spans)
//!     │
//!     ├──> Structural analysis (per file, line heuristics)
//!     │    ├─> Functions, classes, imports, exports
//!     │    └─> Semantic blocks with importance 1..=10
//!     │
//!     ├──> Boundary planning (file edges + important block starts)
//!     │
//!     └──> Chunk assembly
//!          ├─> Greedy grouping under the target size (semantic)
//!          ├─> Line-aligned windows (size-based)
//!          └─> Emit Chunk[] partitioning the text losslessly
//! ```
//!
//! Cross-references between chunks are resolved by `filepack-xref`; the
//! [`instructions`] module turns finished chunks into paste-ready text.
//!
//! ## Example
//!
//! ```rust
//! use filepack_chunker::{render_collection, Chunker, ChunkingConfig, CollectionEntry};
//!
//! let text = render_collection(&[CollectionEntry::text(
//!     "src/app.js",
//!     "/project/src/app.js",
//!     "function main() {\n  return 1;\n}\n",
//! )]);
//!
//! let chunking = Chunker::new(ChunkingConfig::default())?.chunk(&text)?;
//! assert_eq!(chunking.chunks.len(), 1);
//! assert_eq!(chunking.chunks[0].filename, "src/app.js");
//! # Ok::<(), filepack_chunker::ChunkerError>(())
//! ```

pub mod analyzer;
mod assembler;
mod boundary;
mod chunker;
pub mod collection;
mod config;
mod error;
pub mod instructions;
mod language;
mod strategy;
mod types;

pub use analyzer::{analyze, StructureScanner};
pub use assembler::ChunkAssembler;
pub use boundary::{line_to_position, BoundaryPlanner};
pub use chunker::{Chunker, Chunking};
pub use collection::{parse_collection, render_collection, CollectionEntry, EntryKind, SourceFile};
pub use config::{ChunkingConfig, ChunkingStrategy, DEFAULT_BOUNDARY_IMPORTANCE, DEFAULT_CHUNK_SIZE};
pub use error::{ChunkerError, Result};
pub use language::{Language, LanguageFamily};
pub use strategy::size_spans;
pub use types::{
    chunk_label, BlockType, Boundary, BoundaryKind, Chunk, ChunkFile, ClassInfo, CrossReference,
    CrossReferenceKind, ExportInfo, FunctionInfo, FunctionKind, ImportInfo, SemanticBlock,
    StructuralInfo,
};
