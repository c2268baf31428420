//! # Filepack Session
//!
//! Interactive chunking of one combined text: run the full pipeline,
//! re-run it when the target size or strategy changes, and report on the
//! result.
//!
//! ```text
//! request_size / request_strategy
//!     │
//!     ├──> guard (ignored while a pass runs)
//!     ├──> Chunker → CrossReferenceResolver → instructions
//!     └──> install Arc<ChunkSet>, clamp current index
//! ```
//!
//! ## Example
//!
//! ```rust
//! use filepack_chunker::{render_collection, ChunkingConfig, CollectionEntry};
//! use filepack_session::{ChunkSizeController, RechunkOutcome};
//!
//! let text = render_collection(&[CollectionEntry::text("notes.md", "/notes.md", "# Notes\n")]);
//! let controller = ChunkSizeController::new(text, ChunkingConfig::default())?;
//! assert_eq!(controller.snapshot().len(), 1);
//! assert_eq!(controller.request_size(100_000), RechunkOutcome::Unchanged);
//! println!("{}", controller.report());
//! # Ok::<(), filepack_session::SessionError>(())
//! ```

mod controller;
mod error;
mod pipeline;
mod report;

pub use controller::{ChunkSizeController, ChunkingSession, ControllerState, RechunkOutcome, Recovery};
pub use error::{PipelineFailure, Result, SessionError};
pub use pipeline::{ChunkPipeline, ChunkSet, SemanticPipeline};
pub use report::{AnalysisReport, ChunkReport};
