use crate::error::{PipelineFailure, SessionError};
use filepack_chunker::instructions::wrap_all;
use filepack_chunker::{Chunk, Chunker, ChunkingConfig, ChunkingStrategy};
use filepack_xref::CrossReferenceResolver;
use serde::Serialize;

/// Immutable result of one chunking pass
#[derive(Debug, Clone, Serialize)]
pub struct ChunkSet {
    pub chunks: Vec<Chunk>,
    pub target_chunk_size: usize,
    /// Strategy actually applied
    pub strategy: ChunkingStrategy,
    pub file_count: usize,
    /// Set when the pass failed and these chunks are a recovery
    pub degraded: bool,
}

impl ChunkSet {
    /// The whole content as one chunk, the last resort when no pass succeeded
    #[must_use]
    pub fn whole_content(content: &str, config: &ChunkingConfig) -> Self {
        let mut chunks = Vec::new();
        if !content.is_empty() {
            let mut chunk = Chunk::new(0, 0, content.to_string());
            chunk.filename = format!("chunk_{}", chunk.label);
            chunk.semantic_summary = "unprocessed content".to_string();
            chunks.push(chunk);
            if config.include_instructions {
                wrap_all(&mut chunks);
            }
        }
        Self {
            chunks,
            target_chunk_size: config.target_chunk_size,
            strategy: config.strategy,
            file_count: 0,
            degraded: true,
        }
    }

    /// Chunks assembled before a failed pass, left unwrapped
    #[must_use]
    pub fn partial(chunks: Vec<Chunk>, config: &ChunkingConfig) -> Self {
        let file_count = chunks
            .iter()
            .flat_map(|chunk| chunk.files.keys())
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        Self {
            chunks,
            target_chunk_size: config.target_chunk_size,
            strategy: config.strategy,
            file_count,
            degraded: true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }
}

/// One full pass: combined text and settings in, finished chunk set out
pub trait ChunkPipeline: Send + Sync {
    fn run(&self, content: &str, config: &ChunkingConfig) -> Result<ChunkSet, PipelineFailure>;
}

/// Analyze, assemble, resolve cross-references, wrap
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticPipeline;

impl ChunkPipeline for SemanticPipeline {
    fn run(&self, content: &str, config: &ChunkingConfig) -> Result<ChunkSet, PipelineFailure> {
        let chunker = Chunker::new(config.clone()).map_err(PipelineFailure::total)?;
        let mut chunking = chunker.chunk(content).map_err(PipelineFailure::total)?;

        if config.resolve_imports || config.resolve_calls {
            let resolver = CrossReferenceResolver::new(config.resolve_imports, config.resolve_calls);
            if let Err(err) = resolver.apply(&chunking.files, &chunking.structures, &mut chunking.chunks) {
                return Err(PipelineFailure::partial(
                    SessionError::from(err),
                    chunking.chunks,
                ));
            }
        }

        if config.include_instructions {
            wrap_all(&mut chunking.chunks);
        }

        Ok(ChunkSet {
            chunks: chunking.chunks,
            target_chunk_size: config.target_chunk_size,
            strategy: chunking.strategy,
            file_count: chunking.files.len(),
            degraded: false,
        })
    }
}
