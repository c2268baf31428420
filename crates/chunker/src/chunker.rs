use crate::analyzer::analyze;
use crate::assembler::ChunkAssembler;
use crate::boundary::BoundaryPlanner;
use crate::collection::{parse_collection, EntryKind, SourceFile};
use crate::config::{ChunkingConfig, ChunkingStrategy};
use crate::error::{ChunkerError, Result};
use crate::types::{Boundary, Chunk, StructuralInfo};

/// Everything one chunking pass produced
#[derive(Debug, Clone, Default)]
pub struct Chunking {
    pub files: Vec<SourceFile>,
    /// Structure of `files[i]` at index `i`
    pub structures: Vec<StructuralInfo>,
    pub boundaries: Vec<Boundary>,
    pub chunks: Vec<Chunk>,
    /// Strategy actually applied (semantic falls back to size-based without files)
    pub strategy: ChunkingStrategy,
}

/// Main chunker interface: combined text in, raw chunks out
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting invalid configuration
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Analyze, plan and assemble `text` into chunks.
    ///
    /// Chunks are left unwrapped; cross-references and instructions are
    /// added by later stages.
    pub fn chunk(&self, text: &str) -> Result<Chunking> {
        let files = parse_collection(text)?;
        let structures: Vec<StructuralInfo> = files
            .iter()
            .map(|file| match file.kind {
                EntryKind::Text => analyze(file.path(), &file.content),
                EntryKind::Binary => StructuralInfo::default(),
            })
            .collect();

        let boundaries =
            BoundaryPlanner::new(self.config.boundary_importance).plan(&files, &structures);
        let assembler = ChunkAssembler::new(self.config.target_chunk_size);

        let strategy = if files.is_empty() {
            if self.config.strategy == ChunkingStrategy::Semantic && !text.is_empty() {
                log::debug!("No file headers found, using size-based splitting");
            }
            ChunkingStrategy::SizeBased
        } else {
            self.config.strategy
        };

        let chunks = match strategy {
            ChunkingStrategy::Semantic => assembler.assemble(text, &boundaries)?,
            ChunkingStrategy::SizeBased => assembler.assemble_by_size(text, &boundaries)?,
        };

        log::info!(
            "Chunked {} files ({} bytes) into {} chunks using {} strategy",
            files.len(),
            text.len(),
            chunks.len(),
            strategy.as_str()
        );

        Ok(Chunking {
            files,
            structures,
            boundaries,
            chunks,
            strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{render_collection, CollectionEntry};
    use pretty_assertions::assert_eq;

    fn sample() -> String {
        render_collection(&[
            CollectionEntry::text(
                "src/main.py",
                "/p/src/main.py",
                "from util import helper\n\ndef main():\n    helper()\n",
            ),
            CollectionEntry::text("src/util.py", "/p/src/util.py", "def helper():\n    return 1\n"),
            CollectionEntry::text("logo.png", "/p/logo.png", "[binary file omitted]").binary(),
        ])
    }

    #[test]
    fn rejects_invalid_config() {
        let config = ChunkingConfig {
            target_chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            Chunker::new(config),
            Err(ChunkerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn analyzes_text_files_only() {
        let text = sample();
        let chunking = Chunker::new(ChunkingConfig::default()).unwrap().chunk(&text).unwrap();

        assert_eq!(chunking.files.len(), 3);
        assert_eq!(chunking.structures[0].functions[0].name, "main");
        assert_eq!(chunking.structures[1].functions[0].name, "helper");
        assert!(chunking.structures[2].is_empty());
        assert_eq!(chunking.strategy, ChunkingStrategy::Semantic);
        assert_eq!(chunking.chunks.len(), 1);
        assert_eq!(chunking.chunks[0].content, text);
    }

    #[test]
    fn text_without_headers_is_split_by_size() {
        let text = "line one\nline two\nline three\n".repeat(10);
        let chunking = Chunker::new(ChunkingConfig::with_target(50))
            .unwrap()
            .chunk(&text)
            .unwrap();

        assert!(chunking.files.is_empty());
        assert_eq!(chunking.strategy, ChunkingStrategy::SizeBased);
        assert!(chunking.chunks.len() > 1);
        let joined: String = chunking.chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn malformed_collection_is_an_error() {
        let text = format!("{}\nfilename: a.js\n", crate::collection::SEPARATOR);
        let result = Chunker::new(ChunkingConfig::default()).unwrap().chunk(&text);
        assert!(matches!(result, Err(ChunkerError::MalformedCollection(_))));
    }
}
