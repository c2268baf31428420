use crate::pipeline::ChunkSet;
use filepack_chunker::{chunk_label, ChunkingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Per-chunk line of the analysis report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkReport {
    pub label: String,
    pub filename: String,
    pub size: usize,
    pub summary: String,
    pub cross_references: Vec<String>,
}

/// Statistics and membership of one chunk set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub strategy: ChunkingStrategy,
    pub target_chunk_size: usize,
    pub degraded: bool,
    pub chunk_count: usize,
    pub file_count: usize,
    pub total_size: usize,
    pub average_size: usize,
    pub largest_size: usize,
    pub smallest_size: usize,
    /// File name -> labels of the chunks it appears in
    pub files: BTreeMap<String, Vec<String>>,
    pub chunks: Vec<ChunkReport>,
}

impl AnalysisReport {
    #[must_use]
    pub fn from_set(set: &ChunkSet) -> Self {
        let sizes = set.chunks.iter().map(|chunk| chunk.size);
        let total_size: usize = sizes.clone().sum();

        let mut files: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for chunk in &set.chunks {
            for name in chunk.file_names() {
                files
                    .entry(name.to_string())
                    .or_default()
                    .push(chunk.label.clone());
            }
        }

        let chunks = set
            .chunks
            .iter()
            .map(|chunk| ChunkReport {
                label: chunk.label.clone(),
                filename: chunk.filename.clone(),
                size: chunk.size,
                summary: chunk.semantic_summary.clone(),
                cross_references: chunk
                    .cross_references
                    .iter()
                    .map(|r| {
                        format!(
                            "{} -> {}: {}",
                            r.kind.as_str(),
                            chunk_label(r.target_chunk_index),
                            r.description
                        )
                    })
                    .collect(),
            })
            .collect();

        Self {
            strategy: set.strategy,
            target_chunk_size: set.target_chunk_size,
            degraded: set.degraded,
            chunk_count: set.len(),
            file_count: set.file_count,
            total_size,
            average_size: total_size.checked_div(set.len()).unwrap_or(0),
            largest_size: sizes.clone().max().unwrap_or(0),
            smallest_size: sizes.min().unwrap_or(0),
            files,
            chunks,
        }
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chunk analysis")?;
        writeln!(
            f,
            "Strategy: {} | Target: {} bytes{}",
            self.strategy.as_str(),
            self.target_chunk_size,
            if self.degraded { " | degraded" } else { "" }
        )?;
        writeln!(
            f,
            "Chunks: {} | Files: {} | Total: {} bytes",
            self.chunk_count, self.file_count, self.total_size
        )?;
        writeln!(
            f,
            "Size: avg {} | largest {} | smallest {}",
            self.average_size, self.largest_size, self.smallest_size
        )?;

        if !self.files.is_empty() {
            writeln!(f)?;
            writeln!(f, "Files:")?;
            for (name, labels) in &self.files {
                writeln!(f, "  {name}: {}", labels.join(", "))?;
            }
        }

        if !self.chunks.is_empty() {
            writeln!(f)?;
            writeln!(f, "Chunks:")?;
        }
        for chunk in &self.chunks {
            writeln!(
                f,
                "  [{}] {} ({} bytes)",
                chunk.label, chunk.filename, chunk.size
            )?;
            if !chunk.summary.is_empty() {
                writeln!(f, "      {}", chunk.summary)?;
            }
            for reference in &chunk.cross_references {
                writeln!(f, "      {reference}")?;
            }
        }
        Ok(())
    }
}
