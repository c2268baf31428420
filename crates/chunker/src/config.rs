use serde::{Deserialize, Serialize};

/// Default target chunk size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Blocks scoring at or above this importance become chunk boundaries
pub const DEFAULT_BOUNDARY_IMPORTANCE: u8 = 7;

/// Configuration for chunking a file collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunking strategy to use
    pub strategy: ChunkingStrategy,

    /// Target chunk size in bytes (soft limit, atomic segments may exceed it)
    pub target_chunk_size: usize,

    /// Smallest target size a caller may request
    pub min_chunk_size: usize,

    /// Minimum importance for a semantic block to become a boundary (1-10)
    pub boundary_importance: u8,

    /// Resolve cross-references from import statements
    pub resolve_imports: bool,

    /// Resolve cross-references from call sites
    pub resolve_calls: bool,

    /// Wrap chunks with pacing instructions and a metadata header
    pub include_instructions: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::Semantic,
            target_chunk_size: DEFAULT_CHUNK_SIZE,
            min_chunk_size: DEFAULT_CHUNK_SIZE,
            boundary_importance: DEFAULT_BOUNDARY_IMPORTANCE,
            resolve_imports: true,
            resolve_calls: true,
            include_instructions: true,
        }
    }
}

impl ChunkingConfig {
    /// Create config for plain size-based splitting (no structure, no cross-references)
    pub fn size_based() -> Self {
        Self {
            strategy: ChunkingStrategy::SizeBased,
            resolve_imports: false,
            resolve_calls: false,
            ..Default::default()
        }
    }

    /// Create config with an explicit target size and no minimum
    pub fn with_target(target_chunk_size: usize) -> Self {
        Self {
            target_chunk_size,
            min_chunk_size: 1,
            ..Default::default()
        }
    }

    /// Clamp a requested size into the accepted range
    #[must_use]
    pub fn clamp_size(&self, requested: usize) -> usize {
        requested.max(self.min_chunk_size).max(1)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.target_chunk_size == 0 {
            return Err("target_chunk_size must be > 0".to_string());
        }

        if self.min_chunk_size > self.target_chunk_size {
            return Err(format!(
                "min_chunk_size ({}) cannot exceed target_chunk_size ({})",
                self.min_chunk_size, self.target_chunk_size
            ));
        }

        if !(1..=10).contains(&self.boundary_importance) {
            return Err(format!(
                "boundary_importance must be within 1..=10, got {}",
                self.boundary_importance
            ));
        }

        Ok(())
    }
}

/// Strategy for splitting the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkingStrategy {
    /// Boundary-aware chunking driven by structural analysis
    #[default]
    Semantic,

    /// Pure length-based splitting at line boundaries
    SizeBased,
}

impl ChunkingStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::SizeBased => "size-based",
        }
    }
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "size-based" | "size_based" | "size" => Ok(Self::SizeBased),
            other => Err(format!("unknown chunking strategy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ChunkingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_chunk_size, 100_000);
        assert_eq!(config.min_chunk_size, config.target_chunk_size);
    }

    #[test]
    fn presets_are_valid() {
        assert!(ChunkingConfig::size_based().validate().is_ok());
        assert!(ChunkingConfig::with_target(10).validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_settings() {
        let mut config = ChunkingConfig::with_target(500);

        config.min_chunk_size = 1000;
        assert!(config.validate().is_err());

        config.min_chunk_size = 1;
        config.target_chunk_size = 0;
        assert!(config.validate().is_err());

        config.target_chunk_size = 500;
        config.boundary_importance = 11;
        assert!(config.validate().is_err());

        config.boundary_importance = 7;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn requested_sizes_are_clamped() {
        let config = ChunkingConfig::default();
        assert_eq!(config.clamp_size(10), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.clamp_size(250_000), 250_000);

        let relaxed = ChunkingConfig::with_target(100);
        assert_eq!(relaxed.clamp_size(0), 1);
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!("semantic".parse(), Ok(ChunkingStrategy::Semantic));
        assert_eq!("size-based".parse(), Ok(ChunkingStrategy::SizeBased));
        assert_eq!("Size_Based".parse(), Ok(ChunkingStrategy::SizeBased));
        assert!("ast".parse::<ChunkingStrategy>().is_err());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ChunkingConfig =
            serde_json::from_str(r#"{"strategy":"size-based","target_chunk_size":2048}"#).unwrap();
        assert_eq!(config.strategy, ChunkingStrategy::SizeBased);
        assert_eq!(config.target_chunk_size, 2048);
        assert_eq!(config.boundary_importance, DEFAULT_BOUNDARY_IMPORTANCE);
    }
}
