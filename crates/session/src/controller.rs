//! Re-chunking on size or strategy change.
//!
//! The controller owns the combined text and the current [`ChunkSet`]. A
//! request either runs a full pass synchronously or, when another pass is
//! still running, is ignored. Readers always see a complete set: snapshots
//! are swapped wholesale behind an `RwLock`.

use crate::error::{Result, SessionError};
use crate::pipeline::{ChunkPipeline, ChunkSet, SemanticPipeline};
use crate::report::AnalysisReport;
use filepack_chunker::{Chunk, ChunkingConfig, ChunkingStrategy};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Whether a pass is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Rechunking,
}

/// What a failed pass left installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// The previous set stays current
    KeptPrevious,
    /// Chunks assembled before the failure, without cross-references or wrapping
    Partial,
    /// The whole content as a single chunk
    WholeContent,
}

/// Result of a size or strategy request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RechunkOutcome {
    /// A new set is current
    Applied { chunks: usize },
    /// Settings did not change
    Unchanged,
    /// Another pass was running
    Ignored,
    /// The pass failed; see `recovery` for what is current now
    Failed { recovery: Recovery, error: String },
}

/// Read-only view of the session at one moment
#[derive(Debug, Clone, Serialize)]
pub struct ChunkingSession {
    #[serde(skip)]
    pub full_content: Arc<str>,
    pub current_chunk_size: usize,
    pub strategy: ChunkingStrategy,
    pub chunks: Arc<ChunkSet>,
    pub current_chunk_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settings {
    target_chunk_size: usize,
    strategy: ChunkingStrategy,
}

/// Releases the in-progress flag on drop, including during unwinding
struct RechunkGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RechunkGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RechunkGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Drives chunking passes for one combined text
pub struct ChunkSizeController {
    content: Arc<str>,
    base_config: ChunkingConfig,
    pipeline: Box<dyn ChunkPipeline>,
    settings: Mutex<Settings>,
    current: RwLock<Arc<ChunkSet>>,
    current_index: AtomicUsize,
    in_progress: AtomicBool,
}

impl std::fmt::Debug for ChunkSizeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkSizeController")
            .field("content_len", &self.content.len())
            .field("settings", &self.settings())
            .field("chunks", &self.snapshot().len())
            .field("current_index", &self.current_index())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ChunkSizeController {
    /// Create a controller with the default pipeline and run the first pass
    pub fn new(content: impl Into<String>, config: ChunkingConfig) -> Result<Self> {
        Self::with_pipeline(content, config, SemanticPipeline)
    }

    /// Create a controller with a custom pipeline and run the first pass.
    ///
    /// A failing first pass is not an error: the whole content is installed
    /// as a single chunk.
    pub fn with_pipeline(
        content: impl Into<String>,
        config: ChunkingConfig,
        pipeline: impl ChunkPipeline + 'static,
    ) -> Result<Self> {
        config.validate().map_err(SessionError::invalid_config)?;
        let content: Arc<str> = Arc::from(content.into());

        let settings = Settings {
            target_chunk_size: config.clamp_size(config.target_chunk_size),
            strategy: config.strategy,
        };
        let controller = Self {
            current: RwLock::new(Arc::new(ChunkSet::whole_content(&content, &config))),
            content,
            base_config: config,
            pipeline: Box::new(pipeline),
            settings: Mutex::new(settings),
            current_index: AtomicUsize::new(0),
            in_progress: AtomicBool::new(false),
        };

        if let Some(_guard) = RechunkGuard::acquire(&controller.in_progress) {
            let outcome = controller.run_pass(settings, None);
            log::debug!("Initial pass: {outcome:?}");
        }
        Ok(controller)
    }

    /// Re-chunk at a new target size (clamped up to the configured minimum)
    pub fn request_size(&self, requested: usize) -> RechunkOutcome {
        let target_chunk_size = self.base_config.clamp_size(requested);
        if target_chunk_size != requested {
            log::debug!("Requested chunk size {requested} clamped to {target_chunk_size}");
        }
        self.request(|settings| Settings {
            target_chunk_size,
            ..settings
        })
    }

    /// Re-chunk with a different strategy
    pub fn request_strategy(&self, strategy: ChunkingStrategy) -> RechunkOutcome {
        self.request(|settings| Settings {
            strategy,
            ..settings
        })
    }

    /// Re-run the pipeline with the current settings
    pub fn rechunk(&self) -> RechunkOutcome {
        let Some(_guard) = RechunkGuard::acquire(&self.in_progress) else {
            log::debug!("Rechunk ignored: a pass is already running");
            return RechunkOutcome::Ignored;
        };
        let settings = self.settings();
        self.run_pass(settings, Some(settings))
    }

    fn request(&self, update: impl FnOnce(Settings) -> Settings) -> RechunkOutcome {
        let Some(_guard) = RechunkGuard::acquire(&self.in_progress) else {
            log::debug!("Request ignored: a pass is already running");
            return RechunkOutcome::Ignored;
        };

        let previous = self.settings();
        let next = update(previous);
        if next == previous && !self.snapshot().degraded {
            return RechunkOutcome::Unchanged;
        }
        self.run_pass(next, Some(previous))
    }

    /// Run one pass and install its result; the caller holds the guard
    fn run_pass(&self, settings: Settings, previous: Option<Settings>) -> RechunkOutcome {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = settings;

        let config = ChunkingConfig {
            target_chunk_size: settings.target_chunk_size,
            strategy: settings.strategy,
            min_chunk_size: self.base_config.min_chunk_size.min(settings.target_chunk_size),
            ..self.base_config.clone()
        };

        match self.pipeline.run(&self.content, &config) {
            Ok(set) => {
                let chunks = set.len();
                self.install(set);
                log::info!(
                    "Rechunked into {chunks} chunks (target {} bytes, {})",
                    settings.target_chunk_size,
                    settings.strategy.as_str()
                );
                RechunkOutcome::Applied { chunks }
            }
            Err(failure) => {
                log::warn!("Rechunk failed: {}", failure.error);
                let error = failure.error.to_string();
                let recovery = match failure.partial {
                    Some(chunks) => {
                        self.install(ChunkSet::partial(chunks, &config));
                        Recovery::Partial
                    }
                    None => match previous {
                        Some(previous) if !self.snapshot().degraded => {
                            *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = previous;
                            Recovery::KeptPrevious
                        }
                        _ => {
                            self.install(ChunkSet::whole_content(&self.content, &config));
                            Recovery::WholeContent
                        }
                    },
                };
                RechunkOutcome::Failed { recovery, error }
            }
        }
    }

    fn install(&self, set: ChunkSet) {
        let len = set.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(set);
        self.clamp_index(len);
    }

    fn clamp_index(&self, len: usize) -> usize {
        let max = len.saturating_sub(1);
        let clamped = self.current_index.load(Ordering::Acquire).min(max);
        self.current_index.store(clamped, Ordering::Release);
        clamped
    }

    fn settings(&self) -> Settings {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        if self.in_progress.load(Ordering::Acquire) {
            ControllerState::Rechunking
        } else {
            ControllerState::Idle
        }
    }

    /// Current chunk set
    #[must_use]
    pub fn snapshot(&self) -> Arc<ChunkSet> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Consistent view of content, settings, chunks and index
    #[must_use]
    pub fn session(&self) -> ChunkingSession {
        let settings = self.settings();
        ChunkingSession {
            full_content: Arc::clone(&self.content),
            current_chunk_size: settings.target_chunk_size,
            strategy: settings.strategy,
            chunks: self.snapshot(),
            current_chunk_index: self.current_index(),
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn target_chunk_size(&self) -> usize {
        self.settings().target_chunk_size
    }

    #[must_use]
    pub fn strategy(&self) -> ChunkingStrategy {
        self.settings().strategy
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index.load(Ordering::Acquire)
    }

    /// Chunk at the current index
    #[must_use]
    pub fn current(&self) -> Option<Chunk> {
        self.snapshot().get(self.current_index()).cloned()
    }

    /// Move to `index`, clamped into range; returns the index selected
    pub fn select(&self, index: usize) -> usize {
        self.current_index.store(index, Ordering::Release);
        self.clamp_index(self.snapshot().len())
    }

    pub fn next(&self) -> usize {
        self.select(self.current_index().saturating_add(1))
    }

    pub fn previous(&self) -> usize {
        self.select(self.current_index().saturating_sub(1))
    }

    #[must_use]
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport::from_set(&self.snapshot())
    }
}
