use anyhow::{Context, Result};
use filepack_chunker::{CollectionEntry, Language};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Bytes inspected when sniffing for binary content
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Files larger than this are skipped unless overridden
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Gathers files from disk into collection entries
pub struct Collector {
    max_file_size: u64,
    hidden: bool,
}

impl Default for Collector {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            hidden: false,
        }
    }
}

impl Collector {
    pub fn new(max_file_size: u64, hidden: bool) -> Self {
        Self {
            max_file_size,
            hidden,
        }
    }

    /// Collect every file under `paths` (.gitignore aware), sorted by relative path.
    ///
    /// A directory contributes paths relative to itself. A file given directly
    /// is recorded under its own name.
    pub fn collect(&self, paths: &[PathBuf]) -> Result<Vec<CollectionEntry>> {
        let mut found: BTreeSet<(String, PathBuf)> = BTreeSet::new();

        for input in paths {
            let meta = fs::metadata(input)
                .with_context(|| format!("Cannot read input path {}", input.display()))?;
            if meta.is_file() {
                if meta.len() > self.max_file_size {
                    log::warn!("Skipping {} ({} bytes)", input.display(), meta.len());
                    continue;
                }
                let name = input
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| input.display().to_string());
                found.insert((name, input.clone()));
                continue;
            }

            for (relative, path) in self.walk(input) {
                found.insert((relative, path));
            }
        }

        let mut entries = Vec::with_capacity(found.len());
        for (relative, path) in found {
            entries.push(read_entry(&relative, &path)?);
        }
        log::info!("Collected {} files", entries.len());
        Ok(entries)
    }

    fn walk(&self, root: &Path) -> Vec<(String, PathBuf)> {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(!self.hidden)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .max_filesize(Some(self.max_file_size));

        let mut files = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }
                    let path = entry.into_path();
                    let Ok(relative) = path.strip_prefix(root) else {
                        continue;
                    };
                    let relative = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    files.push((relative, path));
                }
                Err(err) => log::warn!("Error walking {}: {err}", root.display()),
            }
        }
        files
    }
}

fn read_entry(relative: &str, path: &Path) -> Result<CollectionEntry> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let full_path = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();

    if is_binary(&bytes) {
        log::debug!("Binary file {relative}");
        let placeholder = format!("[binary file omitted: {} bytes]", bytes.len());
        return Ok(CollectionEntry::text(relative, full_path, placeholder).binary());
    }

    let content = String::from_utf8_lossy(&bytes).into_owned();
    let entry = CollectionEntry::text(relative, full_path, content);
    let language = Language::from_path(relative);
    Ok(if language == Language::Unknown {
        entry
    } else {
        entry.classification(language.as_str())
    })
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0)
}
