//! The combined-text format shared by the collector and the chunker.
//!
//! Every file in a collection is written as:
//!
//! ```text
//! ================================================================================
//! filename: helpers.js
//! directory: src/utils
//! relative_path: src/utils/helpers.js
//! full_path: /home/me/project/src/utils/helpers.js
//! classification: source           (optional)
//! type: text
//! size: 1234 bytes
//! lines: 56
//! ================================================================================
//!
//! <raw file content>
//!
//! ```
//!
//! A file's span runs from its first separator line up to the next file's
//! separator line, so the two trailing newlines belong to the file before them.

use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Separator line framing each file header (80 `=`)
pub const SEPARATOR: &str =
    "================================================================================";

const FILENAME_KEY: &str = "filename: ";

/// Whether an entry carries text or a binary placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Text,
    Binary,
}

impl EntryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }
}

/// File to be written into a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEntry {
    pub filename: String,
    pub directory: String,
    pub relative_path: String,
    pub full_path: String,
    pub classification: Option<String>,
    pub kind: EntryKind,
    pub content: String,
}

impl CollectionEntry {
    /// Build a text entry, deriving `filename` and `directory` from the relative path
    pub fn text(
        relative_path: impl Into<String>,
        full_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let relative_path = relative_path.into();
        let (directory, filename) = match relative_path.rsplit_once('/') {
            Some((dir, name)) => (dir.to_string(), name.to_string()),
            None => (".".to_string(), relative_path.clone()),
        };
        Self {
            filename,
            directory,
            relative_path,
            full_path: full_path.into(),
            classification: None,
            kind: EntryKind::Text,
            content: content.into(),
        }
    }

    /// Builder: set classification tags
    #[must_use]
    pub fn classification(mut self, tags: impl Into<String>) -> Self {
        self.classification = Some(tags.into());
        self
    }

    /// Builder: mark as binary
    #[must_use]
    pub fn binary(mut self) -> Self {
        self.kind = EntryKind::Binary;
        self
    }
}

/// Render entries into the combined text
#[must_use]
pub fn render_collection(entries: &[CollectionEntry]) -> String {
    let capacity = entries
        .iter()
        .map(|entry| entry.content.len() + 512)
        .sum::<usize>();
    let mut out = String::with_capacity(capacity);

    for entry in entries {
        out.push_str(SEPARATOR);
        out.push('\n');
        out.push_str(&format!("{FILENAME_KEY}{}\n", entry.filename));
        out.push_str(&format!("directory: {}\n", entry.directory));
        out.push_str(&format!("relative_path: {}\n", entry.relative_path));
        out.push_str(&format!("full_path: {}\n", entry.full_path));
        if let Some(classification) = &entry.classification {
            out.push_str(&format!("classification: {classification}\n"));
        }
        out.push_str(&format!("type: {}\n", entry.kind.as_str()));
        out.push_str(&format!("size: {} bytes\n", entry.content.len()));
        out.push_str(&format!("lines: {}\n", entry.content.lines().count()));
        out.push_str(SEPARATOR);
        out.push_str("\n\n");
        out.push_str(&entry.content);
        out.push_str("\n\n");
    }

    out
}

/// File parsed out of a combined text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub filename: String,
    pub relative_path: Option<String>,
    pub classification: Option<String>,
    pub kind: EntryKind,
    /// Raw content (everything after the header up to the next entry)
    pub content: String,
    /// Offset of the first separator line
    pub start_offset: usize,
    /// Offset where the raw content begins
    pub header_end: usize,
    /// Offset where the next entry (or the text) begins
    pub end_offset: usize,
}

impl SourceFile {
    /// Size of the whole entry in bytes, header included
    #[must_use]
    pub const fn byte_size(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// Path used for matching: the relative path when known, else the filename
    #[must_use]
    pub fn path(&self) -> &str {
        self.relative_path.as_deref().unwrap_or(&self.filename)
    }
}

struct LineSpan<'a> {
    start: usize,
    text: &'a str,
}

fn line_spans(text: &str) -> Vec<LineSpan<'_>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        spans.push(LineSpan {
            start,
            text: line.trim_end_matches(['\n', '\r']),
        });
        start += line.len();
    }
    spans
}

fn is_header_start(lines: &[LineSpan<'_>], idx: usize) -> bool {
    lines[idx].text == SEPARATOR
        && lines
            .get(idx + 1)
            .is_some_and(|next| next.text.starts_with(FILENAME_KEY))
}

/// Parse the files of a combined text.
///
/// Text without any header yields an empty list. A header whose closing
/// separator is missing is reported as malformed.
pub fn parse_collection(text: &str) -> Result<Vec<SourceFile>> {
    let lines = line_spans(text);
    let header_starts: Vec<usize> = (0..lines.len())
        .filter(|&idx| is_header_start(&lines, idx))
        .collect();

    let mut files = Vec::with_capacity(header_starts.len());

    for (n, &header_idx) in header_starts.iter().enumerate() {
        let start_offset = lines[header_idx].start;
        let end_offset = header_starts
            .get(n + 1)
            .map_or(text.len(), |&next| lines[next].start);

        let footer_idx = (header_idx + 1..lines.len())
            .find(|&idx| lines[idx].text == SEPARATOR)
            .filter(|&idx| lines[idx].start < end_offset)
            .ok_or_else(|| {
                ChunkerError::malformed(format!(
                    "header at offset {start_offset} has no closing separator"
                ))
            })?;

        let mut filename = String::new();
        let mut relative_path = None;
        let mut classification = None;
        let mut kind = EntryKind::Text;
        for line in &lines[header_idx + 1..footer_idx] {
            let Some((key, value)) = line.text.split_once(": ") else {
                continue;
            };
            let value = value.trim();
            match key {
                "filename" => filename = value.to_string(),
                "relative_path" => relative_path = Some(value.to_string()),
                "classification" => classification = Some(value.to_string()),
                "type" if value == "binary" => kind = EntryKind::Binary,
                _ => {}
            }
        }

        // The blank line after the footer is part of the header.
        let mut body_idx = footer_idx + 1;
        if lines
            .get(body_idx)
            .is_some_and(|line| line.text.is_empty() && line.start < end_offset)
        {
            body_idx += 1;
        }
        let header_end = lines
            .get(body_idx)
            .map_or(text.len(), |line| line.start)
            .min(end_offset);

        files.push(SourceFile {
            filename,
            relative_path,
            classification,
            kind,
            content: text[header_end..end_offset].to_string(),
            start_offset,
            header_end,
            end_offset,
        });
    }

    log::debug!("Parsed {} files from collection", files.len());
    Ok(files)
}
