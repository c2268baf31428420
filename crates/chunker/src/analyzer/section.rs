//! Generic scanner for documents and configuration files.

use super::{importance, StructureScanner};
use crate::types::{BlockType, SemanticBlock, StructuralInfo};
use once_cell::sync::Lazy;
use regex::Regex;

static MARKDOWN_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("valid regex literal"));

static BRACKET_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[\[?([^\[\]]+)\]\]?\s*$").expect("valid regex literal"));

static CAPS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9 _:&/-]{3,}$").expect("valid regex literal"));

/// Scanner that splits text into sections at header-like lines
pub struct SectionScanner;

impl SectionScanner {
    fn section_title(line: &str) -> Option<String> {
        if let Some(cap) = MARKDOWN_HEADER.captures(line) {
            return Some(cap[2].to_string());
        }
        if let Some(cap) = BRACKET_HEADER.captures(line) {
            return Some(cap[1].trim().to_string());
        }
        let trimmed = line.trim();
        if CAPS_HEADER.is_match(trimmed) && trimmed.chars().filter(char::is_ascii_alphabetic).count() >= 3 {
            return Some(trimmed.trim_end_matches(':').trim().to_string());
        }
        None
    }
}

impl StructureScanner for SectionScanner {
    fn scan(&self, content: &str) -> StructuralInfo {
        let mut info = StructuralInfo::default();
        let mut starts: Vec<(usize, String)> = Vec::new();
        let mut in_fence = false;
        let mut line_count = 0usize;

        for (idx, line) in content.lines().enumerate() {
            line_count = idx + 1;
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                continue;
            }
            if let Some(title) = Self::section_title(line) {
                starts.push((idx + 1, title));
            }
        }

        for (n, (start_line, name)) in starts.iter().enumerate() {
            let end_line = starts
                .get(n + 1)
                .map_or(line_count, |(next, _)| next - 1)
                .max(*start_line);
            info.semantic_blocks.push(SemanticBlock {
                block_type: BlockType::Section,
                importance: importance::score(BlockType::Section, name),
                name: name.clone(),
                start_line: *start_line,
                end_line,
            });
        }

        info
    }
}
