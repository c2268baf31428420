//! Line-oriented structural analysis.
//!
//! Each scanner is a best-effort heuristic over raw text (no tokenizer, no
//! AST). Scanners share the [`StructureScanner`] interface so a real parser
//! for a language can replace its heuristic without touching the planner or
//! the assembler.

mod curly;
pub mod importance;
mod indent;
mod section;

pub use curly::CurlyBraceScanner;
pub use indent::IndentationScanner;
pub use section::SectionScanner;

use crate::language::{Language, LanguageFamily};
use crate::types::{BlockType, SemanticBlock, StructuralInfo};
use once_cell::sync::Lazy;
use regex::Regex;

/// Strategy interface for per-language structural scanning
pub trait StructureScanner {
    /// Scan one file's raw content
    fn scan(&self, content: &str) -> StructuralInfo;
}

/// Pick the scanner for a language
#[must_use]
pub fn scanner_for(language: Language) -> Box<dyn StructureScanner> {
    match language.family() {
        LanguageFamily::CurlyBrace => Box::new(CurlyBraceScanner::new(language)),
        LanguageFamily::Indentation => Box::new(IndentationScanner),
        LanguageFamily::Generic => Box::new(SectionScanner),
    }
}

/// Analyze one file.
///
/// Never fails: when the language scanner finds no blocks the section scanner
/// takes over, and a non-empty file always gets at least one block covering
/// its whole body.
#[must_use]
pub fn analyze(filename: &str, content: &str) -> StructuralInfo {
    if content.trim().is_empty() {
        return StructuralInfo::default();
    }

    let language = Language::from_path(filename);
    let mut info = scanner_for(language).scan(content);

    if info.semantic_blocks.is_empty() && language.family() != LanguageFamily::Generic {
        log::debug!(
            "No {} blocks detected in {filename}, falling back to section scan",
            language.as_str()
        );
        info.semantic_blocks = SectionScanner.scan(content).semantic_blocks;
    }

    if info.semantic_blocks.is_empty() {
        info.semantic_blocks.push(SemanticBlock {
            block_type: BlockType::Section,
            name: filename.to_string(),
            start_line: 1,
            end_line: content.lines().count().max(1),
            importance: importance::score(BlockType::Section, filename),
        });
    }

    info
}

static DECISION_POINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:if|elif|for|foreach|while|case|when|catch|except|and|or)\b|&&|\|\|")
        .expect("valid regex literal")
});

/// Count decision points in a line of code (comments already removed)
pub(crate) fn decision_points(code: &str) -> usize {
    DECISION_POINT.find_iter(code).count()
}

/// Width of leading whitespace, tabs counted as four columns
pub(crate) fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Split an import/export list (`a, b as c, * as d`) into bound names
pub(crate) fn split_bound_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(|part| {
            part.trim()
                .trim_matches(|c| c == '{' || c == '}' || c == '(' || c == ')')
                .trim()
        })
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let part = part.strip_prefix("type ").unwrap_or(part);
            let name = match part.rsplit_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => part,
            };
            let name = name.trim_start_matches('*').trim();
            let valid = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.');
            valid.then(|| name.to_string())
        })
        .collect()
}
