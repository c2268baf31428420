//! Name-based importance scoring for semantic blocks.

use crate::types::BlockType;

/// Names that mark entry points or lifecycle hooks
const ENTRY_POINT_NAMES: &[&str] = &[
    "main",
    "init",
    "__init__",
    "__main__",
    "initialize",
    "setup",
    "render",
    "constructor",
    "app",
    "run",
    "start",
    "bootstrap",
    "index",
    "handler",
    "execute",
    "configure",
    "create_app",
    "application",
];

/// Prefixes of names that usually drive behaviour
const ENTRY_POINT_PREFIXES: &[&str] = &["handle", "render", "init", "main", "process", "on_"];

/// Markers of supporting code
const LOW_IMPORTANCE_MARKERS: &[&str] = &["test", "spec", "util", "helper", "mock", "fixture"];

/// Section titles that describe a document's structure
const SECTION_KEYWORDS: &[&str] = &[
    "overview",
    "introduction",
    "getting started",
    "usage",
    "installation",
    "configuration",
    "architecture",
    "api",
];

/// Score a block by its type and name, clamped to 1..=10
#[must_use]
pub fn score(block_type: BlockType, name: &str) -> u8 {
    let mut score: i32 = match block_type {
        BlockType::Class => 7,
        BlockType::Section => 6,
        BlockType::Function => 5,
    };

    let lower = name.trim().to_lowercase();
    let is_entry_point = ENTRY_POINT_NAMES.contains(&lower.as_str());

    if is_entry_point {
        score += 4;
    } else if ENTRY_POINT_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        score += 2;
    }

    if block_type == BlockType::Section
        && SECTION_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
    {
        score += 2;
    }

    if !is_entry_point && lower.starts_with('_') {
        score -= 3;
    }

    if LOW_IMPORTANCE_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
    {
        score -= 3;
    }

    score.clamp(1, 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_score_highest() {
        assert_eq!(score(BlockType::Function, "main"), 9);
        assert_eq!(score(BlockType::Function, "constructor"), 9);
        assert_eq!(score(BlockType::Function, "__init__"), 9);
        assert_eq!(score(BlockType::Class, "App"), 10);
        assert_eq!(score(BlockType::Function, "handleClick"), 7);
    }

    #[test]
    fn plain_names_use_type_base() {
        assert_eq!(score(BlockType::Class, "Foo"), 7);
        assert_eq!(score(BlockType::Function, "bar"), 5);
        assert_eq!(score(BlockType::Section, "Notes"), 6);
        assert_eq!(score(BlockType::Section, "Getting Started"), 8);
    }

    #[test]
    fn private_test_and_util_names_score_lowest() {
        assert_eq!(score(BlockType::Function, "_private"), 2);
        assert_eq!(score(BlockType::Function, "testParser"), 2);
        assert_eq!(score(BlockType::Function, "_format_util"), 1);
        assert_eq!(score(BlockType::Class, "StringUtils"), 4);
    }

    #[test]
    fn scoring_is_deterministic() {
        for name in ["main", "Foo", "_x", "render_page"] {
            assert_eq!(
                score(BlockType::Function, name),
                score(BlockType::Function, name)
            );
        }
    }
}
