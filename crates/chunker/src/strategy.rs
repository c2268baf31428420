//! Size-based splitting.
//!
//! Used when the semantic strategy is switched off or when the input carries
//! no file headers at all. Lines are never split.

use crate::collection::SEPARATOR;

/// Split `content` into spans of roughly `target` bytes.
///
/// Each window prefers, in order: a file header starting in its back half,
/// the last newline inside it, or the first newline after it.
#[must_use]
pub fn size_spans(content: &str, target: usize) -> Vec<(usize, usize)> {
    let target = target.max(1);
    let len = content.len();
    let mut spans = Vec::new();
    let mut start = 0;

    while start < len {
        let end = if len - start <= target {
            len
        } else {
            split_point(content, start, floor_char_boundary(content, start + target))
        };
        spans.push((start, end));
        start = end;
    }

    spans
}

fn split_point(content: &str, start: usize, window_end: usize) -> usize {
    let window = &content[start..window_end];
    let back_half = (window_end - start) / 2;

    let header = window
        .match_indices('\n')
        .map(|(idx, _)| idx + 1)
        .filter(|&line_start| line_start >= back_half && line_start < window.len())
        .filter(|&line_start| is_file_header(&content[start + line_start..]))
        .last();
    if let Some(line_start) = header {
        return start + line_start;
    }

    if let Some(newline) = window.rfind('\n') {
        return start + newline + 1;
    }

    content[window_end..]
        .find('\n')
        .map_or(content.len(), |newline| window_end + newline + 1)
}

fn is_file_header(text: &str) -> bool {
    text.strip_prefix(SEPARATOR)
        .and_then(|rest| rest.strip_prefix('\n'))
        .is_some_and(|rest| rest.starts_with("filename: "))
}

fn floor_char_boundary(content: &str, mut index: usize) -> usize {
    while index > 0 && !content.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{render_collection, CollectionEntry};
    use pretty_assertions::assert_eq;

    fn assert_partition(content: &str, spans: &[(usize, usize)]) {
        assert_eq!(spans.first().map(|s| s.0), Some(0));
        assert_eq!(spans.last().map(|s| s.1), Some(content.len()));
        assert!(spans.windows(2).all(|w| w[0].1 == w[1].0));
        assert!(spans.iter().all(|&(s, e)| s < e));
    }

    #[test]
    fn breaks_after_last_newline() {
        let content = "aaaa\nbbbb\ncccc\ndddd\n";
        let spans = size_spans(content, 12);
        assert_eq!(spans, vec![(0, 10), (10, 20)]);
    }

    #[test]
    fn long_lines_extend_to_next_newline() {
        let content = format!("{}\nshort\n", "x".repeat(30));
        let spans = size_spans(&content, 10);
        assert_eq!(spans, vec![(0, 31), (31, 37)]);
    }

    #[test]
    fn prefers_file_headers_in_back_half() {
        let entries = vec![
            CollectionEntry::text("a.txt", "/a.txt", "line\n".repeat(10)),
            CollectionEntry::text("b.txt", "/b.txt", "line\n".repeat(40)),
        ];
        let text = render_collection(&entries);
        let second_header = text.find(&format!("\n{SEPARATOR}\nfilename: ")).unwrap() + 1;

        let spans = size_spans(&text, second_header + 40);
        assert_eq!(spans[0], (0, second_header));
        assert_partition(&text, &spans);
    }

    #[test]
    fn never_splits_multibyte_characters() {
        let content = "ééééé\n".repeat(20);
        let spans = size_spans(&content, 7);
        assert_partition(&content, &spans);
        for (start, end) in spans {
            assert!(content.is_char_boundary(start) && content.is_char_boundary(end));
        }
    }

    #[test]
    fn empty_content_has_no_spans() {
        assert!(size_spans("", 10).is_empty());
    }

    #[test]
    fn small_content_is_one_span() {
        assert_eq!(size_spans("tiny", 100), vec![(0, 4)]);
    }
}
