//! Greedy assembly of boundary-delimited segments into chunks.

use crate::error::{ChunkerError, Result};
use crate::strategy::size_spans;
use crate::types::{Boundary, BoundaryKind, Chunk};
use std::collections::BTreeMap;

/// Names listed per category before the summary starts counting instead
const SUMMARY_NAME_LIMIT: usize = 4;

/// Groups the segments between boundaries into chunks under a target size.
///
/// Segments are never split: a segment larger than the target becomes a
/// chunk of its own. A file joins the open chunk only when it fits whole.
#[derive(Debug, Clone, Copy)]
pub struct ChunkAssembler {
    target_size: usize,
}

impl ChunkAssembler {
    #[must_use]
    pub fn new(target_size: usize) -> Self {
        Self {
            target_size: target_size.max(1),
        }
    }

    #[must_use]
    pub const fn target_size(&self) -> usize {
        self.target_size
    }

    /// Assemble chunks over `content`.
    ///
    /// `boundaries` must be sorted by position and every position must be a
    /// char boundary of `content`. Offsets 0 and `content.len()` are always
    /// segment edges, so the chunks partition the whole content.
    pub fn assemble(&self, content: &str, boundaries: &[Boundary]) -> Result<Vec<Chunk>> {
        validate_boundaries(content, boundaries)?;

        if content.is_empty() {
            return Ok(Vec::new());
        }

        let spans = if self.target_size >= content.len() {
            vec![(0, content.len())]
        } else {
            self.group_segments(content.len(), boundaries)
        };

        let chunks = chunks_from_spans(content, &spans, boundaries);
        log::debug!(
            "Assembled {} chunks from {} bytes (target {})",
            chunks.len(),
            content.len(),
            self.target_size
        );
        Ok(chunks)
    }

    /// Size-based mode: cut at line breaks near the target size, ignoring
    /// block boundaries. `boundaries` only feed chunk metadata.
    pub fn assemble_by_size(&self, content: &str, boundaries: &[Boundary]) -> Result<Vec<Chunk>> {
        validate_boundaries(content, boundaries)?;

        let spans = size_spans(content, self.target_size);
        let chunks = chunks_from_spans(content, &spans, boundaries);
        log::debug!(
            "Split {} bytes into {} size-based chunks (target {})",
            content.len(),
            chunks.len(),
            self.target_size
        );
        Ok(chunks)
    }

    fn group_segments(&self, len: usize, boundaries: &[Boundary]) -> Vec<(usize, usize)> {
        let mut edges = Vec::with_capacity(boundaries.len() + 2);
        edges.push(Cut {
            position: 0,
            file_end: None,
        });
        edges.extend(cut_points(boundaries));
        edges.push(Cut {
            position: len,
            file_end: None,
        });
        edges.dedup_by(|later, earlier| {
            if later.position != earlier.position {
                return false;
            }
            earlier.file_end = earlier.file_end.or(later.file_end);
            true
        });

        let mut spans = Vec::new();
        let (mut start, mut end) = (0, 0);
        for pair in edges.windows(2) {
            let (segment_start, segment_end) = (pair[0].position, pair[1].position);
            // A file only joins an open chunk when all of it fits.
            let needed = pair[0]
                .file_end
                .map_or(segment_end, |file_end| file_end.max(segment_end))
                - segment_start;
            let size = end - start;
            if size > 0 && size + needed > self.target_size {
                spans.push((start, end));
                start = segment_start;
            }
            end = segment_end;
        }
        if end > start {
            spans.push((start, end));
        }
        spans
    }
}

/// Segment edge; `file_end` is set where a file starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cut {
    position: usize,
    file_end: Option<usize>,
}

/// Positions the assembler may cut at.
///
/// A file's first block is not a cut point, so its header always travels
/// with the code after it.
fn cut_points(boundaries: &[Boundary]) -> Vec<Cut> {
    let file_ends: BTreeMap<usize, usize> = boundaries
        .iter()
        .filter(|b| b.kind == BoundaryKind::FileEnd)
        .map(|b| (b.file_index, b.position))
        .collect();

    let mut cuts = Vec::with_capacity(boundaries.len());
    let mut open_header: Option<usize> = None;
    let mut glued: Option<(usize, usize)> = None;
    for boundary in boundaries {
        match boundary.kind {
            BoundaryKind::FileStart => {
                open_header = Some(boundary.file_index);
                glued = None;
                cuts.push(Cut {
                    position: boundary.position,
                    file_end: file_ends.get(&boundary.file_index).copied(),
                });
            }
            BoundaryKind::FileEnd => {
                open_header = None;
                glued = None;
                cuts.push(Cut {
                    position: boundary.position,
                    file_end: None,
                });
            }
            _ if open_header == Some(boundary.file_index) => {
                open_header = None;
                glued = Some((boundary.file_index, boundary.position));
            }
            _ if glued == Some((boundary.file_index, boundary.position)) => {}
            _ => cuts.push(Cut {
                position: boundary.position,
                file_end: None,
            }),
        }
    }
    cuts
}

fn validate_boundaries(content: &str, boundaries: &[Boundary]) -> Result<()> {
    let mut previous = 0;
    for boundary in boundaries {
        if !content.is_char_boundary(boundary.position) {
            return Err(ChunkerError::InvalidBoundaries {
                position: boundary.position,
                len: content.len(),
            });
        }
        if boundary.position < previous {
            return Err(ChunkerError::UnsortedBoundaries {
                previous,
                next: boundary.position,
            });
        }
        previous = boundary.position;
    }
    Ok(())
}

/// Span of one file as told by its start/end boundaries
struct FileSpan<'a> {
    name: &'a str,
    start: usize,
    end: usize,
}

fn file_spans(boundaries: &[Boundary]) -> BTreeMap<usize, FileSpan<'_>> {
    let mut spans: BTreeMap<usize, FileSpan<'_>> = BTreeMap::new();
    for boundary in boundaries {
        let span = spans.entry(boundary.file_index).or_insert(FileSpan {
            name: &boundary.filename,
            start: boundary.position,
            end: boundary.position,
        });
        match boundary.kind {
            BoundaryKind::FileStart => span.start = boundary.position,
            BoundaryKind::FileEnd => span.end = boundary.position,
            _ => span.end = span.end.max(boundary.position),
        }
    }
    spans
}

fn chunks_from_spans(content: &str, spans: &[(usize, usize)], boundaries: &[Boundary]) -> Vec<Chunk> {
    let files = file_spans(boundaries);
    spans
        .iter()
        .enumerate()
        .map(|(index, &(start, end))| build_chunk(index, content, start, end, boundaries, &files))
        .collect()
}

fn build_chunk(
    index: usize,
    content: &str,
    start: usize,
    end: usize,
    boundaries: &[Boundary],
    files: &BTreeMap<usize, FileSpan<'_>>,
) -> Chunk {
    let mut chunk = Chunk::new(index, start, content[start..end].to_string());

    // Members in collection order; a file's end marker is exclusive.
    let members: Vec<&FileSpan<'_>> = files
        .values()
        .filter(|span| span.start < end && span.end > start)
        .collect();
    for span in &members {
        chunk.files.entry(span.name.to_string()).or_default();
    }

    let inside: Vec<&Boundary> = boundaries
        .iter()
        .filter(|b| b.kind != BoundaryKind::FileEnd && chunk.contains_position(b.position))
        .collect();
    for boundary in &inside {
        let entry = chunk.files.entry(boundary.filename.clone()).or_default();
        entry.importance = entry.importance.max(boundary.importance);
        entry.boundaries += 1;
    }

    chunk.filename = match members.as_slice() {
        [] => format!("chunk_{}", chunk.label),
        [only] => only.name.to_string(),
        [first, rest @ ..] => format!("{} (+{} more)", first.name, rest.len()),
    };

    let continued = members.first().filter(|span| span.start < start).map(|span| span.name);
    chunk.semantic_summary = summarize(members.len(), continued, &inside);
    chunk
}

/// Describe a chunk from the boundaries that fall inside it
fn summarize(file_count: usize, continued: Option<&str>, inside: &[&Boundary]) -> String {
    let mut parts = Vec::new();

    if let Some(name) = continued {
        parts.push(format!("continues {name}"));
    }
    match file_count {
        0 => parts.push("no file content".to_string()),
        1 => parts.push("1 file".to_string()),
        n => parts.push(format!("{n} files")),
    }

    for (kind, label) in [
        (BoundaryKind::ClassStart, "classes"),
        (BoundaryKind::FunctionStart, "functions"),
        (BoundaryKind::SectionStart, "sections"),
    ] {
        let names: Vec<&str> = inside
            .iter()
            .filter(|b| b.kind == kind)
            .filter_map(|b| b.block_name.as_deref())
            .collect();
        if names.is_empty() {
            continue;
        }
        let mut listed = names[..names.len().min(SUMMARY_NAME_LIMIT)].join(", ");
        if names.len() > SUMMARY_NAME_LIMIT {
            listed.push_str(&format!(" (+{} more)", names.len() - SUMMARY_NAME_LIMIT));
        }
        parts.push(format!("{label}: {listed}"));
    }

    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn boundary(kind: BoundaryKind, position: usize, file_index: usize, name: &str) -> Boundary {
        Boundary {
            kind,
            position,
            filename: name.to_string(),
            file_index,
            block_name: None,
            importance: 10,
        }
    }

    fn block(kind: BoundaryKind, position: usize, file_index: usize, file: &str, block: &str) -> Boundary {
        Boundary {
            kind,
            position,
            filename: file.to_string(),
            file_index,
            block_name: Some(block.to_string()),
            importance: 8,
        }
    }

    /// Three files of 10 bytes each
    fn three_files() -> (String, Vec<Boundary>) {
        let content = "aaaaaaaaa\nbbbbbbbbb\nccccccccc\n".to_string();
        let boundaries = vec![
            boundary(BoundaryKind::FileStart, 0, 0, "a.txt"),
            boundary(BoundaryKind::FileEnd, 10, 0, "a.txt"),
            boundary(BoundaryKind::FileStart, 10, 1, "b.txt"),
            boundary(BoundaryKind::FileEnd, 20, 1, "b.txt"),
            boundary(BoundaryKind::FileStart, 20, 2, "c.txt"),
            boundary(BoundaryKind::FileEnd, 30, 2, "c.txt"),
        ];
        (content, boundaries)
    }

    fn joined(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn greedy_grouping_respects_target() {
        let (content, boundaries) = three_files();
        let chunks = ChunkAssembler::new(20).assemble(&content, &boundaries).unwrap();

        let spans: Vec<_> = chunks.iter().map(|c| (c.start_pos, c.end_pos)).collect();
        assert_eq!(spans, vec![(0, 20), (20, 30)]);
        assert_eq!(chunks[0].filename, "a.txt (+1 more)");
        assert_eq!(chunks[1].filename, "c.txt");
        assert_eq!(chunks[1].label, "b");
        assert_eq!(joined(&chunks), content);
    }

    #[test]
    fn large_target_collapses_to_one_chunk() {
        let (content, boundaries) = three_files();
        let chunks = ChunkAssembler::new(30).assemble(&content, &boundaries).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, content);
        assert_eq!(chunks[0].files.len(), 3);
        assert_eq!(chunks[0].semantic_summary, "3 files");
    }

    #[test]
    fn oversized_segment_stands_alone() {
        let content = format!("{}{}", "x".repeat(5), "y".repeat(50));
        let boundaries = vec![
            boundary(BoundaryKind::FileStart, 0, 0, "x"),
            boundary(BoundaryKind::FileEnd, 5, 0, "x"),
            boundary(BoundaryKind::FileStart, 5, 1, "y"),
            boundary(BoundaryKind::FileEnd, 55, 1, "y"),
        ];
        let chunks = ChunkAssembler::new(10).assemble(&content, &boundaries).unwrap();
        let sizes: Vec<_> = chunks.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![5, 50]);
    }

    #[test]
    fn preamble_and_trailing_text_are_kept() {
        let content = "preamble\nbody of file\ntrailer";
        let boundaries = vec![
            boundary(BoundaryKind::FileStart, 9, 0, "f"),
            boundary(BoundaryKind::FileEnd, 22, 0, "f"),
        ];
        let chunks = ChunkAssembler::new(5).assemble(content, &boundaries).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].filename, "chunk_a");
        assert_eq!(chunks[0].semantic_summary, "no file content");
        assert_eq!(joined(&chunks), content);
    }

    #[test]
    fn empty_content_has_no_chunks() {
        assert!(ChunkAssembler::new(10).assemble("", &[]).unwrap().is_empty());
    }

    #[test]
    fn content_without_boundaries_is_one_segment() {
        let chunks = ChunkAssembler::new(4).assemble("0123456789", &[]).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].size, 10);
    }

    #[test]
    fn summary_lists_blocks_and_continuations() {
        let content = "0123456789".repeat(4);
        let boundaries = vec![
            boundary(BoundaryKind::FileStart, 0, 0, "app.js"),
            block(BoundaryKind::ClassStart, 10, 0, "app.js", "App"),
            block(BoundaryKind::FunctionStart, 20, 0, "app.js", "render"),
            block(BoundaryKind::FunctionStart, 30, 0, "app.js", "main"),
            boundary(BoundaryKind::FileEnd, 40, 0, "app.js"),
        ];
        let chunks = ChunkAssembler::new(20).assemble(&content, &boundaries).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].semantic_summary, "1 file; classes: App");
        assert_eq!(
            chunks[1].semantic_summary,
            "continues app.js; 1 file; functions: render, main"
        );
        let file = chunks[1].files["app.js"];
        assert_eq!((file.importance, file.boundaries), (8, 2));
        assert_eq!(chunks[0].files["app.js"].importance, 10);
    }

    #[test]
    fn header_stays_with_first_block() {
        let content = "0123456789".repeat(4);
        let boundaries = vec![
            boundary(BoundaryKind::FileStart, 0, 0, "app.js"),
            block(BoundaryKind::ClassStart, 4, 0, "app.js", "App"),
            block(BoundaryKind::FunctionStart, 20, 0, "app.js", "main"),
            boundary(BoundaryKind::FileEnd, 40, 0, "app.js"),
        ];
        let chunks = ChunkAssembler::new(10).assemble(&content, &boundaries).unwrap();

        let spans: Vec<_> = chunks.iter().map(|c| (c.start_pos, c.end_pos)).collect();
        assert_eq!(spans, vec![(0, 20), (20, 40)]);
        assert_eq!(chunks[0].semantic_summary, "1 file; classes: App");
    }

    #[test]
    fn file_that_does_not_fit_opens_a_new_chunk() {
        // Second file: 4-byte header, then a class running to the end.
        let content = "aaaaaaaaa\n".to_string() + &"b".repeat(30);
        let boundaries = vec![
            boundary(BoundaryKind::FileStart, 0, 0, "a.js"),
            boundary(BoundaryKind::FileEnd, 10, 0, "a.js"),
            boundary(BoundaryKind::FileStart, 10, 1, "b.js"),
            block(BoundaryKind::ClassStart, 14, 1, "b.js", "Foo"),
            boundary(BoundaryKind::FileEnd, 40, 1, "b.js"),
        ];
        let chunks = ChunkAssembler::new(15).assemble(&content, &boundaries).unwrap();

        let spans: Vec<_> = chunks.iter().map(|c| (c.start_pos, c.end_pos)).collect();
        assert_eq!(spans, vec![(0, 10), (10, 40)]);
        assert_eq!(chunks[0].filename, "a.js");
        assert_eq!(chunks[1].filename, "b.js");
    }

    #[test]
    fn end_marker_does_not_add_membership() {
        let (content, boundaries) = three_files();
        let chunks = ChunkAssembler::new(10).assemble(&content, &boundaries).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks
            .iter()
            .all(|chunk| chunk.files.len() == 1 && chunk.files.values().all(|f| f.boundaries == 1)));
    }

    #[test]
    fn rejects_bad_boundaries() {
        let content = "héllo";
        let out_of_range = vec![boundary(BoundaryKind::FileStart, 99, 0, "f")];
        assert!(matches!(
            ChunkAssembler::new(2).assemble(content, &out_of_range),
            Err(ChunkerError::InvalidBoundaries { position: 99, .. })
        ));

        let mid_char = vec![boundary(BoundaryKind::FileStart, 2, 0, "f")];
        assert!(matches!(
            ChunkAssembler::new(2).assemble(content, &mid_char),
            Err(ChunkerError::InvalidBoundaries { position: 2, .. })
        ));

        let unsorted = vec![
            boundary(BoundaryKind::FileStart, 3, 0, "f"),
            boundary(BoundaryKind::FileEnd, 1, 0, "f"),
        ];
        assert!(matches!(
            ChunkAssembler::new(2).assemble(content, &unsorted),
            Err(ChunkerError::UnsortedBoundaries { previous: 3, next: 1 })
        ));
    }

    #[test]
    fn assembly_is_deterministic() {
        let (content, boundaries) = three_files();
        let assembler = ChunkAssembler::new(15);
        assert_eq!(
            assembler.assemble(&content, &boundaries).unwrap(),
            assembler.assemble(&content, &boundaries).unwrap()
        );
    }
}
