//! Global boundary planning over a parsed collection.

use crate::collection::SourceFile;
use crate::config::DEFAULT_BOUNDARY_IMPORTANCE;
use crate::types::{Boundary, BoundaryKind, StructuralInfo};

/// Importance given to file start/end markers
const FILE_BOUNDARY_IMPORTANCE: u8 = 10;

/// Produces the sorted boundary list the assembler cuts along
#[derive(Debug, Clone, Copy)]
pub struct BoundaryPlanner {
    min_importance: u8,
}

impl Default for BoundaryPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNDARY_IMPORTANCE)
    }
}

impl BoundaryPlanner {
    #[must_use]
    pub const fn new(min_importance: u8) -> Self {
        Self { min_importance }
    }

    /// Plan boundaries for `files`; `structures[i]` describes `files[i]`.
    ///
    /// Every file contributes one `FileStart` and one `FileEnd`. Blocks at or
    /// above the importance threshold contribute a start marker at an
    /// approximate offset (see [`line_to_position`]).
    #[must_use]
    pub fn plan(&self, files: &[SourceFile], structures: &[StructuralInfo]) -> Vec<Boundary> {
        let mut boundaries = Vec::with_capacity(files.len() * 2);

        for (file_index, file) in files.iter().enumerate() {
            let filename = file.path().to_string();

            boundaries.push(Boundary {
                kind: BoundaryKind::FileStart,
                position: file.start_offset,
                filename: filename.clone(),
                file_index,
                block_name: None,
                importance: FILE_BOUNDARY_IMPORTANCE,
            });

            let blocks = structures
                .get(file_index)
                .map(|info| info.semantic_blocks.as_slice())
                .unwrap_or_default();
            for block in blocks {
                if block.importance < self.min_importance {
                    continue;
                }
                boundaries.push(Boundary {
                    kind: block.block_type.boundary_kind(),
                    position: line_to_position(file, block.start_line),
                    filename: filename.clone(),
                    file_index,
                    block_name: Some(block.name.clone()),
                    importance: block.importance,
                });
            }

            boundaries.push(Boundary {
                kind: BoundaryKind::FileEnd,
                position: file.end_offset,
                filename,
                file_index,
                block_name: None,
                importance: FILE_BOUNDARY_IMPORTANCE,
            });
        }

        boundaries.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then(a.file_index.cmp(&b.file_index))
                .then(a.kind.rank().cmp(&b.kind.rank()))
        });

        log::debug!(
            "Planned {} boundaries for {} files",
            boundaries.len(),
            files.len()
        );
        boundaries
    }
}

/// Approximate the combined-text offset of a 1-indexed line of `file`.
///
/// The offset is `line * average line length` inside the file body, snapped
/// back to the start of the line it lands in. On files with uneven line
/// lengths this can be several lines off; that drift is accepted.
#[must_use]
pub fn line_to_position(file: &SourceFile, line: usize) -> usize {
    let body = file.content.as_str();
    if body.is_empty() {
        return file.header_end;
    }

    let line_count = body.lines().count().max(1);
    let average = body.len() as f64 / line_count as f64;
    let mut offset = ((line.saturating_sub(1)) as f64 * average) as usize;
    offset = offset.min(body.len() - 1);
    while offset > 0 && !body.is_char_boundary(offset) {
        offset -= 1;
    }

    let line_start = body[..offset].rfind('\n').map_or(0, |nl| nl + 1);
    file.header_end + line_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::collection::{parse_collection, render_collection, CollectionEntry};
    use pretty_assertions::assert_eq;

    fn collection() -> (String, Vec<SourceFile>, Vec<StructuralInfo>) {
        let entries = vec![
            CollectionEntry::text(
                "src/app.js",
                "/p/src/app.js",
                "import { helper } from './util';\n\nclass App {\n  start() {\n    helper();\n  }\n}\n\nfunction tiny() {}\n",
            ),
            CollectionEntry::text(
                "src/util.js",
                "/p/src/util.js",
                "export function helper() {\n  return 1;\n}\n",
            ),
        ];
        let text = render_collection(&entries);
        let files = parse_collection(&text).unwrap();
        let structures = files.iter().map(|f| analyze(f.path(), &f.content)).collect();
        (text, files, structures)
    }

    #[test]
    fn emits_file_edges_and_important_blocks() {
        let (_, files, structures) = collection();
        let boundaries = BoundaryPlanner::default().plan(&files, &structures);

        let kinds: Vec<_> = boundaries
            .iter()
            .map(|b| (b.kind, b.filename.as_str(), b.block_name.as_deref()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (BoundaryKind::FileStart, "src/app.js", None),
                (BoundaryKind::ClassStart, "src/app.js", Some("App")),
                (BoundaryKind::FunctionStart, "src/app.js", Some("start")),
                (BoundaryKind::FileEnd, "src/app.js", None),
                (BoundaryKind::FileStart, "src/util.js", None),
                (BoundaryKind::FileEnd, "src/util.js", None),
            ]
        );
        assert_eq!(boundaries[0].position, files[0].start_offset);
        assert_eq!(boundaries[5].position, files[1].end_offset);
    }

    #[test]
    fn positions_are_sorted_and_inside_file_spans() {
        let (text, files, structures) = collection();
        let boundaries = BoundaryPlanner::default().plan(&files, &structures);

        assert!(boundaries.windows(2).all(|w| w[0].position <= w[1].position));
        for boundary in boundaries.iter().filter(|b| b.kind.is_block()) {
            let file = &files[boundary.file_index];
            assert!(boundary.position >= file.header_end);
            assert!(boundary.position < file.end_offset);
            assert!(boundary.position == 0 || text.as_bytes()[boundary.position - 1] == b'\n');
        }
    }

    #[test]
    fn threshold_filters_blocks() {
        let (_, files, structures) = collection();
        let boundaries = BoundaryPlanner::new(11).plan(&files, &structures);
        assert!(boundaries.iter().all(|b| !b.kind.is_block()));
        assert_eq!(boundaries.len(), 4);
    }

    #[test]
    fn line_mapping_tracks_uniform_lines() {
        let entries = vec![CollectionEntry::text("a.txt", "/a.txt", "aaaa\nbbbb\ncccc\ndddd")];
        let text = render_collection(&entries);
        let files = parse_collection(&text).unwrap();
        let file = &files[0];

        assert_eq!(line_to_position(file, 1), file.header_end);
        assert_eq!(&text[line_to_position(file, 3)..][..4], "cccc");
        assert!(line_to_position(file, 999) < file.end_offset);
    }
}
