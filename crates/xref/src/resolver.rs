use crate::builder::GraphBuilder;
use crate::error::Result;
use crate::types::{DependencyGraph, RelationshipType};
use filepack_chunker::{Chunk, CrossReference, CrossReferenceKind, SourceFile, StructuralInfo};
use std::collections::{BTreeMap, BTreeSet};

/// Cross-references per source chunk index
pub type CrossReferenceMap = BTreeMap<usize, Vec<CrossReference>>;

/// Projects file dependencies onto chunks
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossReferenceResolver {
    builder: GraphBuilder,
}

impl CrossReferenceResolver {
    #[must_use]
    pub const fn new(resolve_imports: bool, resolve_calls: bool) -> Self {
        Self {
            builder: GraphBuilder::new(resolve_imports, resolve_calls),
        }
    }

    /// Resolve cross-references between `chunks`.
    ///
    /// A file belongs to the chunk holding its first content byte. References between
    /// files owned by the same chunk are dropped, as are files no chunk owns.
    /// Each list is deduplicated and ordered by target, kind and description.
    pub fn resolve(
        &self,
        files: &[SourceFile],
        structures: &[StructuralInfo],
        chunks: &[Chunk],
    ) -> Result<CrossReferenceMap> {
        let graph = self.builder.build(files, structures)?;
        Ok(project(&graph, files, chunks))
    }

    /// Resolve and store the references on each chunk
    pub fn apply(
        &self,
        files: &[SourceFile],
        structures: &[StructuralInfo],
        chunks: &mut [Chunk],
    ) -> Result<usize> {
        let mut references = self.resolve(files, structures, chunks)?;
        let mut total = 0;
        for chunk in chunks.iter_mut() {
            chunk.cross_references = references.remove(&chunk.index).unwrap_or_default();
            total += chunk.cross_references.len();
        }
        log::debug!("Resolved {total} cross-references across {} chunks", chunks.len());
        Ok(total)
    }
}

/// Index of the chunk containing `position`
#[must_use]
pub fn owning_chunk(chunks: &[Chunk], position: usize) -> Option<usize> {
    let idx = chunks.partition_point(|chunk| chunk.end_pos <= position);
    chunks
        .get(idx)
        .filter(|chunk| chunk.contains_position(position))
        .map(|chunk| chunk.index)
}

/// First content byte of a file, or its header start when the body is empty
fn content_anchor(file: &SourceFile) -> usize {
    if file.header_end < file.end_offset {
        file.header_end
    } else {
        file.start_offset
    }
}

fn project(graph: &DependencyGraph, files: &[SourceFile], chunks: &[Chunk]) -> CrossReferenceMap {
    let owners: Vec<Option<usize>> = files
        .iter()
        .map(|file| owning_chunk(chunks, content_anchor(file)))
        .collect();

    let mut collected: BTreeMap<usize, BTreeSet<(usize, CrossReferenceKind, String)>> = BTreeMap::new();
    for (from, to, edge) in graph.edges() {
        let (Some(source), Some(target)) = (owners[from.file_index], owners[to.file_index]) else {
            continue;
        };
        if source == target {
            continue;
        }

        let description = match edge.relationship {
            RelationshipType::Imports => {
                format!("{} imports '{}' from {}", from.path, edge.detail, to.path)
            }
            RelationshipType::Calls => {
                format!("{} calls {}() defined in {}", from.path, edge.detail, to.path)
            }
        };
        collected
            .entry(source)
            .or_default()
            .insert((target, edge.relationship.reference_kind(), description));
    }

    collected
        .into_iter()
        .map(|(source, references)| {
            let references = references
                .into_iter()
                .map(|(target_chunk_index, kind, description)| CrossReference {
                    kind,
                    target_chunk_index,
                    description,
                })
                .collect();
            (source, references)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use filepack_chunker::{
        analyze, parse_collection, render_collection, ChunkAssembler, BoundaryPlanner, CollectionEntry,
    };
    use pretty_assertions::assert_eq;

    struct Fixture {
        files: Vec<SourceFile>,
        structures: Vec<StructuralInfo>,
        text: String,
    }

    fn fixture() -> Fixture {
        let text = render_collection(&[
            CollectionEntry::text(
                "src/app.js",
                "/p/src/app.js",
                "import { formatDate } from './dates';\n\nfunction render() {\n  return formatDate(new Date());\n}\n",
            ),
            CollectionEntry::text(
                "src/dates.js",
                "/p/src/dates.js",
                "export function formatDate(d) {\n  return d.toISOString();\n}\n",
            ),
        ]);
        let files = parse_collection(&text).unwrap();
        let structures = files.iter().map(|f| analyze(f.path(), &f.content)).collect();
        Fixture {
            files,
            structures,
            text,
        }
    }

    fn chunks(fixture: &Fixture, target: usize) -> Vec<Chunk> {
        let boundaries = BoundaryPlanner::default().plan(&fixture.files, &fixture.structures);
        ChunkAssembler::new(target)
            .assemble(&fixture.text, &boundaries)
            .unwrap()
    }

    #[test]
    fn references_point_across_chunks() {
        let fixture = fixture();
        let target = fixture.files[0].byte_size();
        let chunks = chunks(&fixture, target);
        assert_eq!(chunks.len(), 2);

        let map = CrossReferenceResolver::default()
            .resolve(&fixture.files, &fixture.structures, &chunks)
            .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map[&0],
            vec![
                CrossReference {
                    kind: CrossReferenceKind::Import,
                    target_chunk_index: 1,
                    description: "src/app.js imports './dates' from src/dates.js".to_string(),
                },
                CrossReference {
                    kind: CrossReferenceKind::Call,
                    target_chunk_index: 1,
                    description: "src/app.js calls formatDate() defined in src/dates.js".to_string(),
                },
            ]
        );
    }

    #[test]
    fn same_chunk_references_are_dropped() {
        let fixture = fixture();
        let mut chunks = chunks(&fixture, 1_000_000);
        assert_eq!(chunks.len(), 1);

        let total = CrossReferenceResolver::default()
            .apply(&fixture.files, &fixture.structures, &mut chunks)
            .unwrap();
        assert_eq!(total, 0);
        assert!(chunks[0].cross_references.is_empty());
    }

    #[test]
    fn apply_sets_every_chunk() {
        let fixture = fixture();
        let target = fixture.files[0].byte_size();
        let mut chunks = chunks(&fixture, target);

        let total = CrossReferenceResolver::new(true, false)
            .apply(&fixture.files, &fixture.structures, &mut chunks)
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(chunks[0].cross_references[0].kind, CrossReferenceKind::Import);
        assert!(chunks[1].cross_references.is_empty());
        assert!(chunks
            .iter()
            .flat_map(|c| c.cross_references.iter().map(move |r| (c.index, r.target_chunk_index)))
            .all(|(source, target)| source != target));
    }

    #[test]
    fn file_is_owned_by_the_chunk_holding_its_body() {
        let fixture = fixture();
        let split = fixture.files[1].header_end;
        // dates.js header sits in the first chunk, its body in the second.
        let chunks = vec![
            Chunk::new(0, 0, fixture.text[..split].to_string()),
            Chunk::new(1, split, fixture.text[split..].to_string()),
        ];

        let map = CrossReferenceResolver::default()
            .resolve(&fixture.files, &fixture.structures, &chunks)
            .unwrap();
        let targets: Vec<_> = map[&0].iter().map(|r| (r.target_chunk_index, r.kind)).collect();
        assert_eq!(
            targets,
            vec![(1, CrossReferenceKind::Import), (1, CrossReferenceKind::Call)]
        );
    }

    #[test]
    fn owning_chunk_lookup() {
        let fixture = fixture();
        let chunks = chunks(&fixture, fixture.files[0].byte_size());
        assert_eq!(owning_chunk(&chunks, 0), Some(0));
        assert_eq!(owning_chunk(&chunks, fixture.files[1].start_offset), Some(1));
        assert_eq!(owning_chunk(&chunks, fixture.text.len()), None);
        assert_eq!(owning_chunk(&[], 0), None);
    }
}
