use filepack_chunker::{render_collection, Chunker, ChunkingConfig, CollectionEntry, CrossReferenceKind};
use filepack_xref::CrossReferenceResolver;
use pretty_assertions::assert_eq;

fn padded(body: &str) -> String {
    // Filler pushes every file past the target used below.
    format!("{body}\n{}", "// filler line\n".repeat(20))
}

fn collection() -> String {
    render_collection(&[
        CollectionEntry::text(
            "web/index.ts",
            "/p/web/index.ts",
            padded("import { ApiClient } from './api/client';\nimport { renderPage } from './view';\n\nexport function main() {\n  renderPage(new ApiClient());\n}"),
        ),
        CollectionEntry::text(
            "web/api/client.ts",
            "/p/web/api/client.ts",
            padded("export class ApiClient {\n  fetchUser(id: string) {\n    return fetchJson(id);\n  }\n}\n\nfunction fetchJson(id: string) {\n  return id;\n}"),
        ),
        CollectionEntry::text(
            "web/view.ts",
            "/p/web/view.ts",
            padded("export function renderPage(client) {\n  return client.fetchUser('me');\n}"),
        ),
    ])
}

#[test]
fn resolves_references_between_separate_chunks() {
    let text = collection();
    // Only file edges cut at this threshold, so each file is one chunk.
    let config = ChunkingConfig {
        boundary_importance: 10,
        ..ChunkingConfig::with_target(400)
    };
    let mut chunking = Chunker::new(config)
        .unwrap()
        .chunk(&text)
        .unwrap();
    assert_eq!(chunking.chunks.len(), 3);

    CrossReferenceResolver::default()
        .apply(&chunking.files, &chunking.structures, &mut chunking.chunks)
        .unwrap();

    let index_refs: Vec<_> = chunking.chunks[0]
        .cross_references
        .iter()
        .map(|r| (r.target_chunk_index, r.kind))
        .collect();
    assert_eq!(
        index_refs,
        vec![
            (1, CrossReferenceKind::Import),
            (2, CrossReferenceKind::Import),
            (2, CrossReferenceKind::Call),
        ]
    );

    let view_refs: Vec<_> = chunking.chunks[2]
        .cross_references
        .iter()
        .map(|r| r.description.as_str())
        .collect();
    assert_eq!(view_refs, vec!["web/view.ts calls fetchUser() defined in web/api/client.ts"]);

    for chunk in &chunking.chunks {
        assert!(chunk.cross_references.iter().all(|r| r.target_chunk_index != chunk.index));
        let keys: Vec<_> = chunk
            .cross_references
            .iter()
            .map(|r| (r.target_chunk_index, r.kind, r.description.clone()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);
    }
}

#[test]
fn single_chunk_has_no_references() {
    let text = collection();
    let mut chunking = Chunker::new(ChunkingConfig::with_target(1_000_000))
        .unwrap()
        .chunk(&text)
        .unwrap();

    let total = CrossReferenceResolver::default()
        .apply(&chunking.files, &chunking.structures, &mut chunking.chunks)
        .unwrap();
    assert_eq!(total, 0);
}
