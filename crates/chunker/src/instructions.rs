//! Paste-ready wrapping of chunks.
//!
//! A wrapped chunk reads, top to bottom: a pacing instruction (every part but
//! the last), a metadata block, the raw content between markers and, on the
//! last part, a completion marker. The output depends only on the chunk and
//! the total, so re-wrapping the same set yields identical text.

use crate::types::{chunk_label, Chunk};

pub const CONTENT_BEGIN: &str = "--- BEGIN CONTENT ---";
pub const CONTENT_END: &str = "--- END CONTENT ---";
pub const COMPLETION_MARKER: &str = "=== ALL PARTS SENT ===";

/// Wrap one chunk of a set of `total` chunks
#[must_use]
pub fn wrap(chunk: &Chunk, total: usize) -> String {
    let part = chunk.index + 1;
    let is_last = part >= total;
    let mut out = String::with_capacity(chunk.content.len() + 1024);

    if !is_last {
        out.push_str(&format!(
            "This is part {part} of {total} of a larger document. Do not analyze or answer yet.\n\
             Reply only with \"Received part {part} of {total}\" and wait for the next part.\n\n"
        ));
    }

    out.push_str(&format!("### Chunk {} (part {part} of {total})\n", chunk.label));
    let files: Vec<&str> = chunk.file_names().collect();
    if files.is_empty() {
        out.push_str("Files: none\n");
    } else {
        out.push_str(&format!("Files: {}\n", files.join(", ")));
    }
    out.push_str(&format!("Size: {} bytes\n", chunk.size));
    if !chunk.semantic_summary.is_empty() {
        out.push_str(&format!("Summary: {}\n", chunk.semantic_summary));
    }

    out.push_str(&format!("Cross-references: {}\n", chunk.cross_references.len()));
    for reference in &chunk.cross_references {
        out.push_str(&format!(
            "  - {} -> chunk {}: {}\n",
            reference.kind.as_str(),
            chunk_label(reference.target_chunk_index),
            reference.description
        ));
    }

    let previous = chunk
        .index
        .checked_sub(1)
        .map_or_else(|| "none".to_string(), |index| format!("chunk {}", chunk_label(index)));
    let next = if is_last {
        "none".to_string()
    } else {
        format!("chunk {}", chunk_label(chunk.index + 1))
    };
    out.push_str(&format!("Previous: {previous}\nNext: {next}\n\n"));

    out.push_str(CONTENT_BEGIN);
    out.push('\n');
    out.push_str(&chunk.content);
    if !chunk.content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(CONTENT_END);
    out.push('\n');

    if is_last {
        out.push_str(&format!(
            "\n{COMPLETION_MARKER}\nThis was the final part ({part} of {total}). \
             You now have the complete content and can proceed with the task.\n"
        ));
    }

    out
}

/// Wrap every chunk of a set in place
pub fn wrap_all(chunks: &mut [Chunk]) {
    let total = chunks.len();
    for chunk in chunks.iter_mut() {
        chunk.wrapped_content = wrap(chunk, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkFile, CrossReference, CrossReferenceKind};

    fn chunk(index: usize, content: &str) -> Chunk {
        let mut chunk = Chunk::new(index, index * 100, content.to_string());
        chunk.files.insert("src/app.js".to_string(), ChunkFile::default());
        chunk.semantic_summary = "1 file; classes: App".to_string();
        chunk
    }

    #[test]
    fn middle_parts_ask_for_acknowledgement() {
        let text = wrap(&chunk(0, "class App {}\n"), 3);
        assert!(text.starts_with("This is part 1 of 3"));
        assert!(text.contains("Reply only with \"Received part 1 of 3\""));
        assert!(text.contains("Files: src/app.js\n"));
        assert!(text.contains("Size: 13 bytes\n"));
        assert!(text.contains("Summary: 1 file; classes: App\n"));
        assert!(text.contains("Previous: none\nNext: chunk b\n"));
        assert!(text.contains("--- BEGIN CONTENT ---\nclass App {}\n--- END CONTENT ---\n"));
        assert!(!text.contains(COMPLETION_MARKER));
    }

    #[test]
    fn last_part_carries_completion_marker() {
        let text = wrap(&chunk(2, "tail"), 3);
        assert!(!text.contains("Received part"));
        assert!(text.contains("Previous: chunk b\nNext: none\n"));
        assert!(text.contains("tail\n--- END CONTENT ---"));
        assert!(text.contains(COMPLETION_MARKER));
        assert!(text.contains("final part (3 of 3)"));
    }

    #[test]
    fn lists_cross_references() {
        let mut first = chunk(0, "import x\n");
        first.cross_references.push(CrossReference {
            kind: CrossReferenceKind::Import,
            target_chunk_index: 1,
            description: "src/app.js imports ./util from src/util.js".to_string(),
        });
        let text = wrap(&first, 2);
        assert!(text.contains("Cross-references: 1\n"));
        assert!(text.contains("  - import -> chunk b: src/app.js imports ./util from src/util.js\n"));
    }

    #[test]
    fn wrapping_is_pure() {
        let mut chunks = vec![chunk(0, "a\n"), chunk(1, "b\n")];
        wrap_all(&mut chunks);
        let first_pass: Vec<String> = chunks.iter().map(|c| c.wrapped_content.clone()).collect();
        wrap_all(&mut chunks);
        let second_pass: Vec<String> = chunks.iter().map(|c| c.wrapped_content.clone()).collect();
        assert_eq!(first_pass, second_pass);
        assert!(chunks[1].wrapped_content.contains(COMPLETION_MARKER));
    }
}
