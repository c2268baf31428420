use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a detected function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Free-standing function declaration
    Function,
    /// Function declared inside a class body
    Method,
    /// Arrow function or lambda bound to a name
    Arrow,
}

/// Function detected by a structure scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// Line number (1-indexed)
    pub line: usize,
    pub kind: FunctionKind,
}

/// Class-like declaration (class, interface, enum, struct, object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Base class or first implemented type, if declared
    pub extends: Option<String>,
}

/// Import statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    /// Module path as written (`./utils/helpers`, `os.path`, `com.acme.Foo`)
    pub module: String,
    /// Names pulled in by the statement
    pub items: Vec<String>,
    /// Line number (1-indexed)
    pub line: usize,
}

/// Exported symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub name: String,
    /// Declaration keyword (`function`, `class`, `const`, `default`, ...)
    pub kind: String,
    /// Line number (1-indexed)
    pub line: usize,
}

/// Type of a semantic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Function,
    Class,
    Section,
}

impl BlockType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Section => "section",
        }
    }

    /// Boundary kind emitted when a block of this type starts
    #[must_use]
    pub const fn boundary_kind(self) -> BoundaryKind {
        match self {
            Self::Function => BoundaryKind::FunctionStart,
            Self::Class => BoundaryKind::ClassStart,
            Self::Section => BoundaryKind::SectionStart,
        }
    }
}

/// Line range of a function, class or section with its importance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticBlock {
    pub block_type: BlockType,
    pub name: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// End line (1-indexed, inclusive)
    pub end_line: usize,
    /// Importance score in 1..=10
    pub importance: u8,
}

impl SemanticBlock {
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// Structure detected in one source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralInfo {
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub semantic_blocks: Vec<SemanticBlock>,
    /// Decision-point count
    pub complexity: usize,
}

impl StructuralInfo {
    /// True when no structure at all was detected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.classes.is_empty()
            && self.imports.is_empty()
            && self.exports.is_empty()
            && self.semantic_blocks.is_empty()
    }
}

/// Kind of a boundary marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    FileStart,
    FileEnd,
    FunctionStart,
    ClassStart,
    SectionStart,
}

impl BoundaryKind {
    /// Tie-break rank for boundaries at the same position of the same file
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::FileStart => 0,
            Self::FunctionStart | Self::ClassStart | Self::SectionStart => 1,
            Self::FileEnd => 2,
        }
    }

    #[must_use]
    pub const fn is_block(self) -> bool {
        matches!(
            self,
            Self::FunctionStart | Self::ClassStart | Self::SectionStart
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileStart => "file_start",
            Self::FileEnd => "file_end",
            Self::FunctionStart => "function_start",
            Self::ClassStart => "class_start",
            Self::SectionStart => "section_start",
        }
    }
}

/// Position marker in the combined text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub kind: BoundaryKind,
    /// Byte offset in the combined text
    pub position: usize,
    pub filename: String,
    /// Index of the owning file in collection order
    pub file_index: usize,
    pub block_name: Option<String>,
    pub importance: u8,
}

/// Per-file membership details of a chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkFile {
    /// Highest importance among the file's boundaries inside the chunk
    pub importance: u8,
    /// Number of the file's boundaries inside the chunk
    pub boundaries: usize,
}

/// Kind of a cross-chunk dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossReferenceKind {
    Import,
    Call,
}

impl CrossReferenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Call => "call",
        }
    }
}

/// Dependency from one chunk to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    pub kind: CrossReferenceKind,
    pub target_chunk_index: usize,
    pub description: String,
}

/// Contiguous slice of the combined text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequence number within one chunking pass
    pub index: usize,
    /// Letter label derived from the index (`a`, `b`, ..., `aa`)
    pub label: String,
    /// Display name derived from the member files
    pub filename: String,
    /// Start byte offset (inclusive)
    pub start_pos: usize,
    /// End byte offset (exclusive)
    pub end_pos: usize,
    /// Raw slice of the combined text
    pub content: String,
    /// Length of `content` in bytes
    pub size: usize,
    /// Files present in the chunk, in name order
    pub files: BTreeMap<String, ChunkFile>,
    pub cross_references: Vec<CrossReference>,
    pub semantic_summary: String,
    /// Paste-ready text: instructions, metadata header and content
    pub wrapped_content: String,
}

impl Chunk {
    /// Create a chunk over `content[start_pos..end_pos]`
    #[must_use]
    pub fn new(index: usize, start_pos: usize, content: String) -> Self {
        let size = content.len();
        Self {
            index,
            label: chunk_label(index),
            filename: String::new(),
            start_pos,
            end_pos: start_pos + size,
            wrapped_content: content.clone(),
            content,
            size,
            files: BTreeMap::new(),
            cross_references: Vec::new(),
            semantic_summary: String::new(),
        }
    }

    /// Check if a byte offset falls inside this chunk
    #[must_use]
    pub const fn contains_position(&self, position: usize) -> bool {
        position >= self.start_pos && position < self.end_pos
    }

    /// Member file names in name order
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

/// Base-26 letter label: 0 -> `a`, 25 -> `z`, 26 -> `aa`, 27 -> `ab`
#[must_use]
pub fn chunk_label(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'a' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
