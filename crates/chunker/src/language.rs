use std::path::Path;

/// Language detected from a file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Java,
    Kotlin,
    CSharp,
    Python,
    Markdown,
    Config,
    Unknown,
}

/// Scanner family used for structural analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    /// Blocks delimited by braces
    CurlyBrace,
    /// Blocks delimited by indentation
    Indentation,
    /// Section headers only
    Generic,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "java" => Language::Java,
            "kt" | "kts" => Language::Kotlin,
            "cs" => Language::CSharp,
            "py" | "pyw" => Language::Python,
            "md" | "markdown" | "mdx" => Language::Markdown,
            "ini" | "cfg" | "toml" | "conf" | "properties" => Language::Config,
            _ => Language::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::CSharp => "csharp",
            Language::Python => "python",
            Language::Markdown => "markdown",
            Language::Config => "config",
            Language::Unknown => "unknown",
        }
    }

    /// Scanner family for this language
    pub fn family(self) -> LanguageFamily {
        match self {
            Language::JavaScript
            | Language::TypeScript
            | Language::Java
            | Language::Kotlin
            | Language::CSharp => LanguageFamily::CurlyBrace,
            Language::Python => LanguageFamily::Indentation,
            Language::Markdown | Language::Config | Language::Unknown => LanguageFamily::Generic,
        }
    }

    /// True for JavaScript and TypeScript, which share module syntax
    pub fn is_ecmascript(self) -> bool {
        matches!(self, Language::JavaScript | Language::TypeScript)
    }

    /// Get line comment prefixes for this language
    pub fn comment_prefixes(self) -> &'static [&'static str] {
        match self.family() {
            LanguageFamily::CurlyBrace => &["//", "/*", "*"],
            LanguageFamily::Indentation => &["#"],
            LanguageFamily::Generic => &[],
        }
    }
}
