//! Scanner for brace-delimited languages (JavaScript, TypeScript, Java,
//! Kotlin, C#).

use super::{decision_points, importance, split_bound_names, StructureScanner};
use crate::language::Language;
use crate::types::{
    BlockType, ClassInfo, ExportInfo, FunctionInfo, FunctionKind, ImportInfo, SemanticBlock,
    StructuralInfo,
};
use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:(?:public|private|protected|internal|static|final|abstract|sealed|partial|data|open|inner|annotation|declare)\s+)*(?:class|interface|enum|struct|record|object|trait)\s+([A-Za-z_$][\w$]*)(?:\s*<[^>]*>)?(?:\s*\([^)]*\))?\s*(?:(?:extends|:)\s*([A-Za-z_$][\w$.]*)|implements\s+([A-Za-z_$][\w$.]*))?",
    )
    .expect("valid regex literal")
});

static JS_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\(",
    )
    .expect("valid regex literal")
});

static JS_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]+)?=>|[A-Za-z_$][\w$]*\s*=>)",
    )
    .expect("valid regex literal")
});

static JS_CLASS_FIELD_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|private|protected|static|readonly)\s+)*(#?[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=>",
    )
    .expect("valid regex literal")
});

static JS_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|private|protected|static|async|override|abstract|readonly|get|set)\s+)*\*?(#?[A-Za-z_$][\w$]*)\s*(?:<[^>()]*>)?\s*\(",
    )
    .expect("valid regex literal")
});

static KOTLIN_FUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|private|protected|internal|override|open|suspend|inline|operator|infix|tailrec|abstract|actual|expect)\s+)*fun\s+(?:<[^>]*>\s*)?(?:[\w.]+\.)?([A-Za-z_]\w*)\s*\(",
    )
    .expect("valid regex literal")
});

static JVM_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:public|private|protected|internal|static|final|abstract|synchronized|override|virtual|async|sealed|native|default|extern|unsafe|new|partial)\s+)*(?:[\w<>\[\],.?]+\s+)*([A-Za-z_]\w*)\s*\(",
    )
    .expect("valid regex literal")
});

static JS_IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:import|export)\s+(?:type\s+)?(.+?)\s+from\s+['"]([^'"]+)['"]"#)
        .expect("valid regex literal")
});

static JS_IMPORT_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*import\s+['"]([^'"]+)['"]"#).expect("valid regex literal")
});

static JS_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:(?:const|let|var)\s+(.+?)\s*=\s*)?require\(\s*['"]([^'"]+)['"]\s*\)"#)
        .expect("valid regex literal")
});

static JVM_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(?:static\s+)?([\w.]+?)(?:\.\*)?(?:\s+as\s+(\w+))?\s*;?\s*$")
        .expect("valid regex literal")
});

static CSHARP_USING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*using\s+(?:static\s+)?(?:(\w+)\s*=\s*)?([\w.]+)\s*;").expect("valid regex literal")
});

static JS_EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*export\s+(default\s+)?(?:declare\s+)?(?:async\s+)?(?:abstract\s+)?(function\*?|class|const|let|var|interface|type|enum)\s+([A-Za-z_$][\w$]*)",
    )
    .expect("valid regex literal")
});

static JS_EXPORT_DEFAULT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*export\s+default\s+([A-Za-z_$][\w$]*)\s*;?\s*$").expect("valid regex literal")
});

static JS_EXPORT_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*export\s*(?:type\s*)?\{([^}]*)\}").expect("valid regex literal")
});

static MODULE_EXPORTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*module\.exports\s*=\s*(?:\{([^}]*)\}?|([A-Za-z_$][\w$]*))")
        .expect("valid regex literal")
});

static EXPORTS_PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*=").expect("valid regex literal")
});

/// Words that look like calls or declarations but open control flow
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "foreach", "while", "do", "switch", "catch", "try", "finally", "return",
    "throw", "new", "await", "yield", "typeof", "function", "when", "using", "lock", "sizeof",
    "super", "this", "synchronized", "assert", "delete", "void",
];

#[derive(Debug)]
struct OpenBlock {
    block_type: BlockType,
    name: String,
    start_line: usize,
    /// Brace depth at the declaration line
    depth: usize,
    /// Set once the block's own opening brace has been seen
    entered: bool,
}

impl OpenBlock {
    fn close(self, end_line: usize) -> SemanticBlock {
        SemanticBlock {
            block_type: self.block_type,
            importance: importance::score(self.block_type, &self.name),
            name: self.name,
            start_line: self.start_line,
            end_line: end_line.max(self.start_line),
        }
    }
}

/// Scanner for brace-delimited languages
pub struct CurlyBraceScanner {
    language: Language,
}

impl CurlyBraceScanner {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    fn is_comment_line(&self, trimmed: &str) -> bool {
        self.language
            .comment_prefixes()
            .iter()
            .any(|prefix| trimmed.starts_with(prefix))
    }

    /// Detect a function declared outside of a class body
    fn detect_function(&self, code: &str) -> Option<(String, FunctionKind)> {
        match self.language {
            Language::JavaScript | Language::TypeScript => {
                if let Some(cap) = JS_FUNCTION.captures(code) {
                    return Some((cap[1].to_string(), FunctionKind::Function));
                }
                JS_ARROW
                    .captures(code)
                    .map(|cap| (cap[1].to_string(), FunctionKind::Arrow))
            }
            Language::Kotlin => KOTLIN_FUN
                .captures(code)
                .map(|cap| (cap[1].to_string(), FunctionKind::Function)),
            _ => None,
        }
    }

    /// Detect a method declared directly inside a class body
    fn detect_method(&self, code: &str) -> Option<String> {
        let trimmed = code.trim_end();
        if trimmed.ends_with(';') || trimmed.ends_with(',') {
            return None;
        }

        let first_word = code
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .find(|word| !word.is_empty())
            .unwrap_or_default();
        if CONTROL_KEYWORDS.contains(&first_word) {
            return None;
        }

        let name = match self.language {
            Language::JavaScript | Language::TypeScript => JS_CLASS_FIELD_ARROW
                .captures(code)
                .or_else(|| JS_METHOD.captures(code))
                .map(|cap| cap[1].to_string()),
            Language::Kotlin => KOTLIN_FUN.captures(code).map(|cap| cap[1].to_string()),
            _ => JVM_METHOD.captures(code).map(|cap| cap[1].to_string()),
        }?;

        (!CONTROL_KEYWORDS.contains(&name.as_str())).then_some(name)
    }

    fn detect_imports(&self, raw: &str, line_no: usize, imports: &mut Vec<ImportInfo>) {
        if self.language.is_ecmascript() {
            if let Some(cap) = JS_IMPORT_FROM.captures(raw) {
                imports.push(ImportInfo {
                    module: cap[2].to_string(),
                    items: split_bound_names(&cap[1]),
                    line: line_no,
                });
            } else if let Some(cap) = JS_IMPORT_BARE.captures(raw) {
                imports.push(ImportInfo {
                    module: cap[1].to_string(),
                    items: Vec::new(),
                    line: line_no,
                });
            } else {
                for cap in JS_REQUIRE.captures_iter(raw) {
                    imports.push(ImportInfo {
                        module: cap[2].to_string(),
                        items: cap
                            .get(1)
                            .map(|m| split_bound_names(m.as_str()))
                            .unwrap_or_default(),
                        line: line_no,
                    });
                }
            }
            return;
        }

        if self.language == Language::CSharp {
            if let Some(cap) = CSHARP_USING.captures(raw) {
                let module = cap[2].to_string();
                let item = cap
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .or_else(|| module.rsplit('.').next().map(str::to_string));
                imports.push(ImportInfo {
                    module,
                    items: item.into_iter().collect(),
                    line: line_no,
                });
            }
            return;
        }

        if let Some(cap) = JVM_IMPORT.captures(raw) {
            let module = cap[1].to_string();
            let item = cap
                .get(2)
                .map(|m| m.as_str().to_string())
                .or_else(|| module.rsplit('.').next().map(str::to_string));
            imports.push(ImportInfo {
                module,
                items: item.into_iter().collect(),
                line: line_no,
            });
        }
    }

    fn detect_exports(&self, raw: &str, line_no: usize, exports: &mut Vec<ExportInfo>) {
        if !self.language.is_ecmascript() {
            return;
        }

        let mut push = |name: &str, kind: &str| {
            exports.push(ExportInfo {
                name: name.to_string(),
                kind: kind.to_string(),
                line: line_no,
            });
        };

        if let Some(cap) = JS_EXPORT_DECL.captures(raw) {
            let kind = if cap.get(1).is_some() {
                "default"
            } else {
                cap[2].trim_end_matches('*')
            };
            push(&cap[3], kind);
        } else if let Some(cap) = JS_EXPORT_DEFAULT_NAME.captures(raw) {
            push(&cap[1], "default");
        } else if let Some(cap) = JS_EXPORT_LIST.captures(raw) {
            for name in split_bound_names(&cap[1]) {
                push(&name, "named");
            }
        } else if let Some(cap) = MODULE_EXPORTS.captures(raw) {
            if let Some(list) = cap.get(1) {
                // `{ a, b: impl }` exports the keys
                let keys = list
                    .as_str()
                    .split(',')
                    .filter_map(|entry| entry.split(':').next())
                    .map(str::trim)
                    .filter(|key| !key.is_empty());
                for key in keys {
                    push(key, "commonjs");
                }
            } else if let Some(name) = cap.get(2) {
                push(name.as_str(), "commonjs");
            }
        } else if let Some(cap) = EXPORTS_PROPERTY.captures(raw) {
            push(&cap[1], "commonjs");
        }
    }

    /// Public top-level types count as the exported surface of JVM and C# files
    fn is_exported_type(&self, raw: &str) -> bool {
        match self.language {
            Language::Java | Language::CSharp => raw.contains("public "),
            Language::Kotlin => !(raw.contains("private ") || raw.contains("internal ")),
            _ => false,
        }
    }
}

impl StructureScanner for CurlyBraceScanner {
    fn scan(&self, content: &str) -> StructuralInfo {
        let mut info = StructuralInfo::default();
        let mut stack: Vec<OpenBlock> = Vec::new();
        let mut depth = 0usize;
        let mut in_block_comment = false;
        let mut line_count = 0usize;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            line_count = line_no;

            let started_in_comment = in_block_comment;
            let code = strip_line(raw, &mut in_block_comment);
            let trimmed = raw.trim();
            let detectable = !started_in_comment
                && !code.trim().is_empty()
                && !self.is_comment_line(trimmed);

            if detectable {
                info.complexity += decision_points(&code);
                self.detect_imports(raw, line_no, &mut info.imports);
                self.detect_exports(raw, line_no, &mut info.exports);

                let in_class_body = stack.last().is_some_and(|top| {
                    top.block_type == BlockType::Class && top.entered && depth == top.depth + 1
                });

                let declaration = if let Some(cap) = CLASS_DECL.captures(&code) {
                    let name = cap[1].to_string();
                    let extends = cap
                        .get(2)
                        .or_else(|| cap.get(3))
                        .map(|m| m.as_str().to_string());
                    info.classes.push(ClassInfo {
                        name: name.clone(),
                        line: line_no,
                        extends,
                    });
                    if depth == 0 && self.is_exported_type(raw) {
                        info.exports.push(ExportInfo {
                            name: name.clone(),
                            kind: "class".to_string(),
                            line: line_no,
                        });
                    }
                    Some((BlockType::Class, name))
                } else if in_class_body {
                    self.detect_method(&code).map(|name| {
                        info.functions.push(FunctionInfo {
                            name: name.clone(),
                            line: line_no,
                            kind: FunctionKind::Method,
                        });
                        (BlockType::Function, name)
                    })
                } else if let Some((name, kind)) = self.detect_function(&code) {
                    info.functions.push(FunctionInfo {
                        name: name.clone(),
                        line: line_no,
                        kind,
                    });
                    Some((BlockType::Function, name))
                } else {
                    None
                };

                if let Some((block_type, name)) = declaration {
                    // A new declaration implicitly closes open blocks at the same or deeper nesting.
                    while stack.last().is_some_and(|top| top.depth >= depth) {
                        if let Some(open) = stack.pop() {
                            info.semantic_blocks.push(open.close(line_no - 1));
                        }
                    }
                    stack.push(OpenBlock {
                        block_type,
                        name,
                        start_line: line_no,
                        depth,
                        entered: false,
                    });
                }
            }

            for c in code.chars() {
                match c {
                    '{' => {
                        depth += 1;
                        if let Some(top) = stack.last_mut() {
                            if depth == top.depth + 1 {
                                top.entered = true;
                            }
                        }
                    }
                    '}' => {
                        depth = depth.saturating_sub(1);
                        while stack
                            .last()
                            .is_some_and(|top| top.entered && depth <= top.depth)
                        {
                            if let Some(open) = stack.pop() {
                                info.semantic_blocks.push(open.close(line_no));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        // Unterminated blocks close at end of file.
        while let Some(open) = stack.pop() {
            info.semantic_blocks.push(open.close(line_count));
        }

        info.semantic_blocks
            .sort_by(|a, b| a.start_line.cmp(&b.start_line).then(b.end_line.cmp(&a.end_line)));
        info
    }
}

/// Remove comments and the contents of string literals from one line.
///
/// Quotes are kept so declarations with default string arguments still match.
fn strip_line(line: &str, in_block_comment: &mut bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if *in_block_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                *in_block_comment = false;
            }
            continue;
        }

        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
                out.push(c);
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => break,
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                *in_block_comment = true;
            }
            _ => out.push(c),
        }
    }

    out
}
