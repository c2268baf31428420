//! Scanner for indentation-delimited languages (Python).

use super::{decision_points, importance, indent_width, split_bound_names, StructureScanner};
use crate::types::{
    BlockType, ClassInfo, ExportInfo, FunctionInfo, FunctionKind, ImportInfo, SemanticBlock,
    StructuralInfo,
};
use once_cell::sync::Lazy;
use regex::Regex;

static DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").expect("valid regex literal")
});

static CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*class\s+([A-Za-z_]\w*)\s*(?:\(([^)]*)\))?\s*:").expect("valid regex literal")
});

static IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\s+(.+?)\s*$").expect("valid regex literal"));

static FROM_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*from\s+(\.*[\w.]*)\s+import\s+(.+?)\s*$").expect("valid regex literal")
});

static ALL_NAMES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"]([A-Za-z_]\w*)['"]"#).expect("valid regex literal"));

#[derive(Debug)]
struct OpenBlock {
    block_type: BlockType,
    name: String,
    start_line: usize,
    indent: usize,
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

/// Scanner for Python-style indentation blocks
pub struct IndentationScanner;

impl IndentationScanner {
    fn detect_imports(raw: &str, line_no: usize, imports: &mut Vec<ImportInfo>) {
        if let Some(cap) = FROM_IMPORT.captures(raw) {
            imports.push(ImportInfo {
                module: cap[1].to_string(),
                items: split_bound_names(cap[2].trim_end_matches('\\')),
                line: line_no,
            });
        } else if let Some(cap) = IMPORT.captures(raw) {
            for part in cap[1].split(',') {
                let part = part.trim();
                let (module, alias) = match part.split_once(" as ") {
                    Some((module, alias)) => (module.trim(), Some(alias.trim())),
                    None => (part, None),
                };
                if module.is_empty() {
                    continue;
                }
                let item = alias.or_else(|| module.rsplit('.').next()).unwrap_or(module);
                imports.push(ImportInfo {
                    module: module.to_string(),
                    items: vec![item.to_string()],
                    line: line_no,
                });
            }
        }
    }
}

impl StructureScanner for IndentationScanner {
    fn scan(&self, content: &str) -> StructuralInfo {
        let mut info = StructuralInfo::default();
        let mut stack: Vec<OpenBlock> = Vec::new();
        let mut docstring: Option<&'static str> = None;
        let mut last_code_line = 0usize;
        let mut all_names: Option<Vec<String>> = None;
        let mut top_level: Vec<ExportInfo> = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if let Some(delim) = docstring {
                if trimmed.contains(delim) {
                    docstring = None;
                }
                continue;
            }

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(delim) = ["\"\"\"", "'''"]
                .into_iter()
                .find(|delim| trimmed.starts_with(delim))
            {
                // A docstring opening without its closing delimiter spans several lines.
                if trimmed.matches(delim).count() == 1 {
                    docstring = Some(delim);
                }
                continue;
            }

            let indent = indent_width(raw);
            while stack.last().is_some_and(|top| indent <= top.indent) {
                if let Some(open) = stack.pop() {
                    info.semantic_blocks.push(open.close(last_code_line));
                }
            }

            let code = raw.split(" #").next().unwrap_or(raw);
            info.complexity += decision_points(code);
            Self::detect_imports(raw, line_no, &mut info.imports);

            if trimmed.starts_with("__all__") {
                all_names = Some(
                    ALL_NAMES
                        .captures_iter(trimmed)
                        .map(|cap| cap[1].to_string())
                        .collect(),
                );
            }

            if let Some(cap) = CLASS.captures(raw) {
                let name = cap[1].to_string();
                let extends = cap.get(2).and_then(|bases| {
                    bases
                        .as_str()
                        .split(',')
                        .map(str::trim)
                        .find(|base| !base.is_empty() && !base.contains('='))
                        .map(str::to_string)
                });
                info.classes.push(ClassInfo {
                    name: name.clone(),
                    line: line_no,
                    extends,
                });
                if indent == 0 {
                    top_level.push(ExportInfo {
                        name: name.clone(),
                        kind: "class".to_string(),
                        line: line_no,
                    });
                }
                stack.push(OpenBlock {
                    block_type: BlockType::Class,
                    name,
                    start_line: line_no,
                    indent,
                });
            } else if let Some(cap) = DEF.captures(raw) {
                let name = cap[1].to_string();
                let kind = if stack
                    .last()
                    .is_some_and(|top| top.block_type == BlockType::Class)
                {
                    FunctionKind::Method
                } else {
                    FunctionKind::Function
                };
                info.functions.push(FunctionInfo {
                    name: name.clone(),
                    line: line_no,
                    kind,
                });
                if indent == 0 {
                    top_level.push(ExportInfo {
                        name: name.clone(),
                        kind: "function".to_string(),
                        line: line_no,
                    });
                }
                stack.push(OpenBlock {
                    block_type: BlockType::Function,
                    name,
                    start_line: line_no,
                    indent,
                });
            }

            last_code_line = line_no;
        }

        while let Some(open) = stack.pop() {
            info.semantic_blocks.push(open.close(last_code_line));
        }

        info.exports = match all_names {
            Some(names) => names
                .into_iter()
                .map(|name| ExportInfo {
                    line: top_level
                        .iter()
                        .find(|export| export.name == name)
                        .map_or(0, |export| export.line),
                    name,
                    kind: "__all__".to_string(),
                })
                .collect(),
            None => top_level
                .into_iter()
                .filter(|export| !export.name.starts_with('_'))
                .collect(),
        };

        info.semantic_blocks
            .sort_by(|a, b| a.start_line.cmp(&b.start_line).then(b.end_line.cmp(&a.end_line)));
        info
    }
}
