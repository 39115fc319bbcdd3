//! Python analyzer using tree-sitter.
//!
//! The source is only parsed, never evaluated. Tree-sitter recovers from
//! malformed input by inserting ERROR and MISSING nodes; any such node, or a
//! Python 2 `print`/`exec` statement the grammar still accepts, makes the
//! whole file count as unparsable.

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, Tree};

use super::lines::scan_lines;
use super::{read_source, AnalyzeError};
use crate::metrics::{Counts, FileMetrics};

/// Tree-sitter query for definitions.
///
/// `function_definition` covers plain and `async` functions, methods and
/// nested functions; `async` ones are filtered out after matching.
/// Decorators live on the enclosing `decorated_definition`, so captured
/// spans start at the `def` line.
const DEFINITION_QUERY: &str = r#"
(function_definition) @function
(class_definition) @class
"#;

/// Statements the grammar still accepts for Python 2 sources.
const LEGACY_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

/// Extras that may trail the last statement of a block.
const TRAILING_EXTRAS: &[&str] = &["comment", "line_continuation"];

/// Structural counts taken from the syntax tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefinitionStats {
    pub functions: u64,
    pub classes: u64,
    pub function_lines: u64,
    pub docs_lines: u64,
}

pub struct PythonAnalyzer {
    language: Language,
    definitions: Query,
}

impl PythonAnalyzer {
    pub fn new() -> Result<Self, AnalyzeError> {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let definitions = Query::new(&language, DEFINITION_QUERY)?;
        Ok(Self {
            language,
            definitions,
        })
    }

    fn create_parser(&self) -> Result<Parser, AnalyzeError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Parse source into a tree, rejecting trees with syntax errors.
    pub fn parse(&self, source: &str) -> Result<Tree, AnalyzeError> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or(AnalyzeError::NoTree)?;

        if let Some(node) = first_syntax_error(tree.root_node()) {
            let pos = node.start_position();
            return Err(AnalyzeError::Syntax {
                line: pos.row + 1,
                column: pos.column + 1,
            });
        }

        Ok(tree)
    }

    /// Count definitions, their line spans and docstring lines.
    pub fn definition_stats(&self, source: &str) -> Result<DefinitionStats, AnalyzeError> {
        let tree = self.parse(source)?;
        let names = self.definitions.capture_names();

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.definitions, tree.root_node(), source.as_bytes());

        let mut stats = DefinitionStats::default();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                match names[capture.index as usize] {
                    "function" if is_async(node) => continue,
                    "function" => {
                        stats.functions += 1;
                        stats.function_lines += span_lines(node);
                    }
                    "class" => stats.classes += 1,
                    _ => continue,
                }
                stats.docs_lines += docstring_lines(node, source);
            }
        }

        Ok(stats)
    }

    /// Produce metrics for one file's content. Never fails; errors are
    /// carried in the returned record.
    pub fn analyze(&self, source: &str) -> FileMetrics {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let lines = scan_lines(source);

        match self.definition_stats(source) {
            Ok(defs) => FileMetrics::ok(Counts {
                num_functions: defs.functions,
                num_classes: defs.classes,
                total_lines: lines.total,
                empty_lines: lines.empty,
                comment_lines: lines.comment,
                docs_lines: defs.docs_lines,
                function_lines: defs.function_lines,
            }),
            Err(e) => FileMetrics::failed(e.to_string()),
        }
    }

    /// Read and analyze a file, capturing read failures in the record.
    pub fn analyze_file(&self, path: &Path, max_file_size: u64) -> FileMetrics {
        match read_source(path, max_file_size) {
            Ok(source) => self.analyze(&source),
            Err(e) => FileMetrics::failed(e.to_string()),
        }
    }
}

/// Find the first ERROR, MISSING or Python 2 statement node in document order.
fn first_syntax_error(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() || LEGACY_STATEMENTS.contains(&node.kind()) {
            return Some(node);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return root.has_error().then_some(root);
            }
        }
    }
}

fn is_async(function: Node) -> bool {
    function.child(0).is_some_and(|first| first.kind() == "async")
}

/// Inclusive line count from a definition's first line to its last
/// statement. Trailing comments inside the body are not part of the span.
fn span_lines(node: Node) -> u64 {
    let start = node.start_position().row;
    let end = last_code_row(node).max(start);
    (end - start + 1) as u64
}

/// Row of the last code token under `node`, descending through blocks,
/// clauses and decorated definitions.
fn last_code_row(node: Node) -> usize {
    let mut cursor = node.walk();
    let last = node
        .named_children(&mut cursor)
        .filter(|child| !TRAILING_EXTRAS.contains(&child.kind()))
        .last();

    match last {
        Some(child)
            if matches!(node.kind(), "block" | "decorated_definition")
                || child.kind() == "block"
                || child.kind().ends_with("_clause") =>
        {
            last_code_row(child)
        }
        _ => end_row(node),
    }
}

fn end_row(node: Node) -> usize {
    let start = node.start_position().row;
    let end = node.end_position();
    // A node ending at column 0 stops at the previous line's newline.
    if end.column == 0 && end.row > start {
        end.row - 1
    } else {
        end.row
    }
}

fn docstring_lines(definition: Node, source: &str) -> u64 {
    docstring(definition, source)
        .map(|text| cleaned_line_count(&text))
        .unwrap_or(0)
}

/// Raw docstring of a function or class: the first body statement when it is
/// a lone plain string literal.
fn docstring(definition: Node, source: &str) -> Option<String> {
    let body = definition.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let expr = first.named_child(0)?;
    match expr.kind() {
        "string" => string_value(expr, source),
        "concatenated_string" => {
            let mut cursor = expr.walk();
            let mut text = String::new();
            for part in expr
                .named_children(&mut cursor)
                .filter(|n| n.kind() == "string")
            {
                text.push_str(&string_value(part, source)?);
            }
            Some(text)
        }
        _ => None,
    }
}

/// Value of a string literal as far as line structure goes. f-strings and
/// bytes are not docstrings.
fn string_value(string: Node, source: &str) -> Option<String> {
    let mut cursor = string.walk();
    let children: Vec<Node> = string.children(&mut cursor).collect();
    let start = children.iter().find(|n| n.kind() == "string_start")?;
    let end = children.iter().rev().find(|n| n.kind() == "string_end")?;

    let prefix = source.get(start.start_byte()..start.end_byte())?;
    if prefix
        .chars()
        .any(|c| matches!(c, 'b' | 'B' | 'f' | 'F'))
    {
        return None;
    }

    let raw = source.get(start.end_byte()..end.start_byte())?;
    if prefix.chars().any(|c| matches!(c, 'r' | 'R')) {
        Some(raw.to_string())
    } else {
        Some(unescape_line_breaks(raw))
    }
}

/// Apply the escapes that change line structure: `\n` becomes a newline and
/// a backslash-newline continuation is removed. Other escapes stay verbatim.
fn unescape_line_breaks(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('\n') => {}
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
            None => text.push('\\'),
        }
    }
    text
}

/// Line count after dropping leading and trailing blank lines.
fn cleaned_line_count(text: &str) -> u64 {
    let lines: Vec<&str> = text.split('\n').collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => (last - first + 1) as u64,
        _ => 0,
    }
}
