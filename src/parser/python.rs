// Python source comments using tree-sitter
//
// Recovers the comment block written directly above a definition, or at
// the top of a module, for objects that carry no docstring.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Parser for Python source files
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::Parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse a Python file and index its comments
    pub fn parse_file(&mut self, path: &Path) -> Result<SourceComments> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))))?;
        self.parse_source(&source)
    }

    /// Parse Python source and index its comments
    pub fn parse_source(&mut self, source: &str) -> Result<SourceComments> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parser("Failed to parse source"))?;

        let mut comments = SourceComments {
            indents: source.lines().map(indent_size).collect(),
            ..SourceComments::default()
        };
        collect(&tree.root_node(), source.as_bytes(), &mut comments);
        Ok(comments)
    }
}

/// A full-line comment
#[derive(Debug, Clone, PartialEq, Eq)]
struct Comment {
    column: usize,
    text: String,
}

/// Full-line comments of one source file, by 0-based row
#[derive(Debug, Clone, Default)]
pub struct SourceComments {
    comments: BTreeMap<usize, Comment>,
    /// Indentation width of every line, tabs expanded
    indents: Vec<usize>,
    /// Row of the first statement of the module
    first_statement: Option<usize>,
}

impl SourceComments {
    /// Comment block at the top of the module, skipping a `#!` line
    pub fn header(&self) -> Option<String> {
        let mut block = Vec::new();
        let mut expected = None;
        for (&row, comment) in &self.comments {
            if self.first_statement.is_some_and(|first| row >= first) {
                break;
            }
            if row == 0 && comment.text.starts_with("#!") {
                continue;
            }
            if comment.column != 0 {
                break;
            }
            match expected {
                Some(next) if next != row => break,
                _ => {}
            }
            block.push(comment.text.as_str());
            expected = Some(row + 1);
        }
        join_block(block)
    }

    /// Comment lines directly above the definition on 1-based `line`,
    /// indented like the definition
    pub fn preceding(&self, line: usize) -> Option<String> {
        let row = line.checked_sub(1)?;
        let indent = *self.indents.get(row)?;

        let mut block = Vec::new();
        let mut current = row;
        while current > 0 {
            current -= 1;
            match self.comments.get(&current) {
                Some(comment) if comment.column == indent => block.push(comment.text.as_str()),
                _ => break,
            }
        }
        block.reverse();
        join_block(block)
    }
}

/// Drop bare `#` lines at either end and join the rest
fn join_block(mut block: Vec<&str>) -> Option<String> {
    while block.first().is_some_and(|line| line.trim() == "#") {
        block.remove(0);
    }
    while block.last().is_some_and(|line| line.trim() == "#") {
        block.pop();
    }
    if block.is_empty() {
        None
    } else {
        Some(block.join("\n"))
    }
}

fn indent_size(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

fn collect(node: &Node, source: &[u8], out: &mut SourceComments) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "comment" {
            let row = child.start_position().row;
            let column = child.start_position().column;
            // Trailing comments share a line with code
            if out.indents.get(row) == Some(&column) {
                if let Ok(text) = child.utf8_text(source) {
                    out.comments.insert(
                        row,
                        Comment {
                            column,
                            text: text.trim_end().to_string(),
                        },
                    );
                }
            }
        } else {
            if node.kind() == "module" && out.first_statement.is_none() {
                out.first_statement = Some(child.start_position().row);
            }
            collect(&child, source, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SourceComments {
        PythonParser::new().unwrap().parse_source(source).unwrap()
    }

    #[test]
    fn test_parser_new() {
        assert!(PythonParser::new().is_ok());
    }

    #[test]
    fn test_module_header() {
        let comments = parse("#!/usr/bin/env python\n# Shapes.\n# Second line.\n\n# detached\nimport os\n");
        assert_eq!(comments.header(), Some("# Shapes.\n# Second line.".to_string()));
    }

    #[test]
    fn test_no_header_after_code() {
        let comments = parse("import os\n# not a header\n");
        assert_eq!(comments.header(), None);
    }

    #[test]
    fn test_preceding_comment_of_function() {
        let source = "import os\n\n# Compute things.\n# Quickly.\ndef f():\n    pass\n";
        let comments = parse(source);
        assert_eq!(comments.preceding(5), Some("# Compute things.\n# Quickly.".to_string()));
    }

    #[test]
    fn test_preceding_comment_respects_indent() {
        let source = "class C:\n    # Method comment.\n    def m(self):\n        pass\n# outer\n    \n";
        let comments = parse(source);
        assert_eq!(comments.preceding(3), Some("# Method comment.".to_string()));
        assert_eq!(comments.preceding(1), None);
    }

    #[test]
    fn test_blank_line_breaks_block() {
        let source = "# far away\n\ndef f():\n    pass\n";
        assert_eq!(parse(source).preceding(3), None);
    }

    #[test]
    fn test_trailing_comment_is_ignored() {
        let source = "x = 1  # trailing\ndef f():\n    pass\n";
        assert_eq!(parse(source).preceding(2), None);
    }

    #[test]
    fn test_bare_hash_lines_trimmed() {
        let source = "#\n# Body.\n#\ndef f():\n    pass\n";
        assert_eq!(parse(source).preceding(4), Some("# Body.".to_string()));
    }

    #[test]
    fn test_parse_file_missing() {
        let mut parser = PythonParser::new().unwrap();
        assert!(parser.parse_file(Path::new("/nonexistent/mod.py")).is_err());
    }
}
