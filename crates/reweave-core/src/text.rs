// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Text utilities shared by parsers and recipes.
//!
//! - Lines and columns are **1-indexed**, byte offsets **0-indexed**
//! - Columns count bytes

use crate::marker::SourcePosition;

/// Precomputed line starts for fast offset to position conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex { line_starts }
    }

    /// 1-indexed `(line, column)` of a byte offset.
    pub fn position(&self, offset: usize) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[line];
        (line as u32 + 1, column as u32 + 1)
    }

    /// A [`SourcePosition`] marker for a byte offset.
    pub fn source_position(&self, offset: usize) -> SourcePosition {
        let (line, column) = self.position(offset);
        SourcePosition {
            offset,
            line,
            column,
        }
    }
}

/// Remove the common leading indentation from every line, and a leading and
/// trailing blank line.
///
/// Blank lines do not count towards the common indentation.
pub fn trim_indent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = usize::from(lines.first().is_some_and(|l| l.trim().is_empty()));
    let end = if lines.len() > start && lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.len() - 1
    } else {
        lines.len()
    };
    let lines = &lines[start..end];

    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| if l.len() >= indent { &l[indent..] } else { l.trim_start() })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions() {
        let index = LineIndex::new("ab\ncd\n\nx");
        assert_eq!(index.position(0), (1, 1));
        assert_eq!(index.position(1), (1, 2));
        assert_eq!(index.position(3), (2, 1));
        assert_eq!(index.position(6), (3, 1));
        assert_eq!(index.position(7), (4, 1));
    }

    #[test]
    fn source_position_marker() {
        let index = LineIndex::new("a\n  b");
        let pos = index.source_position(4);
        assert_eq!((pos.line, pos.column, pos.offset), (2, 3, 4));
    }

    #[test]
    fn trim_indent_removes_common_prefix() {
        let text = "\n    a.setFoo(\"foo\");\n        .x\n";
        assert_eq!(trim_indent(text), "a.setFoo(\"foo\");\n    .x");
    }

    #[test]
    fn trim_indent_ignores_blank_lines() {
        assert_eq!(trim_indent("  a\n\n  b"), "a\n\nb");
        assert_eq!(trim_indent("a"), "a");
        assert_eq!(trim_indent(""), "");
    }
}
