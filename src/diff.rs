// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Unified diffs of printed sources.

use std::path::Path;

use similar::{ChangeTag, TextDiff};

/// Lines of unchanged context around each hunk.
const CONTEXT: usize = 3;

/// Generate a unified diff of one file, with `a/` and `b/` headers.
///
/// Returns an empty string when the texts are equal.
pub fn unified_diff(path: &Path, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }
    let diff = TextDiff::from_lines(before, after);
    let name = path.to_string_lossy().replace('\\', "/");
    let mut output = format!("--- a/{}\n+++ b/{}\n", name, name);

    for group in diff.grouped_ops(CONTEXT) {
        let Some(first) = group.first() else {
            continue;
        };
        let old_start = first.old_range().start;
        let new_start = first.new_range().start;
        let old_len: usize = group.iter().map(|op| op.old_range().len()).sum();
        let new_len: usize = group.iter().map(|op| op.new_range().len()).sum();
        output.push_str(&format!(
            "@@ -{} +{} @@\n",
            hunk_range(old_start, old_len),
            hunk_range(new_start, new_len)
        ));

        for op in &group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                output.push(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push_str("\n\\ No newline at end of file\n");
                }
            }
        }
    }
    output
}

/// `start,len` with a 1-based start; an empty range names the line before it.
fn hunk_range(start: usize, len: usize) -> String {
    if len == 0 {
        format!("{},0", start)
    } else {
        format!("{},{}", start + 1, len)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_texts_have_no_diff() {
        assert_eq!(unified_diff(Path::new("a.properties"), "a=1\n", "a=1\n"), "");
    }

    #[test]
    fn changed_line_is_shown_with_context() {
        let before = "a=1\nb=2\nc=3\n";
        let after = "a=1\nb=20\nc=3\n";
        let diff = unified_diff(Path::new("conf/app.properties"), before, after);
        assert_eq!(
            diff,
            "--- a/conf/app.properties\n+++ b/conf/app.properties\n@@ -1,3 +1,3 @@\n a=1\n-b=2\n+b=20\n c=3\n"
        );
    }

    #[test]
    fn appended_line_without_trailing_newline() {
        let diff = unified_diff(Path::new("a.properties"), "a=1\n", "a=1\nb=2");
        assert!(diff.contains("+b=2\n\\ No newline at end of file\n"));
        assert!(diff.contains("@@ -1,1 +1,2 @@"));
    }

    #[test]
    fn distant_changes_get_separate_hunks() {
        let before: String = (1..=20).map(|i| format!("k{}=v\n", i)).collect();
        let after = before.replace("k2=v", "k2=w").replace("k19=v", "k19=w");
        let diff = unified_diff(Path::new("a.properties"), &before, &after);
        assert_eq!(diff.matches("@@ -").count(), 2);
    }
}
