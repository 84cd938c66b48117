//! Line-level diff: comparison of two rendered configuration texts.
//!
//! Uses the `similar` crate (Myers diff algorithm) to produce structured
//! hunks with context lines, and renders them in unified-diff form.

use std::fmt::Write as _;

use similar::{ChangeTag, TextDiff};

/// Context lines kept around each change.
pub const CONTEXT_LINES: usize = 3;

const NO_NEWLINE: &str = " No newline at end of file";

/// The result of diffing two texts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentDiff {
    /// The diff hunks.
    pub hunks: Vec<DiffHunk>,
    /// Total number of lines in the old content.
    pub old_lines: usize,
    /// Total number of lines in the new content.
    pub new_lines: usize,
}

impl ContentDiff {
    /// Returns `true` if the two texts are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total number of lines added across all hunks.
    pub fn additions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    /// Total number of lines removed across all hunks.
    pub fn deletions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    /// Render the hunks in unified-diff form (`@@ -a,b +c,d @@` headers,
    /// then ` `, `-` and `+` prefixed lines, and `\ No newline at end of file`
    /// after a last line without one). Identical texts render as an empty
    /// string.
    pub fn unified(&self) -> String {
        let mut out = String::new();
        for hunk in &self.hunks {
            let _ = writeln!(
                out,
                "@@ -{},{} +{},{} @@",
                hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
            );
            for line in &hunk.lines {
                let (prefix, text) = match line {
                    DiffLine::Context(t) => (' ', t.as_str()),
                    DiffLine::Added(t) => ('+', t.as_str()),
                    DiffLine::Removed(t) => ('-', t.as_str()),
                    DiffLine::NoNewlineAtEof => ('\\', NO_NEWLINE),
                };
                out.push(prefix);
                out.push_str(text);
                out.push('\n');
            }
        }
        out
    }
}

/// A contiguous region of changes in a diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    /// Line number in the old content where this hunk starts (1-based, or the
    /// line before the hunk when it covers no old lines).
    pub old_start: usize,
    /// Number of lines from the old content in this hunk.
    pub old_count: usize,
    /// Line number in the new content where this hunk starts.
    pub new_start: usize,
    /// Number of lines from the new content in this hunk.
    pub new_count: usize,
    /// The individual diff lines in this hunk.
    pub lines: Vec<DiffLine>,
}

/// A single line in a diff hunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    /// A line present in both old and new (context).
    Context(String),
    /// A line added in the new content.
    Added(String),
    /// A line removed from the old content.
    Removed(String),
    /// The preceding line is the last of its side and has no trailing newline.
    NoNewlineAtEof,
}

/// Compute a line-by-line diff between two texts.
pub fn diff_contents(old: &str, new: &str) -> ContentDiff {
    let old_lines = old.lines().count();
    let new_lines = new.lines().count();

    if old == new {
        return ContentDiff {
            hunks: Vec::new(),
            old_lines,
            new_lines,
        };
    }

    let text_diff = TextDiff::from_lines(old, new);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(CONTEXT_LINES) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_range = first.old_range().start..last.old_range().end;
        let new_range = first.new_range().start..last.new_range().end;

        let mut lines = Vec::new();
        for op in &group {
            for change in text_diff.iter_changes(op) {
                let value = change.value();
                let text = value.strip_suffix('\n').unwrap_or(value).to_string();
                lines.push(match change.tag() {
                    ChangeTag::Equal => DiffLine::Context(text),
                    ChangeTag::Delete => DiffLine::Removed(text),
                    ChangeTag::Insert => DiffLine::Added(text),
                });
                if !value.ends_with('\n') {
                    lines.push(DiffLine::NoNewlineAtEof);
                }
            }
        }

        hunks.push(DiffHunk {
            old_start: hunk_start(old_range.start, old_range.len()),
            old_count: old_range.len(),
            new_start: hunk_start(new_range.start, new_range.len()),
            new_count: new_range.len(),
            lines,
        });
    }

    ContentDiff {
        hunks,
        old_lines,
        new_lines,
    }
}

fn hunk_start(zero_based: usize, count: usize) -> usize {
    if count == 0 {
        zero_based
    } else {
        zero_based + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_no_diff() {
        let content = "hello\nworld\n";
        let diff = diff_contents(content, content);
        assert!(diff.is_empty());
        assert_eq!(diff.unified(), "");
    }

    #[test]
    fn parameter_change_is_one_line_swap() {
        let diff = diff_contents("image: app:1.0\n", "image: app:2.0\n");
        assert_eq!(diff.additions(), 1);
        assert_eq!(diff.deletions(), 1);
        assert_eq!(
            diff.unified(),
            "@@ -1,1 +1,1 @@\n-image: app:1.0\n+image: app:2.0\n"
        );
    }

    #[test]
    fn empty_to_content() {
        let diff = diff_contents("", "a\nb\n");
        assert_eq!(diff.additions(), 2);
        assert_eq!(diff.unified(), "@@ -0,0 +1,2 @@\n+a\n+b\n");
    }

    #[test]
    fn content_to_empty() {
        let diff = diff_contents("a\nb\n", "");
        assert_eq!(diff.deletions(), 2);
        assert_eq!(diff.unified(), "@@ -1,2 +0,0 @@\n-a\n-b\n");
    }

    #[test]
    fn context_lines_present() {
        let old = "a\nb\nc\nd\ne\nf\ng\nh\ni\nj\n";
        let new = "a\nb\nc\nd\nX\nf\ng\nh\ni\nj\n";

        let diff = diff_contents(old, new);
        let hunk = &diff.hunks[0];
        assert_eq!(hunk.old_start, 2);
        assert_eq!(hunk.old_count, 7);
        assert_eq!(hunk.new_count, 7);
        let context = hunk
            .lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Context(_)))
            .count();
        assert_eq!(context, 6);
    }

    #[test]
    fn distant_changes_split_into_hunks() {
        let old: String = (0..30).map(|i| format!("line{i}\n")).collect();
        let new = old.replace("line2\n", "two\n").replace("line27\n", "twenty-seven\n");

        let diff = diff_contents(&old, &new);
        assert_eq!(diff.hunks.len(), 2);
        assert_eq!(diff.old_lines, 30);
        assert_eq!(diff.new_lines, 30);
    }

    #[test]
    fn missing_trailing_newline_still_diffs() {
        let diff = diff_contents("a\nb", "a\nc");
        assert_eq!(diff.additions(), 1);
        assert_eq!(diff.deletions(), 1);
        assert_eq!(
            diff.unified(),
            "@@ -1,2 +1,2 @@\n a\n-b\n\\ No newline at end of file\n+c\n\\ No newline at end of file\n"
        );
    }

    #[test]
    fn trailing_newline_change_is_marked() {
        let diff = diff_contents("a", "a\n");
        assert_eq!(
            diff.unified(),
            "@@ -1,1 +1,1 @@\n-a\n\\ No newline at end of file\n+a\n"
        );

        let diff = diff_contents("a\n", "a");
        assert_eq!(
            diff.unified(),
            "@@ -1,1 +1,1 @@\n-a\n+a\n\\ No newline at end of file\n"
        );
    }
}
