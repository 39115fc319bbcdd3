//! Raw line classification, independent of the syntax tree.

/// Python line-comment marker.
pub const COMMENT_MARKER: char = '#';

/// Line counts from a plain text scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub total: u64,
    pub empty: u64,
    pub comment: u64,
}

/// Classify every physical line of `source`.
///
/// Lines are split on `\n`, so a trailing newline yields a final empty line.
/// A line is empty when it is whitespace only, and a comment line when its
/// stripped form starts with `#`.
pub fn scan_lines(source: &str) -> LineStats {
    let mut stats = LineStats::default();

    for line in source.split('\n') {
        stats.total += 1;
        let stripped = line.trim();
        if stripped.is_empty() {
            stats.empty += 1;
        } else if stripped.starts_with(COMMENT_MARKER) {
            stats.comment += 1;
        }
    }

    stats
}
