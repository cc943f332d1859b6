//! Hunk matching
//!
//! Hunks are located by comparing their original-side lines with the file,
//! ignoring trailing whitespace, starting at the position named in the hunk
//! header and searching outwards up to [`FUZZ_LIMIT`] lines in each
//! direction. Hunks must match in ascending order without overlapping.
//! A hunk with less context after its changes than before them is pinned to
//! the end of the file, and one with less context before is pinned to the
//! start.

use super::{Hunk, PartKind};

/// How far a hunk may have moved from its header position
pub const FUZZ_LIMIT: isize = 20;

/// File contents split into lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub lines: Vec<String>,
    pub trailing_newline: bool,
}

impl TextFile {
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self {
                lines: Vec::new(),
                trailing_newline: true,
            };
        }
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        Self {
            lines: body.split('\n').map(str::to_string).collect(),
            trailing_newline,
        }
    }

    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            text.push('\n');
        }
        text
    }
}

/// Apply `hunks` to `text`.
///
/// On failure returns the index of the first hunk that could not be placed.
pub fn apply_hunks(text: &str, hunks: &[Hunk]) -> Result<String, usize> {
    let file = TextFile::parse(text);
    let mut output: Vec<String> = Vec::with_capacity(file.lines.len());
    let mut trailing_newline = file.trailing_newline;
    let mut cursor = 0usize;
    let mut drift: isize = 0;

    for (index, hunk) in hunks.iter().enumerate() {
        let expected = header_position(hunk) + drift;
        let original: Vec<&str> = hunk.original_lines().collect();
        let anchor = Anchor::of(hunk);
        let position =
            find_match(&file.lines, &original, expected, cursor, anchor).ok_or(index)?;

        drift = as_signed(position) - header_position(hunk);
        output.extend(file.lines[cursor..position].iter().cloned());

        // Context lines are copied from the file, not the hunk
        let mut line = position;
        for part in &hunk.parts {
            match part.kind {
                PartKind::Context => {
                    let end = line + part.lines.len();
                    output.extend(file.lines[line..end].iter().cloned());
                    line = end;
                }
                PartKind::Deletion => line += part.lines.len(),
                PartKind::Insertion => output.extend(part.lines.iter().cloned()),
            }
        }
        cursor = line;

        if hunk.original_ends_without_newline() || hunk.patched_ends_without_newline() {
            trailing_newline = !hunk.patched_ends_without_newline();
        }
    }

    output.extend(file.lines[cursor..].iter().cloned());
    Ok(TextFile {
        lines: output,
        trailing_newline,
    }
    .render())
}

/// 0-based index where the hunk's original lines start according to its header
fn header_position(hunk: &Hunk) -> isize {
    let start = as_signed(hunk.original.start);
    if hunk.original.len == 0 {
        start
    } else {
        start - 1
    }
}

fn as_signed(value: usize) -> isize {
    isize::try_from(value).unwrap_or(isize::MAX)
}

/// Offsets tried around the expected position: 0, -1, 1, -2, 2, ...
fn fuzz_offsets() -> impl Iterator<Item = isize> {
    std::iter::once(0).chain((1..=FUZZ_LIMIT).flat_map(|n| [-n, n]))
}

/// Where a hunk must sit, judged from its leading and trailing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Free,
    Start,
    End,
}

impl Anchor {
    fn of(hunk: &Hunk) -> Self {
        let context_len = |part: Option<&super::HunkPart>| {
            part.filter(|p| p.kind == PartKind::Context)
                .map_or(0, |p| p.lines.len())
        };
        let leading = context_len(hunk.parts.first());
        let trailing = context_len(hunk.parts.last());
        match leading.cmp(&trailing) {
            std::cmp::Ordering::Greater => Self::End,
            std::cmp::Ordering::Less => Self::Start,
            std::cmp::Ordering::Equal => Self::Free,
        }
    }

    fn allows(self, candidate: usize, len: usize, total: usize) -> bool {
        match self {
            Self::Free => true,
            Self::Start => candidate == 0,
            Self::End => candidate + len == total,
        }
    }
}

fn find_match(
    lines: &[String],
    original: &[&str],
    expected: isize,
    min: usize,
    anchor: Anchor,
) -> Option<usize> {
    fuzz_offsets().find_map(|offset| {
        let candidate = usize::try_from(expected + offset).ok()?;
        if candidate < min || candidate + original.len() > lines.len() {
            return None;
        }
        if !anchor.allows(candidate, original.len(), lines.len()) {
            return None;
        }
        let window = &lines[candidate..candidate + original.len()];
        window
            .iter()
            .zip(original)
            .all(|(actual, wanted)| lines_equal(actual, wanted))
            .then_some(candidate)
    })
}

fn lines_equal(actual: &str, wanted: &str) -> bool {
    actual.trim_end() == wanted.trim_end()
}
