//! Unified diff parsing
//!
//! Understands the subset of `git diff` output that describes text changes:
//! file headers, mode changes, renames, creations, deletions and hunks.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use super::{Effect, Hunk, HunkPart, LineRange, PartKind};

/// A patch file that is not a well-formed diff
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct PatchSyntaxError {
    pub line: usize,
    pub message: String,
}

impl PatchSyntaxError {
    fn new(line_index: usize, message: impl Into<String>) -> Self {
        Self {
            line: line_index + 1,
            message: message.into(),
        }
    }
}

/// One side of a `---`/`+++` header
#[derive(Debug, Clone, PartialEq, Eq)]
enum DiffPath {
    DevNull,
    File(String),
}

/// Everything collected about one file before turning it into effects
#[derive(Debug, Default)]
struct FileSection {
    start_line: usize,
    git_paths: Option<(String, String)>,
    old_path: Option<DiffPath>,
    new_path: Option<DiffPath>,
    old_mode: Option<u32>,
    new_mode: Option<u32>,
    new_file_mode: Option<u32>,
    deleted_file_mode: Option<u32>,
    rename_from: Option<String>,
    rename_to: Option<String>,
    hunks: Vec<Hunk>,
}

/// Parse diff text into the ordered effects it describes
pub fn parse_patch(text: &str) -> Result<Vec<Effect>, PatchSyntaxError> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }

    let mut sections: Vec<FileSection> = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx].trim_end_matches('\r');

        if let Some(rest) = line.strip_prefix("diff --git ") {
            sections.push(FileSection {
                start_line: idx,
                git_paths: parse_git_header(rest),
                ..FileSection::default()
            });
        } else if line.starts_with("@@") {
            let section = sections
                .last_mut()
                .ok_or_else(|| PatchSyntaxError::new(idx, "hunk found before any file header"))?;
            let (hunk, next) = parse_hunk(&lines, idx)?;
            section.hunks.push(hunk);
            idx = next;
            continue;
        } else if let Some(rest) = line.strip_prefix("--- ") {
            let starts_new_file = sections
                .last()
                .is_none_or(|s| !s.hunks.is_empty() || s.old_path.is_some());
            if starts_new_file {
                sections.push(FileSection {
                    start_line: idx,
                    ..FileSection::default()
                });
            }
            if let Some(section) = sections.last_mut() {
                section.old_path = Some(parse_diff_path(rest));
            }
        } else if let Some(section) = sections.last_mut() {
            parse_extended_header(section, line, idx)?;
        }

        idx += 1;
    }

    if sections.is_empty() {
        return Err(PatchSyntaxError::new(0, "no file changes found"));
    }

    let mut effects = Vec::new();
    for section in sections {
        effects.extend(section_effects(section)?);
    }
    Ok(effects)
}

fn parse_extended_header(
    section: &mut FileSection,
    line: &str,
    idx: usize,
) -> Result<(), PatchSyntaxError> {
    if let Some(rest) = line.strip_prefix("+++ ") {
        section.new_path = Some(parse_diff_path(rest));
    } else if let Some(rest) = line.strip_prefix("new file mode ") {
        section.new_file_mode = Some(parse_mode(rest, idx)?);
    } else if let Some(rest) = line.strip_prefix("deleted file mode ") {
        section.deleted_file_mode = Some(parse_mode(rest, idx)?);
    } else if let Some(rest) = line.strip_prefix("old mode ") {
        section.old_mode = Some(parse_mode(rest, idx)?);
    } else if let Some(rest) = line.strip_prefix("new mode ") {
        section.new_mode = Some(parse_mode(rest, idx)?);
    } else if let Some(rest) = line.strip_prefix("rename from ") {
        section.rename_from = Some(rest.to_string());
    } else if let Some(rest) = line.strip_prefix("rename to ") {
        section.rename_to = Some(rest.to_string());
    } else if line.starts_with("GIT binary patch") || line.starts_with("Binary files ") {
        return Err(PatchSyntaxError::new(idx, "binary patches are not supported"));
    }
    // `index`, `similarity index` and free-form text carry nothing we need
    Ok(())
}

/// `a/x b/y` -> `("x", "y")`
fn parse_git_header(rest: &str) -> Option<(String, String)> {
    let split = rest.rfind(" b/")?;
    let from = rest[..split].strip_prefix("a/")?;
    let to = &rest[split + 3..];
    Some((from.to_string(), to.to_string()))
}

fn parse_diff_path(rest: &str) -> DiffPath {
    // Some tools append a tab and a timestamp
    let path = rest.split('\t').next().unwrap_or(rest).trim_end();
    if path == "/dev/null" {
        return DiffPath::DevNull;
    }
    let path = path
        .strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path);
    DiffPath::File(path.to_string())
}

fn parse_mode(text: &str, idx: usize) -> Result<u32, PatchSyntaxError> {
    u32::from_str_radix(text.trim(), 8)
        .map_err(|_| PatchSyntaxError::new(idx, format!("invalid file mode '{}'", text.trim())))
}

/// `-12,3` or `+7` -> range
fn parse_range(text: &str, sign: char) -> Option<LineRange> {
    let text = text.strip_prefix(sign)?;
    let (start, len) = match text.split_once(',') {
        Some((start, len)) => (start.parse().ok()?, len.parse().ok()?),
        None => (text.parse().ok()?, 1),
    };
    Some(LineRange { start, len })
}

fn parse_hunk_header(line: &str) -> Option<(LineRange, LineRange)> {
    let body = line.strip_prefix("@@ ")?;
    let (ranges, _) = body.split_once(" @@")?;
    let (original, patched) = ranges.split_once(' ')?;
    Some((parse_range(original, '-')?, parse_range(patched, '+')?))
}

/// Parse the hunk starting at `start`; returns the hunk and the index of the
/// first line after it.
fn parse_hunk(lines: &[&str], start: usize) -> Result<(Hunk, usize), PatchSyntaxError> {
    let header = lines[start].trim_end_matches('\r');
    let (original, patched) = parse_hunk_header(header)
        .ok_or_else(|| PatchSyntaxError::new(start, format!("invalid hunk header '{header}'")))?;

    let mut remaining_original = original.len;
    let mut remaining_patched = patched.len;
    let mut parts: Vec<HunkPart> = Vec::new();
    let mut split_next = false;
    let mut idx = start + 1;

    while idx < lines.len() && (remaining_original > 0 || remaining_patched > 0) {
        let line = lines[idx];
        if line.starts_with('\\') {
            mark_no_newline(&mut parts, idx)?;
            split_next = true;
            idx += 1;
            continue;
        }

        let (kind, content) = match line.chars().next() {
            Some(' ') => (PartKind::Context, &line[1..]),
            Some('-') => (PartKind::Deletion, &line[1..]),
            Some('+') => (PartKind::Insertion, &line[1..]),
            // Editors sometimes strip the single space of an empty context line
            None => (PartKind::Context, ""),
            Some(_) => break,
        };

        let (uses_original, uses_patched) = match kind {
            PartKind::Context => (true, true),
            PartKind::Deletion => (true, false),
            PartKind::Insertion => (false, true),
        };
        if (uses_original && remaining_original == 0) || (uses_patched && remaining_patched == 0) {
            break;
        }
        if uses_original {
            remaining_original -= 1;
        }
        if uses_patched {
            remaining_patched -= 1;
        }

        match parts.last_mut() {
            Some(part) if part.kind == kind && !split_next => part.lines.push(content.to_string()),
            _ => parts.push(HunkPart {
                kind,
                lines: vec![content.to_string()],
                no_newline_at_end_of_file: false,
            }),
        }
        split_next = false;
        idx += 1;
    }

    if remaining_original > 0 || remaining_patched > 0 {
        return Err(PatchSyntaxError::new(
            start,
            "hunk header integrity check failed: line counts do not match the hunk body",
        ));
    }

    while idx < lines.len() && lines[idx].starts_with('\\') {
        mark_no_newline(&mut parts, idx)?;
        idx += 1;
    }

    Ok((
        Hunk {
            original,
            patched,
            parts,
        },
        idx,
    ))
}

fn mark_no_newline(parts: &mut [HunkPart], idx: usize) -> Result<(), PatchSyntaxError> {
    let part = parts.last_mut().ok_or_else(|| {
        PatchSyntaxError::new(idx, "'No newline at end of file' marker without a preceding line")
    })?;
    part.no_newline_at_end_of_file = true;
    Ok(())
}

fn section_effects(section: FileSection) -> Result<Vec<Effect>, PatchSyntaxError> {
    let (git_from, git_to) = match section.git_paths.clone() {
        Some((from, to)) => (Some(from), Some(to)),
        None => (None, None),
    };
    let old_file = match &section.old_path {
        Some(DiffPath::File(path)) => Some(path.clone()),
        _ => git_from,
    };
    let new_file = match &section.new_path {
        Some(DiffPath::File(path)) => Some(path.clone()),
        _ => git_to,
    };
    let missing_path = || PatchSyntaxError::new(section.start_line, "file section has no path");
    let line = section.start_line;

    let is_deletion = section.deleted_file_mode.is_some()
        || section.new_path == Some(DiffPath::DevNull);
    let is_creation =
        section.new_file_mode.is_some() || section.old_path == Some(DiffPath::DevNull);

    if is_deletion {
        let path = old_file.ok_or_else(missing_path)?;
        let hunk = single_hunk(section.hunks, PartKind::Deletion, section.start_line)?;
        return Ok(vec![Effect::FileDeletion {
            path: relative_path(&path, line)?,
            mode: section.deleted_file_mode,
            hunk,
        }]);
    }

    if is_creation {
        let path = new_file.ok_or_else(missing_path)?;
        let hunk = single_hunk(section.hunks, PartKind::Insertion, section.start_line)?;
        return Ok(vec![Effect::FileCreation {
            path: relative_path(&path, line)?,
            mode: section.new_file_mode,
            hunk,
        }]);
    }

    let mut effects = Vec::new();
    let target = match (section.rename_from, section.rename_to) {
        (Some(from), Some(to)) => {
            effects.push(Effect::Rename {
                from: relative_path(&from, line)?,
                to: relative_path(&to, line)?,
            });
            Some(to)
        }
        _ => new_file.or(old_file),
    };
    let target = target.ok_or_else(missing_path)?;

    if let (Some(old_mode), Some(new_mode)) = (section.old_mode, section.new_mode) {
        effects.push(Effect::ModeChange {
            path: relative_path(&target, line)?,
            old_mode,
            new_mode,
        });
    }

    if !section.hunks.is_empty() {
        effects.push(Effect::Patch {
            path: relative_path(&target, line)?,
            hunks: section.hunks,
        });
    }

    if effects.is_empty() {
        return Err(PatchSyntaxError::new(
            section.start_line,
            format!("no changes found for {target}"),
        ));
    }
    Ok(effects)
}

/// A diff path that stays inside the directory the patch is applied to
fn relative_path(path: &str, line: usize) -> Result<PathBuf, PatchSyntaxError> {
    let escapes = Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || path.is_empty() {
        return Err(PatchSyntaxError::new(
            line,
            format!("path '{path}' points outside the application"),
        ));
    }
    Ok(PathBuf::from(path))
}

/// Creations and deletions carry at most one hunk, made only of `kind` lines
fn single_hunk(
    hunks: Vec<Hunk>,
    kind: PartKind,
    start_line: usize,
) -> Result<Option<Hunk>, PatchSyntaxError> {
    if hunks.len() > 1 {
        return Err(PatchSyntaxError::new(
            start_line,
            "file creation or deletion with more than one hunk",
        ));
    }
    let hunk = hunks.into_iter().next();
    if let Some(hunk) = &hunk {
        if hunk.parts.iter().any(|p| p.kind != kind) {
            return Err(PatchSyntaxError::new(
                start_line,
                "file creation or deletion hunk contains context lines",
            ));
        }
    }
    Ok(hunk)
}
