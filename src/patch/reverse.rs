//! Structural inverse of a patch

use super::{Effect, Hunk, HunkPart, PartKind};

/// The effects that undo `effects`, in the order they must run
pub fn reverse_effects(effects: &[Effect]) -> Vec<Effect> {
    effects.iter().rev().map(reverse_effect).collect()
}

fn reverse_effect(effect: &Effect) -> Effect {
    match effect {
        Effect::Patch { path, hunks } => Effect::Patch {
            path: path.clone(),
            hunks: hunks.iter().map(reverse_hunk).collect(),
        },
        Effect::FileCreation { path, mode, hunk } => Effect::FileDeletion {
            path: path.clone(),
            mode: *mode,
            hunk: hunk.as_ref().map(reverse_hunk),
        },
        Effect::FileDeletion { path, mode, hunk } => Effect::FileCreation {
            path: path.clone(),
            mode: *mode,
            hunk: hunk.as_ref().map(reverse_hunk),
        },
        Effect::Rename { from, to } => Effect::Rename {
            from: to.clone(),
            to: from.clone(),
        },
        Effect::ModeChange {
            path,
            old_mode,
            new_mode,
        } => Effect::ModeChange {
            path: path.clone(),
            old_mode: *new_mode,
            new_mode: *old_mode,
        },
    }
}

fn reverse_hunk(hunk: &Hunk) -> Hunk {
    Hunk {
        original: hunk.patched,
        patched: hunk.original,
        parts: hunk
            .parts
            .iter()
            .map(|part| HunkPart {
                kind: match part.kind {
                    PartKind::Context => PartKind::Context,
                    PartKind::Deletion => PartKind::Insertion,
                    PartKind::Insertion => PartKind::Deletion,
                },
                lines: part.lines.clone(),
                no_newline_at_end_of_file: part.no_newline_at_end_of_file,
            })
            .collect(),
    }
}
