//! Word-level diff between two versions of a progress update.
//!
//! This is a greedy forward scan with a bounded lookahead, not an LCS. It
//! produces a readable edit script for short human-edited text; a minimal
//! edit script is not a goal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far ahead in the new tokens we look for the current old token.
pub const LOOKAHEAD: usize = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Unchanged,
    Removed,
    Added,
}

impl SegmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Unchanged => "unchanged",
            SegmentKind::Removed => "removed",
            SegmentKind::Added => "added",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub text: String,
}

impl DiffSegment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(SegmentKind::Unchanged, text)
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(SegmentKind::Removed, text)
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(SegmentKind::Added, text)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split on whitespace runs, dropping empty tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Compute the word-level edit script that turns `old_text` into `new_text`.
///
/// Adjacent segments never share a kind.
pub fn compute_diff(old_text: &str, new_text: &str) -> Vec<DiffSegment> {
    let old = tokenize(old_text);
    let new = tokenize(new_text);

    if old.is_empty() && new.is_empty() {
        return Vec::new();
    }
    if old.is_empty() {
        return vec![DiffSegment::added(new.join(" "))];
    }
    if new.is_empty() {
        return vec![DiffSegment::removed(old.join(" "))];
    }

    let mut raw = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);

    loop {
        if i >= old.len() {
            if j < new.len() {
                raw.push(DiffSegment::added(new[j..].join(" ")));
            }
            break;
        }
        if j >= new.len() {
            raw.push(DiffSegment::removed(old[i..].join(" ")));
            break;
        }

        let common = old[i..]
            .iter()
            .zip(&new[j..])
            .take_while(|(a, b)| a == b)
            .count();
        if common > 0 {
            raw.push(DiffSegment::unchanged(old[i..i + common].join(" ")));
            i += common;
            j += common;
            continue;
        }

        match resync_point(&old, &new, i, j) {
            Some(k) => {
                raw.push(DiffSegment::added(new[j..k].join(" ")));
                j = k;
            }
            None => {
                raw.push(DiffSegment::removed(old[i]));
                i += 1;
            }
        }
    }

    merge_adjacent(raw)
}

/// True when at least one segment is an insertion or deletion.
pub fn has_changes(segments: &[DiffSegment]) -> bool {
    segments.iter().any(|s| s.kind != SegmentKind::Unchanged)
}

/// Tokens of the old text, recovered from unchanged + removed spans.
pub fn old_tokens(segments: &[DiffSegment]) -> Vec<&str> {
    side_tokens(segments, SegmentKind::Removed)
}

/// Tokens of the new text, recovered from unchanged + added spans.
pub fn new_tokens(segments: &[DiffSegment]) -> Vec<&str> {
    side_tokens(segments, SegmentKind::Added)
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Index in `new` where scanning can resume matching `old[i]`, if any.
fn resync_point(old: &[&str], new: &[&str], i: usize, j: usize) -> Option<usize> {
    let target = old[i];
    let window_end = (j + LOOKAHEAD).min(new.len());

    if let Some(k) = (j + 1..window_end).find(|&k| new[k] == target) {
        return Some(k);
    }

    // Full search of the remainder, still only accepted near the cursor.
    new[j..]
        .iter()
        .position(|w| *w == target)
        .map(|p| p + j)
        .filter(|&k| k > j && k < j + LOOKAHEAD)
}

fn merge_adjacent(segments: Vec<DiffSegment>) -> Vec<DiffSegment> {
    let mut merged: Vec<DiffSegment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match merged.last_mut() {
            Some(last) if last.kind == segment.kind => {
                last.text.push(' ');
                last.text.push_str(&segment.text);
            }
            _ => merged.push(segment),
        }
    }
    merged
}

fn side_tokens(segments: &[DiffSegment], include: SegmentKind) -> Vec<&str> {
    segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Unchanged || s.kind == include)
        .flat_map(|s| tokenize(&s.text))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
