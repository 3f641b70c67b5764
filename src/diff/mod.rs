//! Word-level diffing between an original and a revised text.
//!
//! Both texts are split into word, whitespace and punctuation tokens and
//! compared with Myers' algorithm. The result is a list of [`DiffSegment`]s in
//! which every change region reads as one removal followed by one insertion,
//! and no two neighbouring segments share a kind.
//!
//! Filtering the segments reconstructs either side exactly:
//!
//! ```ignore
//! use prompt_refiner::diff::{diff_words, original_text, revised_text};
//!
//! let segments = diff_words("the cat sat", "the dog sat");
//! assert_eq!(original_text(&segments), "the cat sat");
//! assert_eq!(revised_text(&segments), "the dog sat");
//! ```

mod render;
mod tokenize;

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffTag};

pub use render::{render_ansi, render_html, render_plain};
pub use tokenize::tokenize;

/// Classification of a diff segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Present in both texts.
    Unchanged,
    /// Only in the revised text.
    Added,
    /// Only in the original text.
    Removed,
}

/// A maximal run of text sharing one classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
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

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(SegmentKind::Added, text)
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(SegmentKind::Removed, text)
    }
}

/// Word counts of a diff, for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub words_added: usize,
    pub words_removed: usize,
    pub words_unchanged: usize,
}

impl DiffStats {
    pub fn from_segments(segments: &[DiffSegment]) -> Self {
        let mut stats = Self::default();
        for segment in segments {
            let words = segment.text.split_whitespace().count();
            match segment.kind {
                SegmentKind::Unchanged => stats.words_unchanged += words,
                SegmentKind::Added => stats.words_added += words,
                SegmentKind::Removed => stats.words_removed += words,
            }
        }
        stats
    }

    pub fn has_changes(&self) -> bool {
        self.words_added > 0 || self.words_removed > 0
    }
}

/// Compute the word diff between `original` and `revised`.
pub fn diff_words(original: &str, revised: &str) -> Vec<DiffSegment> {
    let old_tokens = tokenize(original);
    let new_tokens = tokenize(revised);

    let mut raw = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old_tokens, &new_tokens) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let old_text = || old_tokens[old_range.clone()].concat();
        let new_text = || new_tokens[new_range.clone()].concat();
        match tag {
            DiffTag::Equal => push_merged(&mut raw, SegmentKind::Unchanged, &old_text()),
            DiffTag::Delete => push_merged(&mut raw, SegmentKind::Removed, &old_text()),
            DiffTag::Insert => push_merged(&mut raw, SegmentKind::Added, &new_text()),
            DiffTag::Replace => {
                push_merged(&mut raw, SegmentKind::Removed, &old_text());
                push_merged(&mut raw, SegmentKind::Added, &new_text());
            }
        }
    }

    group_changes(raw)
}

/// Text of the original side: every segment except additions.
pub fn original_text(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.kind != SegmentKind::Added)
        .map(|s| s.text.as_str())
        .collect()
}

/// Text of the revised side: every segment except removals.
pub fn revised_text(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.kind != SegmentKind::Removed)
        .map(|s| s.text.as_str())
        .collect()
}

fn push_merged(segments: &mut Vec<DiffSegment>, kind: SegmentKind, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.kind == kind => last.text.push_str(text),
        _ => segments.push(DiffSegment::new(kind, text)),
    }
}

/// Collapse every change region into one removal followed by one insertion.
///
/// Whitespace-only unchanged runs between two changes belong to the change on
/// both sides, otherwise "a b" -> "c d" would keep a lone unchanged space.
fn group_changes(segments: Vec<DiffSegment>) -> Vec<DiffSegment> {
    let mut grouped = Vec::with_capacity(segments.len());
    let mut removed = String::new();
    let mut added = String::new();
    let total = segments.len();

    for (index, segment) in segments.into_iter().enumerate() {
        match segment.kind {
            SegmentKind::Removed => removed.push_str(&segment.text),
            SegmentKind::Added => added.push_str(&segment.text),
            SegmentKind::Unchanged => {
                let in_change = !removed.is_empty() || !added.is_empty();
                let followed_by_change = index + 1 < total;
                if in_change && followed_by_change && segment.text.trim().is_empty() {
                    removed.push_str(&segment.text);
                    added.push_str(&segment.text);
                    continue;
                }
                flush_change(&mut grouped, &mut removed, &mut added);
                push_merged(&mut grouped, SegmentKind::Unchanged, &segment.text);
            }
        }
    }
    flush_change(&mut grouped, &mut removed, &mut added);

    grouped
}

fn flush_change(segments: &mut Vec<DiffSegment>, removed: &mut String, added: &mut String) {
    push_merged(segments, SegmentKind::Removed, removed);
    push_merged(segments, SegmentKind::Added, added);
    removed.clear();
    added.clear();
}
