//! Presentation of diff segments.
//!
//! Added text is green, removed text is red and struck through, unchanged
//! text is shown as-is.

use std::fmt::Write;

use owo_colors::OwoColorize;

use super::{DiffSegment, SegmentKind};

/// Render for a colour terminal.
pub fn render_ansi(segments: &[DiffSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        let text = segment.text.as_str();
        // Writing to a String cannot fail.
        let _ = match segment.kind {
            SegmentKind::Unchanged => write!(out, "{}", text),
            SegmentKind::Added => write!(out, "{}", text.green()),
            SegmentKind::Removed => write!(out, "{}", text.red().strikethrough()),
        };
    }
    out
}

/// Render with `[-removed-]` and `{+added+}` markers, for plain output.
pub fn render_plain(segments: &[DiffSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment.kind {
            SegmentKind::Unchanged => out.push_str(&segment.text),
            SegmentKind::Added => {
                out.push_str("{+");
                out.push_str(&segment.text);
                out.push_str("+}");
            }
            SegmentKind::Removed => {
                out.push_str("[-");
                out.push_str(&segment.text);
                out.push_str("-]");
            }
        }
    }
    out
}

/// Render as an HTML fragment with `<ins>` and `<del>` elements.
pub fn render_html(segments: &[DiffSegment]) -> String {
    let mut out = String::from("<div class=\"diff\">");
    for segment in segments {
        let text = escape_html(&segment.text);
        match segment.kind {
            SegmentKind::Unchanged => {
                out.push_str("<span>");
                out.push_str(&text);
                out.push_str("</span>");
            }
            SegmentKind::Added => {
                out.push_str("<ins class=\"diff-added\">");
                out.push_str(&text);
                out.push_str("</ins>");
            }
            SegmentKind::Removed => {
                out.push_str("<del class=\"diff-removed\">");
                out.push_str(&text);
                out.push_str("</del>");
            }
        }
    }
    out.push_str("</div>");
    out
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
