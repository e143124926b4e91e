use serde::Serialize;
use std::collections::HashSet;

use crate::model::Blank;

/// Piece of a fill-blank question text after placeholder expansion:
/// either literal prose or a dropdown bound to one blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSegment {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Blank {
        blank_id: i64,
    },
}

/// Split a question text into prose and blank slots. Placeholders are
/// `[token]`; a token resolves to a blank by label (case-insensitive),
/// then by numeric order (`[2]`), then by the synthetic `B<order>` name
/// authors get when they skip labelling (`[B2]`). A token that matches
/// nothing stays in the prose verbatim, brackets included. Blanks no
/// placeholder refers to are appended after the text so every gap is
/// always reachable.
pub fn blank_layout(text: &str, blanks: &[Blank]) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut referenced: HashSet<i64> = HashSet::new();
    let mut rest = text;
    loop {
        let Some(open) = rest.find('[') else {
            push_text(&mut segments, rest);
            break;
        };
        let Some(close) = rest[open..].find(']') else {
            // Unterminated placeholder: the rest is prose.
            push_text(&mut segments, rest);
            break;
        };
        let token = &rest[open + 1..open + close];
        match resolve_token(token, blanks) {
            Some(blank_id) => {
                push_text(&mut segments, &rest[..open]);
                segments.push(TextSegment::Blank { blank_id });
                referenced.insert(blank_id);
            }
            None => push_text(&mut segments, &rest[..open + close + 1]),
        }
        rest = &rest[open + close + 1..];
    }
    for blank in blanks {
        if !referenced.contains(&blank.id) {
            segments.push(TextSegment::Blank { blank_id: blank.id });
        }
    }
    segments
}

fn push_text(segments: &mut Vec<TextSegment>, text: &str) {
    if text.is_empty() {
        return;
    }
    // Merge with a preceding literal so unresolved placeholders do not
    // fragment the prose.
    if let Some(TextSegment::Text { text: prev }) = segments.last_mut() {
        prev.push_str(text);
    } else {
        segments.push(TextSegment::Text {
            text: text.to_string(),
        });
    }
}

fn resolve_token(token: &str, blanks: &[Blank]) -> Option<i64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Some(b) = blanks.iter().find(|b| {
        b.label
            .as_deref()
            .is_some_and(|l| l.trim().eq_ignore_ascii_case(token))
    }) {
        return Some(b.id);
    }
    if let Ok(order) = token.parse::<i64>() {
        if let Some(b) = blanks.iter().find(|b| b.order == order) {
            return Some(b.id);
        }
    }
    if let Some(digits) = token
        .strip_prefix('B')
        .or_else(|| token.strip_prefix('b'))
    {
        if let Ok(order) = digits.parse::<i64>() {
            if let Some(b) = blanks.iter().find(|b| b.order == order) {
                return Some(b.id);
            }
        }
    }
    None
}
