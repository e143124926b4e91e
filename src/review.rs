use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::blanks::{blank_layout, TextSegment};
use crate::model::{QuestionDefinition, QuestionKind, StoredAnswer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Correct,
    Incorrect,
    NotAnswered,
}

/// Read-only display model for one question on the review page,
/// rebuilt from the question definition plus the graded submission
/// row. No attempt state is involved; closing and reopening the page
/// always reproduces the same overlay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOverlay {
    pub question_id: i64,
    pub kind: QuestionKind,
    pub text: String,
    pub points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub review: QuestionReview,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionReview {
    #[serde(rename_all = "camelCase")]
    Choice { choices: Vec<ChoiceReview> },
    #[serde(rename_all = "camelCase")]
    Text { text: String, answered: bool },
    #[serde(rename_all = "camelCase")]
    Blanks {
        segments: Vec<TextSegment>,
        blanks: Vec<BlankReview>,
    },
    #[serde(rename_all = "camelCase")]
    Ordering {
        student_rows: Vec<OrderingReviewRow>,
        correct_rows: Vec<OrderingCorrectRow>,
    },
    #[serde(rename_all = "camelCase")]
    Matching {
        student_rows: Vec<MatchingReviewRow>,
        correct_rows: Vec<MatchingCorrectRow>,
    },
    Empty,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceReview {
    pub choice_id: i64,
    pub text: String,
    pub is_correct: bool,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankReview {
    pub blank_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    pub status: ReviewStatus,
    pub correct_text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingReviewRow {
    pub item_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_position: Option<i64>,
    pub correct_position: i64,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingCorrectRow {
    pub item_id: i64,
    pub text: String,
    pub correct_position: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingReviewRow {
    pub left_pair_id: i64,
    pub left_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_right_pair_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_right_text: Option<String>,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingCorrectRow {
    pub left_pair_id: i64,
    pub left_text: String,
    pub right_text: String,
}

fn flag_status(correct: bool) -> ReviewStatus {
    if correct {
        ReviewStatus::Correct
    } else {
        ReviewStatus::Incorrect
    }
}

/// Teacher-recorded verdicts win for blanks, ordering and matching;
/// when a row predates per-item grading the verdict falls back to
/// comparing against the definition. Choice rows never come through
/// here: their status reads the definition flag directly.
fn verdict(recorded: Option<bool>, definition_says: bool) -> ReviewStatus {
    flag_status(recorded.unwrap_or(definition_says))
}

pub fn build_overlay(question: &QuestionDefinition, stored: Option<&StoredAnswer>) -> QuestionOverlay {
    QuestionOverlay {
        question_id: question.id,
        kind: question.kind,
        text: question.text.clone(),
        points: question.points,
        score: stored.and_then(|s| s.score),
        review: build_review(question, stored),
    }
}

fn build_review(question: &QuestionDefinition, stored: Option<&StoredAnswer>) -> QuestionReview {
    match question.kind {
        QuestionKind::QcmSingle | QuestionKind::QcmMultiple | QuestionKind::TrueFalse => {
            choice_review(question, stored)
        }
        QuestionKind::OpenShort | QuestionKind::OpenLong => {
            let text = stored
                .and_then(|s| s.text.clone())
                .unwrap_or_default();
            let answered = !text.trim().is_empty();
            QuestionReview::Text { text, answered }
        }
        QuestionKind::FillBlank => blanks_review(question, stored),
        QuestionKind::Ordering => ordering_review(question, stored),
        QuestionKind::Matching => matching_review(question, stored),
        QuestionKind::Unknown => QuestionReview::Empty,
    }
}

fn choice_review(question: &QuestionDefinition, stored: Option<&StoredAnswer>) -> QuestionReview {
    let picked: HashSet<i64> = stored
        .map(|s| s.selections.iter().map(|sel| sel.choice_id).collect())
        .unwrap_or_default();
    let choices = question
        .choices
        .iter()
        .map(|c| {
            let selected = picked.contains(&c.id);
            ChoiceReview {
                choice_id: c.id,
                text: c.text.clone(),
                is_correct: c.is_correct,
                selected,
                // The definition flag decides; the stored row only says
                // which choices were picked.
                status: selected.then(|| flag_status(c.is_correct)),
            }
        })
        .collect();
    QuestionReview::Choice { choices }
}

fn blanks_review(question: &QuestionDefinition, stored: Option<&StoredAnswer>) -> QuestionReview {
    let by_blank: HashMap<i64, (Option<i64>, Option<bool>)> = stored
        .map(|s| {
            s.blank_selections
                .iter()
                .map(|sel| (sel.blank_id, (sel.selected_option_id, sel.is_correct)))
                .collect()
        })
        .unwrap_or_default();
    let blanks = question
        .blanks
        .iter()
        .map(|b| {
            let correct_text = b
                .options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.text.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let (stored_option, recorded) = by_blank
                .get(&b.id)
                .copied()
                .unwrap_or((None, None));
            // A selection pointing at a deleted option is shown as
            // unanswered rather than as a ghost value.
            let option = stored_option.and_then(|oid| b.options.iter().find(|o| o.id == oid));
            match option {
                Some(o) => BlankReview {
                    blank_id: b.id,
                    label: b.label.clone(),
                    order: b.order,
                    selected_option_id: Some(o.id),
                    selected_text: Some(o.text.clone()),
                    status: verdict(recorded, o.is_correct),
                    correct_text,
                },
                None => BlankReview {
                    blank_id: b.id,
                    label: b.label.clone(),
                    order: b.order,
                    selected_option_id: None,
                    selected_text: None,
                    status: ReviewStatus::NotAnswered,
                    correct_text,
                },
            }
        })
        .collect();
    QuestionReview::Blanks {
        segments: blank_layout(&question.text, &question.blanks),
        blanks,
    }
}

fn ordering_review(question: &QuestionDefinition, stored: Option<&StoredAnswer>) -> QuestionReview {
    let by_item: HashMap<i64, (Option<i64>, Option<bool>)> = stored
        .map(|s| {
            s.ordering_selections
                .iter()
                .map(|sel| (sel.item_id, (sel.selected_position, sel.is_correct)))
                .collect()
        })
        .unwrap_or_default();
    let mut student_rows: Vec<OrderingReviewRow> = question
        .ordering_items
        .iter()
        .map(|item| {
            let (selected_position, recorded) =
                by_item.get(&item.id).copied().unwrap_or((None, None));
            let status = match selected_position {
                Some(pos) => verdict(recorded, pos == item.correct_position),
                None => ReviewStatus::NotAnswered,
            };
            OrderingReviewRow {
                item_id: item.id,
                text: item.text.clone(),
                selected_position,
                correct_position: item.correct_position,
                status,
            }
        })
        .collect();
    // Rows the student never placed sink to the bottom, keeping their
    // definition order among themselves.
    student_rows.sort_by_key(|r| r.selected_position.unwrap_or(i64::MAX));

    let mut correct_rows: Vec<OrderingCorrectRow> = question
        .ordering_items
        .iter()
        .map(|item| OrderingCorrectRow {
            item_id: item.id,
            text: item.text.clone(),
            correct_position: item.correct_position,
        })
        .collect();
    correct_rows.sort_by_key(|r| r.correct_position);

    QuestionReview::Ordering {
        student_rows,
        correct_rows,
    }
}

fn matching_review(question: &QuestionDefinition, stored: Option<&StoredAnswer>) -> QuestionReview {
    let by_left: HashMap<i64, (Option<i64>, Option<bool>)> = stored
        .map(|s| {
            s.matching_selections
                .iter()
                .map(|sel| (sel.left_pair_id, (sel.selected_right_pair_id, sel.is_correct)))
                .collect()
        })
        .unwrap_or_default();
    let student_rows = question
        .matching_pairs
        .iter()
        .map(|p| {
            let (selected_right, recorded) =
                by_left.get(&p.id).copied().unwrap_or((None, None));
            let right = selected_right
                .and_then(|rid| question.matching_pairs.iter().find(|rp| rp.id == rid));
            match right {
                Some(rp) => MatchingReviewRow {
                    left_pair_id: p.id,
                    left_text: p.left_text.clone(),
                    selected_right_pair_id: Some(rp.id),
                    selected_right_text: Some(rp.right_text.clone()),
                    status: verdict(recorded, rp.id == p.id),
                },
                None => MatchingReviewRow {
                    left_pair_id: p.id,
                    left_text: p.left_text.clone(),
                    selected_right_pair_id: None,
                    selected_right_text: None,
                    status: ReviewStatus::NotAnswered,
                },
            }
        })
        .collect();
    let correct_rows = question
        .matching_pairs
        .iter()
        .map(|p| MatchingCorrectRow {
            left_pair_id: p.id,
            left_text: p.left_text.clone(),
            right_text: p.right_text.clone(),
        })
        .collect();
    QuestionReview::Matching {
        student_rows,
        correct_rows,
    }
}

/// Matches to draw on the review page in "your answer" view: the
/// student's stored assignments, minus anything that no longer exists
/// in the definition, one right item per left prompt.
pub fn student_pairs(question: &QuestionDefinition, stored: Option<&StoredAnswer>) -> Vec<(i64, i64)> {
    let defined: HashSet<i64> = question.matching_pairs.iter().map(|p| p.id).collect();
    let by_left: HashMap<i64, i64> = stored
        .map(|s| {
            s.matching_selections
                .iter()
                .filter_map(|sel| sel.selected_right_pair_id.map(|rid| (sel.left_pair_id, rid)))
                .collect()
        })
        .unwrap_or_default();
    let mut used_rights = HashSet::new();
    question
        .matching_pairs
        .iter()
        .filter_map(|p| {
            let rid = *by_left.get(&p.id)?;
            if !defined.contains(&rid) || !used_rights.insert(rid) {
                return None;
            }
            Some((p.id, rid))
        })
        .collect()
}

/// Matches to draw in "correct answer" view: every left prompt joined
/// to its own right item.
pub fn correct_pairs(question: &QuestionDefinition) -> Vec<(i64, i64)> {
    question.matching_pairs.iter().map(|p| (p.id, p.id)).collect()
}
