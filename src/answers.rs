use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::model::{QuestionDefinition, QuestionKind, StoredAnswer};

/// In-progress answer for one question. The variant is fixed by the
/// question kind when the attempt opens and never changes afterwards;
/// editors only mutate inside the variant they expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerState {
    #[serde(rename_all = "camelCase")]
    Choice { selected_choice_ids: Vec<i64> },
    #[serde(rename_all = "camelCase")]
    Text { text: String },
    #[serde(rename_all = "camelCase")]
    Blanks { blank_answers: Vec<BlankAnswer> },
    #[serde(rename_all = "camelCase")]
    Ordering { sequence: Vec<i64> },
    #[serde(rename_all = "camelCase")]
    Matching { matches: Vec<MatchSlot> },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankAnswer {
    pub blank_id: i64,
    pub selected_option_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSlot {
    pub left_pair_id: i64,
    pub selected_right_pair_id: Option<i64>,
}

/// Answers for the whole attempt, keyed by question id.
pub type AnswerMap = HashMap<i64, AnswerState>;

/// Initial state for a question nobody has touched yet. Total over
/// every kind, including `Unknown`. Ordering questions start from a
/// random permutation so the student never sees the correct order
/// for free; the rng comes from the caller so tests can seed it.
pub fn build_default<R: Rng + ?Sized>(question: &QuestionDefinition, rng: &mut R) -> AnswerState {
    match question.kind {
        QuestionKind::QcmSingle | QuestionKind::QcmMultiple | QuestionKind::TrueFalse => {
            AnswerState::Choice {
                selected_choice_ids: Vec::new(),
            }
        }
        QuestionKind::OpenShort | QuestionKind::OpenLong => AnswerState::Text {
            text: String::new(),
        },
        QuestionKind::FillBlank => AnswerState::Blanks {
            blank_answers: question
                .blanks
                .iter()
                .map(|b| BlankAnswer {
                    blank_id: b.id,
                    selected_option_id: None,
                })
                .collect(),
        },
        QuestionKind::Ordering => {
            let mut sequence: Vec<i64> = question.ordering_items.iter().map(|i| i.id).collect();
            sequence.shuffle(rng);
            AnswerState::Ordering { sequence }
        }
        QuestionKind::Matching => AnswerState::Matching {
            matches: question
                .matching_pairs
                .iter()
                .map(|p| MatchSlot {
                    left_pair_id: p.id,
                    selected_right_pair_id: None,
                })
                .collect(),
        },
        QuestionKind::Unknown => AnswerState::Empty,
    }
}

/// Merge a stored submission row into the default state for a question.
/// The output always covers the full current definition: gaps the
/// stored row never mentions fall back to the default, ids that no
/// longer exist in the definition are dropped. Running the result
/// through `reconcile` again with its own serialized form is a no-op.
pub fn reconcile(
    question: &QuestionDefinition,
    defaults: AnswerState,
    stored: Option<&StoredAnswer>,
) -> AnswerState {
    let Some(stored) = stored else {
        return defaults;
    };
    match question.kind {
        QuestionKind::OpenShort | QuestionKind::OpenLong => {
            let fallback = match defaults {
                AnswerState::Text { text } => text,
                _ => String::new(),
            };
            AnswerState::Text {
                text: stored.text.clone().unwrap_or(fallback),
            }
        }
        QuestionKind::QcmSingle | QuestionKind::QcmMultiple | QuestionKind::TrueFalse => {
            if stored.selections.is_empty() {
                return match defaults {
                    s @ AnswerState::Choice { .. } => s,
                    _ => AnswerState::Choice {
                        selected_choice_ids: Vec::new(),
                    },
                };
            }
            let defined: HashSet<i64> = question.choices.iter().map(|c| c.id).collect();
            let mut seen = HashSet::new();
            let selected_choice_ids = stored
                .selections
                .iter()
                .map(|s| s.choice_id)
                .filter(|id| defined.contains(id) && seen.insert(*id))
                .collect();
            AnswerState::Choice { selected_choice_ids }
        }
        QuestionKind::FillBlank => {
            let by_blank: HashMap<i64, Option<i64>> = stored
                .blank_selections
                .iter()
                .map(|s| (s.blank_id, s.selected_option_id))
                .collect();
            let blank_answers = question
                .blanks
                .iter()
                .map(|b| BlankAnswer {
                    blank_id: b.id,
                    selected_option_id: by_blank
                        .get(&b.id)
                        .copied()
                        .flatten()
                        .filter(|oid| b.options.iter().any(|o| o.id == *oid)),
                })
                .collect();
            AnswerState::Blanks { blank_answers }
        }
        QuestionKind::Ordering => {
            let defined: Vec<i64> = question.ordering_items.iter().map(|i| i.id).collect();
            let mut kept: Vec<(i64, i64)> = Vec::new();
            let mut seen = HashSet::new();
            for s in &stored.ordering_selections {
                if defined.contains(&s.item_id) && seen.insert(s.item_id) {
                    kept.push((s.item_id, s.selected_position.unwrap_or(i64::MAX)));
                }
            }
            if kept.is_empty() {
                return match defaults {
                    s @ AnswerState::Ordering { .. } => s,
                    _ => AnswerState::Ordering { sequence: defined },
                };
            }
            // Stable sort keeps the stored row order for tied or
            // missing positions, so healing stays deterministic.
            kept.sort_by_key(|&(_, pos)| pos);
            let mut sequence: Vec<i64> = kept.into_iter().map(|(id, _)| id).collect();
            for id in defined {
                if !sequence.contains(&id) {
                    sequence.push(id);
                }
            }
            AnswerState::Ordering { sequence }
        }
        QuestionKind::Matching => {
            let by_left: HashMap<i64, Option<i64>> = stored
                .matching_selections
                .iter()
                .map(|s| (s.left_pair_id, s.selected_right_pair_id))
                .collect();
            let defined_rights: HashSet<i64> =
                question.matching_pairs.iter().map(|p| p.id).collect();
            let mut used_rights = HashSet::new();
            let matches = question
                .matching_pairs
                .iter()
                .map(|p| MatchSlot {
                    left_pair_id: p.id,
                    selected_right_pair_id: by_left
                        .get(&p.id)
                        .copied()
                        .flatten()
                        .filter(|rid| defined_rights.contains(rid))
                        // A right item matched to two lefts keeps its
                        // first owner in definition order.
                        .filter(|rid| used_rights.insert(*rid)),
                })
                .collect();
            AnswerState::Matching { matches }
        }
        QuestionKind::Unknown => AnswerState::Empty,
    }
}

/// Whether the student has committed anything for this state. Mirrors
/// what the submit payload carries: an ordering question always holds a
/// full sequence, so it counts as answered as soon as it has items.
pub fn is_answered(state: &AnswerState) -> bool {
    match state {
        AnswerState::Choice {
            selected_choice_ids,
        } => !selected_choice_ids.is_empty(),
        AnswerState::Text { text } => !text.trim().is_empty(),
        AnswerState::Blanks { blank_answers } => blank_answers
            .iter()
            .any(|b| b.selected_option_id.is_some()),
        AnswerState::Ordering { sequence } => !sequence.is_empty(),
        AnswerState::Matching { matches } => {
            matches.iter().any(|m| m.selected_right_pair_id.is_some())
        }
        AnswerState::Empty => false,
    }
}
