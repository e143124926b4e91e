use serde::Serialize;

use crate::answers::{AnswerMap, AnswerState};
use crate::model::QuestionDefinition;

/// One row of the submit payload, shaped the way the grading backend
/// expects it. `text` and `selectedChoiceIds` are always present, the
/// three structured blocks only when they carry something; the backend
/// treats a missing block as "not answered".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAnswer {
    pub question_id: i64,
    pub text: String,
    pub selected_choice_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blank_answers: Option<Vec<WireBlankAnswer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering_sequence: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_answers: Option<Vec<WireMatchingAnswer>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBlankAnswer {
    pub blank_id: i64,
    pub selected_option_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMatchingAnswer {
    pub left_pair_id: i64,
    pub selected_right_pair_id: i64,
}

/// Flatten the attempt's answers into payload rows, one per question in
/// assignment order. Questions with no state (unknown kinds) still get
/// a row so the backend sees the full set.
pub fn serialize_answers(questions: &[QuestionDefinition], answers: &AnswerMap) -> Vec<WireAnswer> {
    questions
        .iter()
        .map(|q| wire_answer(q.id, answers.get(&q.id)))
        .collect()
}

fn wire_answer(question_id: i64, state: Option<&AnswerState>) -> WireAnswer {
    let mut row = WireAnswer {
        question_id,
        text: String::new(),
        selected_choice_ids: Vec::new(),
        blank_answers: None,
        ordering_sequence: None,
        matching_answers: None,
    };
    match state {
        None | Some(AnswerState::Empty) => {}
        Some(AnswerState::Text { text }) => {
            row.text = text.clone();
        }
        Some(AnswerState::Choice {
            selected_choice_ids,
        }) => {
            row.selected_choice_ids = selected_choice_ids.clone();
        }
        Some(AnswerState::Blanks { blank_answers }) => {
            let filled: Vec<WireBlankAnswer> = blank_answers
                .iter()
                .filter_map(|b| {
                    b.selected_option_id.map(|oid| WireBlankAnswer {
                        blank_id: b.blank_id,
                        selected_option_id: oid,
                    })
                })
                .collect();
            if !filled.is_empty() {
                row.blank_answers = Some(filled);
            }
        }
        Some(AnswerState::Ordering { sequence }) => {
            if !sequence.is_empty() {
                row.ordering_sequence = Some(sequence.clone());
            }
        }
        Some(AnswerState::Matching { matches }) => {
            let assigned: Vec<WireMatchingAnswer> = matches
                .iter()
                .filter_map(|m| {
                    m.selected_right_pair_id.map(|rid| WireMatchingAnswer {
                        left_pair_id: m.left_pair_id,
                        selected_right_pair_id: rid,
                    })
                })
                .collect();
            if !assigned.is_empty() {
                row.matching_answers = Some(assigned);
            }
        }
    }
    row
}
