use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::answers::{AnswerMap, AnswerState, BlankAnswer, MatchSlot};

/// Editors return `Ok(changed)` so callers can skip redundant autosave
/// notifications; a no-op edit (same text, out-of-range move) is not an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    UnknownQuestion,
    WrongKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

fn state_mut<'a>(answers: &'a mut AnswerMap, question_id: i64) -> Result<&'a mut AnswerState, EditError> {
    answers.get_mut(&question_id).ok_or(EditError::UnknownQuestion)
}

pub fn set_text(answers: &mut AnswerMap, question_id: i64, value: &str) -> Result<bool, EditError> {
    match state_mut(answers, question_id)? {
        AnswerState::Text { text } => {
            if text == value {
                Ok(false)
            } else {
                *text = value.to_string();
                Ok(true)
            }
        }
        _ => Err(EditError::WrongKind),
    }
}

/// Checkbox semantics when `allow_multiple`, radio semantics otherwise.
/// Radio clicks always leave exactly one selection behind, so clicking
/// the already selected choice reports no change.
pub fn toggle_choice(
    answers: &mut AnswerMap,
    question_id: i64,
    choice_id: i64,
    allow_multiple: bool,
) -> Result<bool, EditError> {
    match state_mut(answers, question_id)? {
        AnswerState::Choice {
            selected_choice_ids,
        } => {
            if allow_multiple {
                if let Some(pos) = selected_choice_ids.iter().position(|&id| id == choice_id) {
                    selected_choice_ids.remove(pos);
                } else {
                    selected_choice_ids.push(choice_id);
                }
                Ok(true)
            } else {
                let changed = *selected_choice_ids != [choice_id];
                selected_choice_ids.clear();
                selected_choice_ids.push(choice_id);
                Ok(changed)
            }
        }
        _ => Err(EditError::WrongKind),
    }
}

/// Upsert one gap's selection. `None` clears it. A gap missing from the
/// state (stale client after a question edit) is added rather than
/// rejected.
pub fn set_blank_option(
    answers: &mut AnswerMap,
    question_id: i64,
    blank_id: i64,
    option_id: Option<i64>,
) -> Result<bool, EditError> {
    match state_mut(answers, question_id)? {
        AnswerState::Blanks { blank_answers } => {
            if let Some(slot) = blank_answers.iter_mut().find(|b| b.blank_id == blank_id) {
                if slot.selected_option_id == option_id {
                    return Ok(false);
                }
                slot.selected_option_id = option_id;
            } else {
                blank_answers.push(BlankAnswer {
                    blank_id,
                    selected_option_id: option_id,
                });
            }
            Ok(true)
        }
        _ => Err(EditError::WrongKind),
    }
}

pub fn move_ordering_item(
    answers: &mut AnswerMap,
    question_id: i64,
    item_id: i64,
    direction: Direction,
) -> Result<bool, EditError> {
    match state_mut(answers, question_id)? {
        AnswerState::Ordering { sequence } => {
            let Some(idx) = sequence.iter().position(|&id| id == item_id) else {
                return Ok(false);
            };
            match direction {
                Direction::Up if idx > 0 => {
                    sequence.swap(idx, idx - 1);
                    Ok(true)
                }
                Direction::Down if idx + 1 < sequence.len() => {
                    sequence.swap(idx, idx + 1);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
        _ => Err(EditError::WrongKind),
    }
}

/// Replace the sequence with a fresh shuffle of the question's items.
pub fn shuffle_ordering<R: Rng + ?Sized>(
    answers: &mut AnswerMap,
    question_id: i64,
    item_ids: &[i64],
    rng: &mut R,
) -> Result<bool, EditError> {
    match state_mut(answers, question_id)? {
        AnswerState::Ordering { sequence } => {
            let mut next = item_ids.to_vec();
            next.shuffle(rng);
            *sequence = next;
            Ok(true)
        }
        _ => Err(EditError::WrongKind),
    }
}

/// Drop an item from `source_index` onto `target_index`: remove, then
/// reinsert, shifting everything in between by one.
pub fn reorder_by_drag(
    answers: &mut AnswerMap,
    question_id: i64,
    source_index: usize,
    target_index: usize,
) -> Result<bool, EditError> {
    match state_mut(answers, question_id)? {
        AnswerState::Ordering { sequence } => {
            if source_index == target_index
                || source_index >= sequence.len()
                || target_index >= sequence.len()
            {
                return Ok(false);
            }
            let item = sequence.remove(source_index);
            sequence.insert(target_index, item);
            Ok(true)
        }
        _ => Err(EditError::WrongKind),
    }
}

/// Assign a right item to a left prompt, or clear it with `None`. The
/// same right item can hang off only one left prompt at a time; an
/// assignment silently steals it from its previous owner.
pub fn set_match(
    answers: &mut AnswerMap,
    question_id: i64,
    left_pair_id: i64,
    right_pair_id: Option<i64>,
) -> Result<bool, EditError> {
    match state_mut(answers, question_id)? {
        AnswerState::Matching { matches } => {
            let mut changed = false;
            if let Some(rid) = right_pair_id {
                for slot in matches.iter_mut() {
                    if slot.left_pair_id != left_pair_id
                        && slot.selected_right_pair_id == Some(rid)
                    {
                        slot.selected_right_pair_id = None;
                        changed = true;
                    }
                }
            }
            if let Some(slot) = matches.iter_mut().find(|s| s.left_pair_id == left_pair_id) {
                if slot.selected_right_pair_id != right_pair_id {
                    slot.selected_right_pair_id = right_pair_id;
                    changed = true;
                }
            } else {
                matches.push(MatchSlot {
                    left_pair_id,
                    selected_right_pair_id: right_pair_id,
                });
                changed = true;
            }
            Ok(changed)
        }
        _ => Err(EditError::WrongKind),
    }
}

/// Tap-to-match focus handling. Clicking a left prompt arms it,
/// clicking it again disarms; the armed prompt is consumed by the next
/// right click.
pub fn click_left(focus: Option<i64>, left_pair_id: i64) -> Option<i64> {
    if focus == Some(left_pair_id) {
        None
    } else {
        Some(left_pair_id)
    }
}

/// Right-side click, returning the next focus and whether the answer
/// changed. With an armed left prompt this commits the match and
/// disarms; committing an assignment already in place reports no
/// change. Without one, clicking an already matched right item re-arms
/// the left prompt that owns it so the student can move the match with
/// one more tap; an unmatched right item does nothing.
pub fn click_right(
    answers: &mut AnswerMap,
    question_id: i64,
    focus: Option<i64>,
    right_pair_id: i64,
) -> Result<(Option<i64>, bool), EditError> {
    if let Some(left) = focus {
        let changed = set_match(answers, question_id, left, Some(right_pair_id))?;
        return Ok((None, changed));
    }
    match answers.get(&question_id) {
        Some(AnswerState::Matching { matches }) => Ok((
            matches
                .iter()
                .find(|s| s.selected_right_pair_id == Some(right_pair_id))
                .map(|s| s.left_pair_id),
            false,
        )),
        Some(_) => Err(EditError::WrongKind),
        None => Err(EditError::UnknownQuestion),
    }
}
