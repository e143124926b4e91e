use serde_json::json;

use crate::answers::AnswerState;
use crate::editors::{self, EditError};
use crate::geometry::{connector_lines, AnchorRect, Rect};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    attempt_mut, edit_error, editing_attempt_mut, opt_i64, required_field, required_i64,
};
use crate::ipc::types::{AppState, Request};
use crate::session::AttemptSession;

fn matching_slots(
    session: &AttemptSession,
    question_id: i64,
) -> Result<Vec<(i64, Option<i64>)>, EditError> {
    match session.answers.get(&question_id) {
        Some(AnswerState::Matching { matches }) => Ok(matches
            .iter()
            .map(|m| (m.left_pair_id, m.selected_right_pair_id))
            .collect()),
        Some(_) => Err(EditError::WrongKind),
        None => Err(EditError::UnknownQuestion),
    }
}

fn click_response(
    req: &Request,
    session: &AttemptSession,
    question_id: i64,
    focus: Option<i64>,
    changed: bool,
) -> serde_json::Value {
    let matches = match matching_slots(session, question_id) {
        Ok(slots) => slots
            .into_iter()
            .map(|(left, right)| json!({ "leftPairId": left, "selectedRightPairId": right }))
            .collect::<Vec<_>>(),
        Err(e) => return edit_error(req, e),
    };
    ok(
        &req.id,
        json!({
            "focus": focus,
            "changed": changed,
            "matches": matches,
            "answeredCount": session.answered_count(),
        }),
    )
}

/// Arm or disarm a left prompt for tap-to-match.
fn handle_click_left(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let left_pair_id = match required_i64(req, "leftPairId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    if let Err(e) = matching_slots(session, question_id) {
        return edit_error(req, e);
    }
    let focus = session.match_focus.get(&question_id).copied();
    let next = editors::click_left(focus, left_pair_id);
    match next {
        Some(left) => {
            session.match_focus.insert(question_id, left);
        }
        None => {
            session.match_focus.remove(&question_id);
        }
    }
    click_response(req, session, question_id, next, false)
}

/// Right-side click: commits against the armed prompt, or re-arms the
/// owner of an already matched right item.
fn handle_click_right(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let right_pair_id = match required_i64(req, "rightPairId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let focus = session.match_focus.get(&question_id).copied();
    match editors::click_right(&mut session.answers, question_id, focus, right_pair_id) {
        Ok((next, changed)) => {
            match next {
                Some(left) => {
                    session.match_focus.insert(question_id, left);
                }
                None => {
                    session.match_focus.remove(&question_id);
                }
            }
            click_response(req, session, question_id, next, changed)
        }
        Err(e) => edit_error(req, e),
    }
}

/// Direct assignment, used by the drag-to-match variant of the widget.
fn handle_set_match(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let left_pair_id = match required_i64(req, "leftPairId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let right_pair_id = match opt_i64(req, "rightPairId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match editors::set_match(&mut session.answers, question_id, left_pair_id, right_pair_id) {
        Ok(changed) => {
            let focus = session.match_focus.get(&question_id).copied();
            click_response(req, session, question_id, focus, changed)
        }
        Err(e) => edit_error(req, e),
    }
}

/// Connector lines for the SVG overlay, computed from the rectangles
/// the page measured. Read-only, so it works in any phase.
fn handle_lines(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let container: Rect = match required_field(req, "container") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let left_anchors: Vec<AnchorRect> = match required_field(req, "leftAnchors") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let right_anchors: Vec<AnchorRect> = match required_field(req, "rightAnchors") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let pairs: Vec<(i64, i64)> = match matching_slots(session, question_id) {
        Ok(slots) => slots
            .into_iter()
            .filter_map(|(left, right)| right.map(|r| (left, r)))
            .collect(),
        Err(e) => return edit_error(req, e),
    };
    let lines = connector_lines(&container, &left_anchors, &right_anchors, &pairs);
    match serde_json::to_value(lines) {
        Ok(v) => ok(&req.id, json!({ "lines": v })),
        Err(e) => err(&req.id, "internal", format!("{e}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "matching.clickLeft" => Some(handle_click_left(state, req)),
        "matching.clickRight" => Some(handle_click_right(state, req)),
        "matching.set" => Some(handle_set_match(state, req)),
        "matching.lines" => Some(handle_lines(state, req)),
        _ => None,
    }
}
