use serde_json::json;

use crate::answers::is_answered;
use crate::editors::{self, Direction, EditError};
use crate::ipc::error::ok;
use crate::ipc::helpers::{
    edit_error, editing_attempt_mut, opt_i64, required_field, required_i64, required_str,
    required_usize,
};
use crate::ipc::types::{AppState, Request};
use crate::session::AttemptSession;

/// Common reply for mutating edits: what changed, the new state of the
/// touched question and the progress counter the page header shows.
fn edit_response(
    req: &Request,
    session: &AttemptSession,
    question_id: i64,
    changed: bool,
) -> serde_json::Value {
    let answer = session.answers.get(&question_id);
    ok(
        &req.id,
        json!({
            "changed": changed,
            "answered": answer.map(is_answered).unwrap_or(false),
            "answeredCount": session.answered_count(),
            "answer": serde_json::to_value(answer).unwrap_or(serde_json::Value::Null),
        }),
    )
}

fn handle_set_text(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let text = match required_str(req, "text") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match editors::set_text(&mut session.answers, question_id, &text) {
        Ok(changed) => edit_response(req, session, question_id, changed),
        Err(e) => edit_error(req, e),
    }
}

fn handle_toggle_choice(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let choice_id = match required_i64(req, "choiceId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let allow_multiple = session
        .question(question_id)
        .map(|q| q.kind.allows_multiple_choices())
        .unwrap_or(false);
    match editors::toggle_choice(&mut session.answers, question_id, choice_id, allow_multiple) {
        Ok(changed) => edit_response(req, session, question_id, changed),
        Err(e) => edit_error(req, e),
    }
}

fn handle_set_blank(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let blank_id = match required_i64(req, "blankId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // optionId: null clears the gap.
    let option_id = match opt_i64(req, "optionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match editors::set_blank_option(&mut session.answers, question_id, blank_id, option_id) {
        Ok(changed) => edit_response(req, session, question_id, changed),
        Err(e) => edit_error(req, e),
    }
}

fn handle_move_item(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let item_id = match required_i64(req, "itemId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let direction: Direction = match required_field(req, "direction") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match editors::move_ordering_item(&mut session.answers, question_id, item_id, direction) {
        Ok(changed) => edit_response(req, session, question_id, changed),
        Err(e) => edit_error(req, e),
    }
}

fn handle_shuffle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let item_ids: Vec<i64> = match session.question(question_id) {
        Some(q) => q.ordering_items.iter().map(|i| i.id).collect(),
        None => return edit_error(req, EditError::UnknownQuestion),
    };
    match editors::shuffle_ordering(
        &mut session.answers,
        question_id,
        &item_ids,
        &mut rand::thread_rng(),
    ) {
        Ok(changed) => edit_response(req, session, question_id, changed),
        Err(e) => edit_error(req, e),
    }
}

fn handle_drag_begin(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let item_id = match required_i64(req, "itemId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match session.drag_begin(question_id, item_id) {
        Ok(Some(source_index)) => ok(
            &req.id,
            json!({ "started": true, "sourceIndex": source_index }),
        ),
        Ok(None) => ok(&req.id, json!({ "started": false })),
        Err(e) => edit_error(req, e),
    }
}

fn handle_drag_hover(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let target_index = match required_usize(req, "targetIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let tracking = session.drag_hover(question_id, target_index);
    ok(&req.id, json!({ "tracking": tracking }))
}

fn handle_drag_commit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let question_id = session.drag.map(|d| d.question_id);
    match session.drag_commit() {
        Ok(changed) => match question_id {
            Some(question_id) => edit_response(req, session, question_id, changed),
            None => ok(&req.id, json!({ "changed": false })),
        },
        Err(e) => edit_error(req, e),
    }
}

fn handle_drag_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match editing_attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let cancelled = session.drag_cancel();
    ok(&req.id, json!({ "cancelled": cancelled }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "answers.setText" => Some(handle_set_text(state, req)),
        "answers.toggleChoice" => Some(handle_toggle_choice(state, req)),
        "answers.setBlank" => Some(handle_set_blank(state, req)),
        "answers.moveItem" => Some(handle_move_item(state, req)),
        "answers.shuffle" => Some(handle_shuffle(state, req)),
        "answers.dragBegin" => Some(handle_drag_begin(state, req)),
        "answers.dragHover" => Some(handle_drag_hover(state, req)),
        "answers.dragCommit" => Some(handle_drag_commit(state, req)),
        "answers.dragCancel" => Some(handle_drag_cancel(state, req)),
        _ => None,
    }
}
