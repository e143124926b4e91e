use chrono::Utc;
use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{attempt_mut, bool_or, optional_field, required_field};
use crate::ipc::types::{AppState, Request};
use crate::model::{HomeworkMeta, QuestionDefinition, StoredAnswer};
use crate::session::{AttemptSession, SubmitError};

/// Open an attempt for the assignment the host page just fetched. Any
/// previously open attempt is discarded, like navigating away from the
/// old page.
fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let homework: HomeworkMeta = match required_field(req, "homework") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let questions: Vec<QuestionDefinition> = match required_field(req, "questions") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let stored: Vec<StoredAnswer> = match optional_field(req, "storedAnswers") {
        Ok(v) => v.unwrap_or_default(),
        Err(resp) => return resp,
    };

    tracing::info!(
        homework_id = homework.id,
        questions = questions.len(),
        stored = stored.len(),
        "opening attempt"
    );
    let session = AttemptSession::open(homework, questions, &stored);
    let snapshot = session.snapshot(Utc::now());
    state.session = Some(session);
    match serde_json::to_value(&snapshot) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", format!("{e}"), None),
    }
}

fn handle_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match serde_json::to_value(session.snapshot(Utc::now())) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", format!("{e}"), None),
    }
}

fn handle_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let closed = state.session.take().is_some();
    ok(&req.id, json!({ "closed": closed }))
}

/// Current wire payload without any phase change, used for draft
/// autosaves.
fn handle_payload(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match serde_json::to_value(session.payload()) {
        Ok(v) => ok(&req.id, json!({ "answers": v })),
        Err(e) => err(&req.id, "internal", format!("{e}"), None),
    }
}

fn handle_submit_begin(state: &mut AppState, req: &Request) -> serde_json::Value {
    let force = match bool_or(req, "force", false) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match session.begin_submit(force) {
        Ok(payload) => {
            tracing::info!(homework_id = session.homework.id, "submit started");
            match serde_json::to_value(payload) {
                Ok(v) => ok(
                    &req.id,
                    json!({
                        "sessionId": session.session_id,
                        "phase": session.phase.as_str(),
                        "answers": v,
                    }),
                ),
                Err(e) => err(&req.id, "internal", format!("{e}"), None),
            }
        }
        Err(SubmitError::RequiredUnanswered(question_ids)) => err(
            &req.id,
            "required_unanswered",
            "required questions are still blank",
            Some(json!({ "questionIds": question_ids })),
        ),
        Err(SubmitError::Locked) => err(
            &req.id,
            "locked",
            "a submit is already in flight",
            Some(json!({ "phase": "submitting" })),
        ),
        Err(SubmitError::AlreadySubmitted) => err(
            &req.id,
            "locked",
            "attempt was already submitted",
            Some(json!({ "phase": "submitted" })),
        ),
        Err(SubmitError::NotSubmitting) => {
            err(&req.id, "bad_phase", "no submit in flight", None)
        }
    }
}

fn handle_submit_resolve(state: &mut AppState, req: &Request) -> serde_json::Value {
    let accepted = match req.params.get("accepted").and_then(|v| v.as_bool()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing accepted", None),
    };
    let session = match attempt_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match session.resolve_submit(accepted) {
        Ok(phase) => {
            tracing::info!(
                homework_id = session.homework.id,
                accepted,
                "submit resolved"
            );
            ok(&req.id, json!({ "phase": phase.as_str() }))
        }
        Err(_) => err(&req.id, "bad_phase", "no submit in flight", None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "homework.open" => Some(handle_open(state, req)),
        "homework.state" => Some(handle_state(state, req)),
        "homework.close" => Some(handle_close(state, req)),
        "homework.payload" => Some(handle_payload(state, req)),
        "submit.begin" => Some(handle_submit_begin(state, req)),
        "submit.resolve" => Some(handle_submit_resolve(state, req)),
        _ => None,
    }
}
