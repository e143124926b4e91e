use serde_json::json;

use crate::geometry::{connector_lines, AnchorRect, Rect};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{required_field, required_i64, required_str, review_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::{GradedSubmission, QuestionDefinition, QuestionKind};
use crate::review::{correct_pairs, student_pairs};
use crate::session::ReviewSession;

/// Open the read-only review of a graded submission. The overlay is
/// rebuilt from scratch on every open, so reopening after a regrade
/// shows the fresh verdicts.
fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission: GradedSubmission = match required_field(req, "submission") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let questions: Vec<QuestionDefinition> = match required_field(req, "questions") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    tracing::info!(
        submission_id = submission.id,
        status = submission.status.as_str(),
        questions = questions.len(),
        "opening review"
    );
    let review = ReviewSession::open(submission, questions);
    let snapshot = review.snapshot();
    state.review = Some(review);
    match serde_json::to_value(&snapshot) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", format!("{e}"), None),
    }
}

fn handle_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    let review = match review_ref(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match serde_json::to_value(review.snapshot()) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", format!("{e}"), None),
    }
}

fn handle_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let closed = state.review.take().is_some();
    ok(&req.id, json!({ "closed": closed }))
}

/// Connector lines for the review page's matching widget. `view`
/// selects whose matches to draw: the student's stored ones or the
/// canonical solution.
fn handle_lines(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(req, "questionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let view = match required_str(req, "view") {
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
    let review = match review_ref(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let Some(question) = review.question(question_id) else {
        return err(&req.id, "not_found", "unknown question", None);
    };
    if question.kind != QuestionKind::Matching {
        return err(
            &req.id,
            "wrong_kind",
            "operation does not apply to this question kind",
            None,
        );
    }
    let pairs = match view.as_str() {
        "student" => student_pairs(question, review.stored_answer(question_id)),
        "correct" => correct_pairs(question),
        other => {
            return err(
                &req.id,
                "bad_params",
                format!("view must be student or correct, got {}", other),
                None,
            )
        }
    };
    let lines = connector_lines(&container, &left_anchors, &right_anchors, &pairs);
    match serde_json::to_value(lines) {
        Ok(v) => ok(&req.id, json!({ "view": view, "lines": v })),
        Err(e) => err(&req.id, "internal", format!("{e}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "review.open" => Some(handle_open(state, req)),
        "review.state" => Some(handle_state(state, req)),
        "review.close" => Some(handle_close(state, req)),
        "review.lines" => Some(handle_lines(state, req)),
        _ => None,
    }
}
