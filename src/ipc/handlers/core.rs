use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "session": state.session.as_ref().map(|s| json!({
                "sessionId": s.session_id,
                "homeworkId": s.homework.id,
                "phase": s.phase.as_str(),
            })),
            "review": state.review.as_ref().map(|r| json!({
                "reviewId": r.review_id,
                "submissionId": r.submission.id,
            })),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        _ => None,
    }
}
