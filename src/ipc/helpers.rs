use serde_json::json;

use crate::editors::EditError;
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::session::{AttemptSession, ReviewSession};

/// Param pluckers. The error side is a finished response envelope so
/// handlers can bubble it with `?`.
pub fn required_i64(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn required_usize(req: &Request, key: &str) -> Result<usize, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Missing or null reads as `None`; any other non-integer is an error.
pub fn opt_i64(req: &Request, key: &str) -> Result<Option<i64>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be integer or null", key),
                None,
            )
        }),
    }
}

pub fn bool_or(req: &Request, key: &str, default: bool) -> Result<bool, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(default),
        Some(v) if v.is_null() => Ok(default),
        Some(v) => v.as_bool().ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be boolean", key),
                None,
            )
        }),
    }
}

/// Deserialize a typed block out of `params.<key>`.
pub fn required_field<T: serde::de::DeserializeOwned>(
    req: &Request,
    key: &str,
) -> Result<T, serde_json::Value> {
    let Some(raw) = req.params.get(key) else {
        return Err(err(&req.id, "bad_params", format!("missing {}", key), None));
    };
    serde_json::from_value(raw.clone()).map_err(|e| {
        err(
            &req.id,
            "bad_params",
            format!("invalid {}: {}", key, e),
            None,
        )
    })
}

pub fn optional_field<T: serde::de::DeserializeOwned>(
    req: &Request,
    key: &str,
) -> Result<Option<T>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(raw) => serde_json::from_value(raw.clone()).map(Some).map_err(|e| {
            err(
                &req.id,
                "bad_params",
                format!("invalid {}: {}", key, e),
                None,
            )
        }),
    }
}

/// The open attempt, after checking the caller still talks about the
/// same one. A `sessionId` from a closed attempt means the host page
/// raced a navigation; it gets a dedicated code so it can reopen.
pub fn attempt_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut AttemptSession, serde_json::Value> {
    let Some(session) = state.session.as_mut() else {
        return Err(err(&req.id, "no_session", "no open attempt", None));
    };
    if let Some(claimed) = req.params.get("sessionId").and_then(|v| v.as_str()) {
        if claimed != session.session_id {
            return Err(err(
                &req.id,
                "stale_session",
                "attempt was reopened since this page loaded",
                Some(json!({ "sessionId": session.session_id })),
            ));
        }
    }
    Ok(session)
}

/// Like `attempt_mut`, but the attempt must also accept edits.
pub fn editing_attempt_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut AttemptSession, serde_json::Value> {
    let id = req.id.clone();
    let session = attempt_mut(state, req)?;
    if !session.can_edit() {
        return Err(err(
            &id,
            "locked",
            "attempt is not editable",
            Some(json!({ "phase": session.phase.as_str() })),
        ));
    }
    Ok(session)
}

pub fn review_ref<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a ReviewSession, serde_json::Value> {
    let Some(review) = state.review.as_ref() else {
        return Err(err(&req.id, "no_review", "no open review", None));
    };
    if let Some(claimed) = req.params.get("reviewId").and_then(|v| v.as_str()) {
        if claimed != review.review_id {
            return Err(err(
                &req.id,
                "stale_review",
                "review was reopened since this page loaded",
                Some(json!({ "reviewId": review.review_id })),
            ));
        }
    }
    Ok(review)
}

pub fn edit_error(req: &Request, e: EditError) -> serde_json::Value {
    match e {
        EditError::UnknownQuestion => err(&req.id, "not_found", "unknown question", None),
        EditError::WrongKind => err(
            &req.id,
            "wrong_kind",
            "operation does not apply to this question kind",
            None,
        ),
    }
}
