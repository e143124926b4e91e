mod test_support;

use serde_json::json;
use test_support::{
    open_session, open_text, qcm_single, request, request_err, request_ok, spawn_sidecar,
};

fn questions_with_required_essay() -> Vec<serde_json::Value> {
    let mut essay = open_text(1, "open_short");
    essay["isRequired"] = json!(true);
    vec![essay, qcm_single(2, &[(21, "yes", true), (22, "no", false)])]
}

#[test]
fn submit_is_blocked_until_required_questions_are_answered() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let (session_id, _) = open_session(
        &mut stdin,
        &mut reader,
        questions_with_required_essay(),
    );

    let (code, error) = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "submit.begin",
        json!({ "sessionId": session_id }),
    );
    assert_eq!(code, "required_unanswered");
    assert_eq!(error["details"]["questionIds"], json!([1]));

    // The student can override after the confirm dialog.
    let forced = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "submit.begin",
        json!({ "sessionId": session_id, "force": true }),
    );
    assert_eq!(forced["phase"].as_str(), Some("submitting"));

    // Rejected by the server: back to editing with answers intact.
    let resolved = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "submit.resolve",
        json!({ "sessionId": session_id, "accepted": false }),
    );
    assert_eq!(resolved["phase"].as_str(), Some("editing"));
}

#[test]
fn submit_locks_edits_and_settles_into_submitted() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let (session_id, _) = open_session(
        &mut stdin,
        &mut reader,
        questions_with_required_essay(),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "answers.setText",
        json!({ "sessionId": session_id, "questionId": 1, "text": "an answer" }),
    );
    let begun = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "submit.begin",
        json!({ "sessionId": session_id }),
    );
    assert_eq!(begun["phase"].as_str(), Some("submitting"));

    // Payload carries one row per question; sections that do not apply
    // to the kind are left out entirely.
    let rows = begun["answers"].as_array().expect("answer rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["questionId"].as_i64(), Some(1));
    assert_eq!(rows[0]["text"].as_str(), Some("an answer"));
    assert!(rows[0].get("orderingSequence").is_none());
    assert!(rows[0].get("blankAnswers").is_none());
    assert!(rows[0].get("matchingAnswers").is_none());
    assert_eq!(rows[1]["selectedChoiceIds"], json!([]));

    // In flight: no edits, no second submit.
    let (code, error) = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "answers.setText",
        json!({ "sessionId": session_id, "questionId": 1, "text": "too late" }),
    );
    assert_eq!(code, "locked");
    assert_eq!(error["details"]["phase"].as_str(), Some("submitting"));

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "submit.begin",
        json!({ "sessionId": session_id }),
    );
    assert_eq!(code, "locked");

    let settled = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "submit.resolve",
        json!({ "sessionId": session_id, "accepted": true }),
    );
    assert_eq!(settled["phase"].as_str(), Some("submitted"));

    let (code, error) = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "answers.toggleChoice",
        json!({ "sessionId": session_id, "questionId": 2, "choiceId": 21 }),
    );
    assert_eq!(code, "locked");
    assert_eq!(error["details"]["phase"].as_str(), Some("submitted"));

    let (code, error) = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "submit.begin",
        json!({ "sessionId": session_id }),
    );
    assert_eq!(code, "locked");
    assert_eq!(error["details"]["phase"].as_str(), Some("submitted"));

    // Reads stay open after submission.
    let state = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "homework.state",
        json!({ "sessionId": session_id }),
    );
    assert_eq!(state["phase"].as_str(), Some("submitted"));

    // No submit in flight any more.
    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "9",
        "submit.resolve",
        json!({ "sessionId": session_id, "accepted": true }),
    );
    assert_eq!(code, "bad_phase");
}

#[test]
fn resolve_needs_an_explicit_verdict() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let (session_id, _) = open_session(
        &mut stdin,
        &mut reader,
        vec![qcm_single(1, &[(11, "only", true)])],
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "submit.begin",
        json!({ "sessionId": session_id }),
    );
    let verdictless = request(
        &mut stdin,
        &mut reader,
        "2",
        "submit.resolve",
        json!({ "sessionId": session_id }),
    );
    assert_eq!(verdictless["ok"].as_bool(), Some(false));
    assert_eq!(
        verdictless["error"]["code"].as_str(),
        Some("bad_params")
    );
}
