#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_homeworkd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn homeworkd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "expected ok for {}: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Expect a failure and hand back its error code plus the whole error
/// object for detail asserts.
pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> (String, serde_json::Value) {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "expected error for {}: {}",
        method,
        value
    );
    let error = value.get("error").cloned().unwrap_or_else(|| json!({}));
    let code = error
        .get("code")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    (code, error)
}

pub fn homework_meta(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": "integration fixture",
        "dueDate": "2099-12-31",
        "maxScore": 10.0
    })
}

pub fn qcm_single(id: i64, choices: &[(i64, &str, bool)]) -> serde_json::Value {
    choice_question(id, "qcm_single", choices)
}

pub fn qcm_multiple(id: i64, choices: &[(i64, &str, bool)]) -> serde_json::Value {
    choice_question(id, "qcm_multiple", choices)
}

pub fn true_false(id: i64, yes_id: i64, no_id: i64, answer_yes: bool) -> serde_json::Value {
    choice_question(
        id,
        "true_false",
        &[(yes_id, "True", answer_yes), (no_id, "False", !answer_yes)],
    )
}

fn choice_question(id: i64, kind: &str, choices: &[(i64, &str, bool)]) -> serde_json::Value {
    json!({
        "id": id,
        "type": kind,
        "text": format!("choice question {id}"),
        "points": 1.0,
        "choices": choices.iter().map(|(cid, text, correct)| json!({
            "id": cid,
            "text": text,
            "isCorrect": correct
        })).collect::<Vec<_>>()
    })
}

pub fn open_text(id: i64, kind: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": kind,
        "text": format!("open question {id}"),
        "points": 2.0
    })
}

/// `blanks`: (blankId, label, order, options as (optionId, text, isCorrect)).
pub fn fill_blank(
    id: i64,
    text: &str,
    blanks: &[(i64, Option<&str>, i64, &[(i64, &str, bool)])],
) -> serde_json::Value {
    json!({
        "id": id,
        "type": "fill_blank",
        "text": text,
        "points": 1.0,
        "blanks": blanks.iter().map(|(bid, label, order, options)| json!({
            "id": bid,
            "label": label,
            "order": order,
            "options": options.iter().map(|(oid, otext, correct)| json!({
                "id": oid,
                "text": otext,
                "isCorrect": correct
            })).collect::<Vec<_>>()
        })).collect::<Vec<_>>()
    })
}

pub fn ordering(id: i64, items: &[(i64, &str)]) -> serde_json::Value {
    json!({
        "id": id,
        "type": "ordering",
        "text": format!("ordering question {id}"),
        "points": 1.0,
        "orderingItems": items.iter().enumerate().map(|(i, (iid, text))| json!({
            "id": iid,
            "text": text,
            "correctPosition": i + 1
        })).collect::<Vec<_>>()
    })
}

pub fn matching(id: i64, pairs: &[(i64, &str, &str)]) -> serde_json::Value {
    json!({
        "id": id,
        "type": "matching",
        "text": format!("matching question {id}"),
        "points": 1.0,
        "matchingPairs": pairs.iter().map(|(pid, left, right)| json!({
            "id": pid,
            "leftText": left,
            "rightText": right
        })).collect::<Vec<_>>()
    })
}

pub fn open_session(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    questions: Vec<serde_json::Value>,
) -> (String, serde_json::Value) {
    let result = request_ok(
        stdin,
        reader,
        "open",
        "homework.open",
        json!({
            "homework": homework_meta(1, "Integration homework"),
            "questions": questions,
        }),
    );
    let session_id = result
        .get("sessionId")
        .and_then(|v| v.as_str())
        .expect("sessionId")
        .to_string();
    (session_id, result)
}

/// Pull one question's block out of a session snapshot.
pub fn snapshot_question(snapshot: &serde_json::Value, question_id: i64) -> serde_json::Value {
    snapshot
        .get("questions")
        .and_then(|v| v.as_array())
        .and_then(|arr| {
            arr.iter()
                .find(|q| q.get("questionId").and_then(|v| v.as_i64()) == Some(question_id))
        })
        .cloned()
        .unwrap_or_else(|| panic!("question {} missing from snapshot", question_id))
}
