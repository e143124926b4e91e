mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar};

fn graded_review_params() -> serde_json::Value {
    json!({
        "submission": {
            "id": 500,
            "status": "graded",
            "score": 4.5,
            "maxScore": 10.0,
            "submittedAt": "2026-03-01T10:00:00Z",
            "gradedAt": "2026-03-02T09:30:00Z",
            "answers": [
                { "questionId": 1, "selections": [{ "choiceId": 12, "isCorrect": true }] },
                { "questionId": 2, "text": "my essay", "score": 1.5 },
                {
                    "questionId": 3,
                    "blankSelections": [
                        { "blankId": 61, "selectedOptionId": 612, "isCorrect": false }
                    ]
                },
                {
                    "questionId": 4,
                    "orderingSelections": [
                        { "itemId": 72, "selectedPosition": 1 },
                        { "itemId": 71, "selectedPosition": 2, "isCorrect": true }
                    ]
                },
                {
                    "questionId": 5,
                    "matchingSelections": [
                        { "leftPairId": 81, "selectedRightPairId": 82 }
                    ]
                }
            ]
        },
        "questions": [
            {
                "id": 1,
                "type": "qcm_single",
                "text": "2 + 2 = ?",
                "points": 1.0,
                "choices": [
                    { "id": 11, "text": "4", "isCorrect": true },
                    { "id": 12, "text": "5" }
                ]
            },
            { "id": 2, "type": "open_long", "text": "Essay", "points": 3.0 },
            {
                "id": 3,
                "type": "fill_blank",
                "text": "Sky is [1].",
                "points": 2.0,
                "blanks": [
                    {
                        "id": 61,
                        "order": 1,
                        "options": [
                            { "id": 611, "text": "blue", "isCorrect": true },
                            { "id": 612, "text": "green" }
                        ]
                    },
                    {
                        "id": 62,
                        "order": 2,
                        "options": [{ "id": 621, "text": "high", "isCorrect": true }]
                    }
                ]
            },
            {
                "id": 4,
                "type": "ordering",
                "text": "Count up",
                "points": 2.0,
                "orderingItems": [
                    { "id": 71, "text": "one", "correctPosition": 1 },
                    { "id": 72, "text": "two", "correctPosition": 2 },
                    { "id": 73, "text": "three", "correctPosition": 3 }
                ]
            },
            {
                "id": 5,
                "type": "matching",
                "text": "Sounds",
                "points": 2.0,
                "matchingPairs": [
                    { "id": 81, "leftText": "cat", "rightText": "meow" },
                    { "id": 82, "leftText": "dog", "rightText": "woof" }
                ]
            }
        ]
    })
}

fn overlay(result: &serde_json::Value, question_id: i64) -> serde_json::Value {
    result["questions"]
        .as_array()
        .expect("questions")
        .iter()
        .find(|q| q["questionId"].as_i64() == Some(question_id))
        .cloned()
        .unwrap_or_else(|| panic!("overlay {} missing", question_id))
}

#[test]
fn overlays_mark_each_kind_against_the_key() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "review.open",
        graded_review_params(),
    );

    assert_eq!(
        result["submission"],
        json!({
            "id": 500,
            "status": "graded",
            "score": 4.5,
            "maxScore": 10.0,
            "submittedAt": "2026-03-01T10:00:00Z",
            "gradedAt": "2026-03-02T09:30:00Z"
        })
    );

    // Wrong choice picked: the definition's isCorrect decides, even
    // against a stored flag claiming otherwise.
    let q1 = overlay(&result, 1);
    assert_eq!(
        q1["review"],
        json!({
            "kind": "choice",
            "choices": [
                { "choiceId": 11, "text": "4", "isCorrect": true, "selected": false },
                {
                    "choiceId": 12,
                    "text": "5",
                    "isCorrect": false,
                    "selected": true,
                    "status": "incorrect"
                }
            ]
        })
    );

    let q2 = overlay(&result, 2);
    assert_eq!(q2["score"].as_f64(), Some(1.5));
    assert_eq!(
        q2["review"],
        json!({ "kind": "text", "text": "my essay", "answered": true })
    );

    let q3 = overlay(&result, 3);
    assert_eq!(
        q3["review"]["blanks"],
        json!([
            {
                "blankId": 61,
                "order": 1,
                "selectedOptionId": 612,
                "selectedText": "green",
                "status": "incorrect",
                "correctText": "blue"
            },
            {
                "blankId": 62,
                "order": 2,
                "status": "not_answered",
                "correctText": "high"
            }
        ])
    );
    assert_eq!(
        q3["review"]["segments"],
        json!([
            { "kind": "text", "text": "Sky is " },
            { "kind": "blank", "blankId": 61 },
            { "kind": "text", "text": "." },
            { "kind": "blank", "blankId": 62 }
        ])
    );

    // The teacher override on item 71 beats the position mismatch, and
    // the unplaced item sinks below the placed ones.
    let q4 = overlay(&result, 4);
    assert_eq!(
        q4["review"]["studentRows"],
        json!([
            {
                "itemId": 72,
                "text": "two",
                "selectedPosition": 1,
                "correctPosition": 2,
                "status": "incorrect"
            },
            {
                "itemId": 71,
                "text": "one",
                "selectedPosition": 2,
                "correctPosition": 1,
                "status": "correct"
            },
            {
                "itemId": 73,
                "text": "three",
                "correctPosition": 3,
                "status": "not_answered"
            }
        ])
    );
    assert_eq!(
        q4["review"]["correctRows"],
        json!([
            { "itemId": 71, "text": "one", "correctPosition": 1 },
            { "itemId": 72, "text": "two", "correctPosition": 2 },
            { "itemId": 73, "text": "three", "correctPosition": 3 }
        ])
    );

    let q5 = overlay(&result, 5);
    assert_eq!(
        q5["review"]["studentRows"],
        json!([
            {
                "leftPairId": 81,
                "leftText": "cat",
                "selectedRightPairId": 82,
                "selectedRightText": "woof",
                "status": "incorrect"
            },
            { "leftPairId": 82, "leftText": "dog", "status": "not_answered" }
        ])
    );
    assert_eq!(
        q5["review"]["correctRows"],
        json!([
            { "leftPairId": 81, "leftText": "cat", "rightText": "meow" },
            { "leftPairId": 82, "leftText": "dog", "rightText": "woof" }
        ])
    );

    // Re-reading the same review is stable.
    let review_id = result["reviewId"].as_str().expect("reviewId").to_string();
    let again = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "review.state",
        json!({ "reviewId": review_id }),
    );
    assert_eq!(again["questions"], result["questions"]);
}

#[test]
fn review_lines_draw_student_or_correct_matches() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "review.open",
        graded_review_params(),
    );
    let review_id = opened["reviewId"].as_str().expect("reviewId").to_string();

    let anchors = json!({
        "reviewId": review_id,
        "questionId": 5,
        "container": { "x": 0.0, "y": 0.0, "width": 320.0, "height": 120.0 },
        "leftAnchors": [
            { "pairId": 81, "x": 0.0, "y": 0.0, "width": 100.0, "height": 40.0 },
            { "pairId": 82, "x": 0.0, "y": 60.0, "width": 100.0, "height": 40.0 }
        ],
        "rightAnchors": [
            { "pairId": 81, "x": 220.0, "y": 0.0, "width": 100.0, "height": 40.0 },
            { "pairId": 82, "x": 220.0, "y": 60.0, "width": 100.0, "height": 40.0 }
        ]
    });

    let mut student_params = anchors.clone();
    student_params["view"] = json!("student");
    let student = request_ok(&mut stdin, &mut reader, "2", "review.lines", student_params);
    assert_eq!(student["view"].as_str(), Some("student"));
    let student_lines = student["lines"].as_array().expect("lines");
    assert_eq!(student_lines.len(), 1);
    assert_eq!(student_lines[0]["leftPairId"].as_i64(), Some(81));
    assert_eq!(student_lines[0]["rightPairId"].as_i64(), Some(82));

    let mut correct_params = anchors.clone();
    correct_params["view"] = json!("correct");
    let correct = request_ok(&mut stdin, &mut reader, "3", "review.lines", correct_params);
    let correct_lines = correct["lines"].as_array().expect("lines");
    assert_eq!(correct_lines.len(), 2);
    assert_eq!(correct_lines[0]["leftPairId"].as_i64(), Some(81));
    assert_eq!(correct_lines[0]["rightPairId"].as_i64(), Some(81));
    assert_eq!(correct_lines[1]["rightPairId"].as_i64(), Some(82));

    let mut sideways_params = anchors.clone();
    sideways_params["view"] = json!("teacher");
    let (code, _) = request_err(&mut stdin, &mut reader, "4", "review.lines", sideways_params);
    assert_eq!(code, "bad_params");

    let mut choice_params = anchors.clone();
    choice_params["view"] = json!("student");
    choice_params["questionId"] = json!(1);
    let (code, _) = request_err(&mut stdin, &mut reader, "5", "review.lines", choice_params);
    assert_eq!(code, "wrong_kind");

    let mut missing_params = anchors;
    missing_params["view"] = json!("student");
    missing_params["questionId"] = json!(404);
    let (code, _) = request_err(&mut stdin, &mut reader, "6", "review.lines", missing_params);
    assert_eq!(code, "not_found");
}
