use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of question kinds the attempt page knows how to render.
/// Anything else coming from the server is mapped to `Unknown` so a
/// schema drift never aborts opening an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    QcmSingle,
    QcmMultiple,
    TrueFalse,
    OpenShort,
    OpenLong,
    FillBlank,
    Ordering,
    Matching,
    #[serde(other)]
    Unknown,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::QcmSingle => "qcm_single",
            QuestionKind::QcmMultiple => "qcm_multiple",
            QuestionKind::TrueFalse => "true_false",
            QuestionKind::OpenShort => "open_short",
            QuestionKind::OpenLong => "open_long",
            QuestionKind::FillBlank => "fill_blank",
            QuestionKind::Ordering => "ordering",
            QuestionKind::Matching => "matching",
            QuestionKind::Unknown => "unknown",
        }
    }

    /// Kinds whose answer is a selection over `choices`. True/false is
    /// stored as a two-choice selection, same as the radio kinds.
    pub fn has_choices(&self) -> bool {
        matches!(
            self,
            QuestionKind::QcmSingle | QuestionKind::QcmMultiple | QuestionKind::TrueFalse
        )
    }

    pub fn allows_multiple_choices(&self) -> bool {
        matches!(self, QuestionKind::QcmMultiple)
    }

    pub fn is_open_text(&self) -> bool {
        matches!(self, QuestionKind::OpenShort | QuestionKind::OpenLong)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankOption {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// One gap in a fill-blank question. `label` is the author-facing name
/// referenced from the question text as `[label]`; `order` is the
/// 1-based position used by numeric placeholders like `[2]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blank {
    pub id: i64,
    #[serde(default)]
    pub label: Option<String>,
    pub order: i64,
    #[serde(default)]
    pub options: Vec<BlankOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingItem {
    pub id: i64,
    pub text: String,
    pub correct_position: i64,
}

/// Matching rows come from the server as pairs: the left prompt and the
/// right answer that belongs to it share one id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingPair {
    pub id: i64,
    pub left_text: String,
    pub right_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDefinition {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub text: String,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub blanks: Vec<Blank>,
    #[serde(default)]
    pub ordering_items: Vec<OrderingItem>,
    #[serde(default)]
    pub matching_pairs: Vec<MatchingPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkMeta {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub max_score: Option<f64>,
}

/// Whether a due date lies in the past. Accepts RFC 3339 timestamps and
/// bare `YYYY-MM-DD` dates; a bare date only counts as passed once the
/// day itself is over. Unparseable input yields `None` rather than a
/// wrong badge.
pub fn due_date_passed(raw: &str, now: DateTime<Utc>) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc) < now);
    }
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(now.date_naive() > d);
    }
    None
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredChoiceSelection {
    pub choice_id: i64,
    // The server grades each pick, but choice verdicts on the review
    // page are re-derived from the definition flag, so nothing reads
    // this.
    #[allow(dead_code)]
    #[serde(default)]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlankSelection {
    pub blank_id: i64,
    #[serde(default)]
    pub selected_option_id: Option<i64>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrderingSelection {
    pub item_id: i64,
    #[serde(default)]
    pub selected_position: Option<i64>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMatchingSelection {
    pub left_pair_id: i64,
    #[serde(default)]
    pub selected_right_pair_id: Option<i64>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

/// One per-question row of a previously saved submission, as fetched
/// from the server. Every field beyond the question id is optional:
/// older submissions predate some of the columns and a draft save may
/// carry only the parts the student touched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnswer {
    pub question_id: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub selections: Vec<StoredChoiceSelection>,
    #[serde(default)]
    pub blank_selections: Vec<StoredBlankSelection>,
    #[serde(default)]
    pub ordering_selections: Vec<StoredOrderingSelection>,
    #[serde(default)]
    pub matching_selections: Vec<StoredMatchingSelection>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Graded,
    #[serde(other)]
    Unknown,
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        SubmissionStatus::Pending
    }
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Graded => "graded",
            SubmissionStatus::Unknown => "unknown",
        }
    }
}

/// A submission after teacher marking, used by the review page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedSubmission {
    pub id: i64,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub graded_at: Option<String>,
    #[serde(default)]
    pub answers: Vec<StoredAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn question_kind_round_trips_known_tags() {
        let q: QuestionKind = serde_json::from_str("\"fill_blank\"").unwrap();
        assert_eq!(q, QuestionKind::FillBlank);
        assert_eq!(serde_json::to_string(&q).unwrap(), "\"fill_blank\"");
    }

    #[test]
    fn question_kind_maps_unexpected_tag_to_unknown() {
        let q: QuestionKind = serde_json::from_str("\"essay_with_upload\"").unwrap();
        assert_eq!(q, QuestionKind::Unknown);
    }

    #[test]
    fn question_definition_parses_with_sparse_fields() {
        let q: QuestionDefinition = serde_json::from_value(serde_json::json!({
            "id": 9,
            "type": "open_short",
            "text": "Define osmosis."
        }))
        .unwrap();
        assert_eq!(q.kind, QuestionKind::OpenShort);
        assert_eq!(q.points, 0.0);
        assert!(!q.is_required);
        assert!(q.choices.is_empty());
        assert!(q.matching_pairs.is_empty());
    }

    #[test]
    fn stored_answer_tolerates_missing_collections() {
        let a: StoredAnswer = serde_json::from_value(serde_json::json!({
            "questionId": 4,
            "text": "mitochondria"
        }))
        .unwrap();
        assert_eq!(a.question_id, 4);
        assert_eq!(a.text.as_deref(), Some("mitochondria"));
        assert!(a.selections.is_empty());
        assert!(a.score.is_none());
    }

    #[test]
    fn due_date_passed_handles_rfc3339_and_bare_dates() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(due_date_passed("2026-03-09T23:00:00Z", now), Some(true));
        assert_eq!(due_date_passed("2026-03-11T08:00:00+01:00", now), Some(false));
        assert_eq!(due_date_passed("2026-03-09", now), Some(true));
        assert_eq!(due_date_passed("2026-03-10", now), Some(false));
        assert_eq!(due_date_passed("soon", now), None);
        assert_eq!(due_date_passed("  ", now), None);
    }

    #[test]
    fn submission_status_defaults_to_pending_and_absorbs_drift() {
        let s: GradedSubmission = serde_json::from_value(serde_json::json!({ "id": 1 })).unwrap();
        assert_eq!(s.status, SubmissionStatus::Pending);
        let s: SubmissionStatus = serde_json::from_str("\"returned_for_rework\"").unwrap();
        assert_eq!(s, SubmissionStatus::Unknown);
    }
}
