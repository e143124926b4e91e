use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::answers::{build_default, is_answered, reconcile, AnswerMap, AnswerState};
use crate::blanks::{blank_layout, TextSegment};
use crate::editors::{self, EditError};
use crate::model::{
    due_date_passed, GradedSubmission, HomeworkMeta, QuestionDefinition, QuestionKind,
    StoredAnswer,
};
use crate::review::{build_overlay, QuestionOverlay};
use crate::wire::{serialize_answers, WireAnswer};

/// Where the attempt stands. Edits are only accepted in `Editing`;
/// `Submitting` locks the answers while the host page talks to the
/// server, and the outcome decides between unlock and `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    Submitted,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Editing => "editing",
            Phase::Submitting => "submitting",
            Phase::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub question_id: i64,
    pub item_id: i64,
    pub source_index: usize,
    pub hover_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    Locked,
    AlreadySubmitted,
    RequiredUnanswered(Vec<i64>),
    NotSubmitting,
}

/// One open homework attempt. Owns the answer map plus the transient
/// interaction state (drag in flight, armed matching prompts) that
/// dies with the session.
pub struct AttemptSession {
    pub session_id: String,
    pub homework: HomeworkMeta,
    pub questions: Vec<QuestionDefinition>,
    pub answers: AnswerMap,
    pub phase: Phase,
    pub drag: Option<DragState>,
    pub match_focus: HashMap<i64, i64>,
}

impl AttemptSession {
    /// Build the session for an assignment: defaults for every
    /// question, then the stored submission merged on top.
    pub fn open(
        homework: HomeworkMeta,
        questions: Vec<QuestionDefinition>,
        stored: &[StoredAnswer],
    ) -> Self {
        let stored_by_question: HashMap<i64, &StoredAnswer> =
            stored.iter().map(|s| (s.question_id, s)).collect();
        let mut rng = rand::thread_rng();
        let answers = questions
            .iter()
            .map(|q| {
                let defaults = build_default(q, &mut rng);
                let merged = reconcile(q, defaults, stored_by_question.get(&q.id).copied());
                (q.id, merged)
            })
            .collect();
        AttemptSession {
            session_id: Uuid::new_v4().to_string(),
            homework,
            questions,
            answers,
            phase: Phase::Editing,
            drag: None,
            match_focus: HashMap::new(),
        }
    }

    pub fn question(&self, question_id: i64) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn can_edit(&self) -> bool {
        self.phase == Phase::Editing
    }

    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.answers.get(&q.id).is_some_and(is_answered))
            .count()
    }

    pub fn unanswered_required(&self) -> Vec<i64> {
        self.questions
            .iter()
            .filter(|q| q.is_required && !self.answers.get(&q.id).is_some_and(is_answered))
            .map(|q| q.id)
            .collect()
    }

    pub fn payload(&self) -> Vec<WireAnswer> {
        serialize_answers(&self.questions, &self.answers)
    }

    /// Lock the attempt and hand back the payload the host page should
    /// post. Required questions left blank block the transition unless
    /// the student confirmed via `force`.
    pub fn begin_submit(&mut self, force: bool) -> Result<Vec<WireAnswer>, SubmitError> {
        match self.phase {
            Phase::Submitting => return Err(SubmitError::Locked),
            Phase::Submitted => return Err(SubmitError::AlreadySubmitted),
            Phase::Editing => {}
        }
        if !force {
            let missing = self.unanswered_required();
            if !missing.is_empty() {
                return Err(SubmitError::RequiredUnanswered(missing));
            }
        }
        self.phase = Phase::Submitting;
        self.drag = None;
        self.match_focus.clear();
        Ok(self.payload())
    }

    /// Outcome of the server call. Success finalizes the attempt,
    /// failure reopens it for editing so nothing the student typed is
    /// lost.
    pub fn resolve_submit(&mut self, accepted: bool) -> Result<Phase, SubmitError> {
        if self.phase != Phase::Submitting {
            return Err(SubmitError::NotSubmitting);
        }
        self.phase = if accepted {
            Phase::Submitted
        } else {
            Phase::Editing
        };
        Ok(self.phase)
    }

    /// Arm a drag on an ordering row. Unknown items are ignored rather
    /// than failing, a drag handle can outlive a concurrent reshuffle.
    pub fn drag_begin(
        &mut self,
        question_id: i64,
        item_id: i64,
    ) -> Result<Option<usize>, EditError> {
        let source_index = match self.answers.get(&question_id) {
            Some(AnswerState::Ordering { sequence }) => {
                sequence.iter().position(|&id| id == item_id)
            }
            Some(_) => return Err(EditError::WrongKind),
            None => return Err(EditError::UnknownQuestion),
        };
        self.drag = source_index.map(|source_index| DragState {
            question_id,
            item_id,
            source_index,
            hover_index: None,
        });
        Ok(source_index)
    }

    /// Remember the row currently hovered. Returns false if no drag is
    /// armed (stray events after a cancel).
    pub fn drag_hover(&mut self, question_id: i64, target_index: usize) -> bool {
        match self.drag.as_mut() {
            Some(drag) if drag.question_id == question_id => {
                drag.hover_index = Some(target_index);
                true
            }
            _ => false,
        }
    }

    pub fn drag_commit(&mut self) -> Result<bool, EditError> {
        let Some(drag) = self.drag.take() else {
            return Ok(false);
        };
        match drag.hover_index {
            Some(target) if target != drag.source_index => editors::reorder_by_drag(
                &mut self.answers,
                drag.question_id,
                drag.source_index,
                target,
            ),
            _ => Ok(false),
        }
    }

    pub fn drag_cancel(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        let overdue = self
            .homework
            .due_date
            .as_deref()
            .and_then(|raw| due_date_passed(raw, now));
        SessionSnapshot {
            session_id: self.session_id.clone(),
            phase: self.phase.as_str(),
            homework: HomeworkView {
                id: self.homework.id,
                title: self.homework.title.clone(),
                description: self.homework.description.clone(),
                due_date: self.homework.due_date.clone(),
                max_score: self.homework.max_score,
                overdue,
            },
            answered_count: self.answered_count(),
            total_questions: self.questions.len(),
            questions: self
                .questions
                .iter()
                .map(|q| QuestionAnswerView {
                    question_id: q.id,
                    kind: q.kind,
                    text: q.text.clone(),
                    points: q.points,
                    is_required: q.is_required,
                    answered: self.answers.get(&q.id).is_some_and(is_answered),
                    answer: self
                        .answers
                        .get(&q.id)
                        .cloned()
                        .unwrap_or(AnswerState::Empty),
                    segments: (q.kind == QuestionKind::FillBlank)
                        .then(|| blank_layout(&q.text, &q.blanks)),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: &'static str,
    pub homework: HomeworkView,
    pub answered_count: usize,
    pub total_questions: usize,
    pub questions: Vec<QuestionAnswerView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkView {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdue: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswerView {
    pub question_id: i64,
    pub kind: QuestionKind,
    pub text: String,
    pub points: f64,
    pub is_required: bool,
    pub answered: bool,
    pub answer: AnswerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<TextSegment>>,
}

/// Read-only counterpart of `AttemptSession` for the review page.
pub struct ReviewSession {
    pub review_id: String,
    pub submission: GradedSubmission,
    pub questions: Vec<QuestionDefinition>,
}

impl ReviewSession {
    pub fn open(submission: GradedSubmission, questions: Vec<QuestionDefinition>) -> Self {
        ReviewSession {
            review_id: Uuid::new_v4().to_string(),
            submission,
            questions,
        }
    }

    pub fn question(&self, question_id: i64) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn stored_answer(&self, question_id: i64) -> Option<&StoredAnswer> {
        self.submission
            .answers
            .iter()
            .find(|a| a.question_id == question_id)
    }

    pub fn snapshot(&self) -> ReviewSnapshot {
        ReviewSnapshot {
            review_id: self.review_id.clone(),
            submission: SubmissionView {
                id: self.submission.id,
                status: self.submission.status.as_str(),
                score: self.submission.score,
                max_score: self.submission.max_score,
                submitted_at: self.submission.submitted_at.clone(),
                graded_at: self.submission.graded_at.clone(),
            },
            questions: self
                .questions
                .iter()
                .map(|q| build_overlay(q, self.stored_answer(q.id)))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSnapshot {
    pub review_id: String,
    pub submission: SubmissionView,
    pub questions: Vec<QuestionOverlay>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub id: i64,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<String>,
}
