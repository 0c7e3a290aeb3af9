//! crates/tutelearn_core/src/facade.rs
//!
//! The single entry point exposed to the rendering layer. Wraps the
//! session state machine: every mutation returns a fresh read-only
//! snapshot, so the renderer never touches engine internals. Failure
//! conditions from the inner components propagate unchanged; the façade
//! adds no error kinds of its own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    AnswerPreview, CompletionRecord, ContentItem, Phase, Question, SubmittedAnswer, Topic,
    TopicData,
};
use crate::error::{EngineError, EngineResult};
use crate::gate::CompletionGate;
use crate::session::LearningSession;
use crate::validator;

//=========================================================================================
// Snapshots
//=========================================================================================

/// A read-only view of the session, emitted after every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub learner_id: Uuid,
    pub topic_id: Uuid,
    pub phase: Phase,
    /// Cursor into the content list; `None` outside the learning phase.
    pub current_content_index: Option<usize>,
    /// Cursor into the question list; `None` outside the quiz phase.
    pub current_question_index: Option<usize>,
    pub total_content_items: usize,
    pub total_questions: usize,
    /// Sorted for a stable wire representation.
    pub completed_item_ids: Vec<Uuid>,
    pub answered_count: usize,
    pub score: Option<u32>,
    pub percentage: Option<u32>,
    pub passed: Option<bool>,
    pub tute_points_earned: Option<u32>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

//=========================================================================================
// The Façade
//=========================================================================================

/// Owns one learner's session and mediates every interaction with it.
#[derive(Debug)]
pub struct SessionFacade {
    session: LearningSession,
}

impl SessionFacade {
    /// Validates raw topic data and starts a session in the learning
    /// phase. Fail-closed: a validation error leaves nothing constructed.
    pub fn create(data: TopicData, learner_id: Uuid, gate: CompletionGate) -> EngineResult<Self> {
        let topic = Topic::from_data(data)?;
        Ok(Self {
            session: LearningSession::new(topic, learner_id, gate),
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session.id()
    }

    pub fn learner_id(&self) -> Uuid {
        self.session.learner_id()
    }

    pub fn topic_id(&self) -> Uuid {
        self.session.topic_id()
    }

    /// The current read-only view, without mutating anything.
    pub fn snapshot(&self) -> SessionSnapshot {
        let session = &self.session;
        let mut completed: Vec<Uuid> = session.completed_item_ids().iter().copied().collect();
        completed.sort();

        let outcome = session.outcome();
        SessionSnapshot {
            session_id: session.id(),
            learner_id: session.learner_id(),
            topic_id: session.topic_id(),
            phase: session.phase(),
            current_content_index: session.current_content_index(),
            current_question_index: session.current_question_index(),
            total_content_items: session.content_items().len(),
            total_questions: session.questions().len(),
            completed_item_ids: completed,
            answered_count: session
                .answers()
                .iter()
                .filter(|slot| slot.is_answered())
                .count(),
            score: outcome.map(|o| o.correct_count),
            percentage: outcome.map(|o| o.percentage),
            passed: outcome.map(|o| o.passed),
            tute_points_earned: outcome.map(|o| o.tute_points_earned),
            started_at: session.started_at(),
            completed_at: session.completed_at(),
        }
    }

    /// The content items in their topic order, for rendering the sidebar.
    pub fn content_items(&self) -> &[ContentItem] {
        self.session.content_items()
    }

    /// The assessment questions in their topic order.
    pub fn questions(&self) -> &[Question] {
        self.session.questions()
    }

    //=====================================================================================
    // Mutations (thin pass-throughs, each returning the post-state)
    //=====================================================================================

    pub fn mark_item_complete(&mut self, item_id: Uuid) -> EngineResult<SessionSnapshot> {
        self.session.mark_item_complete(item_id)?;
        Ok(self.snapshot())
    }

    pub fn record_video_progress(
        &mut self,
        item_id: Uuid,
        watched_secs: u32,
    ) -> EngineResult<SessionSnapshot> {
        self.session.record_video_progress(item_id, watched_secs)?;
        Ok(self.snapshot())
    }

    pub fn record_answer(
        &mut self,
        question_index: usize,
        answer: SubmittedAnswer,
    ) -> EngineResult<SessionSnapshot> {
        self.session.record_answer(question_index, answer)?;
        Ok(self.snapshot())
    }

    pub fn advance_question(&mut self) -> EngineResult<SessionSnapshot> {
        self.session.advance_question()?;
        Ok(self.snapshot())
    }

    pub fn navigate_to(&mut self, index: usize) -> EngineResult<SessionSnapshot> {
        self.session.navigate_to(index)?;
        Ok(self.snapshot())
    }

    //=====================================================================================
    // Read-only extras
    //=====================================================================================

    /// Non-authoritative immediate feedback for one question: re-runs the
    /// validator against the currently recorded answer. Cannot touch the
    /// score or point totals, which are computed only by the
    /// quiz-to-completed edge.
    pub fn preview_answer(&self, question_index: usize) -> EngineResult<AnswerPreview> {
        if self.session.phase() == Phase::Learning {
            return Err(EngineError::InvalidPhaseOperation {
                operation: "preview_answer",
                phase: self.session.phase(),
            });
        }
        let question = self.session.questions().get(question_index).ok_or(
            EngineError::OutOfRange {
                index: question_index,
                len: self.session.questions().len(),
            },
        )?;
        let answer = &self.session.answers()[question_index];
        Ok(AnswerPreview {
            question_index,
            answered: answer.is_answered(),
            correct: validator::is_correct(question, answer),
            points: question.points,
            explanation: question.explanation.clone(),
        })
    }

    /// The output-boundary record for the rewards ledger. `Some` only once
    /// the session has completed.
    pub fn completion_record(&self) -> Option<CompletionRecord> {
        let outcome = self.session.outcome()?;
        let completed_at = self.session.completed_at()?;
        Some(CompletionRecord {
            score: outcome.correct_count,
            total_questions: outcome.total_questions,
            percentage: outcome.percentage,
            passed: outcome.passed,
            tute_points_earned: outcome.tute_points_earned,
            answers: self.session.answers().to_vec(),
            started_at: self.session.started_at(),
            completed_at,
        })
    }
}
