//! crates/tutelearn_core/src/session.rs
//!
//! The learning-session state machine. Owns the phase, the two cursors,
//! the completed-item set, the video watch-time map, and the recorded
//! answers; enforces the one-directional `learning → quiz → completed`
//! lifecycle.
//!
//! Every operation validates before mutating, so a returned error means
//! the session is untouched. The engine assumes non-concurrent access:
//! each mutation is driven by a single discrete user action, and duplicate
//! deliveries (double clicks) are the caller's problem to serialize.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AnswerSlot, ContentItem, Phase, Question, SubmittedAnswer, Topic};
use crate::error::{EngineError, EngineResult};
use crate::gate::CompletionGate;
use crate::scoring::{self, ScoreBreakdown};
use crate::sequencer::Sequencer;

/// One learner's in-memory attempt at a topic.
///
/// Created from a validated [`Topic`] (owned copies of both sequences;
/// the topic itself is never consulted again) and destroyed when the
/// learner exits or starts a new attempt. There is no persistence of
/// intermediate progress across restarts.
#[derive(Debug, Clone)]
pub struct LearningSession {
    id: Uuid,
    learner_id: Uuid,
    topic_id: Uuid,
    phase: Phase,
    content: Sequencer<ContentItem>,
    questions: Sequencer<Question>,
    completed_item_ids: HashSet<Uuid>,
    video_watch_seconds: HashMap<Uuid, u32>,
    answers: Vec<AnswerSlot>,
    outcome: Option<ScoreBreakdown>,
    gate: CompletionGate,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl LearningSession {
    /// Starts a fresh session in the learning phase.
    pub fn new(topic: Topic, learner_id: Uuid, gate: CompletionGate) -> Self {
        let answers = vec![AnswerSlot::Unanswered; topic.quiz_questions.len()];
        Self {
            id: Uuid::new_v4(),
            learner_id,
            topic_id: topic.id,
            phase: Phase::Learning,
            content: Sequencer::new(topic.learning_content),
            questions: Sequencer::new(topic.quiz_questions),
            completed_item_ids: HashSet::new(),
            video_watch_seconds: HashMap::new(),
            answers,
            outcome: None,
            gate,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    //=====================================================================================
    // Read accessors
    //=====================================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn learner_id(&self) -> Uuid {
        self.learner_id
    }

    pub fn topic_id(&self) -> Uuid {
        self.topic_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The cursor into the content list. Only meaningful while learning.
    pub fn current_content_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Learning => Some(self.content.index()),
            _ => None,
        }
    }

    /// The cursor into the question list. Only meaningful during the quiz.
    pub fn current_question_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Quiz => Some(self.questions.index()),
            _ => None,
        }
    }

    pub fn content_items(&self) -> &[ContentItem] {
        self.content.items()
    }

    pub fn questions(&self) -> &[Question] {
        self.questions.items()
    }

    pub fn completed_item_ids(&self) -> &HashSet<Uuid> {
        &self.completed_item_ids
    }

    pub fn video_watch_seconds(&self) -> &HashMap<Uuid, u32> {
        &self.video_watch_seconds
    }

    pub fn answers(&self) -> &[AnswerSlot] {
        &self.answers
    }

    /// The final score breakdown; `Some` only once completed, then
    /// immutable.
    pub fn outcome(&self) -> Option<&ScoreBreakdown> {
        self.outcome.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    //=====================================================================================
    // Mutating operations
    //=====================================================================================

    /// Marks a content item complete.
    ///
    /// Valid only while learning. The completion gate is consulted first;
    /// a refusal changes nothing. Re-marking an already-completed id is an
    /// idempotent no-op: it neither advances the cursor nor re-fires the
    /// learning→quiz edge. A first-time mark advances the cursor, or,
    /// when the cursor sits on the last item, transitions the session
    /// into the quiz phase exactly once.
    pub fn mark_item_complete(&mut self, item_id: Uuid) -> EngineResult<()> {
        // Idempotence first: a duplicate click lands here even after the
        // learning→quiz edge has fired, and must stay a no-op.
        if self.completed_item_ids.contains(&item_id) {
            return Ok(());
        }
        self.require_phase(Phase::Learning, "mark_item_complete")?;

        let item = self
            .content
            .items()
            .iter()
            .find(|item| item.id == item_id)
            .ok_or(EngineError::UnknownItem(item_id))?;

        let watch = self.video_watch_seconds.get(&item_id).copied();
        if !self.gate.can_complete(item, watch) {
            return Err(EngineError::GateNotSatisfied {
                item_id,
                reason: format!(
                    "watched {}s of a video requiring {:.0}% viewed",
                    watch.unwrap_or(0),
                    self.gate.min_watch_fraction() * 100.0
                ),
            });
        }

        self.completed_item_ids.insert(item_id);

        if self.content.is_last() {
            self.enter_quiz_phase();
        } else {
            self.content.advance();
        }
        Ok(())
    }

    /// Records the furthest watch position seen for a video item.
    ///
    /// Monotonic: a smaller report (replay from the start) never regresses
    /// the stored maximum. Not phase-restricted; only the stored maximum
    /// feeds the completion gate and the video bonus.
    pub fn record_video_progress(&mut self, item_id: Uuid, watched_secs: u32) -> EngineResult<()> {
        let item = self
            .content
            .items()
            .iter()
            .find(|item| item.id == item_id)
            .ok_or(EngineError::UnknownItem(item_id))?;
        if !item.is_video() {
            return Err(EngineError::NotVideo(item_id));
        }

        let entry = self.video_watch_seconds.entry(item_id).or_insert(0);
        *entry = (*entry).max(watched_secs);
        Ok(())
    }

    /// Overwrites the answer slot for `question_index`. No grading happens
    /// here; grading is deferred to the quiz→completed edge.
    pub fn record_answer(
        &mut self,
        question_index: usize,
        answer: SubmittedAnswer,
    ) -> EngineResult<()> {
        self.require_phase(Phase::Quiz, "record_answer")?;
        if question_index >= self.answers.len() {
            return Err(EngineError::OutOfRange {
                index: question_index,
                len: self.answers.len(),
            });
        }
        self.answers[question_index] = answer.into();
        Ok(())
    }

    /// Moves to the next question. From the last question this grades
    /// the session and completes it instead. The quiz→completed edge
    /// fires exactly once; the phase check rejects any later call.
    pub fn advance_question(&mut self) -> EngineResult<()> {
        self.require_phase(Phase::Quiz, "advance_question")?;

        if self.questions.is_last() {
            let outcome = scoring::finalize(
                self.questions.items(),
                &self.answers,
                self.content.items(),
                &self.video_watch_seconds,
            );
            self.outcome = Some(outcome);
            self.completed_at = Some(Utc::now());
            self.phase = Phase::Completed;
        } else {
            self.questions.advance();
        }
        Ok(())
    }

    /// Re-points the cursor of the current phase to any valid index.
    /// Rejected once the session has completed.
    pub fn navigate_to(&mut self, index: usize) -> EngineResult<()> {
        match self.phase {
            Phase::Learning => self.content.jump_to(index),
            Phase::Quiz => self.questions.jump_to(index),
            Phase::Completed => Err(EngineError::InvalidPhaseOperation {
                operation: "navigate_to",
                phase: self.phase,
            }),
        }
    }

    //=====================================================================================
    // Internals
    //=====================================================================================

    fn require_phase(&self, expected: Phase, operation: &'static str) -> EngineResult<()> {
        if self.phase != expected {
            return Err(EngineError::InvalidPhaseOperation {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// The one-shot learning→quiz edge: question cursor to zero, answer
    /// slots reset to unanswered.
    fn enter_quiz_phase(&mut self) {
        self.phase = Phase::Quiz;
        self.questions.reset();
        self.answers = vec![AnswerSlot::Unanswered; self.questions.len()];
    }
}
