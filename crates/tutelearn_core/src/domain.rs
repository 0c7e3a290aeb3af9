//! crates/tutelearn_core/src/domain.rs
//!
//! Defines the pure, core data structures for the learning engine.
//! These structs are independent of any database or transport format;
//! the serde derives exist because topic content arrives as JSON from
//! the content repository and session snapshots leave as JSON toward
//! the rendering layer.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

//=========================================================================================
// Topic Input
//=========================================================================================

/// Difficulty tier of a topic or question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Parses the tier string used by the content repository.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// The raw topic shape delivered by the content repository port.
///
/// Deliberately loose: the CMS payload is JSON, and validating it into a
/// [`Topic`] is the engine's job, not the adapter's. The two content
/// sequences stay as raw JSON values so that "missing" and "not an array"
/// are distinguishable failure modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicData {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub estimated_minutes: u32,
    pub learning_content: Option<serde_json::Value>,
    pub quiz_questions: Option<serde_json::Value>,
}

/// A validated, immutable topic definition.
///
/// Constructed only through [`Topic::from_data`]; once built it is never
/// consulted again by the engine (sessions take owned copies of both
/// sequences at creation time).
#[derive(Debug, Clone)]
pub struct Topic {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub estimated_minutes: u32,
    pub learning_content: Vec<ContentItem>,
    pub quiz_questions: Vec<Question>,
}

impl Topic {
    /// Validates raw repository data into a `Topic`.
    ///
    /// Fails closed: any missing sequence, non-array sequence, malformed
    /// element, or unknown difficulty tier yields `InvalidTopicData` and
    /// nothing is constructed.
    pub fn from_data(data: TopicData) -> Result<Self, EngineError> {
        let difficulty = Difficulty::parse(&data.difficulty).ok_or_else(|| {
            EngineError::InvalidTopicData(format!(
                "unknown difficulty tier '{}'",
                data.difficulty
            ))
        })?;

        let learning_content =
            parse_sequence::<ContentItem>(data.learning_content, "learningContent")?;
        let quiz_questions =
            parse_sequence::<Question>(data.quiz_questions, "quizQuestions")?;

        Ok(Self {
            id: data.id,
            title: data.title,
            description: data.description,
            difficulty,
            estimated_minutes: data.estimated_minutes,
            learning_content,
            quiz_questions,
        })
    }
}

/// Parses one of the topic's JSON sequences, rejecting missing or
/// non-array fields before touching the elements.
fn parse_sequence<T: serde::de::DeserializeOwned>(
    value: Option<serde_json::Value>,
    field: &str,
) -> Result<Vec<T>, EngineError> {
    let value = value.ok_or_else(|| {
        EngineError::InvalidTopicData(format!("missing field '{}'", field))
    })?;
    if !value.is_array() {
        return Err(EngineError::InvalidTopicData(format!(
            "field '{}' is not an array",
            field
        )));
    }
    serde_json::from_value(value).map_err(|e| {
        EngineError::InvalidTopicData(format!("malformed element in '{}': {}", field, e))
    })
}

//=========================================================================================
// Content Items and Questions
//=========================================================================================

/// One unit of instructional material consumed during the learning phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: ContentKind,
}

/// The three content variants, discriminated by a `type` tag in the
/// repository payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentKind {
    /// A block of HTML-safe text.
    Text {
        title: Option<String>,
        body: String,
    },
    /// An externally hosted video.
    Video {
        title: String,
        description: Option<String>,
        video_ref: String,
        duration_secs: u32,
    },
    /// An in-line practice quiz. Distinct from assessment questions:
    /// learning-content quizzes are never scored.
    Quiz { question: Question },
}

impl ContentItem {
    /// Returns true for the video variant.
    pub fn is_video(&self) -> bool {
        matches!(self.kind, ContentKind::Video { .. })
    }
}

/// One graded assessment item consumed during the quiz phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default = "default_question_points")]
    pub points: u32,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

fn default_question_points() -> u32 {
    10
}

/// The question variants, discriminated by a `type` tag.
///
/// Single-choice questions still carry a correct *set* (normally of size
/// one) so that grading is uniform set equality across both choice kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Single {
        options: Vec<String>,
        correct: BTreeSet<usize>,
    },
    Multiple {
        options: Vec<String>,
        correct: BTreeSet<usize>,
    },
    Text { correct: String },
}

//=========================================================================================
// Answers
//=========================================================================================

/// An answer as submitted by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmittedAnswer {
    /// Selected option indices for a single/multiple question. Order and
    /// duplicates are irrelevant; grading compares sets.
    Choice { selected: Vec<usize> },
    /// Free-text response for a text question.
    Text { response: String },
}

/// One slot of the session's answer array, parallel to the question list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerSlot {
    Unanswered,
    Choice { selected: BTreeSet<usize> },
    Text { response: String },
}

impl From<SubmittedAnswer> for AnswerSlot {
    fn from(submitted: SubmittedAnswer) -> Self {
        match submitted {
            SubmittedAnswer::Choice { selected } => AnswerSlot::Choice {
                selected: selected.into_iter().collect(),
            },
            SubmittedAnswer::Text { response } => AnswerSlot::Text { response },
        }
    }
}

impl AnswerSlot {
    /// Whether this slot has been answered at all.
    pub fn is_answered(&self) -> bool {
        !matches!(self, AnswerSlot::Unanswered)
    }
}

//=========================================================================================
// Session Phase and Output Records
//=========================================================================================

/// The coarse-grained state of a learning session. Transitions are
/// one-directional: `Learning` → `Quiz` → `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Learning,
    Quiz,
    Completed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Learning => write!(f, "learning"),
            Phase::Quiz => write!(f, "quiz"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

/// Non-authoritative per-question feedback, computed on demand by
/// re-invoking the answer validator. Never mutates score state.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerPreview {
    pub question_index: usize,
    pub answered: bool,
    pub correct: bool,
    pub points: u32,
    pub explanation: Option<String>,
}

/// The record handed to the rewards ledger once a session completes.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRecord {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub passed: bool,
    pub tute_points_earned: u32,
    pub answers: Vec<AnswerSlot>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
