//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation
//! of the `TopicRepository` and `RewardsLedger` ports from the core crate.
//! It handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use tutelearn_core::domain::{CompletionRecord, TopicData};
use tutelearn_core::ports::{PortError, PortResult, RewardsLedger, TopicRepository};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the content-repository and
/// rewards-ledger ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct TopicRecord {
    id: Uuid,
    title: String,
    description: Option<String>,
    difficulty: String,
    estimated_minutes: i32,
}

/// Content items and questions are stored as ordered jsonb payloads; the
/// engine owns parsing them into their sum types.
#[derive(FromRow)]
struct PayloadRecord {
    payload: serde_json::Value,
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `TopicRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl TopicRepository for DbAdapter {
    async fn fetch_topic(&self, topic_id: Uuid) -> PortResult<TopicData> {
        let topic = sqlx::query_as::<_, TopicRecord>(
            "SELECT id, title, description, difficulty, estimated_minutes \
             FROM topics WHERE id = $1",
        )
        .bind(topic_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Topic {} not found", topic_id))
            }
            _ => unexpected(e),
        })?;

        let content_rows = sqlx::query_as::<_, PayloadRecord>(
            "SELECT payload FROM content_items WHERE topic_id = $1 ORDER BY position ASC",
        )
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let question_rows = sqlx::query_as::<_, PayloadRecord>(
            "SELECT payload FROM questions WHERE topic_id = $1 ORDER BY position ASC",
        )
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(TopicData {
            id: topic.id,
            title: topic.title,
            description: topic.description,
            difficulty: topic.difficulty,
            estimated_minutes: topic.estimated_minutes.max(0) as u32,
            learning_content: Some(serde_json::Value::Array(
                content_rows.into_iter().map(|r| r.payload).collect(),
            )),
            quiz_questions: Some(serde_json::Value::Array(
                question_rows.into_iter().map(|r| r.payload).collect(),
            )),
        })
    }
}

//=========================================================================================
// `RewardsLedger` Trait Implementation
//=========================================================================================

#[async_trait]
impl RewardsLedger for DbAdapter {
    async fn credit_completion(
        &self,
        learner_id: Uuid,
        topic_id: Uuid,
        session_id: Uuid,
        record: &CompletionRecord,
    ) -> PortResult<()> {
        let answers = serde_json::to_value(&record.answers)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query(
            "INSERT INTO tute_point_ledger \
             (id, learner_id, topic_id, session_id, points, score, total_questions, \
              percentage, passed, answers, started_at, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(Uuid::new_v4())
        .bind(learner_id)
        .bind(topic_id)
        .bind(session_id)
        .bind(record.tute_points_earned as i32)
        .bind(record.score as i32)
        .bind(record.total_questions as i32)
        .bind(record.percentage as i32)
        .bind(record.passed)
        .bind(answers)
        .bind(record.started_at)
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }
}
