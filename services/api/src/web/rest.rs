//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification. Every mutating endpoint is a
//! thin pass-through to the session façade and answers with the resulting
//! read-only snapshot.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::state::AppState;
use tutelearn_core::domain::{AnswerPreview, CompletionRecord, Phase, SubmittedAnswer};
use tutelearn_core::error::EngineError;
use tutelearn_core::facade::{SessionFacade, SessionSnapshot};
use tutelearn_core::ports::PortError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session_handler,
        get_session_handler,
        complete_item_handler,
        video_progress_handler,
        record_answer_handler,
        advance_question_handler,
        navigate_handler,
        preview_answer_handler,
        session_result_handler,
        delete_session_handler,
    ),
    components(
        schemas(
            SessionView,
            CompleteItemRequest,
            VideoProgressRequest,
            RecordAnswerRequest,
            AnswerPayload,
            NavigateRequest,
            PreviewView,
            ResultView,
        )
    ),
    tags(
        (name = "TuteLearn API", description = "Learning-session endpoints for the topic player.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The read-only session view returned after every operation.
#[derive(Serialize, ToSchema)]
pub struct SessionView {
    pub session_id: Uuid,
    pub learner_id: Uuid,
    pub topic_id: Uuid,
    /// `learning`, `quiz`, or `completed`.
    pub phase: String,
    pub current_content_index: Option<usize>,
    pub current_question_index: Option<usize>,
    pub total_content_items: usize,
    pub total_questions: usize,
    pub completed_item_ids: Vec<Uuid>,
    pub answered_count: usize,
    pub score: Option<u32>,
    pub percentage: Option<u32>,
    pub passed: Option<bool>,
    pub tute_points_earned: Option<u32>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<SessionSnapshot> for SessionView {
    fn from(snap: SessionSnapshot) -> Self {
        Self {
            session_id: snap.session_id,
            learner_id: snap.learner_id,
            topic_id: snap.topic_id,
            phase: snap.phase.to_string(),
            current_content_index: snap.current_content_index,
            current_question_index: snap.current_question_index,
            total_content_items: snap.total_content_items,
            total_questions: snap.total_questions,
            completed_item_ids: snap.completed_item_ids,
            answered_count: snap.answered_count,
            score: snap.score,
            percentage: snap.percentage,
            passed: snap.passed,
            tute_points_earned: snap.tute_points_earned,
            started_at: snap.started_at,
            completed_at: snap.completed_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CompleteItemRequest {
    pub item_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct VideoProgressRequest {
    pub item_id: Uuid,
    pub watched_secs: u32,
}

/// An answer as submitted by the topic player.
#[derive(Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerPayload {
    Choice { selected: Vec<usize> },
    Text { response: String },
}

impl From<AnswerPayload> for SubmittedAnswer {
    fn from(payload: AnswerPayload) -> Self {
        match payload {
            AnswerPayload::Choice { selected } => SubmittedAnswer::Choice { selected },
            AnswerPayload::Text { response } => SubmittedAnswer::Text { response },
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct RecordAnswerRequest {
    pub question_index: usize,
    pub answer: AnswerPayload,
}

#[derive(Deserialize, ToSchema)]
pub struct NavigateRequest {
    pub index: usize,
}

/// Non-authoritative per-question feedback.
#[derive(Serialize, ToSchema)]
pub struct PreviewView {
    pub question_index: usize,
    pub answered: bool,
    pub correct: bool,
    pub points: u32,
    pub explanation: Option<String>,
}

impl From<AnswerPreview> for PreviewView {
    fn from(preview: AnswerPreview) -> Self {
        Self {
            question_index: preview.question_index,
            answered: preview.answered,
            correct: preview.correct,
            points: preview.points,
            explanation: preview.explanation,
        }
    }
}

/// The completion record as persisted to the rewards ledger.
#[derive(Serialize, ToSchema)]
pub struct ResultView {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub passed: bool,
    pub tute_points_earned: u32,
    #[schema(value_type = Object)]
    pub answers: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ResultView {
    fn from_record(record: CompletionRecord) -> Self {
        Self {
            score: record.score,
            total_questions: record.total_questions,
            percentage: record.percentage,
            passed: record.passed,
            tute_points_earned: record.tute_points_earned,
            answers: serde_json::to_value(&record.answers).unwrap_or_default(),
            started_at: record.started_at,
            completed_at: record.completed_at,
        }
    }
}

//=========================================================================================
// Error Mapping Helpers
//=========================================================================================

/// Maps an engine error onto an HTTP status, keeping the engine's own
/// message as the body.
fn engine_error_response(err: EngineError) -> (StatusCode, String) {
    let status = match &err {
        EngineError::GateNotSatisfied { .. } | EngineError::InvalidPhaseOperation { .. } => {
            StatusCode::CONFLICT
        }
        EngineError::OutOfRange { .. } => StatusCode::BAD_REQUEST,
        EngineError::UnknownItem(_) | EngineError::NotVideo(_) => StatusCode::NOT_FOUND,
        // Bad upstream content data, not a bad client request.
        EngineError::InvalidTopicData(_) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}

fn session_not_found(session_id: Uuid) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("No live session {}", session_id),
    )
}

fn learner_id_from_headers(headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    let raw = headers
        .get("x-learner-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-learner-id header is required".to_string(),
            )
        })?;
    Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid x-learner-id format".to_string(),
        )
    })
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Start a learning session for a topic.
///
/// Fetches the topic definition from the content repository and starts a
/// fresh in-memory session in the learning phase. Any live session for the
/// same learner/topic pair is replaced. Fail-closed: a fetch or validation
/// failure creates nothing.
#[utoipa::path(
    post,
    path = "/topics/{topic_id}/sessions",
    responses(
        (status = 201, description = "Session created", body = SessionView),
        (status = 400, description = "Missing or malformed x-learner-id header"),
        (status = 404, description = "Topic not found"),
        (status = 502, description = "Topic data malformed in the content repository")
    ),
    params(
        ("topic_id" = Uuid, Path, description = "The topic to study."),
        ("x-learner-id" = Uuid, Header, description = "The unique ID of the learner.")
    )
)]
pub async fn create_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(topic_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let learner_id = learner_id_from_headers(&headers)?;

    let topic_data = app_state.topics.fetch_topic(topic_id).await.map_err(|e| match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Unexpected(msg) => {
            error!("Failed to fetch topic {}: {}", topic_id, msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch topic".to_string(),
            )
        }
    })?;

    let facade = SessionFacade::create(topic_data, learner_id, app_state.gate).map_err(|e| {
        error!("Topic {} failed validation: {}", topic_id, e);
        engine_error_response(e)
    })?;

    let snapshot = facade.snapshot();
    let session_id = app_state.sessions.insert(facade).await;
    info!("Started session {} for learner {}", session_id, learner_id);

    Ok((StatusCode::CREATED, Json(SessionView::from(snapshot))))
}

/// Fetch the current session snapshot.
#[utoipa::path(
    get,
    path = "/sessions/{session_id}",
    responses(
        (status = 200, description = "Current snapshot", body = SessionView),
        (status = 404, description = "No live session with that id")
    ),
    params(("session_id" = Uuid, Path, description = "The session."))
)]
pub async fn get_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let snapshot = app_state
        .sessions
        .with_session(session_id, |facade| facade.snapshot())
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(SessionView::from(snapshot)))
}

/// Mark a content item complete.
///
/// Gated: a video item must have enough recorded watch time. Completing
/// the last item moves the session into the quiz phase.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/items/complete",
    request_body = CompleteItemRequest,
    responses(
        (status = 200, description = "Updated snapshot", body = SessionView),
        (status = 404, description = "Session or item not found"),
        (status = 409, description = "Completion gate not satisfied, or wrong phase")
    ),
    params(("session_id" = Uuid, Path, description = "The session."))
)]
pub async fn complete_item_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<CompleteItemRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = app_state
        .sessions
        .with_session(session_id, |facade| facade.mark_item_complete(body.item_id))
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    let snapshot = result.map_err(engine_error_response)?;
    Ok(Json(SessionView::from(snapshot)))
}

/// Report video watch progress.
///
/// Monotonic: a report smaller than the stored maximum is absorbed.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/videos/progress",
    request_body = VideoProgressRequest,
    responses(
        (status = 200, description = "Updated snapshot", body = SessionView),
        (status = 404, description = "Session not found, or item is not a video")
    ),
    params(("session_id" = Uuid, Path, description = "The session."))
)]
pub async fn video_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<VideoProgressRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = app_state
        .sessions
        .with_session(session_id, |facade| {
            facade.record_video_progress(body.item_id, body.watched_secs)
        })
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    let snapshot = result.map_err(engine_error_response)?;
    Ok(Json(SessionView::from(snapshot)))
}

/// Record (or overwrite) the answer for a question. Grading is deferred
/// until the quiz is finished.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/answers",
    request_body = RecordAnswerRequest,
    responses(
        (status = 200, description = "Updated snapshot", body = SessionView),
        (status = 400, description = "Question index out of range"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Not in the quiz phase")
    ),
    params(("session_id" = Uuid, Path, description = "The session."))
)]
pub async fn record_answer_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<RecordAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = app_state
        .sessions
        .with_session(session_id, |facade| {
            facade.record_answer(body.question_index, body.answer.into())
        })
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    let snapshot = result.map_err(engine_error_response)?;
    Ok(Json(SessionView::from(snapshot)))
}

/// Advance to the next question; from the last question this grades the
/// quiz, completes the session, and credits the rewards ledger.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/advance",
    responses(
        (status = 200, description = "Updated snapshot", body = SessionView),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Not in the quiz phase")
    ),
    params(("session_id" = Uuid, Path, description = "The session."))
)]
pub async fn advance_question_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = app_state
        .sessions
        .with_session(session_id, |facade| {
            let snapshot = facade.advance_question()?;
            Ok::<_, EngineError>((snapshot, facade.completion_record()))
        })
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    let (snapshot, record) = result.map_err(engine_error_response)?;

    if snapshot.phase == Phase::Completed {
        if let Some(record) = record {
            let ledger_state = app_state.clone();
            let learner_id = snapshot.learner_id;
            let topic_id = snapshot.topic_id;
            tokio::spawn(credit_ledger(
                ledger_state,
                learner_id,
                topic_id,
                session_id,
                record,
            ));
        }
    }

    Ok(Json(SessionView::from(snapshot)))
}

/// Jump the cursor of the current phase to any valid index (sidebar
/// navigation).
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/navigate",
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Updated snapshot", body = SessionView),
        (status = 400, description = "Index out of range"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session already completed")
    ),
    params(("session_id" = Uuid, Path, description = "The session."))
)]
pub async fn navigate_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<NavigateRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = app_state
        .sessions
        .with_session(session_id, |facade| facade.navigate_to(body.index))
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    let snapshot = result.map_err(engine_error_response)?;
    Ok(Json(SessionView::from(snapshot)))
}

/// Non-authoritative feedback for one question (re-runs the validator,
/// never touches the score).
#[utoipa::path(
    get,
    path = "/sessions/{session_id}/questions/{question_index}/preview",
    responses(
        (status = 200, description = "Feedback for the question", body = PreviewView),
        (status = 400, description = "Question index out of range"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Still in the learning phase")
    ),
    params(
        ("session_id" = Uuid, Path, description = "The session."),
        ("question_index" = usize, Path, description = "Zero-based question index.")
    )
)]
pub async fn preview_answer_handler(
    State(app_state): State<Arc<AppState>>,
    Path((session_id, question_index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = app_state
        .sessions
        .with_session(session_id, |facade| facade.preview_answer(question_index))
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    let preview = result.map_err(engine_error_response)?;
    Ok(Json(PreviewView::from(preview)))
}

/// The completion record for a finished session.
#[utoipa::path(
    get,
    path = "/sessions/{session_id}/result",
    responses(
        (status = 200, description = "Completion record", body = ResultView),
        (status = 404, description = "Session not found or not yet completed")
    ),
    params(("session_id" = Uuid, Path, description = "The session."))
)]
pub async fn session_result_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let record = app_state
        .sessions
        .with_session(session_id, |facade| facade.completion_record())
        .await
        .ok_or_else(|| session_not_found(session_id))?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("Session {} has not completed yet", session_id),
            )
        })?;
    Ok(Json(ResultView::from_record(record)))
}

/// Discard a live session (learner exit). Progress is gone; only a
/// completed session's ledger credit survives.
#[utoipa::path(
    delete,
    path = "/sessions/{session_id}",
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "No live session with that id")
    ),
    params(("session_id" = Uuid, Path, description = "The session."))
)]
pub async fn delete_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if app_state.sessions.remove(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(session_id))
    }
}

//=========================================================================================
// Background Tasks
//=========================================================================================

/// A "fire-and-forget" background task that persists the point credit so
/// the learner's final snapshot is not held up by the ledger write.
async fn credit_ledger(
    app_state: Arc<AppState>,
    learner_id: Uuid,
    topic_id: Uuid,
    session_id: Uuid,
    record: CompletionRecord,
) {
    info!(
        "Crediting {} TUTE points to learner {} for session {}.",
        record.tute_points_earned, learner_id, session_id
    );
    if let Err(e) = app_state
        .ledger
        .credit_completion(learner_id, topic_id, session_id, &record)
        .await
    {
        error!(
            "Failed to credit ledger for session {}: {}. Points are not persisted.",
            session_id, e
        );
    }
}
