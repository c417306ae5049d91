// src/handlers/session.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AppError,
    services::session_store::{ClaimOutcome, HandoffStore, SessionStore},
};

/// Request body for exchanging a handoff token for a session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub handoff_token: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_id: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagRequest {
    pub question_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GoToRequest {
    pub index: usize,
}

/// Claims the handoff slot and creates a NotStarted session from it.
///
/// A missing token means there is no exam to take (the client redirects to
/// exam creation); a consumed token is reported distinctly so a stale tab
/// cannot silently re-enter an old exam.
pub async fn create_session(
    State(handoff): State<HandoffStore>,
    State(sessions): State<SessionStore>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    match handoff.claim(payload.handoff_token) {
        ClaimOutcome::Claimed(exam) => {
            let id = sessions.create(*exam);
            let view = sessions.view(id)?;
            Ok((StatusCode::CREATED, Json(json!({ "session": view }))))
        }
        ClaimOutcome::NotFound => Err(AppError::NotFound(
            "No exam found for this token. Create an exam first.".to_string(),
        )),
        ClaimOutcome::AlreadyConsumed => Err(AppError::Gone(
            "This exam was already claimed by another session.".to_string(),
        )),
    }
}

pub async fn get_session(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.view(id)?))
}

/// NotStarted -> InProgress; arms the countdown for timed exams.
pub async fn start_session(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.start(id)?))
}

pub async fn answer_question(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    sessions.answer(id, &payload.question_id, payload.value)?;
    Ok(Json(json!({ "recorded": true })))
}

pub async fn toggle_flag(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FlagRequest>,
) -> Result<impl IntoResponse, AppError> {
    let flagged = sessions.toggle_flag(id, &payload.question_id)?;
    Ok(Json(json!({ "flagged": flagged })))
}

/// Moves the cursor; out-of-range indices leave it unchanged.
pub async fn go_to_question(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoToRequest>,
) -> Result<impl IntoResponse, AppError> {
    sessions.go_to(id, payload.index)?;
    let view = sessions.view(id)?;
    Ok(Json(json!({ "currentIndex": view.current_index })))
}

/// Submits the session and returns the score report. Idempotent: repeat
/// submits (user action racing the countdown) return the same report.
pub async fn submit_session(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let report = sessions.submit(id)?;
    Ok(Json(json!({
        "report": report,
        "message": "Exam submitted successfully"
    })))
}

/// Discards the session when the user leaves the exam view.
pub async fn discard_session(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sessions.discard(id)?;
    Ok(StatusCode::NO_CONTENT)
}
