// src/handlers/exam.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::exam::ExamParameters,
    services::{generator::ExamGenerator, session_store::HandoffStore},
};

/// Generates an exam from the submitted parameters.
///
/// Validation failures are rejected before any network call. Generation
/// itself cannot fail: remote errors degrade to the fixture bank inside the
/// generator. The exam is parked in a single-use handoff slot; the returned
/// token is what the exam-taking flow exchanges for a session.
pub async fn generate_exam(
    State(generator): State<Arc<ExamGenerator>>,
    State(handoff): State<HandoffStore>,
    State(pool): State<SqlitePool>,
    Json(params): Json<ExamParameters>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = params.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    tracing::info!(
        "Generating exam: subject={}, topic={}, count={}",
        params.subject,
        params.topic,
        params.question_count
    );

    let exam = generator.generate(&params).await;
    record_activity(&pool, &params).await;

    let handoff_token = handoff.offer(exam.clone());

    Ok(Json(json!({
        "exam": exam,
        "handoffToken": handoff_token,
    })))
}

/// Best-effort write to the dashboard activity feed.
async fn record_activity(pool: &SqlitePool, params: &ExamParameters) {
    let result = sqlx::query("INSERT INTO activity_log (title, details) VALUES (?1, ?2)")
        .bind("Generated exam")
        .bind(format!("{}: {}", params.subject, params.topic))
        .execute(pool)
        .await;

    if let Err(e) = result {
        tracing::warn!("Failed to record activity: {:?}", e);
    }
}
