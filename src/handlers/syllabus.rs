// src/handlers/syllabus.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    models::syllabus::{ProcessSyllabusRequest, ProcessSyllabusResponse},
    services::extractor::SyllabusExtractor,
};

/// Processes an uploaded syllabus into a structured topic breakdown.
///
/// Keeps the relay contract of the original deployment: success is
/// `{topics, success: true}`, failure is `{error, success: false}` with a
/// 500 status. Unlike exam generation, upstream failures are surfaced, not
/// recovered — the caller must show them to the user.
pub async fn process_syllabus(
    State(extractor): State<SyllabusExtractor>,
    State(pool): State<SqlitePool>,
    Json(payload): Json<ProcessSyllabusRequest>,
) -> impl IntoResponse {
    if payload.syllabus_content.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing syllabus content", "success": false })),
        )
            .into_response();
    }

    if let Some(file_name) = payload.file_name.as_deref() {
        tracing::info!("Processing syllabus from file: {}", file_name);
    }

    match extractor.extract(&payload.syllabus_content).await {
        Ok(topics) => {
            record_activity(&pool, payload.file_name.as_deref()).await;
            Json(ProcessSyllabusResponse {
                topics,
                success: true,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!("Syllabus extraction failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string(), "success": false })),
            )
                .into_response()
        }
    }
}

async fn record_activity(pool: &SqlitePool, file_name: Option<&str>) {
    let result = sqlx::query("INSERT INTO activity_log (title, details) VALUES (?1, ?2)")
        .bind("Processed syllabus")
        .bind(file_name.unwrap_or("pasted text"))
        .execute(pool)
        .await;

    if let Err(e) = result {
        tracing::warn!("Failed to record activity: {:?}", e);
    }
}
