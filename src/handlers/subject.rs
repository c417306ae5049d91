// src/handlers/subject.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::subject::{CreateSubjectRequest, Subject, UpdateSubjectRequest},
};

const SUBJECT_COLUMNS: &str =
    "subject_id, name, color_code, icon_name, description, created_at";

/// Lists all subjects.
pub async fn list_subjects(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let subjects = sqlx::query_as::<_, Subject>(&format!(
        "SELECT {} FROM subjects ORDER BY subject_id",
        SUBJECT_COLUMNS
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(subjects))
}

/// Creates a new subject. Returns 201 and the created row.
pub async fn create_subject(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        "INSERT INTO subjects (name, color_code, icon_name, description) \
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&payload.name)
    .bind(&payload.color_code)
    .bind(&payload.icon_name)
    .bind(&payload.description)
    .execute(&pool)
    .await?;

    let subject = fetch_subject(&pool, result.last_insert_rowid()).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

/// Partially updates a subject; absent fields are left untouched.
pub async fn update_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        "UPDATE subjects SET \
            name = COALESCE(?1, name), \
            color_code = COALESCE(?2, color_code), \
            icon_name = COALESCE(?3, icon_name), \
            description = COALESCE(?4, description) \
         WHERE subject_id = ?5",
    )
    .bind(&payload.name)
    .bind(&payload.color_code)
    .bind(&payload.icon_name)
    .bind(&payload.description)
    .bind(id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    let subject = fetch_subject(&pool, id).await?;
    Ok(Json(subject))
}

pub async fn delete_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM subjects WHERE subject_id = ?1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_subject(pool: &SqlitePool, id: i64) -> Result<Subject, AppError> {
    sqlx::query_as::<_, Subject>(&format!(
        "SELECT {} FROM subjects WHERE subject_id = ?1",
        SUBJECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))
}
