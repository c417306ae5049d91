// src/handlers/dashboard.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::dashboard::{ActivityEntry, DashboardData, PerformanceSummary, UpcomingTest},
};

/// Aggregates the dashboard read models: the latest per-subject
/// performance summaries, the next scheduled tests, and recent activity.
/// Empty tables yield empty lists, never errors.
pub async fn get_dashboard(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let performance = sqlx::query_as::<_, PerformanceSummary>(
        "SELECT s.name AS subject, CAST(ROUND(p.average_score) AS INTEGER) AS score \
         FROM performance_analytics p \
         JOIN subjects s ON s.subject_id = p.subject_id \
         ORDER BY p.analytics_id DESC \
         LIMIT 3",
    )
    .fetch_all(&pool)
    .await?;

    let average_performance = if performance.is_empty() {
        0
    } else {
        let total: i64 = performance.iter().map(|p| p.score).sum();
        (total as f64 / performance.len() as f64).round() as i64
    };

    let upcoming_tests = sqlx::query_as::<_, UpcomingTest>(
        "SELECT schedule_id, title, difficulty, scheduled_date \
         FROM scheduled_tests \
         WHERE completed = 0 \
         ORDER BY scheduled_date ASC \
         LIMIT 2",
    )
    .fetch_all(&pool)
    .await?;

    let recent_activities = sqlx::query_as::<_, ActivityEntry>(
        "SELECT activity_id, title, details, created_at \
         FROM activity_log \
         ORDER BY activity_id DESC \
         LIMIT 5",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(DashboardData {
        performance,
        average_performance,
        upcoming_tests,
        recent_activities,
    }))
}
