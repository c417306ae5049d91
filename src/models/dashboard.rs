// src/models/dashboard.rs

use serde::Serialize;
use sqlx::prelude::FromRow;

/// Per-subject average score, joined from `performance_analytics` and
/// `subjects` for the dashboard performance card.
#[derive(Debug, Serialize, FromRow)]
pub struct PerformanceSummary {
    pub subject: String,
    pub score: i64,
}

/// A not-yet-completed scheduled test.
#[derive(Debug, Serialize, FromRow)]
pub struct UpcomingTest {
    pub schedule_id: i64,
    pub title: String,
    pub difficulty: String,
    pub scheduled_date: String,
}

/// One row of the recent-activity feed.
#[derive(Debug, Serialize, FromRow)]
pub struct ActivityEntry {
    pub activity_id: i64,
    pub title: String,
    pub details: String,
    pub created_at: String,
}

/// Aggregate payload for the dashboard endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub performance: Vec<PerformanceSummary>,
    pub average_performance: i64,
    pub upcoming_tests: Vec<UpcomingTest>,
    pub recent_activities: Vec<ActivityEntry>,
}
