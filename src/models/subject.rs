// src/models/subject.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'subjects' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub subject_id: i64,
    pub name: String,
    pub color_code: Option<String>,
    pub icon_name: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

/// DTO for creating a new subject.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 20))]
    pub color_code: Option<String>,

    #[validate(length(max = 50))]
    pub icon_name: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// DTO for partially updating a subject. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 20))]
    pub color_code: Option<String>,

    #[validate(length(max = 50))]
    pub icon_name: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}
