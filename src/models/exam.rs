// src/models/exam.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Requested difficulty for a generated exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// The kind of questions the generator is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
    Mixed,
}

impl QuestionType {
    /// Whether questions of this type carry an options list.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            QuestionType::MultipleChoice | QuestionType::TrueFalse | QuestionType::Mixed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::TrueFalse => "true-false",
            QuestionType::ShortAnswer => "short-answer",
            QuestionType::Essay => "essay",
            QuestionType::Mixed => "mixed",
        }
    }
}

/// DTO describing the exam a user wants generated.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExamParameters {
    #[validate(length(min = 1, max = 200, message = "subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, max = 200, message = "topic is required"))]
    pub topic: String,

    pub difficulty: Difficulty,

    #[validate(range(min = 5, max = 50))]
    pub question_count: u32,

    pub question_type: QuestionType,

    #[validate(range(min = 1, max = 180))]
    pub time_limit_minutes: u32,

    /// Extra free-text instructions appended to the generation prompt.
    #[validate(length(max = 2000))]
    pub custom_prompt: Option<String>,

    /// Raw syllabus text, forwarded to the prompt when present.
    #[validate(length(max = 20000))]
    pub syllabus_text: Option<String>,
}

/// A single exam question.
///
/// All four textual fields are always populated: when the parser cannot
/// recover a field it substitutes an explicit "not provided" placeholder
/// instead of leaving it empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique within an exam and stable for the session (e.g. "q-3").
    pub id: String,

    pub question_text: String,

    /// Present iff the question is choice-based. For multiple choice the
    /// correct answer refers to an option by label ("Option A".."Option D").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    pub correct_answer: String,

    /// Shown to the user after submission.
    pub explanation: String,
}

impl Question {
    /// Only option-bearing questions participate in automatic scoring.
    pub fn is_scorable(&self) -> bool {
        self.options.is_some()
    }
}

/// Immutable metadata stamped onto a generated exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamMetadata {
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub time_limit_minutes: u32,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// The product of the question-bank generator. Read-only once created;
/// question order is the presentation order for the whole session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedExam {
    pub questions: Vec<Question>,
    pub metadata: ExamMetadata,
}
