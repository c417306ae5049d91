// src/models/syllabus.rs

use serde::{Deserialize, Serialize};

/// Difficulty rating the extractor assigns to a topic.
/// Serialized capitalized ("Beginner") to match the extraction prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// One topic recovered from a syllabus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTopic {
    pub name: String,

    #[serde(default)]
    pub subtopics: Vec<String>,

    #[serde(default)]
    pub key_terms: Vec<String>,

    #[serde(default = "default_topic_difficulty")]
    pub difficulty: TopicDifficulty,
}

fn default_topic_difficulty() -> TopicDifficulty {
    TopicDifficulty::Intermediate
}

/// The structured result of one syllabus upload. Immutable after creation;
/// feeds initial values into the exam parameter form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSyllabus {
    pub main_subject: String,

    #[serde(default)]
    pub topics: Vec<ExtractedTopic>,

    /// Raw model output, retained only on the degraded (unparseable) path
    /// so the client can show it for diagnosis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ExtractedSyllabus {
    /// The degraded result substituted when the model reply is unparseable.
    pub fn degraded(raw: String) -> Self {
        Self {
            main_subject: "Unknown".to_string(),
            topics: Vec::new(),
            raw_response: Some(raw),
        }
    }
}

/// Request body of the syllabus processing endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSyllabusRequest {
    pub syllabus_content: String,

    #[serde(default)]
    pub file_name: Option<String>,
}

/// Success envelope of the syllabus processing endpoint.
#[derive(Debug, Serialize)]
pub struct ProcessSyllabusResponse {
    pub topics: ExtractedSyllabus,
    pub success: bool,
}
