// src/services/extractor.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::models::syllabus::ExtractedSyllabus;
use crate::services::gemini::{GeminiClient, GeminiError, GenerationConfig};
use crate::services::prompt;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid regex"));

static FENCED_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("valid regex"));

static BARE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Pulls the first JSON object out of a model reply. The reply is not
/// trusted to be bare JSON: search order is a ```json fence, any fence,
/// then the first top-level `{...}` span.
pub fn extract_json_block(text: &str) -> Option<String> {
    if let Some(caps) = FENCED_JSON.captures(text) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = FENCED_ANY.captures(text) {
        return Some(caps[1].to_string());
    }
    BARE_OBJECT.find(text).map(|m| m.as_str().to_string())
}

/// Parses the extraction reply, degrading to the Unknown-subject result
/// (raw text retained) when no usable JSON can be recovered. Parse
/// failures never raise; only upstream failures do, one level up.
pub fn parse_extraction_response(raw: &str) -> ExtractedSyllabus {
    let candidate = extract_json_block(raw).unwrap_or_else(|| raw.to_string());

    match serde_json::from_str::<ExtractedSyllabus>(&candidate) {
        Ok(syllabus) => syllabus,
        Err(e) => {
            tracing::warn!("Failed to parse extraction JSON: {}", e);
            ExtractedSyllabus::degraded(raw.to_string())
        }
    }
}

/// Turns raw syllabus text into a structured topic breakdown via the
/// generative endpoint.
///
/// Unlike exam generation there is no silent fallback here: upstream
/// failures are surfaced so the user sees what went wrong. The asymmetry
/// is deliberate.
#[derive(Clone)]
pub struct SyllabusExtractor {
    client: GeminiClient,
}

impl SyllabusExtractor {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    pub async fn extract(&self, syllabus_text: &str) -> Result<ExtractedSyllabus, GeminiError> {
        let instruction = prompt::extraction_prompt(syllabus_text);
        let raw = self
            .client
            .generate_content(&instruction, &GenerationConfig::extraction())
            .await?;

        Ok(parse_extraction_response(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::syllabus::TopicDifficulty;

    #[test]
    fn json_fenced_block_is_preferred() {
        let raw = "Here you go:\n```json\n{\"mainSubject\":\"Biology\",\"topics\":[]}\n```\nDone.";
        let result = parse_extraction_response(raw);
        assert_eq!(result.main_subject, "Biology");
        assert!(result.topics.is_empty());
        assert!(result.raw_response.is_none());
    }

    #[test]
    fn unlabeled_fence_and_bare_object_also_work() {
        let fenced = "```\n{\"mainSubject\":\"Math\",\"topics\":[]}\n```";
        assert_eq!(parse_extraction_response(fenced).main_subject, "Math");

        let bare = "Sure! {\"mainSubject\":\"History\",\"topics\":[]} hope that helps";
        assert_eq!(parse_extraction_response(bare).main_subject, "History");
    }

    #[test]
    fn full_topic_shape_round_trips() {
        let raw = r#"```json
        {
          "mainSubject": "Computer Science",
          "topics": [
            {
              "name": "Algorithms",
              "subtopics": ["Sorting", "Graphs"],
              "keyTerms": ["Big-O", "DFS"],
              "difficulty": "Advanced"
            }
          ]
        }
        ```"#;
        let result = parse_extraction_response(raw);
        assert_eq!(result.topics.len(), 1);
        let topic = &result.topics[0];
        assert_eq!(topic.name, "Algorithms");
        assert_eq!(topic.subtopics, ["Sorting", "Graphs"]);
        assert_eq!(topic.key_terms, ["Big-O", "DFS"]);
        assert_eq!(topic.difficulty, TopicDifficulty::Advanced);
    }

    #[test]
    fn unparseable_reply_degrades_instead_of_raising() {
        let raw = "I am sorry, I cannot help with that.";
        let result = parse_extraction_response(raw);
        assert_eq!(result.main_subject, "Unknown");
        assert!(result.topics.is_empty());
        assert_eq!(result.raw_response.as_deref(), Some(raw));
    }

    #[test]
    fn malformed_json_inside_fence_degrades() {
        let raw = "```json\n{\"mainSubject\": \"Biology\", \"topics\": [oops]}\n```";
        let result = parse_extraction_response(raw);
        assert_eq!(result.main_subject, "Unknown");
        assert!(result.raw_response.is_some());
    }
}
