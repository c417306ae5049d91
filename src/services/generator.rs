// src/services/generator.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::config::Config;
use crate::models::exam::{ExamMetadata, ExamParameters, GeneratedExam, Question};
use crate::services::bank::QuestionBank;
use crate::services::gemini::{GeminiClient, GeminiError, GenerationConfig};
use crate::services::parser::{self, ParsedBlock};
use crate::services::prompt;

/// Capability boundary between question origins: the remote generative
/// endpoint and the local fixture bank are interchangeable behind this.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn draw(&self, params: &ExamParameters) -> Result<Vec<Question>, GeminiError>;
}

/// Questions authored by the generative endpoint and recovered through the
/// free-text parser.
pub struct RemoteQuestionSource {
    client: GeminiClient,
}

impl RemoteQuestionSource {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QuestionSource for RemoteQuestionSource {
    async fn draw(&self, params: &ExamParameters) -> Result<Vec<Question>, GeminiError> {
        let instruction = prompt::exam_prompt(params);
        let raw = self
            .client
            .generate_content(&instruction, &GenerationConfig::exam())
            .await?;

        let blocks = parser::parse_response(&raw, params.question_type);
        let unparsed = blocks
            .iter()
            .filter(|b| matches!(b, ParsedBlock::Unparsed(_)))
            .count();
        if unparsed > 0 {
            tracing::warn!(
                "Discarded {} unparseable block(s) from the generated response",
                unparsed
            );
        }

        Ok(parser::into_questions(blocks))
    }
}

/// Deterministic offline source backed by the fixture bank.
pub struct FixtureQuestionSource {
    bank: QuestionBank,
}

impl FixtureQuestionSource {
    pub fn new(bank: QuestionBank) -> Self {
        Self { bank }
    }
}

#[async_trait]
impl QuestionSource for FixtureQuestionSource {
    async fn draw(&self, params: &ExamParameters) -> Result<Vec<Question>, GeminiError> {
        Ok(self.bank.synthesize(params))
    }
}

/// The question-bank generator.
///
/// The contract is "always returns an exam": any remote failure degrades to
/// the fixture source instead of surfacing an error, and the remote path is
/// skipped entirely when no API key is configured.
pub struct ExamGenerator {
    remote: Option<Arc<dyn QuestionSource>>,
    fallback: Arc<dyn QuestionSource>,
}

impl ExamGenerator {
    pub fn new(config: &Config, client: GeminiClient) -> Self {
        let bank = match config.question_bank_path.as_deref() {
            Some(path) => match QuestionBank::from_json_file(path) {
                Ok(bank) => {
                    tracing::info!("Loaded question bank override from {}", path);
                    bank
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load question bank from {}: {}. Using built-in bank.",
                        path,
                        e
                    );
                    QuestionBank::default()
                }
            },
            None => QuestionBank::default(),
        };

        let remote: Option<Arc<dyn QuestionSource>> = client
            .is_configured()
            .then(|| Arc::new(RemoteQuestionSource::new(client)) as Arc<dyn QuestionSource>);

        Self {
            remote,
            fallback: Arc::new(FixtureQuestionSource::new(bank)),
        }
    }

    #[cfg(test)]
    pub fn with_sources(
        remote: Option<Arc<dyn QuestionSource>>,
        fallback: Arc<dyn QuestionSource>,
    ) -> Self {
        Self { remote, fallback }
    }

    pub async fn generate(&self, params: &ExamParameters) -> GeneratedExam {
        let questions = match &self.remote {
            Some(source) => match source.draw(params).await {
                Ok(questions) => questions,
                Err(e) => {
                    tracing::warn!("Remote generation failed, using fixture bank: {}", e);
                    self.draw_fallback(params).await
                }
            },
            None => {
                tracing::debug!("No API key configured, using fixture bank");
                self.draw_fallback(params).await
            }
        };

        GeneratedExam {
            metadata: ExamMetadata {
                subject: params.subject.clone(),
                topic: params.topic.clone(),
                difficulty: params.difficulty,
                question_count: questions.len() as u32,
                time_limit_minutes: params.time_limit_minutes,
                generated_at: Utc::now(),
            },
            questions,
        }
    }

    async fn draw_fallback(&self, params: &ExamParameters) -> Vec<Question> {
        self.fallback
            .draw(params)
            .await
            .unwrap_or_else(|_| parser::into_questions(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exam::{Difficulty, QuestionType};

    struct FailingSource;

    #[async_trait]
    impl QuestionSource for FailingSource {
        async fn draw(&self, _params: &ExamParameters) -> Result<Vec<Question>, GeminiError> {
            Err(GeminiError::Upstream {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }

    fn params() -> ExamParameters {
        ExamParameters {
            subject: "Biology".to_string(),
            topic: "Cells".to_string(),
            difficulty: Difficulty::Easy,
            question_count: 8,
            question_type: QuestionType::MultipleChoice,
            time_limit_minutes: 20,
            custom_prompt: None,
            syllabus_text: None,
        }
    }

    #[tokio::test]
    async fn remote_failure_falls_back_without_erroring() {
        let generator = ExamGenerator::with_sources(
            Some(Arc::new(FailingSource)),
            Arc::new(FixtureQuestionSource::new(QuestionBank::default())),
        );

        let exam = generator.generate(&params()).await;
        assert_eq!(exam.questions.len(), 8);
        assert_eq!(exam.metadata.subject, "Biology");
        assert_eq!(exam.metadata.question_count, 8);
    }

    #[tokio::test]
    async fn offline_default_uses_fixture_bank() {
        let generator = ExamGenerator::with_sources(
            None,
            Arc::new(FixtureQuestionSource::new(QuestionBank::default())),
        );

        let exam = generator.generate(&params()).await;
        assert_eq!(exam.questions.len(), 8);
        assert!(exam.questions[0].question_text.contains("mitochondria"));
    }
}
