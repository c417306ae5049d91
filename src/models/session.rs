// src/models/session.rs

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::exam::GeneratedExam;

/// Lifecycle of a single exam attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Raised when an operation is applied in the wrong lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A mutation was attempted before `start`.
    NotStarted,
    /// A mutation was attempted on a completed session.
    Completed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotStarted => write!(f, "Exam has not been started yet"),
            SessionError::Completed => write!(f, "Exam is already completed"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Final score, computed exactly once at submission.
///
/// Open-ended questions are never auto-graded: they are excluded from the
/// numerator but kept in the denominator, matching the displayed score of
/// the original flow. `scored_count` lets clients render the subset-based
/// figure instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub correct_count: u32,
    pub scored_count: u32,
    pub total_questions: u32,
    pub percent: u32,
}

/// The mutable runtime record of one exam attempt.
///
/// All operations are synchronous state transitions; the countdown is
/// deadline-based and enforced by the session store. Nothing here persists
/// across a restart.
#[derive(Debug, Clone)]
pub struct ExamSession {
    pub id: Uuid,
    exam: GeneratedExam,
    current_index: usize,
    answers: HashMap<String, String>,
    flagged: HashSet<String>,
    deadline: Option<DateTime<Utc>>,
    status: SessionStatus,
    report: Option<ScoreReport>,
}

impl ExamSession {
    pub fn new(id: Uuid, exam: GeneratedExam) -> Self {
        Self {
            id,
            exam,
            current_index: 0,
            answers: HashMap::new(),
            flagged: HashSet::new(),
            deadline: None,
            status: SessionStatus::NotStarted,
            report: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn exam(&self) -> &GeneratedExam {
        &self.exam
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Seconds left on the clock, `None` for untimed sessions.
    /// Clamped at zero; monotonically non-increasing while running.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline
            .map(|deadline| (deadline - now).num_seconds().max(0))
    }

    /// NotStarted -> InProgress. Arms the countdown from the exam's time
    /// limit; a zero limit leaves the session untimed.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::NotStarted => {
                let minutes = self.exam.metadata.time_limit_minutes;
                if minutes > 0 {
                    self.deadline = Some(now + Duration::seconds(i64::from(minutes) * 60));
                }
                self.status = SessionStatus::InProgress;
                Ok(())
            }
            SessionStatus::InProgress => Ok(()),
            SessionStatus::Completed => Err(SessionError::Completed),
        }
    }

    /// Upserts an answer. No validation of the value against the question
    /// shape happens at this layer.
    pub fn answer(&mut self, question_id: &str, value: String) -> Result<(), SessionError> {
        self.require_in_progress()?;
        self.answers.insert(question_id.to_string(), value);
        Ok(())
    }

    /// Adds or removes the review flag; returns the new membership state.
    pub fn toggle_flag(&mut self, question_id: &str) -> Result<bool, SessionError> {
        self.require_in_progress()?;
        if self.flagged.remove(question_id) {
            Ok(false)
        } else {
            self.flagged.insert(question_id.to_string());
            Ok(true)
        }
    }

    /// Moves the cursor. Out-of-range indices are a no-op, not an error.
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.require_in_progress()?;
        if index < self.exam.questions.len() {
            self.current_index = index;
        }
        Ok(())
    }

    /// InProgress -> Completed. Scores exactly once; submitting an already
    /// completed session returns the existing report unchanged, so the
    /// timer-expiry path and an explicit user submit can race safely.
    pub fn submit(&mut self) -> Result<&ScoreReport, SessionError> {
        match self.status {
            SessionStatus::NotStarted => Err(SessionError::NotStarted),
            SessionStatus::InProgress => {
                self.status = SessionStatus::Completed;
                self.report = Some(self.score());
                Ok(self.report.as_ref().unwrap())
            }
            SessionStatus::Completed => Ok(self
                .report
                .as_ref()
                .expect("completed session always carries a report")),
        }
    }

    /// Auto-submits a running session whose deadline has passed.
    /// Returns true when this call performed the transition.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != SessionStatus::InProgress {
            return false;
        }
        match self.deadline {
            Some(deadline) if deadline <= now => {
                let _ = self.submit();
                true
            }
            _ => false,
        }
    }

    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    fn require_in_progress(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::NotStarted => Err(SessionError::NotStarted),
            SessionStatus::InProgress => Ok(()),
            SessionStatus::Completed => Err(SessionError::Completed),
        }
    }

    fn score(&self) -> ScoreReport {
        let total = self.exam.questions.len() as u32;
        let mut correct = 0u32;
        let mut scored = 0u32;

        for question in &self.exam.questions {
            if !question.is_scorable() {
                continue;
            }
            scored += 1;
            if self
                .answers
                .get(&question.id)
                .is_some_and(|answer| *answer == question.correct_answer)
            {
                correct += 1;
            }
        }

        let percent = if total > 0 {
            (f64::from(correct) / f64::from(total) * 100.0).round() as u32
        } else {
            0
        };

        ScoreReport {
            correct_count: correct,
            scored_count: scored,
            total_questions: total,
            percent,
        }
    }

    /// Read-model for the exam-taking view. Correct answers and
    /// explanations are withheld until the session is completed.
    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        let completed = self.status == SessionStatus::Completed;
        let questions = self
            .exam
            .questions
            .iter()
            .map(|q| SessionQuestion {
                id: q.id.clone(),
                question_text: q.question_text.clone(),
                options: q.options.clone(),
                correct_answer: completed.then(|| q.correct_answer.clone()),
                explanation: completed.then(|| q.explanation.clone()),
            })
            .collect();

        SessionView {
            id: self.id,
            status: self.status,
            current_index: self.current_index,
            remaining_seconds: self.remaining_seconds(now),
            subject: self.exam.metadata.subject.clone(),
            topic: self.exam.metadata.topic.clone(),
            time_limit_minutes: self.exam.metadata.time_limit_minutes,
            questions,
            answers: self.answers.clone(),
            flagged: {
                let mut ids: Vec<String> = self.flagged.iter().cloned().collect();
                ids.sort();
                ids
            },
            report: self.report.clone(),
        }
    }
}

/// A question as exposed to the exam-taking client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuestion {
    pub id: String,
    pub question_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Full client-facing snapshot of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub status: SessionStatus,
    pub current_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
    pub subject: String,
    pub topic: String,
    pub time_limit_minutes: u32,
    pub questions: Vec<SessionQuestion>,
    pub answers: HashMap<String, String>,
    pub flagged: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ScoreReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exam::{Difficulty, ExamMetadata, Question};

    fn choice_question(n: usize, correct: &str) -> Question {
        Question {
            id: format!("q-{}", n),
            question_text: format!("Question {}", n),
            options: Some(vec![
                "First".to_string(),
                "Second".to_string(),
                "Third".to_string(),
                "Fourth".to_string(),
            ]),
            correct_answer: correct.to_string(),
            explanation: "Because.".to_string(),
        }
    }

    fn open_question(n: usize) -> Question {
        Question {
            id: format!("q-{}", n),
            question_text: format!("Question {}", n),
            options: None,
            correct_answer: "Reference answer".to_string(),
            explanation: "Graded manually.".to_string(),
        }
    }

    fn exam(questions: Vec<Question>, minutes: u32) -> GeneratedExam {
        let count = questions.len() as u32;
        GeneratedExam {
            questions,
            metadata: ExamMetadata {
                subject: "Physics".to_string(),
                topic: "Mechanics".to_string(),
                difficulty: Difficulty::Medium,
                question_count: count,
                time_limit_minutes: minutes,
                generated_at: Utc::now(),
            },
        }
    }

    fn session(questions: Vec<Question>, minutes: u32) -> ExamSession {
        ExamSession::new(Uuid::new_v4(), exam(questions, minutes))
    }

    #[test]
    fn mutations_rejected_before_start() {
        let mut s = session(vec![choice_question(1, "Option A")], 30);
        assert_eq!(
            s.answer("q-1", "Option A".to_string()),
            Err(SessionError::NotStarted)
        );
        assert_eq!(s.submit().unwrap_err(), SessionError::NotStarted);
    }

    #[test]
    fn start_arms_countdown_from_time_limit() {
        let mut s = session(vec![choice_question(1, "Option A")], 30);
        let now = Utc::now();
        s.start(now).unwrap();
        assert_eq!(s.status(), SessionStatus::InProgress);
        assert_eq!(s.remaining_seconds(now), Some(30 * 60));
    }

    #[test]
    fn zero_limit_means_untimed() {
        let mut s = session(vec![choice_question(1, "Option A")], 0);
        s.start(Utc::now()).unwrap();
        assert_eq!(s.remaining_seconds(Utc::now()), None);
        assert!(!s.expire_if_due(Utc::now() + Duration::hours(10)));
    }

    #[test]
    fn go_to_ignores_out_of_range_indices() {
        let mut s = session(
            vec![choice_question(1, "Option A"), choice_question(2, "Option B")],
            30,
        );
        s.start(Utc::now()).unwrap();
        s.go_to(1).unwrap();
        let before = s.view(Utc::now()).current_index;
        s.go_to(2).unwrap();
        s.go_to(usize::MAX).unwrap();
        assert_eq!(s.view(Utc::now()).current_index, before);
    }

    #[test]
    fn toggle_flag_round_trips() {
        let mut s = session(vec![choice_question(1, "Option A")], 30);
        s.start(Utc::now()).unwrap();
        assert!(s.toggle_flag("q-1").unwrap());
        assert!(!s.toggle_flag("q-1").unwrap());
        assert!(s.view(Utc::now()).flagged.is_empty());
    }

    #[test]
    fn submit_is_idempotent_and_scores_once() {
        let mut s = session(
            vec![choice_question(1, "Option A"), choice_question(2, "Option B")],
            30,
        );
        s.start(Utc::now()).unwrap();
        s.answer("q-1", "Option A".to_string()).unwrap();

        let first = s.submit().unwrap().clone();
        assert_eq!(first.correct_count, 1);

        // Racing submit (timer vs. user) must not re-score.
        s.answer("q-2", "Option B".to_string()).unwrap_err();
        let second = s.submit().unwrap().clone();
        assert_eq!(second.correct_count, first.correct_count);
        assert_eq!(s.status(), SessionStatus::Completed);
    }

    #[test]
    fn expiry_submits_exactly_once() {
        let mut s = session(vec![choice_question(1, "Option A")], 1);
        let now = Utc::now();
        s.start(now).unwrap();
        let later = now + Duration::seconds(61);
        assert!(s.expire_if_due(later));
        assert!(!s.expire_if_due(later));
        assert_eq!(s.status(), SessionStatus::Completed);
    }

    #[test]
    fn open_questions_kept_in_denominator_but_never_credited() {
        // 3 of 5 choice answers correct, 2 open-ended: numerator 3,
        // denominator stays the full count -> 3/5 = 60%.
        let mut s = session(
            vec![
                choice_question(1, "Option A"),
                choice_question(2, "Option B"),
                choice_question(3, "Option C"),
                open_question(4),
                open_question(5),
            ],
            30,
        );
        s.start(Utc::now()).unwrap();
        s.answer("q-1", "Option A".to_string()).unwrap();
        s.answer("q-2", "Option B".to_string()).unwrap();
        s.answer("q-3", "Option C".to_string()).unwrap();
        s.answer("q-4", "long essay text".to_string()).unwrap();

        let report = s.submit().unwrap();
        assert_eq!(report.correct_count, 3);
        assert_eq!(report.scored_count, 3);
        assert_eq!(report.total_questions, 5);
        assert_eq!(report.percent, 60);
    }

    #[test]
    fn answers_hidden_until_completion() {
        let mut s = session(vec![choice_question(1, "Option A")], 30);
        s.start(Utc::now()).unwrap();
        let running = s.view(Utc::now());
        assert!(running.questions[0].correct_answer.is_none());
        assert!(running.questions[0].explanation.is_none());

        s.submit().unwrap();
        let done = s.view(Utc::now());
        assert_eq!(
            done.questions[0].correct_answer.as_deref(),
            Some("Option A")
        );
    }
}
