// src/services/session_store.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::exam::GeneratedExam;
use crate::models::session::{ExamSession, ScoreReport, SessionView};

/// One write-once, read-once slot carrying a generated exam from the
/// creation flow to the exam-taking flow.
#[derive(Debug)]
enum HandoffSlot {
    Pending(Box<GeneratedExam>),
    Consumed,
}

/// Outcome of claiming a handoff token. "Consumed" is distinct from
/// "never existed" so stale reads are detectable.
#[derive(Debug)]
pub enum ClaimOutcome {
    Claimed(Box<GeneratedExam>),
    AlreadyConsumed,
    NotFound,
}

/// Single-use channel for cross-flow exam handoff.
#[derive(Clone, Default)]
pub struct HandoffStore {
    slots: Arc<Mutex<HashMap<Uuid, HandoffSlot>>>,
}

impl HandoffStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an exam and returns the token that claims it.
    pub fn offer(&self, exam: GeneratedExam) -> Uuid {
        let token = Uuid::new_v4();
        self.slots
            .lock()
            .expect("handoff store poisoned")
            .insert(token, HandoffSlot::Pending(Box::new(exam)));
        token
    }

    /// Claims a token, consuming the slot. Repeat claims observe
    /// `AlreadyConsumed` rather than stale exam data.
    pub fn claim(&self, token: Uuid) -> ClaimOutcome {
        let mut slots = self.slots.lock().expect("handoff store poisoned");
        match slots.get_mut(&token) {
            None => ClaimOutcome::NotFound,
            Some(slot @ HandoffSlot::Pending(_)) => {
                let taken = std::mem::replace(slot, HandoffSlot::Consumed);
                match taken {
                    HandoffSlot::Pending(exam) => ClaimOutcome::Claimed(exam),
                    HandoffSlot::Consumed => unreachable!("slot was just matched as pending"),
                }
            }
            Some(HandoffSlot::Consumed) => ClaimOutcome::AlreadyConsumed,
        }
    }
}

/// In-memory registry of exam sessions.
///
/// All mutation happens as check-and-set under one lock, so the countdown
/// watchdog and a user-initiated submit can never both score a session.
/// Sessions are not persisted; a restart discards them by design.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, ExamSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, exam: GeneratedExam) -> Uuid {
        let id = Uuid::new_v4();
        let session = ExamSession::new(id, exam);
        self.sessions
            .lock()
            .expect("session store poisoned")
            .insert(id, session);
        id
    }

    /// Starts the session and, for timed exams, arms a watchdog task that
    /// finalizes it at the deadline even if no further request arrives.
    pub fn start(&self, id: Uuid) -> Result<SessionView, AppError> {
        let now = Utc::now();
        let deadline = {
            let mut sessions = self.sessions.lock().expect("session store poisoned");
            let session = sessions
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;
            session.start(now)?;
            session.deadline()
        };

        if let Some(deadline) = deadline {
            let sessions = self.sessions.clone();
            tokio::spawn(async move {
                let wait_ms = (deadline - Utc::now()).num_milliseconds().max(0) as u64;
                // Small grace so the deadline has definitely passed.
                tokio::time::sleep(std::time::Duration::from_millis(wait_ms + 250)).await;
                let mut sessions = sessions.lock().expect("session store poisoned");
                if let Some(session) = sessions.get_mut(&id) {
                    if session.expire_if_due(Utc::now()) {
                        tracing::info!("Session {} auto-submitted on timeout", id);
                    }
                }
            });
        }

        self.view(id)
    }

    pub fn answer(&self, id: Uuid, question_id: &str, value: String) -> Result<(), AppError> {
        self.with_running(id, |session| session.answer(question_id, value).map_err(Into::into))
    }

    /// Returns the new flag membership state.
    pub fn toggle_flag(&self, id: Uuid, question_id: &str) -> Result<bool, AppError> {
        self.with_running(id, |session| session.toggle_flag(question_id).map_err(Into::into))
    }

    pub fn go_to(&self, id: Uuid, index: usize) -> Result<(), AppError> {
        self.with_running(id, |session| session.go_to(index).map_err(Into::into))
    }

    /// Submits and returns the score report. Idempotent: a completed
    /// session yields its existing report.
    pub fn submit(&self, id: Uuid) -> Result<ScoreReport, AppError> {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;
        session.expire_if_due(Utc::now());
        Ok(session.submit()?.clone())
    }

    pub fn view(&self, id: Uuid) -> Result<SessionView, AppError> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;
        session.expire_if_due(now);
        Ok(session.view(now))
    }

    /// Drops a session when the user leaves the exam view.
    pub fn discard(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .lock()
            .expect("session store poisoned")
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    /// Runs one mutation under the lock, finalizing an overdue countdown
    /// first so post-deadline mutations are rejected consistently.
    fn with_running<T>(
        &self,
        id: Uuid,
        op: impl FnOnce(&mut ExamSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;
        session.expire_if_due(Utc::now());
        op(session)
    }
}
