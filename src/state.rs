// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::extractor::SyllabusExtractor;
use crate::services::generator::ExamGenerator;
use crate::services::session_store::{HandoffStore, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub generator: Arc<ExamGenerator>,
    pub extractor: SyllabusExtractor,
    pub sessions: SessionStore,
    pub handoff: HandoffStore,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<ExamGenerator> {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}

impl FromRef<AppState> for SyllabusExtractor {
    fn from_ref(state: &AppState) -> Self {
        state.extractor.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for HandoffStore {
    fn from_ref(state: &AppState) -> Self {
        state.handoff.clone()
    }
}
