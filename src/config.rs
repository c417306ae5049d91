// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Runtime configuration, sourced from the environment.
///
/// Every value has a default so the server (and the test suite) can start
/// with no environment at all; without `GEMINI_API_KEY` the generator runs
/// purely on the local fixture bank and syllabus extraction reports an
/// upstream error.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub rust_log: String,

    /// Base URL of the generative endpoint, e.g.
    /// "https://generativelanguage.googleapis.com/v1beta".
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,

    /// Optional path to a JSON file overriding the built-in fixture
    /// question bank.
    pub question_bank_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://examforge.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let gemini_api_url = env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string());

        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

        let question_bank_path = env::var("QUESTION_BANK_PATH").ok();

        Self {
            database_url,
            bind_addr,
            rust_log,
            gemini_api_url,
            gemini_model,
            gemini_api_key,
            question_bank_path,
        }
    }
}
