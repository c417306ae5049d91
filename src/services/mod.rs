// src/services/mod.rs

pub mod bank;
pub mod extractor;
pub mod gemini;
pub mod generator;
pub mod parser;
pub mod prompt;
pub mod session_store;
