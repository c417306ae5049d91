// src/models/mod.rs

pub mod dashboard;
pub mod exam;
pub mod session;
pub mod subject;
pub mod syllabus;
