// src/routes.rs

use axum::{
    Router, http::Method,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{dashboard, exam, session, subject, syllabus},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (exams, sessions, syllabus, subjects, dashboard).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, generator, extractor, stores).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let exam_routes = Router::new().route("/generate", post(exam::generate_exam));

    let syllabus_routes = Router::new().route("/process", post(syllabus::process_syllabus));

    let session_routes = Router::new()
        .route("/", post(session::create_session))
        .route(
            "/{id}",
            get(session::get_session).delete(session::discard_session),
        )
        .route("/{id}/start", post(session::start_session))
        .route("/{id}/answer", post(session::answer_question))
        .route("/{id}/flag", post(session::toggle_flag))
        .route("/{id}/goto", post(session::go_to_question))
        .route("/{id}/submit", post(session::submit_session));

    let subject_routes = Router::new()
        .route(
            "/",
            get(subject::list_subjects).post(subject::create_subject),
        )
        .route(
            "/{id}",
            axum::routing::put(subject::update_subject).delete(subject::delete_subject),
        );

    let dashboard_routes = Router::new().route("/", get(dashboard::get_dashboard));

    Router::new()
        .nest("/api/exams", exam_routes)
        .nest("/api/syllabus", syllabus_routes)
        .nest("/api/sessions", session_routes)
        .nest("/api/subjects", subject_routes)
        .nest("/api/dashboard", dashboard_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
