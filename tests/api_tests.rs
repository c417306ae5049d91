// tests/api_tests.rs

use std::sync::Arc;

use examforge::{
    config::Config,
    routes,
    services::{
        extractor::SyllabusExtractor,
        gemini::GeminiClient,
        generator::ExamGenerator,
        session_store::{HandoffStore, SessionStore},
    },
    state::AppState,
};
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
///
/// Runs against an in-memory SQLite database and with no API key, so the
/// generator exercises its offline fixture path and syllabus extraction
/// its upstream-error path.
async fn spawn_app() -> String {
    // 1. Create a single-connection pool: every connection to
    //    "sqlite::memory:" is a distinct database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        rust_log: "error".to_string(),
        gemini_api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        gemini_model: "gemini-pro".to_string(),
        gemini_api_key: None,
        question_bank_path: None,
    };

    let gemini = GeminiClient::new(&config);
    let state = AppState {
        pool,
        generator: Arc::new(ExamGenerator::new(&config, gemini.clone())),
        extractor: SyllabusExtractor::new(gemini),
        sessions: SessionStore::new(),
        handoff: HandoffStore::new(),
        config,
    };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn exam_params() -> serde_json::Value {
    serde_json::json!({
        "subject": "Physics",
        "topic": "Mechanics",
        "difficulty": "medium",
        "questionCount": 10,
        "questionType": "multiple-choice",
        "timeLimitMinutes": 30
    })
}

/// Generates an exam and exchanges the handoff token for a session.
/// Returns (session_id, generated exam value).
async fn create_session(client: &reqwest::Client, address: &str) -> (String, serde_json::Value) {
    let generated: serde_json::Value = client
        .post(format!("{}/api/exams/generate", address))
        .json(&exam_params())
        .send()
        .await
        .expect("Failed to generate exam")
        .json()
        .await
        .expect("Failed to parse generate response");

    let token = generated["handoffToken"].as_str().expect("token missing");

    let created: serde_json::Value = client
        .post(format!("{}/api/sessions", address))
        .json(&serde_json::json!({ "handoffToken": token }))
        .send()
        .await
        .expect("Failed to create session")
        .json()
        .await
        .expect("Failed to parse session response");

    let id = created["session"]["id"].as_str().expect("id missing");
    (id.to_string(), generated["exam"].clone())
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn generate_returns_requested_count_offline() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/exams/generate", address))
        .json(&exam_params())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    let questions = body["exam"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 10);
    assert!(body["handoffToken"].is_string());
    assert_eq!(body["exam"]["metadata"]["subject"], "Physics");

    // Choice questions carry 4 options and an "Option <L>" answer that
    // refers to one of them by label.
    for q in questions {
        let options = q["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        let answer = q["correctAnswer"].as_str().unwrap();
        assert!(
            ["Option A", "Option B", "Option C", "Option D"].contains(&answer),
            "unexpected answer label: {}",
            answer
        );
    }
}

#[tokio::test]
async fn generate_rejects_invalid_parameters() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Missing subject
    let mut params = exam_params();
    params["subject"] = serde_json::json!("");
    let response = client
        .post(format!("{}/api/exams/generate", address))
        .json(&params)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Question count below the allowed range
    let mut params = exam_params();
    params["questionCount"] = serde_json::json!(3);
    let response = client
        .post(format!("{}/api/exams/generate", address))
        .json(&params)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn handoff_token_is_single_use() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let generated: serde_json::Value = client
        .post(format!("{}/api/exams/generate", address))
        .json(&exam_params())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = generated["handoffToken"].as_str().unwrap();

    let first = client
        .post(format!("{}/api/sessions", address))
        .json(&serde_json::json!({ "handoffToken": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    // Second claim observes the consumed slot, not stale exam data.
    let second = client
        .post(format!("{}/api/sessions", address))
        .json(&serde_json::json!({ "handoffToken": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 410);

    // An unknown token means there is no exam to take.
    let unknown = client
        .post(format!("{}/api/sessions", address))
        .json(&serde_json::json!({ "handoffToken": uuid_string() }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 404);
}

fn uuid_string() -> String {
    // A valid but never-issued v4 UUID.
    "00000000-0000-4000-8000-000000000000".to_string()
}

#[tokio::test]
async fn full_exam_session_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (id, exam) = create_session(&client, &address).await;

    // Answers and explanations are hidden while the exam runs.
    let started: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/start", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["status"], "in_progress");
    let remaining = started["remainingSeconds"].as_i64().unwrap();
    assert!((30 * 60 - 5..=30 * 60).contains(&remaining));
    assert!(started["questions"][0]["correctAnswer"].is_null());

    // Answer every question correctly using the generation payload.
    for q in exam["questions"].as_array().unwrap() {
        let response = client
            .post(format!("{}/api/sessions/{}/answer", address, id))
            .json(&serde_json::json!({
                "questionId": q["id"],
                "value": q["correctAnswer"],
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    // Flag and unflag the first question.
    let q1 = exam["questions"][0]["id"].as_str().unwrap();
    let flagged: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/flag", address, id))
        .json(&serde_json::json!({ "questionId": q1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(flagged["flagged"], true);

    // Navigation: a valid jump moves the cursor, an out-of-range one is a
    // no-op.
    let moved: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/goto", address, id))
        .json(&serde_json::json!({ "index": 4 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moved["currentIndex"], 4);

    let unchanged: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/goto", address, id))
        .json(&serde_json::json!({ "index": 999 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unchanged["currentIndex"], 4);

    // Submit and verify the score.
    let submitted: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/submit", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submitted["report"]["correctCount"], 10);
    assert_eq!(submitted["report"]["totalQuestions"], 10);
    assert_eq!(submitted["report"]["percent"], 100);

    // Submitting again is idempotent.
    let resubmitted: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/submit", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resubmitted["report"]["correctCount"], 10);

    // The completed view now reveals answers and explanations.
    let view: serde_json::Value = client
        .get(format!("{}/api/sessions/{}", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["status"], "completed");
    assert!(view["questions"][0]["correctAnswer"].is_string());

    // Mutation after completion is rejected.
    let rejected = client
        .post(format!("{}/api/sessions/{}/answer", address, id))
        .json(&serde_json::json!({ "questionId": q1, "value": "Option A" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 409);
}

#[tokio::test]
async fn session_operations_require_start() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (id, exam) = create_session(&client, &address).await;

    let q1 = exam["questions"][0]["id"].as_str().unwrap();
    let response = client
        .post(format!("{}/api/sessions/{}/answer", address, id))
        .json(&serde_json::json!({ "questionId": q1, "value": "Option A" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn syllabus_processing_reports_upstream_failure() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // No API key configured: the extractor must surface the failure in the
    // relay contract shape rather than falling back.
    let response = client
        .post(format!("{}/api/syllabus/process", address))
        .json(&serde_json::json!({
            "syllabusContent": "Week 1: Cell structure. Week 2: Photosynthesis.",
            "fileName": "biology.txt"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn syllabus_processing_rejects_empty_content() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/syllabus/process", address))
        .json(&serde_json::json!({ "syllabusContent": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn subject_crud_round_trip() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Create
    let created: serde_json::Value = client
        .post(format!("{}/api/subjects", address))
        .json(&serde_json::json!({
            "name": "Astronomy",
            "color_code": "#123456",
            "description": "Stars and planets"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["subject_id"].as_i64().unwrap();
    assert_eq!(created["name"], "Astronomy");

    // List
    let listed: serde_json::Value = client
        .get(format!("{}/api/subjects", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Partial update keeps untouched fields.
    let updated: serde_json::Value = client
        .put(format!("{}/api/subjects/{}", address, id))
        .json(&serde_json::json!({ "name": "Astrophysics" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["name"], "Astrophysics");
    assert_eq!(updated["description"], "Stars and planets");

    // Delete, then 404 on repeat.
    let deleted = client
        .delete(format!("{}/api/subjects/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let missing = client
        .delete(format!("{}/api/subjects/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn subject_validation_rejects_empty_name() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/subjects", address))
        .json(&serde_json::json!({ "name": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn dashboard_reflects_generation_activity() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Empty dashboard is still a 200 with empty lists.
    let empty: serde_json::Value = client
        .get(format!("{}/api/dashboard", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(empty["performance"].as_array().unwrap().len(), 0);
    assert_eq!(empty["upcomingTests"].as_array().unwrap().len(), 0);

    // Generating an exam leaves a trace in the activity feed.
    client
        .post(format!("{}/api/exams/generate", address))
        .json(&exam_params())
        .send()
        .await
        .unwrap();

    let after: serde_json::Value = client
        .get(format!("{}/api/dashboard", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let activities = after["recentActivities"].as_array().unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0]["title"], "Generated exam");
}
