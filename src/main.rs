// src/main.rs

use std::sync::Arc;

use dotenvy::dotenv;
use examforge::config::Config;
use examforge::routes;
use examforge::services::extractor::SyllabusExtractor;
use examforge::services::gemini::GeminiClient;
use examforge::services::generator::ExamGenerator;
use examforge::services::session_store::{HandoffStore, SessionStore};
use examforge::state::AppState;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    // Seed Default Subjects
    if let Err(e) = seed_default_subjects(&pool).await {
        tracing::error!("Failed to seed default subjects: {:?}", e);
    }

    let gemini = GeminiClient::new(&config);
    if gemini.is_configured() {
        tracing::info!("Generative endpoint configured (model: {})", config.gemini_model);
    } else {
        tracing::warn!(
            "GEMINI_API_KEY not set: exam generation runs on the fixture bank and \
             syllabus extraction will report an upstream error"
        );
    }

    // Create AppState
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        generator: Arc::new(ExamGenerator::new(&config, gemini.clone())),
        extractor: SyllabusExtractor::new(gemini),
        sessions: SessionStore::new(),
        handoff: HandoffStore::new(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

/// Seeds a small starter subject set so a fresh install has something to
/// show on the dashboard and in the exam form.
async fn seed_default_subjects(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subjects")
        .fetch_one(pool)
        .await?;

    if count.0 > 0 {
        return Ok(());
    }

    tracing::info!("Seeding default subjects");
    let defaults = [
        ("Mathematics", "#2563eb", "sigma"),
        ("Physics", "#9333ea", "atom"),
        ("Chemistry", "#16a34a", "flask"),
        ("Biology", "#ca8a04", "leaf"),
    ];

    for (name, color, icon) in defaults {
        sqlx::query("INSERT INTO subjects (name, color_code, icon_name) VALUES (?1, ?2, ?3)")
            .bind(name)
            .bind(color)
            .bind(icon)
            .execute(pool)
            .await?;
    }

    Ok(())
}
