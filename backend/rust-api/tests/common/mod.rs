#![allow(dead_code)]

use axum::Router;
use std::sync::Arc;

use morningsprint_api::{
    config::Config,
    create_router,
    services::{
        events::RecordingReporter,
        feedback_service::{CoachBackend, FeedbackService},
        migration_service::{MemorySink, SubmissionSink},
        progress_store::{MemorySlot, ProgressStore},
        AppState,
    },
};

pub struct TestApp {
    pub router: Router,
    pub sink: Arc<MemorySink>,
    pub reporter: Arc<RecordingReporter>,
}

pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        progress_path: "unused-in-tests.json".to_string(),
        openai_api_key: None,
        openai_base_url: "http://localhost:0".to_string(),
        sync_api_url: "http://localhost:0".to_string(),
        sync_api_key: String::new(),
    }
}

/// Default test app: in-memory progress slot, in-memory sink, no coach
/// configured (feedback serves the deterministic fallback).
pub fn create_test_app() -> TestApp {
    create_test_app_with_coach(None)
}

pub fn create_test_app_with_coach(coach: Option<Arc<dyn CoachBackend>>) -> TestApp {
    let sink = Arc::new(MemorySink::new());
    create_test_app_full(coach, sink)
}

pub fn create_test_app_full(
    coach: Option<Arc<dyn CoachBackend>>,
    sink: Arc<MemorySink>,
) -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let reporter = Arc::new(RecordingReporter::new());
    let progress = ProgressStore::new(Box::new(MemorySlot::new()), reporter.clone());
    let feedback = FeedbackService::new(coach, reporter.clone());

    let state = AppState::with_parts(
        test_config(),
        progress,
        feedback,
        sink.clone(),
        reporter.clone(),
    );

    TestApp {
        router: create_router(Arc::new(state)),
        sink,
        reporter,
    }
}

/// Test app with an arbitrary submission sink (e.g. one that always fails).
pub fn create_test_app_with_sink(sink: Arc<dyn SubmissionSink>) -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let reporter = Arc::new(RecordingReporter::new());
    let progress = ProgressStore::new(Box::new(MemorySlot::new()), reporter.clone());
    let feedback = FeedbackService::new(None, reporter.clone());

    let state = AppState::with_parts(test_config(), progress, feedback, sink, reporter.clone());

    TestApp {
        router: create_router(Arc::new(state)),
        sink: Arc::new(MemorySink::new()),
        reporter,
    }
}
