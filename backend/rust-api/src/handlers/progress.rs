use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::progress::{DrillSubmission, SubmitDrillRequest};
use crate::services::AppState;

/// GET /api/v1/progress - Current local progress record (default empty
/// record when nothing has been stored yet).
pub async fn get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.progress.read())
}

/// POST /api/v1/progress/submissions - Record a completed drill.
///
/// The streak is anchored to wall-clock "today", not the submission's own
/// date: backdated submissions count toward totals but do not rebuild a
/// streak.
pub async fn submit_drill(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitDrillRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Err(e) = req.validate() {
        return Err((StatusCode::BAD_REQUEST, format!("Validation error: {}", e)));
    }

    tracing::info!("Recording drill submission for {}", req.date);

    let submission = DrillSubmission {
        id: Uuid::new_v4().to_string(),
        date: req.date,
        prompt: req.prompt,
        audio_blob: req.audio_blob,
        transcript: req.transcript,
        feedback: req.feedback,
        created_at: Utc::now(),
    };

    let today = Utc::now().date_naive();
    let record = state.progress.append(submission, today);

    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/progress - Explicit reset flow, discards all history.
pub async fn clear_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::info!("Clearing local progress record");
    state.progress.clear();
    StatusCode::NO_CONTENT
}
