use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::handlers::require_user_id;
use crate::models::migration::{MigrateProgressResponse, MigrationReport};
use crate::models::progress::ProgressRecord;
use crate::services::{migration_service::MigrationService, AppState};

/// POST /api/v1/migrate/progress - Reconcile a client-held progress
/// payload into server-side storage. The client marks its own copy
/// migrated once this succeeds.
pub async fn migrate_progress(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(progress): Json<ProgressRecord>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = require_user_id(&headers)?;

    if let Err(e) = progress.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Invalid progress data: {}", e),
        ));
    }

    tracing::info!(
        "Migrating {} submissions for user {}",
        progress.drill_submissions.len(),
        user_id
    );

    let service = MigrationService::new(state.sink.clone(), state.reporter.clone());
    match service.migrate(&user_id, &progress).await {
        Ok(report) => Ok((StatusCode::OK, Json(response_from(report)))),
        Err(e) => {
            tracing::error!("Failed to migrate progress: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to migrate progress".to_string(),
            ))
        }
    }
}

/// POST /api/v1/migrate/local - Reconcile this device's own store, then
/// flip its migrated flag. Retries are safe: duplicates are no-ops
/// server-side and the flag is only set after a completed pass.
pub async fn migrate_local_progress(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = require_user_id(&headers)?;

    if !state.progress.has_unmigrated_history() {
        tracing::info!("No unmigrated history for user {}", user_id);
        return Ok((
            StatusCode::OK,
            Json(MigrateProgressResponse {
                success: true,
                migrated_count: 0,
                total_submissions: 0,
            }),
        ));
    }

    let record = state.progress.read();
    let service = MigrationService::new(state.sink.clone(), state.reporter.clone());

    match service.migrate(&user_id, &record).await {
        Ok(report) => {
            state.progress.mark_migrated();
            Ok((StatusCode::OK, Json(response_from(report))))
        }
        Err(e) => {
            // Leave the migrated flag untouched so the next login retries.
            tracing::error!("Failed to migrate local progress: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to migrate progress".to_string(),
            ))
        }
    }
}

fn response_from(report: MigrationReport) -> MigrateProgressResponse {
    MigrateProgressResponse {
        success: true,
        migrated_count: report.migrated_count,
        total_submissions: report.total_submissions,
    }
}
