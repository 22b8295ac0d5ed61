use axum::{extract::Query, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::models::drill;

const DEFAULT_RECENT_COUNT: usize = 7;
const MAX_RECENT_COUNT: usize = 30;

/// GET /api/v1/drills/today - Today's drill prompt.
pub async fn get_todays_drill() -> impl IntoResponse {
    let today = Utc::now().date_naive();
    Json(drill::todays_drill(today))
}

#[derive(Debug, Deserialize)]
pub struct RecentDrillsQuery {
    pub count: Option<usize>,
}

/// GET /api/v1/drills/recent - The most recent drills, newest first.
pub async fn list_recent_drills(Query(query): Query<RecentDrillsQuery>) -> impl IntoResponse {
    let count = query
        .count
        .unwrap_or(DEFAULT_RECENT_COUNT)
        .min(MAX_RECENT_COUNT);
    let today = Utc::now().date_naive();
    Json(drill::recent_drills(today, count))
}
