use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

/// Records request count and latency for every HTTP request.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Collapses dynamic path segments (ids, calendar dates) so label
/// cardinality stays bounded.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if is_uuid_like(segment) || is_numeric_id(segment) || is_calendar_date(segment) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// YYYY-MM-DD segments, e.g. drill ids keyed by date.
fn is_calendar_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && s.chars()
            .enumerate()
            .all(|(i, c)| matches!(i, 4 | 7) || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_uuid_and_numeric_segments() {
        assert_eq!(
            normalize_path("/api/v1/progress/550e8400-e29b-41d4-a716-446655440000"),
            "/api/v1/progress/{id}"
        );
        assert_eq!(normalize_path("/api/v1/drills/123"), "/api/v1/drills/{id}");
        assert_eq!(normalize_path("/health"), "/health");
    }

    #[test]
    fn normalizes_date_segments() {
        assert_eq!(
            normalize_path("/api/v1/drills/2024-01-01"),
            "/api/v1/drills/{id}"
        );
        assert!(!is_calendar_date("2024-1-01"));
        assert!(!is_calendar_date("not-a-date"));
    }
}
