use chrono::{DateTime, Utc};
use serde::Serialize;

use super::feedback::Rubric;
use super::progress::{DrillFeedback, DrillSubmission};

#[derive(Debug, Serialize)]
pub struct MigrateProgressResponse {
    pub success: bool,
    pub migrated_count: usize,
    pub total_submissions: usize,
}

/// Counts from one migration pass. `migrated_count` is newly inserted rows
/// only; retries of already-synced history land in `duplicate_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated_count: usize,
    pub duplicate_count: usize,
    pub failed_count: usize,
    pub total_submissions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub overall: u8,
    pub rubric: Rubric,
}

/// Row shape written to server-side storage. Dedup key is
/// `(user_id, created_at)`: multiple submissions may share a `date`, but
/// each has a distinct creation timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRow {
    pub user_id: String,
    pub transcript: String,
    pub feedback_json: DrillFeedback,
    pub score_json: ScoreSummary,
    pub created_at: DateTime<Utc>,
}

impl SubmissionRow {
    pub fn from_submission(user_id: &str, submission: &DrillSubmission) -> Self {
        Self {
            user_id: user_id.to_string(),
            transcript: submission.transcript.clone(),
            feedback_json: submission.feedback.clone(),
            score_json: ScoreSummary {
                overall: submission.feedback.overall_score,
                rubric: submission.feedback.rubric.clone(),
            },
            created_at: submission.created_at,
        }
    }
}
