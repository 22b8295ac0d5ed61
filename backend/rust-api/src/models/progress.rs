use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::feedback::{Correction, Rubric};

/// Feedback as stored with a submission. Same rubric shape as
/// [`super::feedback::FeedbackResponse`] minus the transcript and
/// next-prompt fields, which live on the submission itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DrillFeedback {
    #[validate(nested)]
    pub rubric: Rubric,
    #[validate(range(min = 0, max = 100))]
    pub overall_score: u8,
    pub corrections: Vec<Correction>,
    pub encouragement: String,
}

/// One completed drill. Wire format matches the browser client's stored
/// payloads: camelCase keys, `date` as YYYY-MM-DD in the user's local
/// timezone, `createdAt` as a full timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DrillSubmission {
    pub id: String,
    pub date: NaiveDate,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_blob: Option<String>,
    pub transcript: String,
    #[validate(nested)]
    pub feedback: DrillFeedback,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
    pub last_drill_date: Option<NaiveDate>,
}

/// The full local state for one device: every submission in recording
/// order plus the derived counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[validate(nested)]
    pub drill_submissions: Vec<DrillSubmission>,
    pub streak: StreakState,
    pub total_drills_completed: u32,
    pub migrated: bool,
}

/// Request body for recording a completed drill. The server assigns the
/// submission id and creation timestamp.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDrillRequest {
    pub date: NaiveDate,
    #[validate(length(min = 1))]
    pub prompt: String,
    pub transcript: String,
    #[validate(nested)]
    pub feedback: DrillFeedback,
    #[serde(default)]
    pub audio_blob: Option<String>,
}
