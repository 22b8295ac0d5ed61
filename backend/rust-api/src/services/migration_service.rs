use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::metrics;
use crate::models::migration::{MigrationReport, SubmissionRow};
use crate::models::progress::{DrillSubmission, ProgressRecord};
use crate::services::events::{CoreEvent, EventReporter};
use crate::utils::retry::{retry_async, RetryConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// The `(user_id, created_at)` key already exists server-side; the
    /// submission was migrated by an earlier pass.
    Duplicate,
}

/// Server-side storage boundary. Implementations must make re-submitting
/// the same `(user_id, created_at)` pair a no-op, never an error.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn upsert_submission(
        &self,
        user_id: &str,
        submission: &DrillSubmission,
    ) -> Result<UpsertOutcome>;
}

/// PostgREST-style sink: idempotent insert with ignore-duplicates on the
/// `(user_id, created_at)` unique constraint. Duplicates are detected by
/// the representation coming back empty.
pub struct RestSink {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestSink {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for progress sync")?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl SubmissionSink for RestSink {
    async fn upsert_submission(
        &self,
        user_id: &str,
        submission: &DrillSubmission,
    ) -> Result<UpsertOutcome> {
        let row = SubmissionRow::from_submission(user_id, submission);
        let url = format!(
            "{}/rest/v1/drill_submissions?on_conflict=user_id,created_at",
            self.base_url
        );

        let response = retry_async(RetryConfig::default(), || {
            self.http
                .post(&url)
                .header("apikey", &self.api_key)
                .bearer_auth(&self.api_key)
                .header("Prefer", "resolution=ignore-duplicates,return=representation")
                .json(&[&row])
                .send()
        })
        .await
        .context("Failed to reach progress sync API")?;

        if !response.status().is_success() {
            anyhow::bail!("Progress sync API returned status: {}", response.status());
        }

        let inserted: Vec<serde_json::Value> = response
            .json()
            .await
            .context("Failed to parse progress sync response")?;

        if inserted.is_empty() {
            Ok(UpsertOutcome::Duplicate)
        } else {
            Ok(UpsertOutcome::Inserted)
        }
    }
}

/// In-memory sink for tests, keyed exactly like the server table.
#[derive(Default)]
pub struct MemorySink {
    rows: Mutex<HashMap<(String, String), serde_json::Value>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().expect("memory sink mutex poisoned").len()
    }
}

#[async_trait]
impl SubmissionSink for MemorySink {
    async fn upsert_submission(
        &self,
        user_id: &str,
        submission: &DrillSubmission,
    ) -> Result<UpsertOutcome> {
        let key = (user_id.to_string(), submission.created_at.to_rfc3339());
        let row = serde_json::to_value(SubmissionRow::from_submission(user_id, submission))?;

        let mut rows = self.rows.lock().expect("memory sink mutex poisoned");
        if rows.contains_key(&key) {
            Ok(UpsertOutcome::Duplicate)
        } else {
            rows.insert(key, row);
            Ok(UpsertOutcome::Inserted)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("progress sync rejected every submission ({failed} of {total}); last error: {last_error}")]
    AllFailed {
        failed: usize,
        total: usize,
        last_error: String,
    },
}

/// One-shot reconciler: pushes locally held submissions into server-side
/// storage. Safe to re-run; duplicates are no-ops server-side.
pub struct MigrationService {
    sink: Arc<dyn SubmissionSink>,
    reporter: Arc<dyn EventReporter>,
}

impl MigrationService {
    pub fn new(sink: Arc<dyn SubmissionSink>, reporter: Arc<dyn EventReporter>) -> Self {
        Self { sink, reporter }
    }

    /// Attempts every submission; per-item failures are reported and
    /// counted but never abort the batch. Only when every item fails does
    /// the whole call error, so the caller knows not to mark local state
    /// migrated and a later retry re-attempts everything.
    pub async fn migrate(
        &self,
        user_id: &str,
        progress: &ProgressRecord,
    ) -> Result<MigrationReport, MigrationError> {
        let mut report = MigrationReport {
            total_submissions: progress.drill_submissions.len(),
            ..MigrationReport::default()
        };
        let mut last_error = String::new();

        for submission in &progress.drill_submissions {
            match self.sink.upsert_submission(user_id, submission).await {
                Ok(UpsertOutcome::Inserted) => {
                    report.migrated_count += 1;
                    metrics::MIGRATION_SUBMISSIONS_TOTAL
                        .with_label_values(&["migrated"])
                        .inc();
                }
                Ok(UpsertOutcome::Duplicate) => {
                    report.duplicate_count += 1;
                    metrics::MIGRATION_SUBMISSIONS_TOTAL
                        .with_label_values(&["duplicate"])
                        .inc();
                }
                Err(e) => {
                    report.failed_count += 1;
                    last_error = format!("{:#}", e);
                    metrics::MIGRATION_SUBMISSIONS_TOTAL
                        .with_label_values(&["failed"])
                        .inc();
                    self.reporter.report(CoreEvent::MigrationItemFailed {
                        submission_id: submission.id.clone(),
                        detail: last_error.clone(),
                    });
                }
            }
        }

        if report.total_submissions > 0 && report.failed_count == report.total_submissions {
            return Err(MigrationError::AllFailed {
                failed: report.failed_count,
                total: report.total_submissions,
                last_error,
            });
        }

        tracing::info!(
            "Migration pass for user {}: {} migrated, {} duplicate, {} failed of {}",
            user_id,
            report.migrated_count,
            report.duplicate_count,
            report.failed_count,
            report.total_submissions
        );

        Ok(report)
    }
}
