use std::sync::Arc;

use crate::config::Config;

use self::events::{EventReporter, TracingReporter};
use self::feedback_service::FeedbackService;
use self::migration_service::{RestSink, SubmissionSink};
use self::progress_store::{FileSlot, ProgressStore};

pub struct AppState {
    pub config: Config,
    pub progress: ProgressStore,
    pub coach: FeedbackService,
    pub sink: Arc<dyn SubmissionSink>,
    pub reporter: Arc<dyn EventReporter>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let reporter: Arc<dyn EventReporter> = Arc::new(TracingReporter);

        let progress = ProgressStore::new(
            Box::new(FileSlot::new(config.progress_path.clone())),
            reporter.clone(),
        );
        tracing::info!("Progress store backed by {}", config.progress_path);

        let coach = FeedbackService::from_config(&config, reporter.clone())?;
        if coach.is_configured() {
            tracing::info!("Speech coach configured ({})", config.openai_base_url);
        } else {
            tracing::warn!("Speech coach not configured, serving fallback feedback");
        }

        let sink: Arc<dyn SubmissionSink> = Arc::new(RestSink::new(
            config.sync_api_url.clone(),
            config.sync_api_key.clone(),
        )?);

        Ok(Self {
            config,
            progress,
            coach,
            sink,
            reporter,
        })
    }

    /// Assembles state from pre-built parts. Tests use this to inject
    /// in-memory storage, scripted coaches, and recording sinks.
    pub fn with_parts(
        config: Config,
        progress: ProgressStore,
        coach: FeedbackService,
        sink: Arc<dyn SubmissionSink>,
        reporter: Arc<dyn EventReporter>,
    ) -> Self {
        Self {
            config,
            progress,
            coach,
            sink,
            reporter,
        }
    }
}

pub mod events;
pub mod feedback_service;
pub mod migration_service;
pub mod progress_store;
pub mod streak;
