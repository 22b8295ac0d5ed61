use std::sync::Mutex;

/// Why a feedback request fell back to a canned result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No coach credential configured; no call was attempted.
    Unconfigured,
    /// Transcription or review failed (network, quota, malformed audio).
    Transport,
    /// The coach responded but the payload violated the feedback contract.
    Malformed,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::Unconfigured => "unconfigured",
            FallbackReason::Transport => "transport",
            FallbackReason::Malformed => "malformed",
        }
    }
}

/// Failure-path events the core emits instead of logging ad hoc. Injected
/// so tests can assert on failure handling without capturing log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    StorageReadFailed { detail: String },
    StorageParseFailed { detail: String },
    StorageWriteFailed { detail: String },
    FeedbackFallback { reason: FallbackReason },
    MigrationItemFailed { submission_id: String, detail: String },
}

pub trait EventReporter: Send + Sync {
    fn report(&self, event: CoreEvent);
}

/// Production reporter: forwards events to the tracing subscriber.
pub struct TracingReporter;

impl EventReporter for TracingReporter {
    fn report(&self, event: CoreEvent) {
        match &event {
            CoreEvent::StorageReadFailed { detail } => {
                tracing::error!("Failed to read progress slot: {}", detail);
            }
            CoreEvent::StorageParseFailed { detail } => {
                tracing::warn!("Stored progress is corrupt, treating as empty: {}", detail);
            }
            CoreEvent::StorageWriteFailed { detail } => {
                tracing::error!("Failed to persist progress record: {}", detail);
            }
            CoreEvent::FeedbackFallback { reason } => {
                tracing::warn!("Feedback fell back to canned result: {}", reason.as_str());
            }
            CoreEvent::MigrationItemFailed {
                submission_id,
                detail,
            } => {
                tracing::warn!(
                    "Failed to migrate submission {}: {}",
                    submission_id,
                    detail
                );
            }
        }
    }
}

/// Test reporter: collects every event for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<CoreEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CoreEvent> {
        self.events
            .lock()
            .expect("event reporter mutex poisoned")
            .clone()
    }

    pub fn contains(&self, predicate: impl Fn(&CoreEvent) -> bool) -> bool {
        self.events().iter().any(predicate)
    }
}

impl EventReporter for RecordingReporter {
    fn report(&self, event: CoreEvent) {
        self.events
            .lock()
            .expect("event reporter mutex poisoned")
            .push(event);
    }
}
