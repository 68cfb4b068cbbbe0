use crate::event::{EventRecord, LogStream, ParseError};
use crate::notify::{Notifier, NotifyError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Operation name marking a completed write. Any other operation is an
/// in-progress or irrelevant one and is skipped.
pub const WRITE_COMPLETED_OPERATION: &str = "PutRange";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("parse failure: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid operation uri: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("notify failure: {0}")]
    Notify(#[from] NotifyError),
}

/// One captured failure, tagged with the batch position of its record.
#[derive(Debug)]
pub struct RecordFailure {
    pub index: usize,
    pub reason: RecordError,
}

/// Post-batch failure signal: one wrapped reason, or all of them in
/// occurrence order.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("record {}: {}", .0.index, .0.reason)]
    Single(RecordFailure),

    #[error("batch completed with {} failures: {}", .0.len(), summarize(.0))]
    Multiple(Vec<RecordFailure>),
}

fn summarize(failures: &[RecordFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("record {}: {}", f.index, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl BatchError {
    /// Folds captured failures into the batch signal. Empty input means the
    /// batch succeeded.
    pub fn from_failures(mut failures: Vec<RecordFailure>) -> Option<Self> {
        match failures.len() {
            0 => None,
            1 => failures.pop().map(Self::Single),
            _ => Some(Self::Multiple(failures)),
        }
    }

    /// All captured failures, in occurrence order.
    pub fn failures(&self) -> &[RecordFailure] {
        match self {
            Self::Single(failure) => std::slice::from_ref(failure),
            Self::Multiple(failures) => failures,
        }
    }
}

/// Totals for a fully successful batch, reported for logging.
#[derive(Debug, Clone, Copy)]
pub struct BatchStats {
    pub records_attempted: usize,
    pub notifications_sent: usize,
}

/// Processes event batches with partial-failure isolation: every record is
/// attempted exactly once, failures are collected, and a single aggregate
/// signal is raised only after the whole batch has been attempted.
pub struct BatchEventProcessor {
    notifier: Arc<dyn Notifier>,
    target_path_filter: Option<String>,
}

impl BatchEventProcessor {
    pub fn new(notifier: Arc<dyn Notifier>, target_path_filter: Option<String>) -> Self {
        Self {
            notifier,
            target_path_filter,
        }
    }

    /// Attempts every record in order. A record's failure never stops its
    /// siblings; the collected reasons become the final signal.
    pub async fn process_batch(&self, batch: &[EventRecord]) -> Result<BatchStats, BatchError> {
        let mut failures = Vec::new();
        let mut notifications_sent = 0usize;

        for (index, record) in batch.iter().enumerate() {
            self.process_record(index, record, &mut failures, &mut notifications_sent)
                .await;
        }

        match BatchError::from_failures(failures) {
            None => Ok(BatchStats {
                records_attempted: batch.len(),
                notifications_sent,
            }),
            Some(error) => Err(error),
        }
    }

    async fn process_record(
        &self,
        index: usize,
        record: &EventRecord,
        failures: &mut Vec<RecordFailure>,
        notifications_sent: &mut usize,
    ) {
        let logs = match LogStream::parse(record) {
            Ok(logs) => logs,
            Err(e) => {
                warn!(record = index, error = %e, "Failed to parse event body");
                failures.push(RecordFailure {
                    index,
                    reason: e.into(),
                });
                return;
            }
        };

        for operation in &logs.records {
            // Only forward operations for files that are completed
            if operation.operation_name != WRITE_COMPLETED_OPERATION {
                debug!(
                    record = index,
                    operation = %operation.operation_name,
                    "Skipping operation"
                );
                continue;
            }

            let uri = match Url::parse(&operation.uri) {
                Ok(uri) => uri,
                Err(e) => {
                    warn!(record = index, uri = %operation.uri, error = %e, "Invalid operation uri");
                    failures.push(RecordFailure {
                        index,
                        reason: e.into(),
                    });
                    // A bad uri ends this record; siblings are unaffected.
                    return;
                }
            };
            let path = uri.path();

            if !self.path_eligible(path) {
                debug!(record = index, path = %path, "Path outside target directory");
                continue;
            }

            match self.notifier.notify(path).await {
                Ok(()) => *notifications_sent += 1,
                Err(e) => failures.push(RecordFailure {
                    index,
                    reason: e.into(),
                }),
            }
        }
    }

    fn path_eligible(&self, path: &str) -> bool {
        match &self.target_path_filter {
            Some(filter) => path.contains(filter.as_str()),
            None => true,
        }
    }
}
