//! Per-record outcomes and the batch summary.

use std::fmt;

use crate::errors::PipelineError;
use crate::processor::{IndexOperation, SkipReason};

/// What happened to one record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// The index call returned `true`.
    Succeeded(IndexOperation),
    /// The index call returned `false`: an add that overwrote, an upsert that
    /// inserted, a delete of a missing document.
    Rejected(IndexOperation),
    /// The record produced no operation.
    Skipped(SkipReason),
    /// The index call failed.
    Failed {
        operation: IndexOperation,
        error: PipelineError,
    },
}

impl RecordOutcome {
    pub fn operation(&self) -> Option<&IndexOperation> {
        match self {
            Self::Succeeded(operation) | Self::Rejected(operation) => Some(operation),
            Self::Failed { operation, .. } => Some(operation),
            Self::Skipped(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of one record, with its position in the batch.
#[derive(Debug)]
pub struct RecordResult {
    pub position: usize,
    pub event_id: Option<String>,
    pub outcome: RecordOutcome,
}

/// Aggregate result of a batch.
///
/// `processed` counts every record in the batch, skipped and failed ones
/// included.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed: usize,
    pub results: Vec<RecordResult>,
}

impl BatchSummary {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn push(&mut self, result: RecordResult) {
        self.processed += 1;
        match result.outcome {
            RecordOutcome::Succeeded(_) => self.succeeded += 1,
            RecordOutcome::Rejected(_) => self.rejected += 1,
            RecordOutcome::Skipped(_) => self.skipped += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
        self.results.push(result);
    }

    /// Whether any index call failed. A harness should redrive the batch.
    pub fn has_errors(&self) -> bool {
        self.failed > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordResult> {
        self.results.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn message(&self) -> String {
        format!("Successfully processed {} records.", self.processed)
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
