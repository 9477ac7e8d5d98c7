//! Dispatcher module for the search sync pipeline.
//!
//! Applies a batch of change records to the search index, one record at a
//! time and in delivery order.

mod summary;

use std::sync::Arc;

use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

use crate::consumer::ChangeRecord;
use crate::errors::PipelineError;
use crate::processor::{classify, IndexOperation};
use search_sync_repository::SearchIndexProvider;

pub use summary::{BatchSummary, RecordOutcome, RecordResult};

/// Dispatcher that applies change records to the search index.
///
/// Records are awaited one at a time so that an insert followed by a modify
/// (or a remove followed by an insert) of the same document converges to the
/// right state. A failing record never stops the rest of the batch.
pub struct BatchDispatcher {
    provider: Arc<dyn SearchIndexProvider>,
}

impl BatchDispatcher {
    /// Create a new dispatcher over the given provider.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self { provider }
    }

    /// Process a batch of change records.
    ///
    /// # Arguments
    ///
    /// * `records` - The records, in delivery order
    ///
    /// # Returns
    ///
    /// A summary counting every record and holding each record's outcome.
    /// Index failures are reported in the summary, never returned as an error.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub async fn process_batch(&self, records: &[ChangeRecord]) -> BatchSummary {
        let mut summary = BatchSummary::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            let span = info_span!(
                "record",
                position = position,
                event_id = record.event_id.as_deref().unwrap_or_default(),
                event_kind = %record.event_kind(),
            );
            let outcome = self.process_record(record).instrument(span).await;

            summary.push(RecordResult {
                position,
                event_id: record.event_id.clone(),
                outcome,
            });
        }

        info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            rejected = summary.rejected,
            skipped = summary.skipped,
            failed = summary.failed,
            "Processed batch"
        );
        summary
    }

    async fn process_record(&self, record: &ChangeRecord) -> RecordOutcome {
        debug!(
            sequence_number = record.sequence_number().unwrap_or_default(),
            created_at = ?record.created_at(),
            keys = ?record.dynamodb.keys,
            new_image = ?record.dynamodb.new_image,
            "Processing record"
        );

        let operation = match classify(record) {
            Ok(operation) => operation,
            Err(reason) => {
                info!(reason = %reason, "Skipping record");
                return RecordOutcome::Skipped(reason);
            }
        };

        match self.apply(&operation).await {
            Ok(true) => {
                info!(
                    index = %operation.index_name(),
                    doc_id = %operation.doc_id(),
                    "{}: true",
                    operation.verb()
                );
                RecordOutcome::Succeeded(operation)
            }
            Ok(false) => {
                warn!(
                    index = %operation.index_name(),
                    doc_id = %operation.doc_id(),
                    "{}: false",
                    operation.verb()
                );
                RecordOutcome::Rejected(operation)
            }
            Err(e) => {
                error!(
                    index = %operation.index_name(),
                    doc_id = %operation.doc_id(),
                    error = %e,
                    "Failed to apply record"
                );
                RecordOutcome::Failed {
                    operation,
                    error: e,
                }
            }
        }
    }

    /// Apply a single operation to the index.
    pub async fn apply(&self, operation: &IndexOperation) -> Result<bool, PipelineError> {
        let applied = match operation {
            IndexOperation::Add(doc) => {
                self.provider
                    .add(&doc.index_name, &doc.doc_id, &doc.fields)
                    .await?
            }
            IndexOperation::Update(doc) => {
                self.provider
                    .update(&doc.index_name, &doc.doc_id, &doc.fields)
                    .await?
            }
            IndexOperation::Delete { index_name, doc_id } => {
                self.provider.delete(index_name, doc_id).await?
            }
        };
        Ok(applied)
    }
}
