//! Drives decoded stream batches through the dispatcher against an
//! in-memory index.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use search_sync_pipeline::consumer::StreamBatch;
use search_sync_pipeline::{BatchDispatcher, RecordOutcome};
use search_sync_repository::{SearchIndexError, SearchIndexProvider};
use search_sync_shared::{DocumentFields, SearchQuery, SearchResult, WildcardResult};

/// In-memory index keyed by (index name, document id).
#[derive(Default)]
struct InMemoryIndex {
    docs: Mutex<HashMap<(String, String), DocumentFields>>,
    unavailable_index: Option<String>,
}

impl InMemoryIndex {
    fn unavailable_for(index_name: &str) -> Self {
        Self {
            unavailable_index: Some(index_name.to_string()),
            ..Self::default()
        }
    }

    fn check(&self, index_name: &str) -> Result<(), SearchIndexError> {
        match &self.unavailable_index {
            Some(name) if name == index_name => {
                Err(SearchIndexError::connection("connection reset by peer"))
            }
            _ => Ok(()),
        }
    }

    fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    fn key(index_name: &str, doc_id: &str) -> (String, String) {
        (index_name.to_string(), doc_id.to_string())
    }
}

#[async_trait]
impl SearchIndexProvider for InMemoryIndex {
    async fn add(
        &self,
        index_name: &str,
        doc_id: &str,
        fields: &DocumentFields,
    ) -> Result<bool, SearchIndexError> {
        self.check(index_name)?;
        let previous = self
            .docs
            .lock()
            .unwrap()
            .insert(Self::key(index_name, doc_id), fields.clone());
        Ok(previous.is_none())
    }

    async fn update(
        &self,
        index_name: &str,
        doc_id: &str,
        fields: &DocumentFields,
    ) -> Result<bool, SearchIndexError> {
        self.check(index_name)?;
        let mut docs = self.docs.lock().unwrap();
        match docs.get_mut(&Self::key(index_name, doc_id)) {
            Some(existing) => {
                existing.extend(fields.clone());
                Ok(true)
            }
            None => {
                docs.insert(Self::key(index_name, doc_id), fields.clone());
                Ok(false)
            }
        }
    }

    async fn delete(&self, index_name: &str, doc_id: &str) -> Result<bool, SearchIndexError> {
        self.check(index_name)?;
        let removed = self
            .docs
            .lock()
            .unwrap()
            .remove(&Self::key(index_name, doc_id));
        Ok(removed.is_some())
    }

    async fn get_one(
        &self,
        index_name: &str,
        doc_id: &str,
    ) -> Result<Option<Value>, SearchIndexError> {
        self.check(index_name)?;
        let docs = self.docs.lock().unwrap();
        Ok(docs
            .get(&Self::key(index_name, doc_id))
            .map(|fields| json!(fields)))
    }

    async fn search(
        &self,
        _index_name: &str,
        _query: &SearchQuery,
    ) -> Result<SearchResult, SearchIndexError> {
        Ok(SearchResult::empty())
    }

    async fn wildcard(
        &self,
        _index_name: &str,
        _pattern: &str,
        _field: &str,
    ) -> Result<WildcardResult, SearchIndexError> {
        Ok(WildcardResult {
            total_hits: 0,
            raw: Value::Null,
        })
    }

    async fn drop_index(&self, index_name: &str) -> Result<(), SearchIndexError> {
        self.docs
            .lock()
            .unwrap()
            .retain(|(index, _), _| index != index_name);
        Ok(())
    }
}

fn insert_batch() -> StreamBatch {
    StreamBatch::from_json(
        r#"{
            "Records": [
                {
                    "eventID": "1",
                    "eventName": "INSERT",
                    "dynamodb": {
                        "Keys": { "id": { "S": "abc" }, "sortKey": { "S": "episodes" } },
                        "NewImage": {
                            "title": { "S": "T" },
                            "podcastId": { "S": "p1" },
                            "duration": { "N": "3600" }
                        },
                        "SequenceNumber": "100"
                    }
                }
            ]
        }"#,
    )
    .unwrap()
}

fn remove_batch() -> StreamBatch {
    StreamBatch::from_json(
        r#"{
            "Records": [
                {
                    "eventID": "2",
                    "eventName": "remove",
                    "dynamodb": {
                        "Keys": { "id": { "S": "abc" }, "sortKey": { "S": "episodes" } }
                    }
                }
            ]
        }"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_insert_then_get_round_trip() {
    let index = Arc::new(InMemoryIndex::default());
    let dispatcher = BatchDispatcher::new(index.clone());

    let summary = dispatcher.process_batch(&insert_batch().records).await;

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.message(), "Successfully processed 1 records.");
    assert!(matches!(summary.results[0].outcome, RecordOutcome::Succeeded(_)));

    let source = index.get_one("episodes", "abc").await.unwrap();
    assert_eq!(source, Some(json!({ "title": "T", "podcastId": "p1" })));
}

#[tokio::test]
async fn test_redelivered_insert_converges() {
    let index = Arc::new(InMemoryIndex::default());
    let dispatcher = BatchDispatcher::new(index.clone());

    let first = dispatcher.process_batch(&insert_batch().records).await;
    let second = dispatcher.process_batch(&insert_batch().records).await;

    assert_eq!(first.succeeded, 1);
    // The overwrite reports false but is not an error
    assert_eq!(second.rejected, 1);
    assert!(!second.has_errors());

    assert_eq!(index.len(), 1);
    let source = index.get_one("episodes", "abc").await.unwrap();
    assert_eq!(source, Some(json!({ "title": "T", "podcastId": "p1" })));
}

#[tokio::test]
async fn test_remove_of_missing_document_continues() {
    let index = Arc::new(InMemoryIndex::default());
    let dispatcher = BatchDispatcher::new(index.clone());

    let mut records = remove_batch().records;
    records.extend(insert_batch().records);

    let summary = dispatcher.process_batch(&records).await;

    assert_eq!(summary.processed, 2);
    assert!(matches!(summary.results[0].outcome, RecordOutcome::Rejected(_)));
    assert!(matches!(summary.results[1].outcome, RecordOutcome::Succeeded(_)));
    assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn test_insert_modify_remove_sequence() {
    let index = Arc::new(InMemoryIndex::default());
    let dispatcher = BatchDispatcher::new(index.clone());

    let batch = StreamBatch::from_json(
        r#"{
            "Records": [
                {
                    "eventName": "Insert",
                    "dynamodb": {
                        "Keys": { "id": { "S": "e1" } },
                        "NewImage": { "title": { "S": "First" } }
                    }
                },
                {
                    "eventName": "MODIFY",
                    "dynamodb": {
                        "Keys": { "id": { "S": "e1" } },
                        "NewImage": { "title": { "S": "Second" }, "type": { "S": "episode" } }
                    }
                },
                {
                    "eventName": "MODIFY",
                    "dynamodb": {
                        "Keys": { "id": { "S": "e2" } },
                        "NewImage": { "title": { "S": "Upserted" } }
                    }
                },
                {
                    "eventName": "REMOVE",
                    "dynamodb": { "Keys": { "id": { "S": "e2" } } }
                }
            ]
        }"#,
    )
    .unwrap();

    let summary = dispatcher.process_batch(&batch.records).await;

    assert_eq!(summary.processed, 4);
    // The upsert of e2 inserted rather than updated
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.rejected, 1);

    let source = index.get_one("default", "e1").await.unwrap();
    assert_eq!(source, Some(json!({ "title": "Second", "type": "episode" })));
    assert_eq!(index.get_one("default", "e2").await.unwrap(), None);
}

#[tokio::test]
async fn test_skipped_records_are_counted() {
    let index = Arc::new(InMemoryIndex::default());
    let dispatcher = BatchDispatcher::new(index.clone());

    let batch = StreamBatch::from_json(
        r#"{
            "Records": [
                { "eventName": "INSERT", "dynamodb": { "Keys": { "sortKey": { "S": "episodes" } } } },
                { "eventName": "INSERT", "dynamodb": { "Keys": { "id": { "N": "12" } } } },
                { "eventName": "TTL_EXPIRE", "dynamodb": { "Keys": { "id": { "S": "abc" } } } },
                { "dynamodb": { "Keys": { "id": { "S": "abc" } } } }
            ]
        }"#,
    )
    .unwrap();

    let summary = dispatcher.process_batch(&batch.records).await;

    assert_eq!(summary.processed, 4);
    assert_eq!(summary.skipped, 4);
    assert_eq!(index.len(), 0);
    assert_eq!(summary.to_string(), "Successfully processed 4 records.");
}

#[tokio::test]
async fn test_transport_failure_does_not_abort_batch() {
    let index = Arc::new(InMemoryIndex::unavailable_for("broken"));
    let dispatcher = BatchDispatcher::new(index.clone());

    let batch = StreamBatch::from_json(
        r#"{
            "Records": [
                {
                    "eventID": "a",
                    "eventName": "INSERT",
                    "dynamodb": {
                        "Keys": { "id": { "S": "x" }, "sortKey": { "S": "broken" } },
                        "NewImage": { "title": { "S": "lost" } }
                    }
                },
                {
                    "eventID": "b",
                    "eventName": "INSERT",
                    "dynamodb": {
                        "Keys": { "id": { "S": "y" }, "sortKey": { "S": "episodes" } },
                        "NewImage": { "title": { "S": "kept" } }
                    }
                }
            ]
        }"#,
    )
    .unwrap();

    let summary = dispatcher.process_batch(&batch.records).await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(summary.has_errors());
    assert_eq!(
        summary.failures().next().and_then(|r| r.event_id.as_deref()),
        Some("a")
    );
    assert_eq!(
        index.get_one("episodes", "y").await.unwrap(),
        Some(json!({ "title": "kept" }))
    );
}
