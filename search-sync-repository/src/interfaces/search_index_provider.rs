//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use search_sync_shared::{DocumentFields, SearchQuery, SearchResult, WildcardResult};

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into the batch dispatcher to enable dependency injection
/// and easy testing with mock implementations.
///
/// The write operations return `Ok(bool)` where the boolean mirrors the engine's
/// result status for the document. `Err` is reserved for transport, signing and
/// response failures.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Write a document under an explicit id.
    ///
    /// # Arguments
    ///
    /// * `index_name` - The target index
    /// * `doc_id` - The document id
    /// * `fields` - The document source
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the engine reports the document as newly created
    /// * `Ok(false)` - If the engine reports any other result, e.g. an existing
    ///   document was overwritten
    /// * `Err(SearchIndexError)` - If the request fails
    async fn add(
        &self,
        index_name: &str,
        doc_id: &str,
        fields: &DocumentFields,
    ) -> Result<bool, SearchIndexError>;

    /// Upsert a document: merge `fields` into an existing document, or insert
    /// `fields` when it does not exist.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the engine reports the document as updated
    /// * `Ok(false)` - If it was inserted through the upsert fallback or left unchanged
    /// * `Err(SearchIndexError)` - If the request fails
    async fn update(
        &self,
        index_name: &str,
        doc_id: &str,
        fields: &DocumentFields,
    ) -> Result<bool, SearchIndexError>;

    /// Delete a document.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the engine reports the document as deleted
    /// * `Ok(false)` - If the document did not exist
    /// * `Err(SearchIndexError)` - If the request fails
    async fn delete(&self, index_name: &str, doc_id: &str) -> Result<bool, SearchIndexError>;

    /// Fetch the stored source of a document, or `None` when it does not exist.
    async fn get_one(&self, index_name: &str, doc_id: &str)
        -> Result<Option<Value>, SearchIndexError>;

    /// Run a full-text search against one index.
    ///
    /// A blank query returns an empty result without contacting the index.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResult)` - The total hit count and the requested page
    /// * `Err(SearchIndexError::Timeout)` - If the query exceeded the fixed timeout
    /// * `Err(SearchIndexError)` - If the request fails
    async fn search(
        &self,
        index_name: &str,
        query: &SearchQuery,
    ) -> Result<SearchResult, SearchIndexError>;

    /// Run a glob-style pattern match on a single field. No paging or sort.
    async fn wildcard(
        &self,
        index_name: &str,
        pattern: &str,
        field: &str,
    ) -> Result<WildcardResult, SearchIndexError>;

    /// Delete an entire index. Diagnostic use only.
    async fn drop_index(&self, index_name: &str) -> Result<(), SearchIndexError>;
}
