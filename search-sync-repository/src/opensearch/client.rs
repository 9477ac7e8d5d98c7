//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    http::response::Response, indices::IndicesDeleteParts, DeleteParts, GetParts, IndexParts,
    OpenSearch, SearchParts, UpdateParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::config::TransportConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::{queries, responses, transport};
use search_sync_shared::{
    DocumentFields, SearchQuery, SearchResult, WildcardResult, WriteResult, SEARCH_TIMEOUT,
};

/// OpenSearch client implementation.
///
/// Owns the transport's connection pool. Build it once per process, share it
/// behind an `Arc`, and release it with [`OpenSearchClient::close`] on shutdown.
///
/// # Example
///
/// ```ignore
/// use search_sync_repository::{OpenSearchClient, SearchIndexProvider, TransportConfig};
///
/// let config = TransportConfig::signed("https://search-podcasts.us-east-1.es.amazonaws.com");
/// let client = OpenSearchClient::connect(&config).await?;
///
/// let created = client.add("episodes", "abc", &fields).await?;
/// client.close();
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Build a client and verify the endpoint answers.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A client bound to a reachable endpoint
    /// * `Err(SearchIndexError)` - If the endpoint is malformed or unreachable,
    ///   or signing credentials cannot be resolved
    pub async fn connect(config: &TransportConfig) -> Result<Self, SearchIndexError> {
        let client = Self::new(config).await?;
        client.ping().await?;

        info!(endpoint = %config.endpoint, "Connected to OpenSearch");
        Ok(client)
    }

    /// Build a client without contacting the endpoint.
    pub async fn new(config: &TransportConfig) -> Result<Self, SearchIndexError> {
        let client = transport::build_client(config).await?;
        Ok(Self { client })
    }

    /// Check that the endpoint is reachable.
    pub async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::connection(format!(
                "Ping failed with status {}",
                status
            )));
        }
        Ok(())
    }

    /// Release the connection pool.
    pub fn close(self) {
        info!("Closing OpenSearch client");
        drop(self.client);
    }

    fn validate_target(index_name: &str, doc_id: &str) -> Result<(), SearchIndexError> {
        Self::validate_index(index_name)?;
        if doc_id.trim().is_empty() {
            return Err(SearchIndexError::validation("doc_id is required"));
        }
        Ok(())
    }

    fn validate_index(index_name: &str) -> Result<(), SearchIndexError> {
        if index_name.trim().is_empty() {
            return Err(SearchIndexError::validation("index_name is required"));
        }
        Ok(())
    }

    /// Read a JSON body from a successful response, or turn a failed one into
    /// an error carrying its status and body.
    async fn read_json(
        response: Response,
        on_error: fn(String) -> SearchIndexError,
    ) -> Result<Value, SearchIndexError> {
        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Request failed");
            return Err(on_error(format!(
                "Request failed with status {}: {}",
                status, error_body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))
    }

    fn query_error(err: opensearch::Error) -> SearchIndexError {
        if err.is_timeout() {
            SearchIndexError::Timeout(SEARCH_TIMEOUT)
        } else {
            SearchIndexError::query(err.to_string())
        }
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    /// Index a document under an explicit id.
    ///
    /// `true` only when the engine reports `created`. Overwriting an existing
    /// document reports `updated` and returns `false`.
    #[instrument(skip(self, fields), fields(index = %index_name, doc_id = %doc_id))]
    async fn add(
        &self,
        index_name: &str,
        doc_id: &str,
        fields: &DocumentFields,
    ) -> Result<bool, SearchIndexError> {
        Self::validate_target(index_name, doc_id)?;
        info!("Adding document");

        let response = self
            .client
            .index(IndexParts::IndexId(index_name, doc_id))
            .body(fields)
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        let body = Self::read_json(response, SearchIndexError::IndexError).await?;
        let result = responses::parse_write_result(&body)?;

        info!(result = %result, "Added document");
        Ok(result == WriteResult::Created)
    }

    /// Upsert a document, using the same fields as the partial update and as
    /// the document to insert when it is missing.
    ///
    /// API reference: https://docs.opensearch.org/latest/api-reference/document-apis/update-document/#using-the-upsert-operation
    #[instrument(skip(self, fields), fields(index = %index_name, doc_id = %doc_id))]
    async fn update(
        &self,
        index_name: &str,
        doc_id: &str,
        fields: &DocumentFields,
    ) -> Result<bool, SearchIndexError> {
        Self::validate_target(index_name, doc_id)?;
        info!("Updating document");

        let response = self
            .client
            .update(UpdateParts::IndexId(index_name, doc_id))
            .body(json!({
                "doc": fields,
                "upsert": fields
            }))
            .send()
            .await
            .map_err(|e| SearchIndexError::update(e.to_string()))?;

        let body = Self::read_json(response, SearchIndexError::UpdateError).await?;
        let result = responses::parse_write_result(&body)?;

        info!(result = %result, "Updated document");
        Ok(result == WriteResult::Updated)
    }

    /// Delete a document. A missing document (or index) yields `false`.
    #[instrument(skip(self), fields(index = %index_name, doc_id = %doc_id))]
    async fn delete(&self, index_name: &str, doc_id: &str) -> Result<bool, SearchIndexError> {
        Self::validate_target(index_name, doc_id)?;
        info!("Deleting document");

        let response = self
            .client
            .delete(DeleteParts::IndexId(index_name, doc_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        // 404 carries `"result": "not_found"`, or an error body when the index is missing
        if response.status_code().as_u16() == 404 {
            warn!("Document to delete not found");
            return Ok(false);
        }

        let body = Self::read_json(response, SearchIndexError::DeleteError).await?;
        let result = responses::parse_write_result(&body)?;

        info!(result = %result, "Deleted document");
        Ok(result == WriteResult::Deleted)
    }

    #[instrument(skip(self), fields(index = %index_name, doc_id = %doc_id))]
    async fn get_one(
        &self,
        index_name: &str,
        doc_id: &str,
    ) -> Result<Option<Value>, SearchIndexError> {
        Self::validate_target(index_name, doc_id)?;

        let response = self
            .client
            .get(GetParts::IndexId(index_name, doc_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::query(e.to_string()))?;

        if response.status_code().as_u16() == 404 {
            debug!("Document not found");
            return Ok(None);
        }

        let body = Self::read_json(response, SearchIndexError::QueryError).await?;
        let source = responses::parse_get_source(&body);

        debug!(source = ?source, "Fetched document");
        Ok(source)
    }

    #[instrument(skip(self, query), fields(index = %index_name, query = %query.query))]
    async fn search(
        &self,
        index_name: &str,
        query: &SearchQuery,
    ) -> Result<SearchResult, SearchIndexError> {
        if query.is_blank() {
            debug!("Blank query, returning empty result");
            return Ok(SearchResult::empty());
        }
        Self::validate_index(index_name)?;

        let body = queries::build_search_query(query);
        debug!(body = %body, "Executing search");

        let response = self
            .client
            .search(SearchParts::Index(&[index_name]))
            .body(body)
            .request_timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(Self::query_error)?;

        let body = Self::read_json(response, SearchIndexError::QueryError).await?;
        let result = responses::parse_search_response(&body)?;

        debug!(
            total_hits = result.total_hits,
            returned = result.hits.len(),
            "Search completed"
        );
        Ok(result)
    }

    #[instrument(skip(self), fields(index = %index_name))]
    async fn wildcard(
        &self,
        index_name: &str,
        pattern: &str,
        field: &str,
    ) -> Result<WildcardResult, SearchIndexError> {
        Self::validate_index(index_name)?;
        if field.trim().is_empty() {
            return Err(SearchIndexError::validation("field is required"));
        }

        let response = self
            .client
            .search(SearchParts::Index(&[index_name]))
            .body(queries::build_wildcard_query(field, pattern))
            .request_timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(Self::query_error)?;

        let raw = Self::read_json(response, SearchIndexError::QueryError).await?;
        responses::check_timed_out(&raw)?;
        let total_hits = responses::parse_total_hits(&raw)?;

        debug!(total_hits = total_hits, "Wildcard search completed");
        Ok(WildcardResult { total_hits, raw })
    }

    #[instrument(skip(self), fields(index = %index_name))]
    async fn drop_index(&self, index_name: &str) -> Result<(), SearchIndexError> {
        Self::validate_index(index_name)?;
        warn!("Dropping index");

        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index_name]))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        Self::read_json(response, SearchIndexError::DeleteError).await?;

        info!("Index dropped");
        Ok(())
    }
}
