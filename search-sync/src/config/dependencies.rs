//! Dependency initialization and wiring for search sync.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::IndexingError;
use search_sync_pipeline::BatchDispatcher;
use search_sync_repository::{OpenSearchClient, SearchIndexProvider};

/// Container for all initialized dependencies.
///
/// Owns the one index client of the process. Call [`Dependencies::shutdown`]
/// before exiting to release its connection pool.
pub struct Dependencies {
    /// The index client, shared with the dispatcher.
    pub client: Arc<OpenSearchClient>,
    /// The dispatcher applying change batches through the client.
    pub dispatcher: BatchDispatcher,
}

impl Dependencies {
    /// Build the index client and the dispatcher.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the endpoint is malformed or unreachable
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            signing = settings.signing_enabled,
            "Initializing dependencies"
        );

        let client = OpenSearchClient::connect(&settings.transport_config())
            .await
            .map_err(|e| IndexingError::config(format!("Failed to connect to OpenSearch: {}", e)))?;

        info!("OpenSearch connection verified");

        let client = Arc::new(client);
        let dispatcher = BatchDispatcher::new(client.clone());

        Ok(Self { client, dispatcher })
    }

    /// The index client behind the provider interface.
    pub fn provider(&self) -> Arc<dyn SearchIndexProvider> {
        self.client.clone()
    }

    /// Release the index client.
    pub fn shutdown(self) {
        let Self { client, dispatcher } = self;
        drop(dispatcher);

        match Arc::try_unwrap(client) {
            Ok(client) => client.close(),
            Err(_) => warn!("Index client still in use at shutdown"),
        }
    }
}
