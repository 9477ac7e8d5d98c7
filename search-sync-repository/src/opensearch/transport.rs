//! Signed HTTP transport to the index service.
//!
//! Every request sent through a signed transport carries an AWS SigV4
//! signature scoped to the configured service identifier and region.
//! Credentials come from the default AWS provider chain (environment,
//! profile, container or instance metadata).

use aws_config::BehaviorVersion;
use aws_types::region::Region;
use opensearch::{
    auth::Credentials,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    OpenSearch,
};
use tracing::{debug, info};
use url::Url;

use crate::config::{SigningConfig, TransportConfig};
use crate::errors::SearchIndexError;

/// Build a client bound to the configured endpoint.
///
/// The transport does not retry; retries belong to the caller.
///
/// # Returns
///
/// * `Ok(OpenSearch)` - A client ready to send requests
/// * `Err(SearchIndexError::ConnectionError)` - If the endpoint is malformed
/// * `Err(SearchIndexError::SigningError)` - If signing credentials cannot be resolved
pub async fn build_client(config: &TransportConfig) -> Result<OpenSearch, SearchIndexError> {
    let url = parse_endpoint(&config.endpoint)?;

    let conn_pool = SingleNodeConnectionPool::new(url);
    let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

    if let Some(signing) = &config.signing {
        let credentials = aws_credentials(signing).await?;
        builder = builder
            .auth(credentials)
            .service_name(&signing.service_name);
    }

    let transport = builder
        .build()
        .map_err(|e| SearchIndexError::connection(e.to_string()))?;

    info!(
        endpoint = %config.endpoint,
        signed = config.signing.is_some(),
        "Built OpenSearch transport"
    );

    Ok(OpenSearch::new(transport))
}

/// Parse and check the endpoint URL. Only `http` and `https` are accepted.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, SearchIndexError> {
    let url = Url::parse(endpoint).map_err(|e| {
        SearchIndexError::connection(format!("Invalid endpoint '{}': {}", endpoint, e))
    })?;

    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(SearchIndexError::connection(format!(
            "Invalid endpoint '{}': expected an http(s) URL with a host",
            endpoint
        ))),
    }
}

async fn aws_credentials(signing: &SigningConfig) -> Result<Credentials, SearchIndexError> {
    let region = Region::new(signing.region.clone());

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region.clone())
        .load()
        .await;

    let provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| SearchIndexError::signing("No AWS credentials provider available"))?;

    debug!(
        service = %signing.service_name,
        region = %signing.region,
        "Resolved SigV4 credentials provider"
    );

    Ok(Credentials::AwsSigV4(provider, region))
}
