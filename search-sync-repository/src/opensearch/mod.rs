//! OpenSearch implementation of the search data-access layer.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, together with the signed transport it
//! runs on and the request/response helpers it uses.

mod client;
pub mod queries;
mod responses;
pub mod transport;

pub use client::OpenSearchClient;
