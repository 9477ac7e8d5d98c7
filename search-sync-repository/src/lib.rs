//! # Search Sync Repository
//!
//! This crate provides the data-access layer over the search index: the
//! `SearchIndexProvider` trait, the error type shared by every operation,
//! and a concrete implementation for OpenSearch whose requests are signed
//! with AWS SigV4.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use config::{SigningConfig, TransportConfig};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchClient;
