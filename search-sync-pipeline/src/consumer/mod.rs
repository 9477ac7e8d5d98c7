//! Consumer module for the search sync pipeline.
//!
//! Decodes change-stream batches into records.

pub mod messages;

pub use messages::{AttributeMap, AttributeValue, ChangeRecord, EventKind, StreamBatch, StreamRecord};
