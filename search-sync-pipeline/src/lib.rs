//! # Search Sync Pipeline
//!
//! This crate provides the pipeline components that apply change-stream
//! batches to the search index.
//!
//! ## Architecture
//!
//! 1. **Consumer**: Decodes a stream batch into change records
//! 2. **Processor**: Maps each record onto an index operation
//! 3. **Dispatcher**: Applies the operations in order and summarizes the batch

pub mod consumer;
pub mod dispatcher;
pub mod errors;
pub mod processor;

pub use dispatcher::{BatchDispatcher, BatchSummary, RecordOutcome, RecordResult};
pub use errors::PipelineError;
