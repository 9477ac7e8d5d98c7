//! Processor module for the search sync pipeline.
//!
//! Maps change records onto search index operations.

mod change_mapper;

pub use change_mapper::{
    classify, flatten_attributes, map_change, IndexOperation, SkipReason, DEFAULT_SORT_KEY,
    ID_KEY, SORT_KEY,
};
