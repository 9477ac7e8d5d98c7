//! # Search Sync Shared
//!
//! Types shared between the change-stream pipeline and the search index
//! repository: the flattened document written to the index, the write
//! status reported back by the engine, and the query/result types of the
//! search layer.

mod document;
mod search;

pub use document::{DocumentFields, IndexDocument, WriteResult};
pub use search::{
    ParseSortDirectionError, SearchHit, SearchQuery, SearchResult, SortDirection, TermFilter,
    WildcardResult, DEFAULT_LIMIT, SEARCH_TIMEOUT,
};
