//! Index document and write status types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Flattened attribute map stored as a document's source.
///
/// Entries iterate and serialize in key order. The order attributes arrived
/// in is not kept.
pub type DocumentFields = BTreeMap<String, String>;

/// A document as it is written to the search index.
///
/// The identity of a document is the pair (`index_name`, `doc_id`). The index
/// name comes from the record's sort key, never from a separate parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Target index.
    pub index_name: String,
    /// Explicit document id within the index.
    pub doc_id: String,
    /// String-typed attributes of the record.
    pub fields: DocumentFields,
}

impl IndexDocument {
    pub fn new(
        index_name: impl Into<String>,
        doc_id: impl Into<String>,
        fields: DocumentFields,
    ) -> Self {
        Self {
            index_name: index_name.into(),
            doc_id: doc_id.into(),
            fields,
        }
    }
}

/// Per-document result status reported by the search engine for a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    Created,
    Updated,
    Deleted,
    NotFound,
    Noop,
    /// Any status this crate does not know about, kept verbatim.
    Other(String),
}

impl WriteResult {
    /// Parse the engine's `result` field.
    pub fn parse(value: &str) -> Self {
        match value {
            "created" => Self::Created,
            "updated" => Self::Updated,
            "deleted" => Self::Deleted,
            "not_found" => Self::NotFound,
            "noop" => Self::Noop,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::NotFound => "not_found",
            Self::Noop => "noop",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for WriteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
