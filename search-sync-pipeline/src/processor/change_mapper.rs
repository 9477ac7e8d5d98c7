//! Change-record mapper.
//!
//! Turns one change record into the index operation it calls for. Mapping is
//! pure: it never touches the index and never fails, it either yields an
//! operation or a reason for skipping the record.

use std::fmt;

use tracing::debug;

use crate::consumer::{AttributeMap, ChangeRecord, EventKind};
use search_sync_shared::{DocumentFields, IndexDocument};

/// Key attribute holding the document id.
pub const ID_KEY: &str = "id";

/// Key attribute holding the index name.
pub const SORT_KEY: &str = "sortKey";

/// Index name used when a record carries no string `sortKey`.
pub const DEFAULT_SORT_KEY: &str = "default";

/// An operation to apply to the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOperation {
    /// Write a new document (insert).
    Add(IndexDocument),
    /// Upsert a document (modify).
    Update(IndexDocument),
    /// Remove a document.
    Delete { index_name: String, doc_id: String },
}

impl IndexOperation {
    pub fn index_name(&self) -> &str {
        match self {
            Self::Add(doc) | Self::Update(doc) => &doc.index_name,
            Self::Delete { index_name, .. } => index_name,
        }
    }

    pub fn doc_id(&self) -> &str {
        match self {
            Self::Add(doc) | Self::Update(doc) => &doc.doc_id,
            Self::Delete { doc_id, .. } => doc_id,
        }
    }

    /// Past-tense name used in outcome logs.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Add(_) => "inserted",
            Self::Update(_) => "modified",
            Self::Delete { .. } => "removed",
        }
    }
}

/// Why a record produced no operation. Skips are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No string-typed `id` key.
    MissingId,
    /// Event name is absent or not insert/modify/remove.
    UnknownEventKind,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId => f.write_str("missing id"),
            Self::UnknownEventKind => f.write_str("unknown event kind"),
        }
    }
}

/// Decide which operation a record calls for.
///
/// A missing id skips the record whatever its event kind. The index name is
/// the record's `sortKey`, or [`DEFAULT_SORT_KEY`] when there is none.
pub fn classify(record: &ChangeRecord) -> Result<IndexOperation, SkipReason> {
    let doc_id = record.key(ID_KEY).ok_or(SkipReason::MissingId)?;
    let index_name = record.key(SORT_KEY).unwrap_or(DEFAULT_SORT_KEY);

    let operation = match record.event_kind() {
        EventKind::Insert => IndexOperation::Add(IndexDocument::new(
            index_name,
            doc_id,
            flatten_attributes(record.new_image()),
        )),
        EventKind::Modify => IndexOperation::Update(IndexDocument::new(
            index_name,
            doc_id,
            flatten_attributes(record.new_image()),
        )),
        EventKind::Remove => IndexOperation::Delete {
            index_name: index_name.to_string(),
            doc_id: doc_id.to_string(),
        },
        EventKind::Unknown => return Err(SkipReason::UnknownEventKind),
    };

    Ok(operation)
}

/// Map a record to an operation, or `None` when it is skipped.
pub fn map_change(record: &ChangeRecord) -> Option<IndexOperation> {
    classify(record).ok()
}

/// Keep the string-typed attributes of an image. Every other type is dropped.
pub fn flatten_attributes(image: Option<&AttributeMap>) -> DocumentFields {
    let Some(image) = image else {
        return DocumentFields::new();
    };

    let fields: DocumentFields = image
        .iter()
        .filter_map(|(name, value)| value.as_str().map(|s| (name.clone(), s.to_string())))
        .collect();

    if fields.len() < image.len() {
        debug!(
            kept = fields.len(),
            dropped = image.len() - fields.len(),
            "Dropped non-string attributes"
        );
    }

    fields
}
