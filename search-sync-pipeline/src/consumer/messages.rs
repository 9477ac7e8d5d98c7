//! Change-stream record types.
//!
//! A batch arrives as a DynamoDB-Streams shaped JSON document:
//!
//! ```json
//! {
//!   "Records": [
//!     {
//!       "eventID": "1",
//!       "eventName": "INSERT",
//!       "dynamodb": {
//!         "Keys": { "id": { "S": "abc" }, "sortKey": { "S": "episodes" } },
//!         "NewImage": { "title": { "S": "T" } },
//!         "SequenceNumber": "111",
//!         "ApproximateCreationDateTime": 1700000000
//!       }
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

/// Attribute map keyed by attribute name.
///
/// Iterates in key order, so the order attributes appear in on the wire is
/// not kept. Nothing downstream depends on it.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// An attribute value tagged with its storage type.
///
/// Numbers and binaries stay in their wire encoding (decimal string and
/// base64 string). Nothing here coerces one type into another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "B")]
    Binary(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
    #[serde(rename = "BS")]
    BinarySet(Vec<String>),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "M")]
    Map(AttributeMap),
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// The value when it is string-typed, `None` for every other type.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Kind of mutation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Insert,
    Modify,
    Remove,
    Unknown,
}

impl EventKind {
    /// Classify an event name, ignoring case. A missing or unrecognized
    /// name is `Unknown`.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(name) if name.eq_ignore_ascii_case("insert") => Self::Insert,
            Some(name) if name.eq_ignore_ascii_case("modify") => Self::Modify,
            Some(name) if name.eq_ignore_ascii_case("remove") => Self::Remove,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Modify => "modify",
            Self::Remove => "remove",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The storage-side part of a change record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamRecord {
    pub keys: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_view_type: Option<String>,
    /// Epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_creation_date_time: Option<f64>,
}

/// One mutation notification from the change stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    pub dynamodb: StreamRecord,
}

impl ChangeRecord {
    /// Create a record with the given event name and no attributes.
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_id: None,
            event_name: Some(event_name.into()),
            event_source: None,
            aws_region: None,
            dynamodb: StreamRecord::default(),
        }
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Add a key attribute.
    pub fn with_key(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.dynamodb.keys.insert(name.into(), value);
        self
    }

    /// Add an attribute to the new image, creating the image if needed.
    pub fn with_new_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.dynamodb
            .new_image
            .get_or_insert_with(AttributeMap::new)
            .insert(name.into(), value);
        self
    }

    pub fn event_kind(&self) -> EventKind {
        EventKind::from_name(self.event_name.as_deref())
    }

    /// String-typed key attribute by name.
    pub fn key(&self, name: &str) -> Option<&str> {
        self.dynamodb.keys.get(name).and_then(AttributeValue::as_str)
    }

    pub fn new_image(&self) -> Option<&AttributeMap> {
        self.dynamodb.new_image.as_ref()
    }

    pub fn sequence_number(&self) -> Option<&str> {
        self.dynamodb.sequence_number.as_deref()
    }

    /// Approximate time the change was written to the stream.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let seconds = self.dynamodb.approximate_creation_date_time?;
        if !seconds.is_finite() {
            return None;
        }
        DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
    }
}

/// An ordered batch of change records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<ChangeRecord>,
}

impl StreamBatch {
    pub fn new(records: Vec<ChangeRecord>) -> Self {
        Self { records }
    }

    /// Decode a batch from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(PipelineError::from_json)
    }

    /// Decode a batch from a reader, such as a file or stdin.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        serde_json::from_reader(reader).map_err(PipelineError::from_json)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
