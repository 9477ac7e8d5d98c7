//! Parsing of the response fields the data-access layer consumes.

use serde_json::{Map, Value};

use crate::errors::SearchIndexError;
use search_sync_shared::{SearchHit, SearchResult, WriteResult, SEARCH_TIMEOUT};

/// Read the `result` status of a document write.
pub fn parse_write_result(body: &Value) -> Result<WriteResult, SearchIndexError> {
    body.get("result")
        .and_then(Value::as_str)
        .map(WriteResult::parse)
        .ok_or_else(|| SearchIndexError::parse(format!("Missing 'result' in response: {}", body)))
}

/// Read the stored source of a get response, `None` when not found.
pub fn parse_get_source(body: &Value) -> Option<Value> {
    if body.get("found").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    body.get("_source").cloned()
}

/// Fail when the engine reports that the query ran past its timeout.
pub fn check_timed_out(body: &Value) -> Result<(), SearchIndexError> {
    if body.get("timed_out").and_then(Value::as_bool) == Some(true) {
        return Err(SearchIndexError::Timeout(SEARCH_TIMEOUT));
    }
    Ok(())
}

/// Read the total hit count. Accepts both the `{"value": n}` form and the
/// plain number used by older engines.
pub fn parse_total_hits(body: &Value) -> Result<u64, SearchIndexError> {
    let total = &body["hits"]["total"];
    total
        .as_u64()
        .or_else(|| total.get("value").and_then(Value::as_u64))
        .ok_or_else(|| SearchIndexError::parse("Missing 'hits.total' in search response"))
}

/// Parse a search response into a page of hits.
pub fn parse_search_response(body: &Value) -> Result<SearchResult, SearchIndexError> {
    check_timed_out(body)?;
    let total_hits = parse_total_hits(body)?;

    let hits = body["hits"]["hits"]
        .as_array()
        .map(|hits| hits.iter().filter_map(parse_hit).collect())
        .unwrap_or_default();

    Ok(SearchResult { total_hits, hits })
}

/// Parse a single hit. Hits without an id are dropped.
fn parse_hit(hit: &Value) -> Option<SearchHit> {
    let id = hit.get("_id")?.as_str()?.to_string();
    let index = hit
        .get("_index")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let score = hit.get("_score").and_then(Value::as_f64);
    let source = hit
        .get("_source")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);

    Some(SearchHit {
        index,
        id,
        score,
        source,
    })
}
