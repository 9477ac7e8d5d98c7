//! OpenSearch query builders.
//!
//! This module provides functions to build OpenSearch request bodies for the
//! general search path and the wildcard path.

use serde_json::{json, Map, Value};

use search_sync_shared::{SearchQuery, TermFilter, SEARCH_TIMEOUT};

/// Build the body of a search request.
///
/// The body contains:
/// - a `bool` query whose single `must` clause is a `multi_match` with the
///   `and` operator, so every query term has to match
/// - a `post_filter` with one `term` clause per filter, all of which must hold
/// - `sort`, only when both a field and a direction are set
/// - `from`/`size` paging and the fixed timeout
pub fn build_search_query(query: &SearchQuery) -> Value {
    let mut body = Map::new();

    body.insert("query".to_string(), build_text_query(query));

    if let Some(post_filter) = build_post_filter(&query.filter_fields) {
        body.insert("post_filter".to_string(), post_filter);
    }

    if let Some((field, direction)) = query.sort() {
        let mut sort = Map::new();
        sort.insert(field.to_string(), json!({ "order": direction.as_str() }));
        body.insert("sort".to_string(), json!([sort]));
    }

    if let Some(offset) = query.offset {
        body.insert("from".to_string(), json!(offset));
    }
    body.insert("size".to_string(), json!(query.limit));
    body.insert("timeout".to_string(), json!(timeout_value()));

    Value::Object(body)
}

/// Build the body of a single-field wildcard request.
pub fn build_wildcard_query(field: &str, pattern: &str) -> Value {
    let mut wildcard = Map::new();
    wildcard.insert(field.to_string(), json!({ "value": pattern }));

    json!({
        "query": { "wildcard": wildcard },
        "timeout": timeout_value()
    })
}

/// The fixed timeout in the engine's time-unit syntax.
pub fn timeout_value() -> String {
    format!("{}s", SEARCH_TIMEOUT.as_secs())
}

fn build_text_query(query: &SearchQuery) -> Value {
    let fields: Vec<&str> = query.effective_search_fields().collect();

    let mut multi_match = Map::new();
    multi_match.insert("query".to_string(), json!(query.query));
    // Without explicit fields the engine falls back to the index default fields
    if !fields.is_empty() {
        multi_match.insert("fields".to_string(), json!(fields));
    }
    multi_match.insert("operator".to_string(), json!("and"));

    json!({
        "bool": {
            "must": [ { "multi_match": multi_match } ]
        }
    })
}

fn build_post_filter(filters: &[TermFilter]) -> Option<Value> {
    let mut terms: Vec<Value> = filters.iter().map(build_term).collect();

    match terms.len() {
        0 => None,
        1 => terms.pop(),
        _ => Some(json!({ "bool": { "filter": terms } })),
    }
}

fn build_term(filter: &TermFilter) -> Value {
    let mut term = Map::new();
    term.insert(filter.field.clone(), json!(filter.value));
    json!({ "term": term })
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_sync_shared::SortDirection;

    #[test]
    fn test_build_text_query() {
        let query = SearchQuery::new("rust podcast").with_search_fields(["title", "description"]);
        let body = build_search_query(&query);

        let must = body["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 1);
        assert_eq!(must[0]["multi_match"]["query"], "rust podcast");
        assert_eq!(must[0]["multi_match"]["operator"], "and");
        assert_eq!(
            must[0]["multi_match"]["fields"],
            json!(["title", "description"])
        );
    }

    #[test]
    fn test_build_text_query_skips_missing_fields() {
        let query = SearchQuery::new("q").with_optional_search_fields(vec![
            None,
            Some("podcastId".to_string()),
            None,
        ]);
        let body = build_search_query(&query);

        assert_eq!(
            body["query"]["bool"]["must"][0]["multi_match"]["fields"],
            json!(["podcastId"])
        );
    }

    #[test]
    fn test_build_text_query_without_fields() {
        let body = build_search_query(&SearchQuery::new("q"));
        assert!(body["query"]["bool"]["must"][0]["multi_match"]
            .get("fields")
            .is_none());
    }

    #[test]
    fn test_defaults_paging_and_timeout() {
        let body = build_search_query(&SearchQuery::new("q"));

        assert_eq!(body["size"], 30);
        assert!(body.get("from").is_none());
        assert!(body.get("sort").is_none());
        assert!(body.get("post_filter").is_none());
        assert_eq!(body["timeout"], "15s");
    }

    #[test]
    fn test_paging() {
        let query = SearchQuery::new("q").with_limit(10).with_offset(20);
        let body = build_search_query(&query);

        assert_eq!(body["size"], 10);
        assert_eq!(body["from"], 20);
    }

    #[test]
    fn test_single_post_filter() {
        let query = SearchQuery::new("q").with_filter(("type", "episode"));
        let body = build_search_query(&query);

        assert_eq!(
            body["post_filter"],
            json!({ "term": { "type": "episode" } })
        );
    }

    #[test]
    fn test_multiple_post_filters_are_conjunctive() {
        let query = SearchQuery::new("q")
            .with_filter(("type", "episode"))
            .with_filter(("podcastId", "p1"));
        let body = build_search_query(&query);

        let filters = body["post_filter"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0], json!({ "term": { "type": "episode" } }));
        assert_eq!(filters[1], json!({ "term": { "podcastId": "p1" } }));
    }

    #[test]
    fn test_sort() {
        let query = SearchQuery::new("q").sorted_by("publishedAt", SortDirection::Desc);
        let body = build_search_query(&query);

        assert_eq!(
            body["sort"],
            json!([ { "publishedAt": { "order": "desc" } } ])
        );
    }

    #[test]
    fn test_sort_needs_direction() {
        let mut query = SearchQuery::new("q");
        query.sort_by = Some("publishedAt".to_string());

        let body = build_search_query(&query);
        assert!(body.get("sort").is_none());
    }

    #[test]
    fn test_build_wildcard_query() {
        let body = build_wildcard_query("title", "pod*");

        assert_eq!(body["query"]["wildcard"]["title"]["value"], "pod*");
        assert_eq!(body["timeout"], "15s");
        assert!(body.get("size").is_none());
        assert!(body.get("sort").is_none());
    }
}
