//! Requests sent through a signed transport carry a SigV4 signature.
//!
//! Lives in its own test binary because it sets AWS credential variables
//! for the whole process.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use search_sync_repository::{
    OpenSearchClient, SearchIndexProvider, SigningConfig, TransportConfig,
};
use search_sync_shared::DocumentFields;

fn set_static_credentials() {
    std::env::set_var("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
    std::env::set_var(
        "AWS_SECRET_ACCESS_KEY",
        "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
    );
    std::env::set_var("AWS_EC2_METADATA_DISABLED", "true");
}

fn header<'a>(request: &'a wiremock::Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|value| value.to_str().ok())
}

#[tokio::test]
async fn test_signed_requests_carry_sigv4_headers() {
    set_static_credentials();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/episodes/_doc/abc"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_index": "episodes",
            "_id": "abc",
            "result": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = TransportConfig::signed(server.uri());
    let client = OpenSearchClient::new(&config).await.unwrap();

    let mut fields = DocumentFields::new();
    fields.insert("title".to_string(), "T".to_string());
    assert!(client.add("episodes", "abc", &fields).await.unwrap());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let authorization = header(&requests[0], "authorization").unwrap();
    assert!(authorization.starts_with("AWS4-HMAC-SHA256 "));
    assert!(authorization.contains("Credential=AKIDEXAMPLE/"));
    assert!(authorization.contains("/us-east-1/es/aws4_request"));
    assert!(authorization.contains("SignedHeaders="));
    assert!(header(&requests[0], "x-amz-date").is_some());
}

#[tokio::test]
async fn test_signature_scope_follows_configured_service_and_region() {
    set_static_credentials();

    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/episodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .mount(&server)
        .await;

    let config = TransportConfig::unsigned(server.uri())
        .with_signing(SigningConfig::new("aoss", "eu-west-1"));
    let client = OpenSearchClient::new(&config).await.unwrap();
    client.drop_index("episodes").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let authorization = header(&requests[0], "authorization").unwrap();
    assert!(authorization.contains("/eu-west-1/aoss/aws4_request"));
}

#[tokio::test]
async fn test_unsigned_requests_carry_no_signature() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/episodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .mount(&server)
        .await;

    let client = OpenSearchClient::new(&TransportConfig::unsigned(server.uri()))
        .await
        .unwrap();
    client.drop_index("episodes").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(header(&requests[0], "authorization").is_none());
}
