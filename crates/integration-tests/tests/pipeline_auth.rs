//! Identity resolution and guarding across a whole request.

use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;

use greenstall_graph::Request;
use greenstall_integration_tests::{
    InMemoryCatalog, InMemoryDirectory, TestHarness, args, auth_headers, test_config,
};
use serde_json::json;

#[tokio::test]
async fn identity_resolves_exactly_once_across_sibling_fields() {
    let harness = TestHarness::new();
    let alice = harness
        .directory
        .seed_user("alice@example.com", "pw-alice", "Alice", "Moss")
        .await;
    let token = harness.access_token_for(&alice);

    // Four sibling fields, evaluated concurrently by the executor.
    let request = Request::new(auth_headers(&token))
        .select("me", args(json!({})))
        .select("categories", args(json!({})))
        .select("products", args(json!({})))
        .select("users", args(json!({})));

    let response = harness.schema.execute(request).await;
    assert!(response.is_ok(), "errors: {:?}", response.errors);
    assert_eq!(harness.directory.lookup_count(), 1);
}

#[tokio::test]
async fn anonymous_request_resolves_without_any_lookup() {
    let harness = TestHarness::new();

    let request = Request::new(HeaderMap::new()).select("categories", args(json!({})));
    let response = harness.schema.execute(request).await;

    assert!(response.is_ok());
    assert_eq!(harness.directory.lookup_count(), 0);
}

#[tokio::test]
async fn guarded_field_fails_alone_while_public_sibling_succeeds() {
    let harness = TestHarness::new();

    // No credential: "me" is guarded, "categories" is public.
    let request = Request::new(HeaderMap::new())
        .select("me", args(json!({})))
        .select("categories", args(json!({})));

    let response = harness.schema.execute(request).await;

    let categories = response.field("categories").expect("categories resolved");
    assert!(categories.is_array());
    assert!(!categories.as_array().expect("array").is_empty());

    assert_eq!(response.field("me"), Some(&serde_json::Value::Null));
    let failure = response.error_for("me").expect("me failed");
    assert_eq!(failure.code, "UNAUTHENTICATED");
    assert!(response.error_for("categories").is_none());
}

#[tokio::test]
async fn guarded_field_resolves_for_authenticated_caller() {
    let harness = TestHarness::new();
    let alice = harness
        .directory
        .seed_user("alice@example.com", "pw-alice", "Alice", "Moss")
        .await;
    let token = harness.access_token_for(&alice);

    let request = Request::new(auth_headers(&token)).select("me", args(json!({})));
    let response = harness.schema.execute(request).await;

    assert!(response.is_ok());
    let me = response.field("me").expect("me resolved");
    assert_eq!(me["email"], json!("alice@example.com"));
    assert_eq!(me["first_name"], json!("Alice"));
}

#[tokio::test]
async fn refresh_token_does_not_authenticate_requests() {
    let harness = TestHarness::new();
    let alice = harness
        .directory
        .seed_user("alice@example.com", "pw-alice", "Alice", "Moss")
        .await;
    let refresh = harness
        .tokens
        .issue_refresh(&alice.id.to_string())
        .expect("refresh token")
        .into_string();

    let request = Request::new(auth_headers(&refresh)).select("me", args(json!({})));
    let response = harness.schema.execute(request).await;

    assert_eq!(
        response.error_for("me").expect("me failed").code,
        "UNAUTHENTICATED"
    );
}

#[tokio::test]
async fn scheme_prefix_length_is_configuration() {
    let mut config = test_config();
    config.auth.scheme_prefix_len = 7;

    let directory = Arc::new(InMemoryDirectory::new());
    let harness = TestHarness::with_parts(
        config,
        Arc::clone(&directory),
        Arc::new(InMemoryCatalog::numbered(1)),
    );
    let alice = directory
        .seed_user("alice@example.com", "pw-alice", "Alice", "Moss")
        .await;
    let token = harness.access_token_for(&alice);

    // "Bearer " is seven characters; the reconfigured pipeline accepts it.
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::AUTHORIZATION,
        format!("Bearer {token}").parse().expect("header value"),
    );
    let response = harness
        .schema
        .execute(Request::new(headers).select("me", args(json!({}))))
        .await;
    assert!(response.is_ok(), "errors: {:?}", response.errors);

    // The default 4-char scheme no longer lines up.
    let response = harness
        .schema
        .execute(Request::new(auth_headers(&token)).select("me", args(json!({}))))
        .await;
    assert_eq!(
        response.error_for("me").expect("me failed").code,
        "UNAUTHENTICATED"
    );
}

#[tokio::test]
async fn slow_directory_degrades_to_anonymous_not_failure() {
    let mut config = test_config();
    config.auth.lookup_timeout = Duration::from_millis(20);

    let directory = Arc::new(InMemoryDirectory::slow(Duration::from_millis(200)));
    let harness = TestHarness::with_parts(
        config,
        Arc::clone(&directory),
        Arc::new(InMemoryCatalog::numbered(1)),
    );
    let alice = directory
        .seed_user("alice@example.com", "pw-alice", "Alice", "Moss")
        .await;
    let token = harness.access_token_for(&alice);

    let request = Request::new(auth_headers(&token))
        .select("me", args(json!({})))
        .select("categories", args(json!({})));
    let response = harness.schema.execute(request).await;

    // Lookup timed out: the caller is anonymous, the guarded field fails
    // field-scoped, and the public sibling is unaffected.
    assert_eq!(
        response.error_for("me").expect("me failed").code,
        "UNAUTHENTICATED"
    );
    assert!(response.error_for("categories").is_none());
}

#[tokio::test]
async fn unknown_field_is_isolated_too() {
    let harness = TestHarness::new();

    let request = Request::new(HeaderMap::new())
        .select("categories", args(json!({})))
        .select("nonsense", args(json!({})));
    let response = harness.schema.execute(request).await;

    assert!(response.error_for("categories").is_none());
    assert_eq!(
        response.error_for("nonsense").expect("nonsense failed").code,
        "BAD_USER_INPUT"
    );
}
