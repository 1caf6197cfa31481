//! Page envelope behavior through the whole pipeline.
//!
//! The harness catalog holds seven numbered products and the test config
//! uses a page size of three, so pages are 1-3, 4-6, 7.

use http::HeaderMap;
use serde_json::{Value, json};

use greenstall_graph::Request;
use greenstall_integration_tests::{TestHarness, args};

async fn fetch_products_page(harness: &TestHarness, page_args: Value) -> Value {
    let request = Request::new(HeaderMap::new()).select("products", args(page_args));
    let response = harness.schema.execute(request).await;
    assert!(response.is_ok(), "errors: {:?}", response.errors);
    response.field("products").expect("products resolved").clone()
}

fn names(envelope: &Value) -> Vec<String> {
    envelope["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|item| item["name"].as_str().expect("name").to_owned())
        .collect()
}

#[tokio::test]
async fn every_in_range_page_returns_its_exact_window() {
    let harness = TestHarness::new();

    let first = fetch_products_page(&harness, json!({"page": 1})).await;
    assert_eq!(names(&first), ["product-1", "product-2", "product-3"]);
    assert_eq!(first["total_count"], json!(7));
    assert_eq!(first["has_next"], json!(true));
    assert_eq!(first["has_previous"], json!(false));

    let second = fetch_products_page(&harness, json!({"page": 2})).await;
    assert_eq!(names(&second), ["product-4", "product-5", "product-6"]);
    assert_eq!(second["has_next"], json!(true));
    assert_eq!(second["has_previous"], json!(true));

    let third = fetch_products_page(&harness, json!({"page": 3})).await;
    assert_eq!(names(&third), ["product-7"]);
    assert_eq!(third["has_next"], json!(false));
    assert_eq!(third["has_previous"], json!(true));
}

#[tokio::test]
async fn page_defaults_to_one() {
    let harness = TestHarness::new();
    let envelope = fetch_products_page(&harness, json!({})).await;
    assert_eq!(envelope["page"], json!(1));
    assert_eq!(names(&envelope), ["product-1", "product-2", "product-3"]);
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_no_next() {
    let harness = TestHarness::new();
    let envelope = fetch_products_page(&harness, json!({"page": 9})).await;

    assert!(envelope["items"].as_array().expect("items").is_empty());
    assert_eq!(envelope["has_next"], json!(false));
    assert_eq!(envelope["has_previous"], json!(true));
    assert_eq!(envelope["total_count"], json!(7));
}

#[tokio::test]
async fn non_positive_page_clamps_to_the_first() {
    let harness = TestHarness::new();
    for bad in [0, -3] {
        let envelope = fetch_products_page(&harness, json!({"page": bad})).await;
        assert_eq!(envelope["page"], json!(1));
        assert_eq!(names(&envelope), ["product-1", "product-2", "product-3"]);
    }
}

#[tokio::test]
async fn non_integer_page_is_a_field_scoped_argument_error() {
    let harness = TestHarness::new();
    let request = Request::new(HeaderMap::new())
        .select("products", args(json!({"page": "two"})))
        .select("categories", args(json!({})));

    let response = harness.schema.execute(request).await;
    assert_eq!(
        response.error_for("products").expect("products failed").code,
        "BAD_USER_INPUT"
    );
    assert!(response.error_for("categories").is_none());
}

#[tokio::test]
async fn users_field_pages_the_directory() {
    let harness = TestHarness::new();
    for n in 0..4 {
        harness
            .directory
            .seed_user(&format!("user{n}@example.com"), "pw", "User", &format!("{n}"))
            .await;
    }

    let request = Request::new(HeaderMap::new()).select("users", args(json!({"page": 2})));
    let response = harness.schema.execute(request).await;
    assert!(response.is_ok(), "errors: {:?}", response.errors);

    let envelope = response.field("users").expect("users resolved");
    assert_eq!(envelope["total_count"], json!(4));
    assert_eq!(envelope["items"].as_array().expect("items").len(), 1);
    assert_eq!(
        envelope["items"][0]["email"],
        json!("user3@example.com")
    );
}
