use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reconstruct_wrapped_text(ctx: &TestContext) {
    let raw = "The quick brown fox jum-\nps over the lazy\ndog.\r\n\r\nA new\nsentence starts here.";

    let response = ctx
        .client
        .post("/api/extract", &json!({ "text": raw }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(
        body["text"],
        "The quick brown fox jumps over the lazy dog.\nA new sentence starts here."
    );
    assert_eq!(body["word_count"], 14);
    assert_eq!(
        body["char_count"].as_u64().unwrap() as usize,
        body["text"].as_str().unwrap().chars().count()
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_text_with_nothing_to_extract(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/extract", &json!({ "text": "  \n \r\n" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("No text could be extracted");

    let response = ctx.client.post("/api/extract", &json!({})).await.unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_estimate_processing_time(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/estimate", &json!({ "text": "a".repeat(20_000) }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        *response.body.as_ref().unwrap(),
        json!({
            "char_count": 20_000,
            "estimated_seconds": 103,
            "estimated_audio_duration_minutes": 27
        })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_estimate_minimum_for_empty_text(ctx: &TestContext) {
    let response = ctx.client.post("/api/estimate", &json!({})).await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body["char_count"], 0);
    assert_eq!(body["estimated_seconds"], 5);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_json(ctx: &TestContext) {
    let response = ctx
        .client
        .post_raw("/api/estimate", b"{not json".to_vec(), "application/json")
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Failed to parse the request body as JSON");
}
