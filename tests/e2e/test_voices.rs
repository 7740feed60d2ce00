use crate::e2e::helpers;

use helpers::{TestContext, CHUNKED_VOICE, DIRECT_VOICE, ENGLISH_VOICE, POLLY_VOICE};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_every_catalog_voice(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices").await.unwrap();

    response.assert_status(StatusCode::OK);

    let voices = response.body.as_ref().unwrap()["voices"].as_array().unwrap();
    let ids: Vec<&str> = voices.iter().filter_map(|v| v["id"].as_str()).collect();
    assert_eq!(ids, vec![DIRECT_VOICE, ENGLISH_VOICE, CHUNKED_VOICE, POLLY_VOICE]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_describe_voices_without_provider_parameters(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices").await.unwrap();

    let voices = response.body.as_ref().unwrap()["voices"].as_array().unwrap();
    let chunked = voices.iter().find(|v| v["id"] == CHUNKED_VOICE).unwrap();

    assert_eq!(
        *chunked,
        json!({
            "id": CHUNKED_VOICE,
            "label": CHUNKED_VOICE,
            "provider": "google",
            "language": "pt-BR",
            "gender": "female"
        })
    );
}
