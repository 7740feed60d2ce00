use crate::e2e::helpers;

use helpers::fake_providers::FAIL_MARKER;
use helpers::{TestContext, CHUNKED_VOICE, DIRECT_VOICE, ENGLISH_VOICE, MAX_BODY_BYTES};
use hyper::StatusCode;
use serde_json::json;
use std::time::Duration;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_audio_within_the_request(ctx: &TestContext) {
    let text = "Um capítulo curto.\nCom dois parágrafos.";

    let response = ctx
        .client
        .post("/api/generate", &json!({ "text": text, "voice": CHUNKED_VOICE }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg")
        .assert_header("content-disposition", "attachment; filename=\"audiobook.mp3\"");
    assert_eq!(
        response.body_bytes,
        "Um capítulo curto.Com dois parágrafos.".as_bytes()
    );

    // The copy on disk outlives the response only briefly
    let stored = ctx.stored_files();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("audiobook_"), "{:?}", stored);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(ctx.stored_files().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_use_the_default_voice_when_none_is_given(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/generate", &json!({ "text": "Olá." }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    // The default voice is a direct one: the whole text in one call
    assert_eq!(ctx.provider.calls(), vec!["Olá."]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_validate_generate_requests(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/generate", &json!({ "text": "", "voice": DIRECT_VOICE }))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .client
        .post("/api/generate", &json!({ "text": "Hi.", "voice": "missing" }))
        .await
        .unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Unknown voice: missing");

    assert!(ctx.provider.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_answer_bad_gateway_when_the_provider_fails(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/generate",
            &json!({ "text": format!("This will {}.", FAIL_MARKER), "voice": DIRECT_VOICE }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(ctx.stored_files().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_oversized_bodies(ctx: &TestContext) {
    let body = serde_json::to_vec(&json!({
        "text": "a".repeat(MAX_BODY_BYTES + 1),
        "voice": DIRECT_VOICE
    }))
    .unwrap();

    let response = ctx
        .client
        .post_raw("/api/generate", body, "application/json")
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE)
        .assert_error_message("length limit exceeded");
    assert!(ctx.provider.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_preview_a_voice_inline(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("/api/preview/{}", ENGLISH_VOICE))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg")
        .assert_header("content-disposition", "inline; filename=\"preview.mp3\"");

    // English voices read the English sample
    let calls = ctx.provider.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("Hello!"), "{}", calls[0]);
    assert_eq!(response.body_bytes, calls[0].as_bytes());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_cache_previews_across_get_and_post(ctx: &TestContext) {
    let first = ctx
        .client
        .get(&format!("/api/preview/{}", DIRECT_VOICE))
        .await
        .unwrap();
    first.assert_status(StatusCode::OK);

    let second = ctx
        .client
        .post("/api/preview", &json!({ "voice": DIRECT_VOICE }))
        .await
        .unwrap();
    second.assert_status(StatusCode::OK);

    assert_eq!(first.body_bytes, second.body_bytes);
    assert_eq!(ctx.provider.calls().len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_previews_of_unknown_voices(ctx: &TestContext) {
    let response = ctx.client.get("/api/preview/xx-XX-Nobody").await.unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Unknown voice");
}
