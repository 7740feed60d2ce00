use crate::e2e::helpers;

use helpers::fake_providers::UPSTREAM_ERROR;
use helpers::{TestContext, CHUNKED_VOICE, DIRECT_VOICE, POLLY_VOICE};
use hyper::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use test_context::test_context;

const BOOK: &str = "First paragraph of the book.\nSecond paragraph of the book.\nThird paragraph of the book.";

fn progress_of(body: &Value) -> u64 {
    body["progress"].as_u64().unwrap()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_a_job_and_report_it_pending_or_processing(ctx: &TestContext) {
    let job_id = ctx.submit_job(BOOK, CHUNKED_VOICE).await;

    let response = ctx.client.get(&format!("/api/jobs/{}", job_id)).await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body["job_id"], job_id.as_str());
    assert_eq!(body["voice_id"], CHUNKED_VOICE);
    assert!(body["created_at"].is_string());
    assert!(body.get("error_message").is_none());
    assert!(progress_of(body) < 100);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_a_chunked_job_with_monotonic_progress(ctx: &TestContext) {
    let job_id = ctx.submit_job(BOOK, CHUNKED_VOICE).await;

    let seen = ctx.wait_for_job(&job_id).await;

    let progress: Vec<u64> = seen.iter().map(progress_of).collect();
    assert!(
        progress.windows(2).all(|pair| pair[0] <= pair[1]),
        "progress went backwards: {:?}",
        progress
    );
    for body in &seen[..seen.len() - 1] {
        assert!(progress_of(body) < 100, "unfinished job at 100%: {}", body);
    }

    let last = seen.last().unwrap();
    assert_eq!(last["status"], "done");
    assert_eq!(progress_of(last), 100);

    // One provider call per paragraph, in order
    assert_eq!(
        ctx.provider.calls(),
        vec![
            "First paragraph of the book.",
            "Second paragraph of the book.",
            "Third paragraph of the book.",
        ]
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_download_the_concatenated_audio(ctx: &TestContext) {
    let job_id = ctx.submit_job(BOOK, CHUNKED_VOICE).await;
    ctx.wait_for_job(&job_id).await;

    let response = ctx.download(&job_id).await;

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg")
        .assert_header("content-disposition", "attachment; filename=\"audiobook.mp3\"");

    let expected = "First paragraph of the book.Second paragraph of the book.Third paragraph of the book.";
    assert_eq!(response.body_bytes, expected.as_bytes());
    assert_eq!(
        response.header("content-length").unwrap(),
        &expected.len().to_string()
    );

    // Downloads can be repeated within the retention window
    ctx.download(&job_id).await.assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_send_direct_voices_in_a_single_call(ctx: &TestContext) {
    let job_id = ctx.submit_job(BOOK, DIRECT_VOICE).await;

    let seen = ctx.wait_for_job(&job_id).await;
    assert_eq!(seen.last().unwrap()["status"], "done");

    assert_eq!(ctx.provider.calls(), vec![BOOK]);
    let response = ctx.download(&job_id).await;
    assert_eq!(response.body_bytes, BOOK.as_bytes());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/jobs", &json!({ "text": "   \n ", "voice": CHUNKED_VOICE }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .client
        .post("/api/jobs", &json!({ "voice": CHUNKED_VOICE }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.provider.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_voices(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/jobs", &json!({ "text": BOOK, "voice": "xx-XX-Nobody" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("xx-XX-Nobody");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_answer_malformed_bodies_with_an_error_message(ctx: &TestContext) {
    let response = ctx
        .client
        .post_raw("/api/jobs", b"{text: 1}".to_vec(), "application/json")
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Failed to parse the request body as JSON");
    response.assert_header_exists("x-request-id");

    let response = ctx
        .client
        .post("/api/jobs", &json!({ "text": 42, "voice": CHUNKED_VOICE }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.provider.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_jobs(ctx: &TestContext) {
    let unknown = "00000000-0000-4000-8000-000000000000";

    let response = ctx.client.get(&format!("/api/jobs/{}", unknown)).await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);

    ctx.download(unknown).await.assert_status(StatusCode::NOT_FOUND);

    // Ids that are not UUIDs cannot exist either
    let response = ctx.client.get("/api/jobs/not-a-uuid").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    ctx.download("not-a-uuid").await.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_refuse_downloads_before_the_job_is_done(ctx: &TestContext) {
    let job_id = ctx.submit_job(BOOK, CHUNKED_VOICE).await;

    let response = ctx.download(&job_id).await;

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("not ready");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_the_job_when_a_chunk_fails(ctx: &TestContext) {
    let text = "First paragraph of the book.\nSecond FAIL paragraph here.\nThird paragraph of the book.";
    let job_id = ctx.submit_job(text, CHUNKED_VOICE).await;

    let seen = ctx.wait_for_job(&job_id).await;
    let last = seen.last().unwrap();

    assert_eq!(last["status"], "error");
    // Setup plus the one chunk that succeeded
    assert_eq!(progress_of(last), 35);

    let message = last["error_message"].as_str().unwrap();
    assert!(message.contains("chunk 1"), "{}", message);
    assert!(message.contains(UPSTREAM_ERROR), "{}", message);

    // Synthesis stops at the first failure
    assert_eq!(ctx.provider.calls().len(), 2);

    ctx.download(&job_id)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message(UPSTREAM_ERROR);
    assert!(ctx.stored_files().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_provider_errors_from_polly(ctx: &TestContext) {
    let job_id = ctx.submit_job("Olá, mundo.", POLLY_VOICE).await;

    let seen = ctx.wait_for_job(&job_id).await;
    let last = seen.last().unwrap();

    assert_eq!(last["status"], "error");
    let message = last["error_message"].as_str().unwrap();
    assert!(message.contains("AWS Polly error"), "{}", message);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_expire_the_job_after_the_retention_window(ctx: &TestContext) {
    let job_id = ctx.submit_job(BOOK, CHUNKED_VOICE).await;
    ctx.wait_for_job(&job_id).await;

    ctx.download(&job_id).await.assert_status(StatusCode::OK);
    assert_eq!(ctx.stored_files().len(), 1);

    // Retention is one second in tests
    tokio::time::sleep(Duration::from_millis(1500)).await;

    ctx.download(&job_id).await.assert_status(StatusCode::NOT_FOUND);
    let response = ctx.client.get(&format!("/api/jobs/{}", job_id)).await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(ctx.stored_files().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_undownloaded_jobs_until_the_idle_timeout(ctx: &TestContext) {
    let job_id = ctx.submit_job(BOOK, CHUNKED_VOICE).await;
    ctx.wait_for_job(&job_id).await;

    // Past the download retention, but the job was never fetched
    tokio::time::sleep(Duration::from_millis(1500)).await;

    ctx.download(&job_id).await.assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_finish_running_jobs_on_shutdown(ctx: &TestContext) {
    let job_id = ctx.submit_job(BOOK, CHUNKED_VOICE).await;

    let drained = ctx.job_service.shutdown(Duration::from_secs(5)).await;
    assert!(drained);

    let response = ctx.client.get(&format!("/api/jobs/{}", job_id)).await.unwrap();
    assert_eq!(response.body.as_ref().unwrap()["status"], "done");

    // New work is refused once draining starts
    let response = ctx
        .client
        .post("/api/jobs", &json!({ "text": BOOK, "voice": CHUNKED_VOICE }))
        .await
        .unwrap();
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
