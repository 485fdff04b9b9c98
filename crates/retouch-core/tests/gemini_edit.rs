//! End-to-end edit calls against a mocked Gemini REST API.

use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use retouch_core::{Config, EditError, EditRequest, ImageEditor};
use std::io::Cursor;
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.0-flash-exp:streamGenerateContent";

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format).unwrap();
    out
}

fn source_jpeg() -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([120, 80, 40]))),
        ImageFormat::Jpeg,
    )
}

fn editor_for(server: &MockServer, scratch: &tempfile::TempDir) -> ImageEditor {
    let mut config = Config::default();
    config.gemini.endpoint = format!("{}/v1beta", server.uri());
    config.gemini.upload_endpoint = format!("{}/upload/v1beta", server.uri());
    config.gemini.api_key = "${RETOUCH_IT_UNSET_KEY_321}".to_string();
    config.output.scratch_dir = Some(scratch.path().to_string_lossy().into_owned());
    ImageEditor::new(config)
}

fn sse(chunks: &[serde_json::Value]) -> String {
    chunks
        .iter()
        .map(|c| format!("data: {c}\r\n\r\n"))
        .collect()
}

async fn mount_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header("x-goog-api-key", "test-key"))
        .and(header("x-goog-upload-protocol", "resumable"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-url", format!("{}/upload/session/1", server.uri())),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload/session/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "file": {
                "name": "files/abc",
                "uri": format!("{}/v1beta/files/abc", server.uri()),
                "mimeType": "image/png",
                "state": "ACTIVE"
            }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn image_reply_is_saved_and_upload_removed() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_upload(&server).await;

    let returned = encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]))),
        ImageFormat::Png,
    );
    let b64 = base64::engine::general_purpose::STANDARD.encode(&returned);
    let body = sse(&[
        serde_json::json!({"candidates": [{"content": {"parts": [{"text": "looks good"}]}}]}),
        serde_json::json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": b64}}
        ]}}]}),
        serde_json::json!({"candidates": [{"content": {"parts": [{"text": "never read"}]}}]}),
    ]);

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let request = EditRequest::new(source_jpeg(), "add a hat").with_credential("test-key");
    let outcome = editor_for(&server, &scratch).edit(request).await.unwrap();

    assert_eq!(outcome.text(), "");
    let saved = outcome.image().unwrap();
    assert_eq!(saved.mime_type(), "image/png");
    assert_eq!(saved.bytes().unwrap(), returned);
    assert!(saved.path().starts_with(scratch.path()));
}

#[tokio::test]
async fn text_reply_is_accumulated() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_upload(&server).await;

    let body = sse(&[
        serde_json::json!({"candidates": [{"content": {"parts": [{"text": "sorry"}]}}]}),
        serde_json::json!({"candidates": []}),
        serde_json::json!({"candidates": [{"content": {"parts": [{"text": "cannot process"}]}}]}),
    ]);
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let request = EditRequest::new(source_jpeg(), "").with_credential("test-key");
    let outcome = editor_for(&server, &scratch).edit(request).await.unwrap();

    assert!(outcome.image().is_none());
    assert_eq!(outcome.text(), "sorry\ncannot process\n");
}

#[tokio::test]
async fn rejected_key_is_upstream_failure_and_upload_still_removed() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_upload(&server).await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let request = EditRequest::new(source_jpeg(), "x").with_credential("test-key");
    let err = editor_for(&server, &scratch).edit(request).await.unwrap_err();

    match &err {
        EditError::Upstream {
            message,
            status_code,
        } => {
            assert_eq!(*status_code, Some(403));
            assert!(message.contains("API key not valid."));
        }
        other => panic!("expected upstream failure, got {other:?}"),
    }
    assert!(err.user_message().starts_with("Gemini request failed"));
}

#[tokio::test]
async fn missing_credential_makes_no_requests() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = editor_for(&server, &scratch)
        .edit(EditRequest::new(source_jpeg(), "x").with_credential("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, EditError::MissingCredential));
}
