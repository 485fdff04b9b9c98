//! Gemini client: Files API upload, streamed generation, file cleanup.

use super::wire::{
    ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, UploadMetadata,
    UploadResponse, UploadStart,
};
use crate::compose::GenerationRequest;
use crate::config::GeminiConfig;
use crate::credential::Credential;
use crate::error::EditError;
use crate::input::PreparedImage;
use crate::service::{FragmentStream, ModelService, UploadedFile};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Client for one edit call.
///
/// Built per call from the resolved credential and dropped when the call
/// finishes; nothing is shared between calls.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    upload_endpoint: String,
    credential: Credential,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, credential: Credential) -> Result<Self, EditError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| EditError::upstream(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            upload_endpoint: config.upload_endpoint.trim_end_matches('/').to_string(),
            credential,
        })
    }

    /// Build the `streamGenerateContent` endpoint URL for a model
    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:streamGenerateContent?alt=sse",
            self.endpoint
        )
    }

    /// Turn a non-2xx response into an upstream failure.
    async fn http_error(context: &str, resp: reqwest::Response) -> EditError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "Gemini {context} failed");
        EditError::Upstream {
            message: format!("{context} returned HTTP {status}: {}", api_error_message(&body)),
            status_code: Some(status.as_u16()),
        }
    }
}

/// Pull the human-readable message out of a Gemini error body.
fn api_error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(message) = envelope.error.message {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.chars().count() > 300 {
        let cut: String = trimmed.chars().take(300).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}

fn transport_error(context: &str, e: reqwest::Error) -> EditError {
    tracing::error!(error = %e, "Gemini {context} request failed");
    EditError::upstream(format!("{context} request failed: {e}"))
}

#[async_trait]
impl ModelService for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    /// Resumable upload: start the session, then send the bytes and finalize.
    async fn upload(&self, image: &PreparedImage) -> Result<UploadedFile, EditError> {
        let start = self
            .http
            .post(format!("{}/files", self.upload_endpoint))
            .header(API_KEY_HEADER, self.credential.expose())
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", image.png.len())
            .header("X-Goog-Upload-Header-Content-Type", PreparedImage::MIME_TYPE)
            .json(&UploadStart {
                file: UploadMetadata {
                    display_name: "retouch-source".to_string(),
                },
            })
            .send()
            .await
            .map_err(|e| transport_error("upload start", e))?;

        if !start.status().is_success() {
            return Err(Self::http_error("upload start", start).await);
        }

        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| EditError::upstream("upload start returned no session URL"))?;

        let resp = self
            .http
            .post(&session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(image.png.clone())
            .send()
            .await
            .map_err(|e| transport_error("upload", e))?;

        if !resp.status().is_success() {
            return Err(Self::http_error("upload", resp).await);
        }

        let uploaded: UploadResponse = resp
            .json()
            .await
            .map_err(|e| EditError::upstream(format!("failed to parse upload response: {e}")))?;

        tracing::debug!(
            "Uploaded {} ({} bytes) as {}",
            PreparedImage::MIME_TYPE,
            image.png.len(),
            uploaded.file.name
        );
        Ok(uploaded.file)
    }

    async fn stream_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, EditError> {
        let body = GenerateContentRequest::from(request);

        let resp = self
            .http
            .post(self.stream_url(&request.model))
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("generate", e))?;

        if !resp.status().is_success() {
            return Err(Self::http_error("generate", resp).await);
        }

        // Gemini streams SSE events whose data lines are JSON chunks
        let fragments = resp
            .bytes_stream()
            .eventsource()
            .filter_map(|event| async move {
                match event {
                    Ok(event) => {
                        let data = event.data.trim();
                        if data.is_empty() {
                            return None;
                        }
                        let chunk = match serde_json::from_str::<GenerateContentResponse>(data) {
                            Ok(chunk) => chunk,
                            Err(e) => {
                                return Some(Err(EditError::upstream(format!(
                                    "unparseable stream chunk: {e}"
                                ))));
                            }
                        };
                        Some(chunk.into_fragment())
                    }
                    Err(e) => Some(Err(EditError::upstream(format!("stream interrupted: {e}")))),
                }
            });

        Ok(Box::pin(fragments))
    }

    async fn delete(&self, file: &UploadedFile) -> Result<(), EditError> {
        let resp = self
            .http
            .delete(format!("{}/{}", self.endpoint, file.name))
            .header(API_KEY_HEADER, self.credential.expose())
            .send()
            .await
            .map_err(|e| transport_error("delete", e))?;

        if !resp.status().is_success() {
            return Err(Self::http_error("delete", resp).await);
        }
        Ok(())
    }
}
