//! Gemini REST request/response types.

use crate::compose::GenerationRequest;
use crate::error::EditError;
use crate::service::{Fragment, UploadedFile};
use base64::Engine;
use serde::{Deserialize, Serialize};

// --- Request types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<RequestPart>,
}

/// A part in a request: an uploaded file reference or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    file_uri: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_modalities: Vec<String>,
    response_mime_type: String,
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(req: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    RequestPart::FileData {
                        file_data: FileData {
                            file_uri: req.file.uri.clone(),
                            mime_type: req.file.mime_type.clone(),
                        },
                    },
                    RequestPart::Text {
                        text: req.prompt.clone(),
                    },
                ],
            }],
            generation_config: WireGenerationConfig {
                temperature: req.params.temperature,
                top_p: req.params.top_p,
                top_k: req.params.top_k,
                max_output_tokens: req.params.max_output_tokens,
                response_modalities: req.params.response_modalities.clone(),
                response_mime_type: req.params.response_mime_type.clone(),
            },
        }
    }
}

/// Body of the resumable upload start call.
#[derive(Debug, Serialize)]
pub(crate) struct UploadStart {
    pub file: UploadMetadata,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadMetadata {
    pub display_name: String,
}

// --- Response types ---

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub file: UploadedFile,
}

/// One streamed chunk of `streamGenerateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error envelope used by non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ApiError,
}

impl GenerateContentResponse {
    /// Reduce a chunk to a single fragment.
    ///
    /// Only the first candidate counts. Its first part decides between image
    /// and text: inline data makes an image fragment, otherwise all text parts
    /// are joined. No usable content makes an empty fragment.
    pub(crate) fn into_fragment(self) -> Result<Fragment, EditError> {
        if let Some(error) = self.error {
            return Err(EditError::Upstream {
                message: error
                    .message
                    .unwrap_or_else(|| "stream reported an error".to_string()),
                status_code: error.code,
            });
        }

        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            tracing::warn!("Gemini blocked the prompt: {reason}");
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Ok(Fragment::Empty);
        };
        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                tracing::debug!("Candidate finish reason: {reason}");
            }
        }
        let Some(content) = candidate.content else {
            return Ok(Fragment::Empty);
        };
        let mut parts = content.parts.into_iter();
        let Some(first) = parts.next() else {
            return Ok(Fragment::Empty);
        };
        if let Some(inline) = first.inline_data {
            let data = base64::engine::general_purpose::STANDARD
                .decode(inline.data.as_bytes())
                .map_err(|e| EditError::upstream(format!("invalid inline image data: {e}")))?;
            return Ok(Fragment::Image {
                data,
                mime_type: inline.mime_type,
            });
        }

        let texts: Vec<String> = std::iter::once(first)
            .chain(parts)
            .filter_map(|p| p.text)
            .collect();
        if texts.is_empty() {
            Ok(Fragment::Empty)
        } else {
            Ok(Fragment::Text(texts.concat()))
        }
    }
}
