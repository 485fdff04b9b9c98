//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Gemini service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// REST endpoint for model calls and file management
    pub endpoint: String,

    /// Endpoint for media uploads
    pub upload_endpoint: String,

    /// Fallback API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model that performs the edit
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            upload_endpoint: "https://generativelanguage.googleapis.com/upload/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
        }
    }
}

/// Fixed sampling and output parameters sent with every edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling threshold
    pub top_p: f32,

    /// Top-k sampling threshold
    pub top_k: u32,

    /// Output token ceiling
    pub max_output_tokens: u32,

    /// Requested output modalities, image first
    pub response_modalities: Vec<String>,

    /// MIME type requested for text output
    pub response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_modalities: vec!["image".to_string(), "text".to_string()],
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// Resource limits to protect against problematic inputs and hung calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum source image size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Upper bound on a whole edit call (upload + stream) in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 8192,
            decode_timeout_ms: 5000,
            request_timeout_ms: 300_000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for scratch files holding returned images.
    /// Uses the system temp directory when unset.
    pub scratch_dir: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
