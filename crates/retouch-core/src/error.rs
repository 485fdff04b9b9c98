//! Error types for Retouch.
//!
//! Edit failures are grouped into three kinds (missing credential, invalid
//! input, upstream failure). Each kind maps to exactly one user-facing
//! message so that the CLI can report failures without leaking a misleading
//! cause.

use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised by a single edit call.
#[derive(Error, Debug)]
pub enum EditError {
    /// No API key was supplied and no fallback is configured.
    #[error("No Gemini API key available")]
    MissingCredential,

    /// The submitted image is missing or cannot be used.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport, authentication, or model failure during upload or streaming.
    #[error("Upstream failure: {message}")]
    Upstream {
        message: String,
        status_code: Option<u16>,
    },

    /// Local I/O while storing the returned image.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Detail used by [`EditError::InvalidInput`] when no image was submitted.
pub(crate) const NO_IMAGE: &str = "no image supplied";

impl EditError {
    /// Build an upstream failure without an HTTP status.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            status_code: None,
        }
    }

    /// One consistent message per error kind, suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => {
                "No Gemini API key provided. Enter a key or set GEMINI_API_KEY.".to_string()
            }
            Self::InvalidInput(detail) if detail == NO_IMAGE => {
                "Please upload an image first.".to_string()
            }
            Self::InvalidInput(detail) => format!("Invalid image: {detail}"),
            Self::Upstream { message, .. } => format!("Gemini request failed: {message}"),
            Self::Storage(e) => format!("Could not store the returned image: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_missing_credential() {
        let msg = EditError::MissingCredential.user_message();
        assert!(msg.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_user_message_no_image() {
        let err = EditError::InvalidInput(NO_IMAGE.to_string());
        assert_eq!(err.user_message(), "Please upload an image first.");
    }

    #[test]
    fn test_user_message_bad_image_keeps_detail() {
        let err = EditError::InvalidInput("unrecognized image format".to_string());
        assert_eq!(err.user_message(), "Invalid image: unrecognized image format");
    }

    #[test]
    fn test_user_message_upstream_is_accurate() {
        let err = EditError::Upstream {
            message: "HTTP 403 Forbidden: API key not valid".to_string(),
            status_code: Some(403),
        };
        let msg = err.user_message();
        assert!(msg.contains("API key not valid"));
        assert!(!msg.to_lowercase().contains("explicit"));
    }
}
