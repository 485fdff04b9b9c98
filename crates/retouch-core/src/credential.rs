//! API key resolution.
//!
//! Precedence: a non-empty key supplied with the request, then the configured
//! fallback (`gemini.api_key`, usually `${GEMINI_API_KEY}`), then
//! [`EditError::MissingCredential`].

use crate::config::GeminiConfig;
use crate::error::EditError;
use std::fmt;

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Supplied with the edit request
    Explicit,
    /// Taken from the config file or the environment variable it references
    Fallback,
}

/// A resolved Gemini API key.
///
/// `Debug` redacts the key so it never ends up in logs.
#[derive(Clone)]
pub struct Credential {
    key: String,
    source: CredentialSource,
}

impl Credential {
    /// The raw key, for the auth header.
    pub fn expose(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolve the key for one edit call.
pub fn resolve_credential(
    explicit: Option<&str>,
    config: &GeminiConfig,
) -> Result<Credential, EditError> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(Credential {
            key: key.to_string(),
            source: CredentialSource::Explicit,
        });
    }

    resolve_env_var(config.api_key.trim())
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .map(|key| Credential {
            key,
            source: CredentialSource::Fallback,
        })
        .ok_or(EditError::MissingCredential)
}

/// Whether a key is available without asking the user.
pub fn has_fallback(config: &GeminiConfig) -> bool {
    resolve_credential(None, config).is_ok()
}
