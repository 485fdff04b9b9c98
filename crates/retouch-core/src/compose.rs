//! Request composition: uploaded file + prompt + fixed generation parameters.

use crate::config::{Config, GenerationConfig};
use crate::service::UploadedFile;

/// A generation call addressed to a named model.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model identifier, e.g. "gemini-2.0-flash-exp"
    pub model: String,
    /// The uploaded source image
    pub file: UploadedFile,
    /// Edit instruction; may be empty
    pub prompt: String,
    /// Sampling and output parameters
    pub params: GenerationConfig,
}

/// Builds generation requests with the configured model and parameters.
#[derive(Debug, Clone)]
pub struct RequestComposer {
    model: String,
    params: GenerationConfig,
}

impl RequestComposer {
    pub fn new(model: impl Into<String>, params: GenerationConfig) -> Self {
        Self {
            model: model.into(),
            params,
        }
    }

    /// Composer using the model and parameters from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.gemini.model.clone(), config.generation.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Compose the request for one edit. The prompt is passed through as is.
    pub fn compose(&self, file: &UploadedFile, prompt: &str) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            file: file.clone(),
            prompt: prompt.to_string(),
            params: self.params.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded() -> UploadedFile {
        UploadedFile {
            name: "files/abc".to_string(),
            uri: "https://example.test/files/abc".to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    #[test]
    fn test_compose_uses_config_model_and_params() {
        let config = Config::default();
        let request = RequestComposer::from_config(&config).compose(&uploaded(), "add a hat");

        assert_eq!(request.model, "gemini-2.0-flash-exp");
        assert_eq!(request.file.uri, "https://example.test/files/abc");
        assert_eq!(request.prompt, "add a hat");
        assert_eq!(request.params.temperature, 1.0);
        assert_eq!(request.params.top_p, 0.95);
        assert_eq!(request.params.max_output_tokens, 8192);
    }

    #[test]
    fn test_compose_allows_empty_prompt() {
        let composer = RequestComposer::new("some-model", GenerationConfig::default());
        let request = composer.compose(&uploaded(), "");
        assert!(request.prompt.is_empty());
        assert_eq!(composer.model(), "some-model");
    }
}
