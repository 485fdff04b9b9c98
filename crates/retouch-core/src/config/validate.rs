//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.model must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        let generation = &self.generation;
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if !(generation.top_p > 0.0 && generation.top_p <= 1.0) {
            return Err(ConfigError::ValidationError(
                "generation.top_p must be in (0.0, 1.0]".into(),
            ));
        }
        if generation.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "generation.top_k must be > 0".into(),
            ));
        }
        if generation.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_output_tokens must be > 0".into(),
            ));
        }
        if generation.response_modalities.is_empty() {
            return Err(ConfigError::ValidationError(
                "generation.response_modalities must list at least one modality".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = Config::default();
        config.gemini.model = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gemini.model"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.request_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_sampling() {
        let mut config = Config::default();
        config.generation.temperature = 2.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));

        let mut config = Config::default();
        config.generation.top_p = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_p"));
    }

    #[test]
    fn test_validate_rejects_nan_sampling() {
        let mut config = Config::default();
        config.generation.top_p = f32::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_p"));

        let mut config = Config::default();
        config.generation.temperature = f32::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_validate_rejects_missing_modalities() {
        let mut config = Config::default();
        config.generation.response_modalities.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("response_modalities"));
    }
}
