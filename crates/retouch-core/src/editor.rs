//! The edit call: validate → resolve key → prepare → upload → generate →
//! classify → clean up.

use crate::classify::{classify, EditOutcome};
use crate::compose::RequestComposer;
use crate::config::Config;
use crate::credential::resolve_credential;
use crate::error::{EditError, NO_IMAGE};
use crate::gemini::GeminiClient;
use crate::input::ImagePreparer;
use crate::scratch::ScratchSpace;
use crate::service::{ModelService, UploadedFile};
use std::time::{Duration, Instant};
use tokio::time::{timeout, timeout_at};

/// Upper bound on deleting the upload once the call is over.
const CLEANUP_TIMEOUT_MS: u64 = 10_000;

/// One user submission.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    /// Raw bytes of the image to edit, in any supported raster format
    pub image: Option<Vec<u8>>,
    /// Edit instruction; may be empty
    pub prompt: String,
    /// API key for this call; blank means "use the configured fallback"
    pub credential: Option<String>,
}

impl EditRequest {
    pub fn new(image: Vec<u8>, prompt: impl Into<String>) -> Self {
        Self {
            image: Some(image),
            prompt: prompt.into(),
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

/// Runs edit calls with a fixed configuration.
pub struct ImageEditor {
    config: Config,
    composer: RequestComposer,
    scratch: ScratchSpace,
}

impl ImageEditor {
    pub fn new(config: Config) -> Self {
        let composer = RequestComposer::from_config(&config);
        let scratch = ScratchSpace::new(config.scratch_dir());
        Self {
            config,
            composer,
            scratch,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one edit against Gemini.
    ///
    /// Fails with `InvalidInput` when no image is supplied and with
    /// `MissingCredential` when no key can be resolved; both checks happen
    /// before any network traffic.
    pub async fn edit(&self, request: EditRequest) -> Result<EditOutcome, EditError> {
        let image = request
            .image
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| EditError::InvalidInput(NO_IMAGE.to_string()))?;
        let credential = resolve_credential(request.credential.as_deref(), &self.config.gemini)?;
        tracing::debug!("Using {:?} credential", credential.source());

        let client = GeminiClient::new(&self.config.gemini, credential)?;
        self.edit_with(&client, image, &request.prompt).await
    }

    /// Run one edit against an explicit service.
    pub async fn edit_with(
        &self,
        service: &dyn ModelService,
        image: Vec<u8>,
        prompt: &str,
    ) -> Result<EditOutcome, EditError> {
        let started = Instant::now();
        let prepared = ImagePreparer::new(self.config.limits.clone())
            .prepare(image)
            .await?;

        let limit_ms = self.config.limits.request_timeout_ms;
        let deadline = tokio::time::Instant::now() + Duration::from_millis(limit_ms);
        let timed_out = || EditError::upstream(format!("no complete response within {limit_ms}ms"));

        let uploaded = timeout_at(deadline, service.upload(&prepared))
            .await
            .map_err(|_| timed_out())??;

        let result = match timeout_at(deadline, self.generate(service, &uploaded, prompt)).await {
            Ok(result) => result,
            Err(_) => Err(timed_out()),
        };

        // The upload only exists for this call
        let cleanup_limit = Duration::from_millis(limit_ms.min(CLEANUP_TIMEOUT_MS));
        match timeout(cleanup_limit, service.delete(&uploaded)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("Failed to delete uploaded file {}: {e}", uploaded.name);
            }
            Err(_) => tracing::warn!(
                "Gave up deleting uploaded file {} after {}ms",
                uploaded.name,
                cleanup_limit.as_millis()
            ),
        }

        match &result {
            Ok(outcome) => tracing::info!(
                "{} edit finished in {}ms ({})",
                service.name(),
                started.elapsed().as_millis(),
                if outcome.is_image() { "image" } else { "text" }
            ),
            Err(e) => tracing::warn!("{} edit failed: {e}", service.name()),
        }
        result
    }

    async fn generate(
        &self,
        service: &dyn ModelService,
        uploaded: &UploadedFile,
        prompt: &str,
    ) -> Result<EditOutcome, EditError> {
        let request = self.composer.compose(uploaded, prompt);
        tracing::debug!("Requesting edit from model {}", request.model);
        let fragments = service.stream_generate(&request).await?;
        classify(fragments, &self.scratch).await
    }
}
