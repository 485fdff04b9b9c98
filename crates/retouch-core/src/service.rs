//! The remote model service seam.
//!
//! [`ImageEditor`](crate::ImageEditor) talks to the model only through
//! [`ModelService`], so the edit flow can run against Gemini or a test double.

use crate::compose::GenerationRequest;
use crate::error::EditError;
use crate::input::PreparedImage;
use async_trait::async_trait;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// One unit of a streamed model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Inline binary payload with its declared content type
    Image { data: Vec<u8>, mime_type: String },
    /// Text commentary
    Text(String),
    /// Neither image nor text (e.g. no candidates produced)
    Empty,
}

/// Lazy, finite, non-restartable sequence of reply fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment, EditError>> + Send>>;

/// Reference to a file uploaded to the model service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Resource name used for management calls, e.g. "files/abc123"
    pub name: String,
    /// URI referenced from generation requests
    pub uri: String,
    /// Content type recorded by the service
    pub mime_type: String,
}

/// Operations the edit flow needs from a generative model service.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the editor takes `&dyn ModelService`).
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Upload the prepared source image.
    async fn upload(&self, image: &PreparedImage) -> Result<UploadedFile, EditError>;

    /// Start a generation call and return its reply fragments.
    async fn stream_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, EditError>;

    /// Remove a previously uploaded file.
    async fn delete(&self, file: &UploadedFile) -> Result<(), EditError>;
}
