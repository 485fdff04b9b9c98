//! Retouch Core - prompt-driven image editing through Gemini.
//!
//! An edit takes an image and a text instruction, uploads the image, asks the
//! model for a mixed image/text reply, and keeps whichever comes first: the
//! first returned image, or else all of the returned text.
//!
//! # Architecture
//!
//! ```text
//! EditRequest → Validate/Decode (RGBA PNG) → Upload → Compose → Stream → Classify → EditOutcome
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use retouch_core::{Config, EditRequest, ImageEditor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let editor = ImageEditor::new(Config::load()?);
//!     let image = std::fs::read("./cat.jpg")?;
//!
//!     let outcome = editor.edit(EditRequest::new(image, "give the cat a hat")).await?;
//!     match outcome.image() {
//!         Some(saved) => println!("Image at {}", saved.path().display()),
//!         None => println!("{}", outcome.text()),
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod classify;
pub mod compose;
pub mod config;
pub mod credential;
pub mod editor;
pub mod error;
pub mod gemini;
pub mod input;
pub mod scratch;
pub mod service;

// Re-exports for convenient access
pub use classify::{classify, EditOutcome};
pub use compose::{GenerationRequest, RequestComposer};
pub use config::Config;
pub use credential::{resolve_credential, Credential, CredentialSource};
pub use editor::{EditRequest, ImageEditor};
pub use error::{ConfigError, EditError};
pub use gemini::GeminiClient;
pub use input::{ImagePreparer, PreparedImage};
pub use scratch::{SavedImage, ScratchSpace};
pub use service::{Fragment, FragmentStream, ModelService, UploadedFile};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
