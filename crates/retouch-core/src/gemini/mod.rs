//! Google Gemini backend for [`ModelService`](crate::service::ModelService).

pub(crate) mod client;
pub(crate) mod wire;

pub use client::GeminiClient;
