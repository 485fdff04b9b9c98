//! Source image handling: validation, decoding, and normalisation to a
//! 4-channel PNG before upload.

pub mod prepare;
pub mod validate;

pub use prepare::{format_to_string, ImagePreparer, PreparedImage};
pub use validate::Validator;
