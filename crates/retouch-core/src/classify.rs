//! Response classification: first image wins, otherwise collect the text.

use crate::error::EditError;
use crate::scratch::{SavedImage, ScratchSpace};
use crate::service::Fragment;
use futures_util::{Stream, StreamExt};

/// Result of one edit: exactly one of an image or (possibly empty) text.
#[derive(Debug)]
pub enum EditOutcome {
    /// The model returned an image; fragments after it were not read.
    Image(SavedImage),
    /// The model returned only text, one line per fragment.
    Text(String),
}

impl EditOutcome {
    pub fn image(&self) -> Option<&SavedImage> {
        match self {
            Self::Image(saved) => Some(saved),
            Self::Text(_) => None,
        }
    }

    /// Accumulated text; empty for an image outcome.
    pub fn text(&self) -> &str {
        match self {
            Self::Image(_) => "",
            Self::Text(text) => text,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

/// Consume `fragments` until the first image or the end of the stream.
///
/// An image fragment is written to `scratch` and ends the call; the stream is
/// not polled again. Text fragments are appended with a trailing newline.
/// Empty fragments are skipped. Any stream error aborts classification.
pub async fn classify<S>(mut fragments: S, scratch: &ScratchSpace) -> Result<EditOutcome, EditError>
where
    S: Stream<Item = Result<Fragment, EditError>> + Unpin,
{
    let mut text = String::new();
    let mut seen = 0usize;

    while let Some(fragment) = fragments.next().await {
        seen += 1;
        match fragment? {
            Fragment::Image { data, mime_type } => {
                let saved = scratch.save(&data, &mime_type)?;
                tracing::info!(
                    "Saved {} image ({} bytes) from fragment {seen} to {}",
                    mime_type,
                    saved.len(),
                    saved.path().display()
                );
                return Ok(EditOutcome::Image(saved));
            }
            Fragment::Text(chunk) => {
                tracing::debug!("Text fragment {seen}: {chunk}");
                text.push_str(&chunk);
                text.push('\n');
            }
            Fragment::Empty => {
                tracing::debug!("Skipping empty fragment {seen}");
            }
        }
    }

    tracing::info!("Stream ended after {seen} fragment(s) without an image");
    Ok(EditOutcome::Text(text))
}
