//! Guided edit flow.
//!
//! Walks the user through: image path → prompt → API key (if needed) →
//! edit → result. Errors from the edit are shown as a one-line message and
//! the session continues.

use crate::cli::edit::{self, Delivered};
use console::Style;
use dialoguer::Input;
use retouch_core::credential::has_fallback;
use retouch_core::{Config, EditRequest, ImageEditor};
use std::path::PathBuf;

use super::setup;
use super::theme::retouch_theme;

/// State that survives between edits in one interactive run.
pub struct Session {
    editor: ImageEditor,
    /// Key typed in during this run; reused for later edits.
    api_key: Option<String>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            editor: ImageEditor::new(config),
            api_key: None,
        }
    }

    pub fn config(&self) -> &Config {
        self.editor.config()
    }

    /// Run one guided edit. Returns `Ok` after a failed edit as well.
    pub async fn guided_edit(&mut self) -> anyhow::Result<()> {
        let theme = retouch_theme();
        let warn = Style::new().for_stderr().yellow();

        // ── Step 1: Image path ──────────────────────────────────────────────
        // Empty input is allowed through so the "no image" message is shown.

        let image_path = loop {
            let Some(raw_path) = super::handle_interrupt(
                Input::<String>::with_theme(&theme)
                    .with_prompt("Path to image")
                    .allow_empty(true)
                    .interact_text(),
            )?
            else {
                return Ok(());
            };

            let raw_path = raw_path.trim();
            if raw_path.is_empty() {
                break None;
            }

            let path = PathBuf::from(shellexpand::tilde(raw_path).into_owned());
            if !path.is_file() {
                eprintln!(
                    "  {}",
                    warn.apply_to(format!("Not a file: {}", path.display()))
                );
                continue;
            }
            break Some(path);
        };

        // ── Step 2: Prompt ──────────────────────────────────────────────────

        let Some(prompt) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Describe the edit")
                .allow_empty(true)
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        // ── Step 3: API key ─────────────────────────────────────────────────

        if needs_key_prompt(image_path.is_some(), self.api_key.as_deref(), self.config()) {
            self.api_key = setup::prompt_for_key(&Config::default_path())?;
        }

        // ── Step 4: Edit ────────────────────────────────────────────────────

        let mut request = EditRequest {
            prompt,
            credential: self.api_key.clone(),
            ..EditRequest::default()
        };
        if let Some(path) = &image_path {
            match std::fs::read(path) {
                Ok(bytes) => request.image = Some(bytes),
                Err(e) => {
                    eprintln!(
                        "  {}",
                        warn.apply_to(format!("Could not read {}: {e}", path.display()))
                    );
                    return Ok(());
                }
            }
        }

        let outcome = match edit::run(&self.editor, request, true).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!("Edit failed: {e}");
                report_failure(&e.user_message());
                return Ok(());
            }
        };

        // ── Step 5: Result ──────────────────────────────────────────────────

        // An image outcome implies an image was submitted.
        let input = image_path.unwrap_or_else(|| PathBuf::from("image"));
        match edit::deliver(outcome, &input, None) {
            Ok(Delivered::Image { path, .. }) => {
                let green = Style::new().for_stderr().green();
                eprintln!();
                eprintln!(
                    "  {} Edited image saved to {}",
                    green.apply_to("✓"),
                    path.display()
                );
                eprintln!();
            }
            Ok(Delivered::Text(text)) => {
                let cyan = Style::new().for_stderr().cyan();
                eprintln!();
                eprintln!("  {}", cyan.apply_to("Gemini replied with text:"));
                for line in text.lines() {
                    eprintln!("    {line}");
                }
                eprintln!();
            }
            Err(e) => report_failure(&format!("{e:#}")),
        }

        Ok(())
    }
}

fn report_failure(message: &str) {
    let red = Style::new().for_stderr().red();
    eprintln!();
    eprintln!("  {} {message}", red.apply_to("✗"));
    eprintln!();
}

/// Ask for a key only when an edit would otherwise stop on a missing one.
///
/// Without an image the edit fails before the key matters.
fn needs_key_prompt(has_image: bool, session_key: Option<&str>, config: &Config) -> bool {
    has_image && session_key.is_none() && !has_fallback(&config.gemini)
}
