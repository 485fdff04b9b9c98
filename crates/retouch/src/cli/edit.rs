//! The `retouch edit` command: one image, one prompt, one result.

use anyhow::Context;
use clap::Args;
use retouch_core::{Config, EditError, EditOutcome, EditRequest, ImageEditor};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Arguments for the `edit` command.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Image file to edit
    #[arg(required = true)]
    pub image: PathBuf,

    /// Instruction describing the edit
    #[arg(short, long, default_value = "")]
    pub prompt: String,

    /// Gemini API key (overrides GEMINI_API_KEY and the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Where to write the edited image (defaults to <stem>-edited.<ext> next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Gemini model to use instead of the configured one
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print a JSON report to stdout instead of plain text
    #[arg(long)]
    pub json: bool,
}

/// What an edit produced once it has left the scratch directory.
#[derive(Debug)]
pub enum Delivered {
    Image { path: PathBuf, mime_type: String },
    Text(String),
}

/// Machine-readable summary printed by `--json`.
#[derive(Debug, Serialize)]
struct EditReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
}

#[derive(Debug, Serialize)]
struct ErrorReport {
    kind: &'static str,
    message: String,
}

impl EditReport {
    fn delivered(delivered: &Delivered) -> Self {
        match delivered {
            Delivered::Image { path, mime_type } => Self {
                status: "image",
                output: Some(path.clone()),
                mime_type: Some(mime_type.clone()),
                text: None,
                error: None,
            },
            Delivered::Text(text) => Self {
                status: "text",
                output: None,
                mime_type: None,
                text: Some(text.clone()),
                error: None,
            },
        }
    }

    fn failed(err: &EditError) -> Self {
        Self {
            status: "error",
            output: None,
            mime_type: None,
            text: None,
            error: Some(ErrorReport {
                kind: error_kind(err),
                message: err.user_message(),
            }),
        }
    }
}

/// Execute the edit command.
pub async fn execute(args: EditArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(model) = args.model.as_deref() {
        config.gemini.model = model.to_string();
    }

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read image: {}", args.image.display()))?;

    let mut request = EditRequest::new(bytes, args.prompt.clone());
    if let Some(key) = args.api_key.as_deref() {
        request = request.with_credential(key);
    }

    let editor = ImageEditor::new(config);
    let show_spinner = !args.json && console::user_attended_stderr();

    let outcome = match run(&editor, request, show_spinner).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&EditReport::failed(&e))?);
            }
            anyhow::bail!(e.user_message());
        }
    };

    let delivered = deliver(outcome, &args.image, args.output.as_deref())?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&EditReport::delivered(&delivered))?
        );
        return Ok(());
    }

    match delivered {
        Delivered::Image { path, .. } => {
            eprintln!("Edited image written to {}", path.display());
            println!("{}", path.display());
        }
        Delivered::Text(text) => {
            eprintln!("The model replied with text only:");
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}

/// Run one edit call, with a spinner on stderr while the model works.
pub async fn run(
    editor: &ImageEditor,
    request: EditRequest,
    show_spinner: bool,
) -> Result<EditOutcome, EditError> {
    let spinner = show_spinner.then(create_spinner);

    let result = editor.edit(request).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result
}

/// Move an image outcome out of scratch storage, or pass text through.
///
/// With no explicit `output`, the image lands beside `input` as
/// `<stem>-edited.<ext>`, the extension taken from the returned MIME type.
/// An existing file at that name is never replaced; see [`default_output_path`].
pub fn deliver(
    outcome: EditOutcome,
    input: &Path,
    output: Option<&Path>,
) -> anyhow::Result<Delivered> {
    match outcome {
        EditOutcome::Image(saved) => {
            let mime_type = saved.mime_type().to_string();
            let dest = match output {
                Some(path) => path.to_path_buf(),
                None => default_output_path(input, saved.extension()),
            };
            let path = saved
                .export(&dest)
                .with_context(|| format!("Failed to write image to {}", dest.display()))?;
            tracing::info!("Saved edited image to {}", path.display());
            Ok(Delivered::Image { path, mime_type })
        }
        EditOutcome::Text(text) => Ok(Delivered::Text(text)),
    }
}

/// `photos/cat.jpg` + `png` → `photos/cat-edited.png`.
///
/// If that file already exists, a counter is appended instead:
/// `cat-edited-2.png`, `cat-edited-3.png`, and so on.
pub fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let first = input.with_file_name(format!("{stem}-edited.{extension}"));
    if !first.exists() {
        return first;
    }

    let mut n = 2u32;
    loop {
        let candidate = input.with_file_name(format!("{stem}-edited-{n}.{extension}"));
        if !candidate.exists() {
            tracing::debug!(
                "{} exists, writing to {} instead",
                first.display(),
                candidate.display()
            );
            return candidate;
        }
        n += 1;
    }
}

/// Stable identifier for each error kind in JSON reports.
pub(crate) fn error_kind(err: &EditError) -> &'static str {
    match err {
        EditError::MissingCredential => "missing_credential",
        EditError::InvalidInput(_) => "invalid_input",
        EditError::Upstream { .. } => "upstream_failure",
        EditError::Storage(_) => "storage",
    }
}

fn create_spinner() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Waiting for Gemini...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
