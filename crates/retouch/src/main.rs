//! Retouch CLI - edit an image by describing the change in words.
//!
//! The image and prompt are sent to a Gemini image model. If the model replies
//! with an image it is written next to the input (or to `--output`); if it
//! replies with text only, the text is printed.
//!
//! # Usage
//!
//! ```bash
//! # One-shot edit
//! retouch edit cat.jpg --prompt "give the cat a party hat"
//!
//! # Guided session (no subcommand, on a terminal)
//! retouch
//!
//! # View configuration
//! retouch config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Retouch - prompt-driven image editing with Gemini.
#[derive(Parser, Debug)]
#[command(name = "retouch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Edit an image with a text prompt
    Edit(cli::edit::EditArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let interactive = cli.command.is_none();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match retouch_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `retouch config path`."
            );
            retouch_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs, interactive);

    tracing::debug!("Retouch v{}", retouch_core::VERSION);

    match cli.command {
        Some(Commands::Edit(args)) => cli::edit::execute(args, config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if console::user_attended_stderr() => cli::interactive::run(config).await,
        None => {
            anyhow::bail!(
                "No command given and not running on a terminal.\n  \
                 Use `retouch edit <IMAGE> --prompt <TEXT>` or see `retouch --help`."
            )
        }
    }
}
