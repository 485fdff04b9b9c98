//! Interactive CLI mode — guided experience for bare `retouch` invocation.
//!
//! When `retouch` is invoked with no subcommand on a TTY, this module provides
//! a menu-driven interface that delegates to the same edit logic as the
//! flag-based CLI. A failed edit is reported and the menu comes back.

pub mod session;
pub mod setup;
pub mod theme;

use console::Style;
use dialoguer::Select;
use retouch_core::Config;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Use this to wrap `interact_text()` / `interact()` calls that lack an `_opt`
/// variant, so interrupts exit the current flow cleanly instead of panicking.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Main menu options presented to the user.
const MENU_ITEMS: &[&str] = &["Edit an image", "Configure settings", "Exit"];

/// Entry point for interactive mode. Called when `retouch` is invoked with no subcommand on a TTY.
pub async fn run(config: Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::retouch_theme();
    let mut session = session::Session::new(config);

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => session.guided_edit().await?,
            Some(1) => show_config(session.config())?,
            Some(2) | None => break, // Exit or Ctrl+C / Esc
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// Interactive config viewer — shows a summary of current settings and offers
/// to display the full TOML or the config file path.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::retouch_theme();
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", cyan.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };

        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Model:"),
            config.gemini.model
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("API key:"),
            setup::key_status(config)
        );
        eprintln!(
            "    {:<20} temperature {} / top-p {} / top-k {}",
            label.apply_to("Sampling:"),
            config.generation.temperature,
            config.generation.top_p,
            config.generation.top_k
        );
        eprintln!(
            "    {:<20} {} MB, {}px per side",
            label.apply_to("Input limits:"),
            config.limits.max_file_size_mb,
            config.limits.max_image_dimension
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Scratch dir:"),
            config
                .scratch_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "system temp".to_string())
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &["View full config (TOML)", "Show config file path", "Back"];

        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!();
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                    eprintln!();
                }
            },
            Some(1) => {
                eprintln!();
                eprintln!("  {}", Config::default_path().display());
                eprintln!();
            }
            Some(2) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}
