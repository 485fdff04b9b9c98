//! Dialoguer theme and entry banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// Returns the `ColorfulTheme` used by every interactive prompt.
///
/// - Prompt prefix: magenta `?`
/// - Active item indicator: magenta `▸`
/// - Success prefix: green `✓`
/// - Error prefix: red `✗`
pub fn retouch_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().magenta(),
        active_item_style: Style::new().for_stderr().magenta(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the version banner to stderr so stdout stays clean.
pub fn print_banner() {
    let lines = banner_lines(retouch_core::VERSION);
    let magenta = Style::new().for_stderr().magenta();

    eprintln!();
    for line in &lines {
        eprintln!("{}", magenta.apply_to(line));
    }
    eprintln!();
}

fn banner_lines(version: &str) -> [String; 4] {
    let version_line = format!("Retouch v{version}");
    let tagline = "Edit images by describing the change";

    // Two columns of padding on each side of the tagline
    let inner_width = tagline.chars().count() + 4;

    [
        format!("  ╔{:═<width$}╗", "", width = inner_width),
        format!("  ║{:^width$}║", version_line, width = inner_width),
        format!("  ║{:^width$}║", tagline, width = inner_width),
        format!("  ╚{:═<width$}╝", "", width = inner_width),
    ]
}
