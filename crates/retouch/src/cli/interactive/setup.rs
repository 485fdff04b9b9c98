//! Gemini API key setup — detection, input, and optional persistence.

use console::Style;
use dialoguer::{Password, Select};
use retouch_core::credential::has_fallback;
use retouch_core::Config;
use std::path::Path;

use super::theme::retouch_theme;

/// Environment variable the default config reads the key from.
pub(crate) const KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Ask for an API key when none can be resolved from env or config.
///
/// Returns `None` if the user skips; the edit then reports the missing key.
pub fn prompt_for_key(config_path: &Path) -> anyhow::Result<Option<String>> {
    let theme = retouch_theme();
    let warn = Style::new().for_stderr().yellow();

    eprintln!(
        "  {}",
        warn.apply_to(format!("{KEY_ENV_VAR} not set and no key in config."))
    );

    let key: String = match Password::with_theme(&theme)
        .with_prompt("Enter your Gemini API key (empty to skip)")
        .allow_empty_password(true)
        .interact()
    {
        Ok(k) if !k.trim().is_empty() => k.trim().to_string(),
        _ => return Ok(None),
    };

    let save_options = &["Yes, save to config file", "No, use for this session only"];
    let save_choice = Select::with_theme(&theme)
        .with_prompt("Save this key for future sessions?")
        .items(save_options)
        .default(1)
        .interact_opt()?;

    match save_choice {
        Some(0) => {
            match save_key_to_config(config_path, &key) {
                Ok(()) => {
                    let dim = Style::new().for_stderr().dim();
                    eprintln!(
                        "  {}",
                        dim.apply_to(format!("Key saved to {}", config_path.display()))
                    );
                }
                Err(e) => {
                    eprintln!(
                        "  {}",
                        warn.apply_to(format!("Could not save to config: {e}"))
                    );
                    eprintln!("  Using key for this session only.");
                }
            }
            Ok(Some(key))
        }
        Some(1) => Ok(Some(key)),
        _ => Ok(None),
    }
}

/// Check if the config file itself holds a literal key (not an env template).
pub(crate) fn config_has_key(config: &Config) -> bool {
    let key = config.gemini.api_key.trim();
    !key.is_empty() && !key.starts_with("${")
}

/// One-line description of where the key will come from.
pub(crate) fn key_status(config: &Config) -> String {
    if config_has_key(config) {
        "set in config file".to_string()
    } else if has_fallback(&config.gemini) {
        format!("from {}", config.gemini.api_key.trim())
    } else {
        "not set (will ask)".to_string()
    }
}

/// Write `key` to `[gemini] api_key` in the config file, preserving comments
/// and every other setting.
pub(crate) fn save_key_to_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
    let content = if config_path.exists() {
        std::fs::read_to_string(config_path)?
    } else {
        String::new()
    };

    let mut doc: toml_edit::DocumentMut = content.parse().unwrap_or_default();

    if !doc.contains_key("gemini") {
        doc["gemini"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["gemini"]["api_key"] = toml_edit::value(key);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, doc.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: &str) -> Config {
        let mut config = Config::default();
        config.gemini.api_key = key.to_string();
        config
    }

    // ── config_has_key tests ────────────────────────────────────────────

    #[test]
    fn config_has_key_with_real_key() {
        assert!(config_has_key(&config_with_key("AIza-real-key")));
    }

    #[test]
    fn config_has_key_empty_key() {
        assert!(!config_has_key(&config_with_key("")));
        assert!(!config_has_key(&config_with_key("   ")));
    }

    #[test]
    fn config_has_key_template_key() {
        assert!(!config_has_key(&config_with_key("${GEMINI_API_KEY}")));
    }

    #[test]
    fn key_status_unresolvable_template() {
        let config = config_with_key("${RETOUCH_SETUP_TEST_UNSET_VAR}");
        assert_eq!(key_status(&config), "not set (will ask)");
    }

    // ── save_key_to_config tests ────────────────────────────────────────

    #[test]
    fn save_key_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        save_key_to_config(&path, "AIza-new").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.gemini.api_key, "AIza-new");
    }

    #[test]
    fn save_key_preserves_comments_and_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "# my settings\n[gemini]\nmodel = \"gemini-2.5-flash-image\"\napi_key = \"${GEMINI_API_KEY}\"\n\n[limits]\nmax_file_size_mb = 5\n",
        )
        .unwrap();

        save_key_to_config(&path, "AIza-replaced").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# my settings"));
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.gemini.api_key, "AIza-replaced");
        assert_eq!(loaded.gemini.model, "gemini-2.5-flash-image");
        assert_eq!(loaded.limits.max_file_size_mb, 5);
    }
}
