//! # Output Configuration
//!
//! Controls CLI output appearance: whether progress lines carry emoji and
//! colour, based on terminal capabilities and user preferences.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for colour control
//! - `NO_COLOR` - Disables colours when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colours
//! - `CLICOLOR_FORCE=1` - Forces colours even in non-TTY
//! - `TERM=dumb` - Disables colours for dumb terminals

use console::style;
use std::env;
use std::fmt::Display;

/// Output configuration for controlling colours and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colours and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `--color=always` overrides `NO_COLOR`; `auto` defers to the
    /// environment and to whether stdout is a colour-capable terminal.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colours
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// `✅ message` or `[OK] message`.
    pub fn success(&self, message: impl Display) -> String {
        self.line("✅", "[OK]", message, Tone::Good)
    }

    /// `⚠️  message` or `[WARN] message`.
    pub fn warning(&self, message: impl Display) -> String {
        self.line("⚠️ ", "[WARN]", message, Tone::Warn)
    }

    /// `❌ message` or `[FAIL] message`.
    pub fn failure(&self, message: impl Display) -> String {
        self.line("❌", "[FAIL]", message, Tone::Bad)
    }

    /// `💡 message` or `[INFO] message`.
    pub fn info(&self, message: impl Display) -> String {
        self.line("💡", "[INFO]", message, Tone::Plain)
    }

    fn line(&self, emoji_str: &str, plain: &str, message: impl Display, tone: Tone) -> String {
        let marker = emoji(self, emoji_str, plain);
        if !self.use_color {
            return format!("{} {}", marker, message);
        }
        let message = match tone {
            Tone::Good => style(message.to_string()).green(),
            Tone::Warn => style(message.to_string()).yellow(),
            Tone::Bad => style(message.to_string()).red(),
            Tone::Plain => style(message.to_string()),
        };
        format!("{} {}", marker, message.force_styling(true))
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Good,
    Warn,
    Bad,
    Plain,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colours are enabled and the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
