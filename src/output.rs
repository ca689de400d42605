//! # Output Configuration
//!
//! Controls how the binary decorates its short human summary. Progress and
//! diagnostics go through `log`; this module only covers the final lines
//! printed to stdout.
//!
//! The following environment variables and flags are respected:
//! - `--color=never|always|auto`
//! - `NO_COLOR` - disables colors when set, whatever its value
//! - `CLICOLOR=0` - disables colors
//! - `CLICOLOR_FORCE=1` - forces colors even when stdout is not a TTY
//! - `TERM=dumb` - disables colors

use console::style;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorWhen {
    Always,
    Never,
    #[default]
    Auto,
}

impl FromStr for ColorWhen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(ColorWhen::Always),
            "never" => Ok(ColorWhen::Never),
            "auto" => Ok(ColorWhen::Auto),
            other => Err(format!(
                "invalid color choice '{}' (expected always, never or auto)",
                other
            )),
        }
    }
}

impl fmt::Display for ColorWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorWhen::Always => "always",
            ColorWhen::Never => "never",
            ColorWhen::Auto => "auto",
        })
    }
}

/// Whether colors and emojis are used in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// In `Auto` mode colors are off when `NO_COLOR` is set, `CLICOLOR=0`,
    /// `TERM=dumb`, or stdout is not a color-capable terminal (unless
    /// `CLICOLOR_FORCE` is set).
    pub fn new(when: ColorWhen) -> Self {
        let use_color = match when {
            ColorWhen::Always => true,
            ColorWhen::Never => false,
            ColorWhen::Auto => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
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

    /// Line announcing a finished step.
    pub fn success(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", emoji(self, "✅", "[OK]"), style(message).green().bold())
        } else {
            format!("{} {}", emoji(self, "✅", "[OK]"), message)
        }
    }

    /// Line announcing a failed step.
    pub fn failure(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", emoji(self, "❌", "[ERR]"), style(message).red().bold())
        } else {
            format!("{} {}", emoji(self, "❌", "[ERR]"), message)
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(ColorWhen::Auto)
    }
}

/// `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
