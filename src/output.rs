//! # Output Configuration
//!
//! This module controls how report text looks: whether repository headers are
//! colored and how they are styled.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color auto|always|never` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use clap::ValueEnum;
use console::Style;

/// When report headers should be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorWhen {
    /// Color when the environment allows it and stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve coloring from the `--color` choice and the process environment.
    pub fn new(when: ColorWhen) -> Self {
        Self::resolve(
            when,
            |name| env::var(name).ok(),
            || console::Term::stdout().features().colors_supported(),
        )
    }

    /// `Always` and `Never` win outright. In `Auto`, `NO_COLOR` (even empty)
    /// and `CLICOLOR=0` turn color off, a non-zero `CLICOLOR_FORCE` turns it
    /// on, `TERM=dumb` turns it off, and otherwise the terminal decides.
    fn resolve(
        when: ColorWhen,
        var: impl Fn(&str) -> Option<String>,
        terminal: impl FnOnce() -> bool,
    ) -> Self {
        let use_color = match when {
            ColorWhen::Always => true,
            ColorWhen::Never => false,
            ColorWhen::Auto => {
                let forced = var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0");
                if var("NO_COLOR").is_some() || var("CLICOLOR").as_deref() == Some("0") {
                    false
                } else if forced {
                    true
                } else {
                    var("TERM").as_deref() != Some("dumb") && terminal()
                }
            }
        };
        Self { use_color }
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Header line introducing one repository's block.
    pub fn header(&self, label: &str) -> String {
        self.paint(Style::new().bold().cyan(), &format!("project: {}", label))
    }

    /// Marker for problems.
    pub fn error(&self, text: &str) -> String {
        self.paint(Style::new().bold().red(), text)
    }

    /// De-emphasized annotation.
    pub fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dim(), text)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(ColorWhen::Auto)
    }
}
