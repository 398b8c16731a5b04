//! # Output Formatting
//!
//! Helpers for the CLI's human readable output: whether to use color, how to
//! color a stack status, and plain column-aligned tables.
//!
//! Color is decided once from the `--color` flag and the environment:
//! - `--color=always|never` wins outright
//! - `NO_COLOR` (any value) or `CLICOLOR=0` disables color
//! - `CLICOLOR_FORCE=1` enables color even when stdout is not a terminal
//! - otherwise color is used when stdout supports it

use std::env;

use console::{measure_text_width, pad_str, style, Alignment};

use crate::stack::StackStatus;

/// Output configuration for controlling colors and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        console::set_colors_enabled(use_color);
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() || env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        console::Term::stdout().features().colors_supported()
    }

    /// Symbol for a finished step.
    pub fn ok(&self) -> &'static str {
        if self.use_color {
            "✅"
        } else {
            "[OK]"
        }
    }

    /// Symbol for a failed step.
    pub fn failed(&self) -> &'static str {
        if self.use_color {
            "❌"
        } else {
            "[FAILED]"
        }
    }
}

/// Render a stack status, or `-` for an absent stack, colored by outcome.
pub fn format_status(config: &OutputConfig, status: Option<StackStatus>) -> String {
    let Some(status) = status else {
        return "-".to_string();
    };
    if !config.use_color {
        return status.to_string();
    }
    let styled = if status.is_success() {
        style(status.as_str()).green()
    } else if status.is_failure() {
        style(status.as_str()).red()
    } else {
        style(status.as_str()).yellow()
    };
    styled.force_styling(true).to_string()
}

/// Lay out `rows` under `headers` in left-aligned columns.
///
/// Widths ignore ANSI escapes, so cells from [`format_status`] line up.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if index < widths.len() {
                widths[index] = widths[index].max(measure_text_width(cell));
            }
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad_str(cell, *width, Alignment::Left, None).into_owned())
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut lines = vec![format_line(headers.to_vec())];
    for row in rows {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}
