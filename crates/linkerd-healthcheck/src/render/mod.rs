//! Report renderers
//!
//! Both renderers are [`CheckObserver`]s: producers push results into them one
//! at a time and call [`Renderer::finish`] once the stream ends.

pub mod json;
pub mod spinner;
pub mod table;

pub use json::JsonRenderer;
pub use table::TableRenderer;

use crate::error::{HealthcheckError, Result};
use crate::result::{CheckObserver, CheckResult, Verdict};
use std::fmt;
use std::io::{IsTerminal, Write};
use std::str::FromStr;

pub const OK_GLYPH: &str = "√";
pub const WARN_GLYPH: &str = "‼";
pub const FAIL_GLYPH: &str = "×";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    /// Table restricted to warnings and failures
    Short,
}

impl FromStr for OutputFormat {
    type Err = HealthcheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "short" => Ok(OutputFormat::Short),
            other => Err(HealthcheckError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Short => write!(f, "short"),
        }
    }
}

/// Terminal capabilities of the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Animate a spinner for retrying checks and running extensions
    pub interactive: bool,
    /// Colorize glyphs
    pub color: bool,
}

impl RenderOptions {
    /// Detect capabilities of the process's stdout
    pub fn detect() -> Self {
        let tty = std::io::stdout().is_terminal();
        Self {
            interactive: tty,
            color: tty && colored::control::SHOULD_COLORIZE.should_colorize(),
        }
    }
}

/// Renderer selected by [`OutputFormat`]
pub enum Renderer<W: Write> {
    Table(TableRenderer<W>),
    Json(JsonRenderer<W>),
}

impl<W: Write> Renderer<W> {
    pub fn new(format: OutputFormat, out: W, options: RenderOptions) -> Self {
        match format {
            OutputFormat::Table => Renderer::Table(TableRenderer::new(out, options)),
            OutputFormat::Short => Renderer::Table(TableRenderer::short(out, options)),
            OutputFormat::Json => Renderer::Json(JsonRenderer::new(out)),
        }
    }

    /// Open a titled section; the JSON document has no sections
    pub fn section(&mut self, title: &str) {
        if let Renderer::Table(table) = self {
            table.section(title);
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            Renderer::Table(table) => table.verdict(),
            Renderer::Json(json) => json.verdict(),
        }
    }

    /// Write the trailer (summary line or JSON document)
    pub fn finish(self) -> Result<Verdict> {
        match self {
            Renderer::Table(table) => table.finish(),
            Renderer::Json(json) => json.finish(),
        }
    }
}

impl<W: Write> CheckObserver for Renderer<W> {
    fn observe(&mut self, result: &CheckResult) {
        match self {
            Renderer::Table(table) => table.observe(result),
            Renderer::Json(json) => json.observe(result),
        }
    }

    fn progress(&mut self, message: &str) {
        if let Renderer::Table(table) = self {
            table.progress(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::CheckError;

    #[test]
    fn test_output_format_round_trips_names() {
        for name in ["table", "json", "short"] {
            let format: OutputFormat = name.parse().unwrap();
            assert_eq!(format.to_string(), name);
        }
        assert!(matches!(
            "wide".parse::<OutputFormat>(),
            Err(HealthcheckError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_renderers_agree_on_verdict() {
        let results = [
            CheckResult::success("a", "ok"),
            CheckResult::warning("a", "meh", CheckError::msg("w")),
            CheckResult::failure("b", "bad", CheckError::msg("e")).retrying(),
        ];

        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Short] {
            let mut renderer = Renderer::new(format, Vec::new(), RenderOptions::default());
            for result in &results {
                renderer.observe(result);
            }
            let verdict = renderer.finish().unwrap();
            assert!(verdict.success, "{format}");
            assert!(verdict.warning, "{format}");
        }
    }
}
