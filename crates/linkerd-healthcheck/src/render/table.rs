//! Human-readable table output
//!
//! ```text
//! linkerd-cli
//! -----------
//! √ kubectl is available on the PATH
//! ‼ extension search path is set
//!     PATH is empty
//!     see https://linkerd.io/2/checks/#l5d-path for hints
//!
//! Status check results are √
//! ```

use super::spinner::Spinner;
use super::{FAIL_GLYPH, OK_GLYPH, RenderOptions, WARN_GLYPH};
use crate::error::Result;
use crate::result::{CheckObserver, CheckResult, Verdict};
use colored::Colorize;
use std::io::{self, Write};

const INDENT: &str = "    ";

pub struct TableRenderer<W: Write> {
    out: W,
    short: bool,
    color: bool,
    spinner: Spinner,
    last_category: Option<String>,
    /// Short mode prints headers lazily, before the first non-success line
    pending_header: Option<String>,
    pending_section: Option<String>,
    wrote_any: bool,
    verdict: Verdict,
    io_error: Option<io::Error>,
}

impl<W: Write> TableRenderer<W> {
    pub fn new(out: W, options: RenderOptions) -> Self {
        Self {
            out,
            short: false,
            color: options.color,
            spinner: Spinner::new(options.interactive),
            last_category: None,
            pending_header: None,
            pending_section: None,
            wrote_any: false,
            verdict: Verdict::default(),
            io_error: None,
        }
    }

    /// Only warnings and failures are printed
    pub fn short(out: W, options: RenderOptions) -> Self {
        Self {
            short: true,
            ..Self::new(out, options)
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Print a `=`-underlined section title ahead of the next category
    pub fn section(&mut self, title: &str) {
        self.spinner.stop();
        self.pending_section = Some(title.to_string());
        self.last_category = None;
        if !self.short {
            self.flush_section();
        }
    }

    /// Show a spinner until the next result arrives
    pub fn progress(&mut self, message: &str) {
        self.spinner.spin(message);
    }

    /// Stop any spinner and print the summary line
    pub fn finish(mut self) -> Result<Verdict> {
        self.spinner.stop();

        let glyph = if self.verdict.success {
            self.ok_glyph()
        } else {
            self.fail_glyph()
        };
        self.write_line("");
        self.write_line(&format!("Status check results are {glyph}"));

        if let Some(err) = self.io_error.take() {
            return Err(err.into());
        }
        self.out.flush()?;
        Ok(self.verdict)
    }

    fn flush_section(&mut self) {
        if let Some(title) = self.pending_section.take() {
            if self.wrote_any {
                self.write_line("");
            }
            self.write_line(&title);
            self.write_line(&"=".repeat(title.chars().count()));
        }
    }

    fn flush_header(&mut self) {
        if let Some(category) = self.pending_header.take() {
            self.flush_section();
            if self.wrote_any {
                self.write_line("");
            }
            self.write_line(&category);
            self.write_line(&"-".repeat(category.chars().count()));
        }
    }

    fn print_result(&mut self, result: &CheckResult) {
        let glyph = match (&result.err, result.warning) {
            (None, _) => self.ok_glyph(),
            (Some(_), true) => self.warn_glyph(),
            (Some(_), false) => self.fail_glyph(),
        };

        self.write_line(&format!("{glyph} {}", result.description));

        if let Some(err) = &result.err {
            let message = err.to_string();
            let message = message.trim_end().replace('\n', &format!("\n{INDENT}"));
            self.write_line(&format!("{INDENT}{message}"));

            if let Some(url) = &result.hint_url {
                self.write_line(&format!("{INDENT}see {url} for hints"));
            }
        }
    }

    fn ok_glyph(&self) -> String {
        if self.color {
            OK_GLYPH.green().bold().to_string()
        } else {
            OK_GLYPH.to_string()
        }
    }

    fn warn_glyph(&self) -> String {
        if self.color {
            WARN_GLYPH.yellow().bold().to_string()
        } else {
            WARN_GLYPH.to_string()
        }
    }

    fn fail_glyph(&self) -> String {
        if self.color {
            FAIL_GLYPH.red().bold().to_string()
        } else {
            FAIL_GLYPH.to_string()
        }
    }

    /// Clears any spinner first. Keeps the first write error for `finish`;
    /// later writes are skipped.
    fn write_line(&mut self, line: &str) {
        self.spinner.stop();
        if self.io_error.is_some() {
            return;
        }
        match writeln!(self.out, "{line}") {
            Ok(()) => self.wrote_any = true,
            Err(err) => self.io_error = Some(err),
        }
    }
}

impl<W: Write> CheckObserver for TableRenderer<W> {
    fn observe(&mut self, result: &CheckResult) {
        if !result.retry {
            self.spinner.stop();
        }

        if self.last_category.as_deref() != Some(result.category.as_str()) {
            self.last_category = Some(result.category.clone());
            self.pending_header = Some(result.category.clone());
            if !self.short {
                self.flush_header();
            }
        }

        if result.retry {
            let message = result
                .err
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            self.spinner.spin(message);
            return;
        }

        self.verdict.record(result);

        if self.short && result.err.is_none() {
            return;
        }

        self.flush_header();
        self.print_result(result);
    }

    fn progress(&mut self, message: &str) {
        TableRenderer::progress(self, message);
    }
}
