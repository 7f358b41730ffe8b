use crate::error::Result;
use crate::result::{CheckObserver, CheckResult, Verdict};
use crate::schema::{Check, CheckCategory, CheckOutput};
use std::io::Write;

/// Buffers results and prints one `CheckOutput` document on finish
pub struct JsonRenderer<W: Write> {
    out: W,
    categories: Vec<CheckCategory>,
    verdict: Verdict,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            categories: Vec::new(),
            verdict: Verdict::default(),
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn finish(mut self) -> Result<Verdict> {
        let document = CheckOutput {
            success: self.verdict.success,
            categories: self.categories,
        };

        let json = serde_json::to_string_pretty(&document)?;
        writeln!(self.out, "{json}")?;
        self.out.flush()?;

        Ok(self.verdict)
    }
}

impl<W: Write> CheckObserver for JsonRenderer<W> {
    fn observe(&mut self, result: &CheckResult) {
        let same_category = self
            .categories
            .last()
            .is_some_and(|c| c.name == result.category);
        if !same_category {
            self.categories.push(CheckCategory {
                name: result.category.clone(),
                checks: Vec::new(),
            });
        }

        if result.retry {
            return;
        }

        self.verdict.record(result);
        if let Some(category) = self.categories.last_mut() {
            category.checks.push(Check::from(result));
        }
    }
}
