//! Built-in check engine
//!
//! Categories of checkers run in registration order. A checker may be retried
//! until a deadline (each failed attempt is streamed as a `retry` result), may
//! be advisory (`warning`), and may be `fatal`, in which case a final failure
//! stops every remaining check.

use crate::result::{CheckError, CheckObserver, CheckResult, DEFAULT_HINT_BASE_URL, Verdict};
use std::thread;
use std::time::{Duration, Instant};

/// Pause between attempts of a retrying checker
pub const DEFAULT_RETRY_WINDOW: Duration = Duration::from_secs(1);

type CheckFn<'a> = Box<dyn FnMut() -> anyhow::Result<()> + 'a>;

/// A single named check
pub struct Checker<'a> {
    description: String,
    hint_anchor: Option<String>,
    warning: bool,
    fatal: bool,
    retry_deadline: Option<Instant>,
    check: CheckFn<'a>,
}

impl<'a> Checker<'a> {
    pub fn new(
        description: impl Into<String>,
        check: impl FnMut() -> anyhow::Result<()> + 'a,
    ) -> Self {
        Self {
            description: description.into(),
            hint_anchor: None,
            warning: false,
            fatal: false,
            retry_deadline: None,
            check: Box::new(check),
        }
    }

    pub fn with_hint_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.hint_anchor = Some(anchor.into());
        self
    }

    /// Failures of this checker only warn
    pub fn warning(mut self) -> Self {
        self.warning = true;
        self
    }

    /// A final failure of this checker stops the run
    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    /// Keep retrying failures until `deadline`
    pub fn with_retry_deadline(mut self, deadline: Instant) -> Self {
        self.retry_deadline = Some(deadline);
        self
    }
}

/// A group of checkers rendered under one header
pub struct Category<'a> {
    id: String,
    checkers: Vec<Checker<'a>>,
    enabled: bool,
}

impl<'a> Category<'a> {
    pub fn new(id: impl Into<String>, checkers: Vec<Checker<'a>>) -> Self {
        Self {
            id: id.into(),
            checkers,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Runs registered categories and streams their results
pub struct HealthChecker<'a> {
    categories: Vec<Category<'a>>,
    hint_base_url: String,
    retry_window: Duration,
}

impl<'a> HealthChecker<'a> {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            hint_base_url: DEFAULT_HINT_BASE_URL.to_string(),
            retry_window: DEFAULT_RETRY_WINDOW,
        }
    }

    pub fn with_hint_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.hint_base_url = base_url.into();
        self
    }

    pub fn with_retry_window(mut self, window: Duration) -> Self {
        self.retry_window = window;
        self
    }

    pub fn add_category(&mut self, category: Category<'a>) {
        self.categories.push(category);
    }

    /// Run all enabled categories in order
    pub fn run_checks(&mut self, observer: &mut dyn CheckObserver) -> Verdict {
        let mut verdict = Verdict::default();

        for category in self.categories.iter_mut().filter(|c| c.enabled) {
            for checker in category.checkers.iter_mut() {
                let keep_going = run_checker(
                    &category.id,
                    checker,
                    &self.hint_base_url,
                    self.retry_window,
                    observer,
                    &mut verdict,
                );

                if !keep_going {
                    tracing::debug!(
                        category = %category.id,
                        check = %checker.description,
                        "fatal check failed, skipping remaining checks"
                    );
                    return verdict;
                }
            }
        }

        verdict
    }
}

impl Default for HealthChecker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns false when the run must stop
fn run_checker(
    category: &str,
    checker: &mut Checker<'_>,
    hint_base_url: &str,
    retry_window: Duration,
    observer: &mut dyn CheckObserver,
    verdict: &mut Verdict,
) -> bool {
    loop {
        let outcome = (checker.check)();

        let mut result = CheckResult::success(category, checker.description.clone());
        if let Some(anchor) = &checker.hint_anchor {
            result = result.with_hint_anchor(hint_base_url, anchor.clone());
        }

        let err = match outcome {
            Ok(()) => {
                verdict.record(&result);
                observer.observe(&result);
                return true;
            }
            Err(err) => CheckError::from(err),
        };

        result.err = Some(err);
        result.warning = checker.warning;

        if checker
            .retry_deadline
            .is_some_and(|deadline| Instant::now() < deadline)
        {
            observer.observe(&result.retrying());
            thread::sleep(retry_window);
            continue;
        }

        verdict.record(&result);
        observer.observe(&result);
        return !checker.fatal;
    }
}
