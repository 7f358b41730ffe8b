use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Transient status line for in-flight work
///
/// Disabled spinners ignore every call, so callers never need to check for a
/// terminal themselves.
pub struct Spinner {
    enabled: bool,
    target: fn() -> ProgressDrawTarget,
    pb: Option<ProgressBar>,
}

impl Spinner {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            target: ProgressDrawTarget::stdout,
            pb: None,
        }
    }

    /// Enabled spinner that draws nowhere
    #[cfg(test)]
    pub(crate) fn hidden() -> Self {
        Self {
            enabled: true,
            target: ProgressDrawTarget::hidden,
            pb: None,
        }
    }

    /// Start spinning, or replace the text of the running spinner
    pub fn spin(&mut self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }

        let target = self.target;
        let pb = self.pb.get_or_insert_with(|| {
            let pb = ProgressBar::with_draw_target(None, target());
            if let Ok(style) = ProgressStyle::default_spinner()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "])
                .template("{spinner:.bold} {msg}")
            {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        pb.set_message(msg.into());
    }

    pub fn stop(&mut self) {
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn bar(&self) -> Option<&ProgressBar> {
        self.pb.as_ref()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
