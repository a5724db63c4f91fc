//! Progress reporting utilities using indicatif.
//!
//! The [`Progress`] struct implements [`ProgressCallback`] with a spinner on
//! stderr, so stdout stays reserved for the result document.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress callback for the duplicate check.
///
/// Implement this trait to receive progress updates while rows are read.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "reading", "grouping")
    /// * `total` - Total number of items, or 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called periodically with the number of items processed so far.
    ///
    /// # Arguments
    ///
    /// * `current` - Rows read since the phase started
    fn on_progress(&self, current: usize);

    /// Called when a phase completes, after the last `on_progress`.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name passed to the matching `on_phase_start`
    fn on_phase_end(&self, phase: &str);
}

/// Spinner-based progress reporter.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - Discard all updates instead of drawing a spinner
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use std::sync::Arc;
    /// use rowdupe::duplicates::{DuplicateFinder, FinderConfig};
    /// use rowdupe::progress::Progress;
    ///
    /// let config = FinderConfig::default().with_progress_callback(Arc::new(Progress::new(false)));
    /// let report = DuplicateFinder::new(config).find_duplicates(Path::new("people.csv"), "Email");
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn spinner(phase: &str) -> ProgressBar {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template("{spinner:.green} {prefix}: {pos} rows [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_prefix(phase.to_owned());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }
        let bar = Self::spinner(phase);
        if total > 0 {
            bar.set_length(total as u64);
        }
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_progress(&self, current: usize) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_position(current as u64);
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
                log::debug!("{} finished at {} rows", phase, bar.position());
            }
        }
    }
}
