//! Ctrl+C handling for the duplicate check.
//!
//! A shared `AtomicBool` is raised when the process receives an interrupt.
//! The finder polls it between rows and stops with
//! [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted);
//! the binary then exits with code 130 (128 + SIGINT).
//!
//! ```rust,no_run
//! use rowdupe::duplicates::{DuplicateFinder, FinderConfig};
//! use rowdupe::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(handler.get_flag()));
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    ///
    /// The handler is not registered with the OS; use [`install_handler`]
    /// for that.
    ///
    /// # Example
    ///
    /// ```
    /// use rowdupe::signal::ShutdownHandler;
    ///
    /// let handler = ShutdownHandler::new();
    /// assert!(!handler.is_shutdown_requested());
    /// handler.request_shutdown();
    /// assert!(handler.is_shutdown_requested());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True once an interrupt arrived or [`Self::request_shutdown`] ran.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag manually.
    ///
    /// Every clone and every flag from [`Self::get_flag`] observes it.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag, for [`FinderConfig::with_shutdown_flag`](crate::duplicates::FinderConfig::with_shutdown_flag).
    ///
    /// # Returns
    ///
    /// A new reference to the shared flag, not a copy of its value.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Lower the flag again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C hook and return its handler.
///
/// Later calls return the already installed handler with its flag lowered,
/// so repeated `run_app` calls in one process (tests) keep working.
///
/// When Ctrl+C is pressed:
/// 1. The shutdown flag is set to `true`
/// 2. "Interrupted. Stopping duplicate check..." is printed to stderr
/// 3. The finder sees the flag at its next row and returns
///    [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted)
///
/// # Returns
///
/// The process-wide [`ShutdownHandler`].
///
/// # Errors
///
/// Returns [`SignalError`] if the hook cannot be registered and no handler
/// was installed before.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    let installed = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Stopping duplicate check...");
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
    });

    match installed {
        Ok(()) => Ok(GLOBAL_HANDLER.get_or_init(|| handler).clone()),
        Err(e) => match GLOBAL_HANDLER.get() {
            Some(existing) => Ok(existing.clone()),
            None => Err(SignalError::InstallFailed(e)),
        },
    }
}
