//! The process-wide reporter and the free functions that delegate to it.
//!
//! The first call to [`global`] (directly, or through any free function in
//! the crate root) creates a local-only reporter printing to standard output,
//! unless one was installed before with [`Reporter::install`]. Backends such
//! as the Sentry one from `errortools-sentry` plug into the process-wide
//! reporter with [`Reporter::set_backend`], so they can be attached at any
//! point of the program's life.
//!
//! [`Reporter::teardown`] on the process-wide reporter ends its lifecycle: it
//! flushes and detaches the backend and clears all accumulated state.

use core::fmt;

use spin::Once;

use crate::{
    backend::Severity,
    input::IntoInput,
    reporter::{Delivery, Reporter},
};

static GLOBAL: Once<Reporter> = Once::new();

/// Returns the process-wide reporter, creating a default one on first use.
pub fn global() -> &'static Reporter {
    GLOBAL.call_once(Reporter::new)
}

/// Error returned when installing a process-wide reporter after one already
/// exists.
///
/// Contains the reporter that was attempted to be installed.
pub struct ReporterAlreadyInstalledError(pub Reporter);

impl fmt::Debug for ReporterAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterAlreadyInstalledError").finish()
    }
}

impl fmt::Display for ReporterAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a process-wide reporter is already installed")
    }
}

impl core::error::Error for ReporterAlreadyInstalledError {}

impl Reporter {
    /// Installs `self` as the process-wide reporter.
    ///
    /// Fails if the process-wide reporter already exists, either because it
    /// was installed before or because something was reported through it.
    ///
    /// ```
    /// use errortools::Reporter;
    ///
    /// Reporter::new().install().expect("nothing was reported yet");
    /// assert!(Reporter::new().install().is_err());
    /// ```
    pub fn install(self) -> Result<(), ReporterAlreadyInstalledError> {
        let mut pending = Some(self);
        GLOBAL.call_once(|| pending.take().unwrap_or_default());
        match pending {
            None => Ok(()),
            Some(reporter) => Err(ReporterAlreadyInstalledError(reporter)),
        }
    }
}

/// Reports `input` at info level through the process-wide reporter.
pub fn capture_info(input: impl IntoInput) {
    global().capture_info(input);
}

/// Reports `input` at warning level through the process-wide reporter.
pub fn capture_warning(input: impl IntoInput) {
    global().capture_warning(input);
}

/// Reports `input` at error level through the process-wide reporter.
pub fn capture_error(input: impl IntoInput) {
    global().capture_error(input);
}

/// Reports `input` at fatal level through the process-wide reporter and
/// terminates the process. Returns only when `input` is empty.
pub fn capture_fatal(input: impl IntoInput) {
    global().capture_fatal(input);
}

/// Reports `input` at `severity` through the process-wide reporter.
pub fn report(input: impl IntoInput, severity: Severity, delivery: Delivery) {
    global().report(input, severity, delivery);
}

/// Sets a context entry on the process-wide reporter.
pub fn set_context(key: impl Into<String>, value: impl fmt::Display) {
    global().set_context(key, value);
}

/// Removes a context entry from the process-wide reporter.
pub fn remove_context(key: &str) {
    global().remove_context(key);
}

/// Installs a message function on the process-wide reporter.
pub fn set_modify_message_function<F>(transform: F)
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    global().set_modify_message_function(transform);
}

/// Removes the message function from the process-wide reporter.
pub fn remove_modify_message_function() {
    global().remove_modify_message_function();
}

/// Sets a tag on the process-wide reporter's backend.
pub fn set_tag(key: &str, value: impl fmt::Display) {
    global().set_tag(key, value);
}

/// Removes a tag from the process-wide reporter's backend.
pub fn remove_tag(key: &str) {
    global().remove_tag(key);
}

/// Number of error-level reports made through the process-wide reporter.
pub fn count() -> usize {
    global().count()
}

/// Resets the process-wide error counter.
pub fn reset_count() {
    global().reset_count();
}
