//! The seam between the reporter and an external error-tracking service.
//!
//! A [`Backend`] exposes the small set of scope operations the reporter needs:
//! tags and extras that annotate the next captured event, a grouping
//! fingerprint, a severity level, and the two capture calls. The reporter
//! never inspects the outcome of any of these calls.
//!
//! The core crate only ships [`NoopBackend`], which is what reports go to
//! before a real backend has been installed. The `errortools-sentry` crate
//! provides a backend built on the `sentry` client.

use core::{fmt, time::Duration};

/// Severity of a report. Drives both the backend level and the local
/// disposition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational message.
    Info,
    /// Something unexpected that does not need immediate attention.
    Warning,
    /// A failure. Counted by the reporter's error counter.
    Error,
    /// A failure the process cannot continue after.
    Fatal,
}

impl Severity {
    /// Lowercase name of the severity, as used by most trackers.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// Whether reports at this severity are sent as exceptions rather than
    /// plain messages.
    pub const fn is_exception(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external error-tracking service.
///
/// Implementations are called from whichever thread is reporting, so they
/// must be `Send + Sync`. Every method is fire-and-forget.
pub trait Backend: Send + Sync + 'static {
    /// Sets a searchable tag on subsequent events.
    fn set_tag(&self, key: &str, value: &str);

    /// Removes a tag.
    fn remove_tag(&self, key: &str);

    /// Sets an extra annotation on subsequent events.
    fn set_extra(&self, key: &str, value: &str);

    /// Removes an extra annotation.
    fn remove_extra(&self, key: &str);

    /// Sets the grouping fingerprint. `None` restores default grouping.
    fn set_fingerprint(&self, fingerprint: Option<&[String]>);

    /// Sets the level of subsequent events. `None` unsets it.
    fn set_level(&self, level: Option<Severity>);

    /// Captures an exception event.
    fn capture_exception(&self, error: &(dyn core::error::Error + 'static), level: Severity);

    /// Captures a message event.
    fn capture_message(&self, message: &str, level: Severity);

    /// Blocks until queued events are sent or `timeout` elapses. Returns
    /// `false` on timeout.
    fn flush(&self, timeout: Duration) -> bool {
        let _ = timeout;
        true
    }
}

/// A backend that drops everything. Used for local-only reporting.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopBackend;

impl Backend for NoopBackend {
    fn set_tag(&self, _: &str, _: &str) {}

    fn remove_tag(&self, _: &str) {}

    fn set_extra(&self, _: &str, _: &str) {}

    fn remove_extra(&self, _: &str) {}

    fn set_fingerprint(&self, _: Option<&[String]>) {}

    fn set_level(&self, _: Option<Severity>) {}

    fn capture_exception(&self, _: &(dyn core::error::Error + 'static), _: Severity) {}

    fn capture_message(&self, _: &str, _: Severity) {}
}

/// Sets the backend level for as long as the guard lives and unsets it on
/// drop.
pub(crate) struct LevelGuard<'a> {
    backend: &'a dyn Backend,
}

impl<'a> LevelGuard<'a> {
    pub(crate) fn acquire(backend: &'a dyn Backend, level: Severity) -> Self {
        backend.set_level(Some(level));
        Self { backend }
    }
}

impl Drop for LevelGuard<'_> {
    fn drop(&mut self) {
        self.backend.set_level(None);
    }
}
