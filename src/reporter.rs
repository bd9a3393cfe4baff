//! The reporting pipeline.
//!
//! A [`Reporter`] owns everything a report is built from: the backend it is
//! sent to, the console it is printed on, the process-wide [`ContextStore`],
//! the optional message transform and the error counter.
//!
//! Reporting a value goes through the same steps at every severity:
//!
//! 1. The value is normalized into an [`ErrorRecord`]. Empty values stop here.
//! 2. The installed message transform, if any, rewrites the message.
//! 3. Context, message, HTTP snapshots and extras are set on the backend.
//! 4. The backend level is set for the duration of the capture call only.
//! 5. The event is captured and flushed.
//! 6. The record's extras are removed from the backend again.
//! 7. The message is printed; error reports are counted and fatal reports
//!    terminate the process.
//!
//! ```
//! use errortools::{ErrorRecord, Reporter};
//!
//! let reporter = Reporter::new();
//! reporter.set_context("env", "staging");
//! reporter.capture_warning("cache is cold");
//! reporter.capture_error(ErrorRecord::new("payment declined").with_extra("user_id", 42));
//! assert_eq!(reporter.count(), 1);
//! ```

use alloc::sync::Arc;
use core::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use std::panic::{self, AssertUnwindSafe};

use spin::RwLock;

use crate::{
    backend::{Backend, LevelGuard, NoopBackend, Severity},
    console::{Console, StdConsole},
    context::ContextStore,
    input::IntoInput,
    record::{ErrorRecord, MessageError},
    transform::TransformSlot,
};

/// Extra holding the rendered process-wide context.
pub const KEY_CONTEXT: &str = "context";
/// Extra holding the record's message.
pub const KEY_MESSAGE: &str = "message";
/// Tag holding the response status code.
pub const KEY_RESPONSE_STATUS_CODE: &str = "response_status_code";
/// Extra holding the response status text.
pub const KEY_RESPONSE_STATUS: &str = "response_status";
/// Extra holding the request URL.
pub const KEY_URL: &str = "url";
/// Extra holding the request method.
pub const KEY_HTTP_METHOD: &str = "http_method";
/// Extra holding the request body.
pub const KEY_HTTP_BODY: &str = "http_body";

/// Default upper bound on how long a report waits for the backend to flush.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// Whether a report is sent to the backend.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Delivery {
    /// Send to the backend, then print.
    #[default]
    Backend,
    /// Only print. The backend is not touched.
    LocalOnly,
}

/// Builds, sends and prints reports.
///
/// Most applications use the process-wide reporter through the free
/// functions in the crate root; a `Reporter` can also be created and used
/// directly.
pub struct Reporter {
    backend: RwLock<Arc<dyn Backend>>,
    console: RwLock<Arc<dyn Console>>,
    context: ContextStore,
    transform: TransformSlot,
    error_count: AtomicUsize,
    flush_timeout: Duration,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    /// Creates a local-only reporter printing to standard output.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a reporter.
    pub fn builder() -> ReporterBuilder {
        ReporterBuilder::default()
    }

    /// The currently configured backend.
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend.read())
    }

    /// Replaces the backend. Returns the previous one.
    pub fn set_backend(&self, backend: Arc<dyn Backend>) -> Arc<dyn Backend> {
        core::mem::replace(&mut *self.backend.write(), backend)
    }

    /// The currently configured console.
    pub fn console(&self) -> Arc<dyn Console> {
        Arc::clone(&self.console.read())
    }

    /// Replaces the console. Returns the previous one.
    pub fn set_console(&self, console: Arc<dyn Console>) -> Arc<dyn Console> {
        core::mem::replace(&mut *self.console.write(), console)
    }

    /// The context merged into every report.
    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    /// Sets a context entry included in every subsequent report.
    pub fn set_context(&self, key: impl Into<String>, value: impl fmt::Display) {
        self.context.set(key, value);
    }

    /// Removes a context entry.
    pub fn remove_context(&self, key: &str) {
        self.context.remove(key);
    }

    /// Installs a function rewriting every message before it is reported.
    pub fn set_modify_message_function<F>(&self, transform: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.transform.set(transform);
    }

    /// Removes the installed message function.
    pub fn remove_modify_message_function(&self) {
        self.transform.remove();
    }

    /// Sets a tag directly on the backend.
    pub fn set_tag(&self, key: &str, value: impl fmt::Display) {
        self.backend().set_tag(key, &value.to_string());
    }

    /// Removes a tag from the backend.
    pub fn remove_tag(&self, key: &str) {
        self.backend().remove_tag(key);
    }

    /// Number of error-level reports since creation or the last
    /// [`reset_count`](Self::reset_count).
    pub fn count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Resets the error counter to zero.
    pub fn reset_count(&self) {
        self.error_count.store(0, Ordering::Relaxed);
    }

    /// Restores the reporter to its initial state: flushes and detaches the
    /// backend, clears the context, removes the message function and resets
    /// the counter.
    pub fn teardown(&self) {
        let backend = self.set_backend(Arc::new(NoopBackend));
        if !backend.flush(self.flush_timeout) {
            tracing::warn!(timeout = ?self.flush_timeout, "backend did not flush before teardown");
        }
        self.context.clear();
        self.transform.remove();
        self.reset_count();
    }

    /// Reports at info level and prints the message.
    pub fn capture_info(&self, input: impl IntoInput) {
        self.report(input, Severity::Info, Delivery::Backend);
    }

    /// Reports at warning level and prints the message.
    pub fn capture_warning(&self, input: impl IntoInput) {
        self.report(input, Severity::Warning, Delivery::Backend);
    }

    /// Reports at error level, prints the message and increments the error
    /// counter.
    pub fn capture_error(&self, input: impl IntoInput) {
        self.report(input, Severity::Error, Delivery::Backend);
    }

    /// Reports at fatal level, prints the message and terminates the process.
    ///
    /// Returns only when `input` is empty.
    pub fn capture_fatal(&self, input: impl IntoInput) {
        self.report(input, Severity::Fatal, Delivery::Backend);
    }

    /// Reports `input` at `severity`.
    ///
    /// Empty input is a no-op. With [`Delivery::LocalOnly`] the backend is not
    /// touched but the message is still printed, counted, or terminates the
    /// process according to `severity`.
    pub fn report(&self, input: impl IntoInput, severity: Severity, delivery: Delivery) {
        let Some(record) = input.into_input().into_record() else {
            return;
        };

        match severity {
            Severity::Fatal => self.capture_fatal_record(record, delivery),
            Severity::Info | Severity::Warning => {
                let message = self.dispatch(record, severity, delivery);
                self.console().print(&message);
            }
            Severity::Error => {
                let message = self.dispatch(record, severity, delivery);
                self.error_count.fetch_add(1, Ordering::Relaxed);
                self.console().print(&message);
            }
        }
    }

    /// Reports `record` at fatal level and terminates the process.
    pub fn capture_fatal_record(&self, record: ErrorRecord, delivery: Delivery) -> ! {
        let message = self.dispatch(record, Severity::Fatal, delivery);
        self.console().terminate(&message)
    }

    /// Applies the message transform and sends the record. Returns the final
    /// message.
    fn dispatch(&self, mut record: ErrorRecord, severity: Severity, delivery: Delivery) -> String {
        if let Some(message) = self.transform.apply(record.message()) {
            record.set_message(message);
        }

        tracing::debug!(%severity, ?delivery, message = record.message(), "reporting event");

        if delivery == Delivery::Backend {
            let backend = self.backend();
            self.send(backend.as_ref(), &record, severity);
        }

        record.into_message()
    }

    fn send(&self, backend: &dyn Backend, record: &ErrorRecord, severity: Severity) {
        let sent = panic::catch_unwind(AssertUnwindSafe(|| {
            apply_payload(backend, &self.context, record);
            {
                let _level = LevelGuard::acquire(backend, severity);
                capture(backend, record, severity);
            }
            if !backend.flush(self.flush_timeout) {
                tracing::warn!(timeout = ?self.flush_timeout, "backend did not flush in time");
            }
        }));
        if sent.is_err() {
            tracing::warn!(%severity, "backend panicked while reporting, event dropped");
        }

        let cleared = panic::catch_unwind(AssertUnwindSafe(|| clear_extras(backend, record)));
        if cleared.is_err() {
            tracing::warn!("backend panicked while clearing record extras");
        }
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("context", &self.context)
            .field("transform", &self.transform)
            .field("error_count", &self.count())
            .field("flush_timeout", &self.flush_timeout)
            .finish_non_exhaustive()
    }
}

/// Sets every annotation describing `record` on the backend, removing the
/// ones that do not apply so nothing carries over from a previous report.
fn apply_payload(backend: &dyn Backend, context: &ContextStore, record: &ErrorRecord) {
    match context.render() {
        Some(rendered) => backend.set_extra(KEY_CONTEXT, &rendered),
        None => backend.remove_extra(KEY_CONTEXT),
    }

    if record.message().is_empty() {
        backend.remove_extra(KEY_MESSAGE);
    } else {
        backend.set_extra(KEY_MESSAGE, record.message());
    }

    backend.set_fingerprint(record.fingerprint());

    if let Some(response) = record.response() {
        backend.set_tag(KEY_RESPONSE_STATUS_CODE, &response.status_code.to_string());
        backend.set_extra(KEY_RESPONSE_STATUS, &response.status_text);
    } else {
        backend.remove_tag(KEY_RESPONSE_STATUS_CODE);
        backend.remove_extra(KEY_RESPONSE_STATUS);
    }

    if let Some(request) = record.request() {
        backend.set_extra(KEY_URL, &request.url);
        backend.set_extra(KEY_HTTP_METHOD, &request.method);
        match &request.body {
            Some(body) => backend.set_extra(KEY_HTTP_BODY, &String::from_utf8_lossy(body)),
            None => backend.remove_extra(KEY_HTTP_BODY),
        }
    } else {
        backend.remove_extra(KEY_URL);
        backend.remove_extra(KEY_HTTP_METHOD);
        backend.remove_extra(KEY_HTTP_BODY);
    }

    for (key, value) in record.extras().into_iter().flatten() {
        backend.set_extra(key, value);
    }
}

fn capture(backend: &dyn Backend, record: &ErrorRecord, severity: Severity) {
    if !severity.is_exception() {
        backend.capture_message(record.message(), severity);
        return;
    }

    match record.original_error() {
        Some(error) => backend.capture_exception(error, severity),
        None => backend.capture_exception(&MessageError(record.message().to_string()), severity),
    }
}

fn clear_extras(backend: &dyn Backend, record: &ErrorRecord) {
    for key in record.extras().into_iter().flat_map(|extras| extras.keys()) {
        backend.remove_extra(key);
    }
}

/// Configures a [`Reporter`].
///
/// ```
/// use std::{sync::Arc, time::Duration};
///
/// use errortools::{NoopBackend, Reporter, StdConsole};
///
/// let reporter = Reporter::builder()
///     .backend(Arc::new(NoopBackend))
///     .console(Arc::new(StdConsole))
///     .flush_timeout(Duration::from_millis(500))
///     .build();
/// reporter.capture_info("configured");
/// ```
pub struct ReporterBuilder {
    backend: Arc<dyn Backend>,
    console: Arc<dyn Console>,
    flush_timeout: Duration,
}

impl Default for ReporterBuilder {
    fn default() -> Self {
        Self {
            backend: Arc::new(NoopBackend),
            console: Arc::new(StdConsole),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

impl ReporterBuilder {
    /// Sets the backend reports are sent to.
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the console reports are printed on.
    #[must_use]
    pub fn console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = console;
        self
    }

    /// Sets how long each report waits for the backend to flush.
    #[must_use]
    pub fn flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Builds the reporter.
    pub fn build(self) -> Reporter {
        Reporter {
            backend: RwLock::new(self.backend),
            console: RwLock::new(self.console),
            context: ContextStore::new(),
            transform: TransformSlot::new(),
            error_count: AtomicUsize::new(0),
            flush_timeout: self.flush_timeout,
        }
    }
}

impl fmt::Debug for ReporterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterBuilder")
            .field("flush_timeout", &self.flush_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::record::{RequestSnapshot, ResponseSnapshot};

    #[derive(Default)]
    struct CallLog(Mutex<Vec<String>>);

    impl CallLog {
        fn push(&self, call: String) {
            self.0.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Backend for CallLog {
        fn set_tag(&self, key: &str, value: &str) {
            self.push(format!("set_tag {key}={value}"));
        }
        fn remove_tag(&self, key: &str) {
            self.push(format!("remove_tag {key}"));
        }
        fn set_extra(&self, key: &str, value: &str) {
            self.push(format!("set_extra {key}={value}"));
        }
        fn remove_extra(&self, key: &str) {
            self.push(format!("remove_extra {key}"));
        }
        fn set_fingerprint(&self, fingerprint: Option<&[String]>) {
            self.push(format!("set_fingerprint {fingerprint:?}"));
        }
        fn set_level(&self, level: Option<Severity>) {
            self.push(format!("set_level {level:?}"));
        }
        fn capture_exception(&self, error: &(dyn core::error::Error + 'static), level: Severity) {
            self.push(format!("capture_exception {level} {error}"));
        }
        fn capture_message(&self, message: &str, level: Severity) {
            self.push(format!("capture_message {level} {message}"));
        }
    }

    #[test]
    fn test_reporter_send_sync() {
        static_assertions::assert_impl_all!(Reporter: Send, Sync);
    }

    #[test]
    fn test_payload_order() {
        let backend = CallLog::default();
        let context = ContextStore::new();
        context.set("env", "staging");

        let record = ErrorRecord::new("checkout failed")
            .with_request(RequestSnapshot::new("https://shop.test/cart", "POST"))
            .with_response(ResponseSnapshot::new(502, "Bad Gateway"))
            .with_extra("cart_id", "c-17");
        apply_payload(&backend, &context, &record);

        assert_eq!(
            backend.calls(),
            [
                "set_extra context=env: staging",
                "set_extra message=checkout failed",
                "set_fingerprint None",
                "set_tag response_status_code=502",
                "set_extra response_status=Bad Gateway",
                "set_extra url=https://shop.test/cart",
                "set_extra http_method=POST",
                "remove_extra http_body",
                "set_extra cart_id=c-17",
            ]
        );
    }

    #[test]
    fn test_payload_removes_absent_fields() {
        let backend = CallLog::default();
        apply_payload(&backend, &ContextStore::new(), &ErrorRecord::default());

        assert_eq!(
            backend.calls(),
            [
                "remove_extra context",
                "remove_extra message",
                "set_fingerprint None",
                "remove_tag response_status_code",
                "remove_extra response_status",
                "remove_extra url",
                "remove_extra http_method",
                "remove_extra http_body",
            ]
        );
    }

    #[test]
    fn test_level_scoped_to_capture() {
        let backend = Arc::new(CallLog::default());
        let reporter = Reporter::builder().backend(backend.clone()).build();
        reporter.capture_warning(ErrorRecord::new("slow query").with_extra("ms", 1200));

        let calls = backend.calls();
        let tail = &calls[calls.len() - 4..];
        assert_eq!(
            tail,
            [
                "set_level Some(Warning)",
                "capture_message warning slow query",
                "set_level None",
                "remove_extra ms",
            ]
        );
    }

    #[test]
    fn test_error_without_original_is_synthesized() {
        let backend = Arc::new(CallLog::default());
        let reporter = Reporter::builder().backend(backend.clone()).build();
        reporter.capture_error("quota exceeded");

        assert!(
            backend
                .calls()
                .contains(&"capture_exception error quota exceeded".to_string())
        );
        assert_eq!(reporter.count(), 1);
    }

    #[test]
    fn test_local_only_skips_backend() {
        let backend = Arc::new(CallLog::default());
        let reporter = Reporter::builder().backend(backend.clone()).build();
        reporter.report("dry run", Severity::Error, Delivery::LocalOnly);

        assert!(backend.calls().is_empty());
        assert_eq!(reporter.count(), 1);
    }

    #[test]
    fn test_teardown_resets_state() {
        let backend = Arc::new(CallLog::default());
        let reporter = Reporter::builder().backend(backend.clone()).build();
        reporter.set_context("env", "staging");
        reporter.set_modify_message_function(|m| m.to_uppercase());
        reporter.capture_error("one");

        reporter.teardown();
        assert_eq!(reporter.count(), 0);
        assert!(reporter.context().is_empty());

        reporter.capture_error("two");
        assert_eq!(backend.calls().iter().filter(|c| c.starts_with("capture")).count(), 1);
    }
}
