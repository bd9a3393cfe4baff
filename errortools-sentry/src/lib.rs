#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Sentry backend for errortools.
//!
//! This crate connects the process-wide errortools reporter to Sentry. After
//! [`init`], every `capture_*` call is sent to Sentry as an event carrying
//! the report's context, message, HTTP snapshots and extras, and is flushed
//! before the call returns, so a fatal report reaches Sentry before the
//! process exits.
//!
//! # Quick Start
//!
//! ```no_run
//! use errortools_sentry::SentryConfig;
//!
//! let _guard = errortools_sentry::init(SentryConfig::from_env()).expect("invalid Sentry DSN");
//!
//! errortools::set_context("env", "staging");
//! errortools::capture_error("could not reach the billing service");
//! ```
//!
//! Keep the returned guard alive for the lifetime of the program; dropping it
//! shuts the Sentry client down.
//!
//! # Live and test deployments
//!
//! Unless [`SentryConfig::live`] is set, events go to [`SENTRY_DSN_TEST`]
//! instead of the configured DSN, keeping development noise out of the
//! production project.
//!
//! # Exception types
//!
//! Sentry groups and titles exception events by their type. A record's
//! `exception_type` extra (set with
//! [`ErrorRecord::set_type`](errortools::ErrorRecord::set_type)) replaces the
//! type of every exception in the event, and is then dropped from the event's
//! extras. See [`apply_exception_type`].
//!
//! # Environment Variables
//!
//! Read by [`SentryConfig::from_env`]:
//!
//! - `ERRORTOOLS_SENTRY_DSN` - DSN used for live deployments
//! - `ERRORTOOLS_LIVE` - `1`, `true` or `yes` marks the deployment as live
//! - `ERRORTOOLS_FLUSH_TIMEOUT_MS` - how long each report may wait for
//!   delivery, in milliseconds (default 3000)
//! - `ERRORTOOLS_ENVIRONMENT` - Sentry environment name

use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use errortools::{Backend, KEY_EXCEPTION_TYPE, Severity};
use sentry::{
    ClientInitGuard, ClientOptions, Hub, Level,
    protocol::{Event, Value},
    types::{Dsn, ParseDsnError},
};

/// DSN of the project receiving events from deployments not marked as live.
pub const SENTRY_DSN_TEST: &str =
    "https://da7ff9970b3f4fb6b7f84ffeee423f87@o326694.ingest.sentry.io/5510091";

/// Default upper bound on how long a report waits for delivery.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// A [`Backend`] sending events through the current Sentry hub.
///
/// Scope changes are made on [`Hub::current`], which is thread-local for
/// every thread except the main one, so concurrent reports from different
/// threads do not see each other's annotations.
#[derive(Copy, Clone, Debug)]
pub struct SentryBackend {
    flush_timeout: Duration,
}

impl Default for SentryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_TIMEOUT)
    }
}

impl SentryBackend {
    /// Creates a backend waiting at most `flush_timeout` for each event to be
    /// delivered.
    pub fn new(flush_timeout: Duration) -> Self {
        Self { flush_timeout }
    }

    fn configure_scope(&self, f: impl FnOnce(&mut sentry::Scope)) {
        Hub::current().configure_scope(f);
    }
}

/// Maps an errortools severity to the Sentry level.
pub fn level_for(severity: Severity) -> Level {
    match severity {
        Severity::Info => Level::Info,
        Severity::Warning => Level::Warning,
        Severity::Error => Level::Error,
        Severity::Fatal => Level::Fatal,
    }
}

impl Backend for SentryBackend {
    fn set_tag(&self, key: &str, value: &str) {
        self.configure_scope(|scope| scope.set_tag(key, value));
    }

    fn remove_tag(&self, key: &str) {
        self.configure_scope(|scope| scope.remove_tag(key));
    }

    fn set_extra(&self, key: &str, value: &str) {
        self.configure_scope(|scope| scope.set_extra(key, Value::from(value)));
    }

    fn remove_extra(&self, key: &str) {
        self.configure_scope(|scope| scope.remove_extra(key));
    }

    fn set_fingerprint(&self, fingerprint: Option<&[String]>) {
        let fingerprint: Option<Vec<&str>> =
            fingerprint.map(|parts| parts.iter().map(String::as_str).collect());
        self.configure_scope(|scope| scope.set_fingerprint(fingerprint.as_deref()));
    }

    fn set_level(&self, level: Option<Severity>) {
        self.configure_scope(|scope| scope.set_level(level.map(level_for)));
    }

    fn capture_exception(&self, error: &(dyn std::error::Error + 'static), _level: Severity) {
        let event_id = Hub::current().capture_error(error);
        tracing::debug!(%event_id, "captured exception event");
    }

    fn capture_message(&self, message: &str, level: Severity) {
        let event_id = Hub::current().capture_message(message, level_for(level));
        tracing::debug!(%event_id, "captured message event");
    }

    fn flush(&self, timeout: Duration) -> bool {
        match Hub::current().client() {
            Some(client) => client.flush(Some(timeout.min(self.flush_timeout))),
            None => true,
        }
    }
}

/// Rewrites the type of every exception in `event` to the `exception_type`
/// extra, and removes that extra.
///
/// Events without exceptions are returned unchanged. Installed as the
/// client's `before_send` hook by [`init`].
pub fn apply_exception_type(mut event: Event<'static>) -> Option<Event<'static>> {
    if event.exception.values.is_empty() {
        return Some(event);
    }

    if let Some(exception_type) = event.extra.remove(KEY_EXCEPTION_TYPE) {
        let exception_type = match exception_type {
            Value::String(name) => name,
            other => other.to_string(),
        };
        for exception in &mut event.exception.values {
            exception.ty.clone_from(&exception_type);
        }
    }

    Some(event)
}

/// Configuration for [`init`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentryConfig {
    /// DSN used when [`live`](Self::live) is set.
    pub dsn: Option<String>,
    /// Whether this deployment reports to the production project.
    pub live: bool,
    /// Whether message events carry a stack trace.
    pub attach_stacktrace: bool,
    /// How long each report may wait for delivery.
    pub flush_timeout: Duration,
    /// Sentry environment name.
    pub environment: Option<String>,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            live: false,
            attach_stacktrace: true,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            environment: None,
        }
    }
}

impl SentryConfig {
    /// Creates a configuration reporting to `dsn` when `live`, and to
    /// [`SENTRY_DSN_TEST`] otherwise.
    pub fn new(dsn: impl Into<String>, live: bool) -> Self {
        Self {
            dsn: Some(dsn.into()),
            live,
            ..Self::default()
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// See the [crate documentation](crate#environment-variables) for the
    /// variables used. Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let live = lookup("ERRORTOOLS_LIVE").is_some_and(|live| {
            ["1", "true", "yes"]
                .iter()
                .any(|v| live.trim().eq_ignore_ascii_case(v))
        });

        let flush_timeout = match lookup("ERRORTOOLS_FLUSH_TIMEOUT_MS") {
            Some(timeout) => match timeout.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(value = %timeout, "ignoring invalid ERRORTOOLS_FLUSH_TIMEOUT_MS");
                    DEFAULT_FLUSH_TIMEOUT
                }
            },
            None => DEFAULT_FLUSH_TIMEOUT,
        };

        Self {
            dsn: lookup("ERRORTOOLS_SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            live,
            flush_timeout,
            environment: lookup("ERRORTOOLS_ENVIRONMENT").filter(|env| !env.is_empty()),
            ..Self::default()
        }
    }

    /// The DSN events are actually sent to.
    pub fn effective_dsn(&self) -> Option<&str> {
        if self.live {
            self.dsn.as_deref()
        } else {
            Some(SENTRY_DSN_TEST)
        }
    }

    /// Builds the Sentry client options for this configuration.
    pub fn client_options(&self) -> Result<ClientOptions, InitError> {
        let dsn = self
            .effective_dsn()
            .map(Dsn::from_str)
            .transpose()
            .map_err(InitError::InvalidDsn)?;

        Ok(ClientOptions {
            dsn,
            attach_stacktrace: self.attach_stacktrace,
            before_send: Some(Arc::new(apply_exception_type)),
            shutdown_timeout: self.flush_timeout,
            environment: self.environment.clone().map(Into::into),
            ..ClientOptions::default()
        })
    }
}

/// Error returned by [`init`].
#[derive(Debug)]
pub enum InitError {
    /// The DSN could not be parsed.
    InvalidDsn(ParseDsnError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDsn(_) => write!(f, "invalid Sentry DSN"),
        }
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidDsn(error) => Some(error),
        }
    }
}

/// Initializes the Sentry client and routes the process-wide errortools
/// reporter to it.
///
/// The returned guard must be kept alive; dropping it flushes and shuts down
/// the client.
pub fn init(config: SentryConfig) -> Result<ClientInitGuard, InitError> {
    let guard = sentry::init(config.client_options()?);
    errortools::global().set_backend(Arc::new(SentryBackend::new(config.flush_timeout)));

    tracing::info!(
        live = config.live,
        enabled = guard.is_enabled(),
        "sentry error reporting initialized"
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use errortools::{ErrorRecord, Reporter, ResponseSnapshot};
    use sentry::{protocol::Exception, test::with_captured_events_options};

    use super::*;

    #[derive(Debug, derive_more::Display, derive_more::Error)]
    #[display("ledger is locked")]
    struct LedgerLocked;

    fn reporter() -> Reporter {
        Reporter::builder()
            .backend(Arc::new(SentryBackend::default()))
            .build()
    }

    fn test_options() -> ClientOptions {
        ClientOptions {
            before_send: Some(Arc::new(apply_exception_type)),
            ..ClientOptions::default()
        }
    }

    #[test]
    fn test_error_event_carries_payload() {
        let reporter = reporter();
        reporter.set_context("env", "staging");

        let events = with_captured_events_options(
            || {
                let record = ErrorRecord::from_error(LedgerLocked)
                    .with_response(ResponseSnapshot::new(503, "Service Unavailable"))
                    .with_extra("user_id", 42)
                    .with_fingerprint(["ledger", "locked"]);
                reporter.capture_error(record);
            },
            test_options(),
        );

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.level, Level::Error);
        assert_eq!(event.extra["context"], Value::from("env: staging"));
        assert_eq!(event.extra["message"], Value::from("ledger is locked"));
        assert_eq!(event.extra["user_id"], Value::from("42"));
        assert_eq!(event.extra["response_status"], Value::from("Service Unavailable"));
        assert_eq!(event.tags["response_status_code"], "503");
        let fingerprint: Vec<&str> = event.fingerprint.iter().map(|part| part.as_ref()).collect();
        assert_eq!(fingerprint, ["ledger", "locked"]);
        assert_eq!(event.exception.values[0].value.as_deref(), Some("ledger is locked"));
    }

    #[test]
    fn test_extras_do_not_leak() {
        let reporter = reporter();

        let events = with_captured_events_options(
            || {
                reporter.capture_error(ErrorRecord::new("first").with_extra("user_id", 42));
                reporter.capture_error("second");
            },
            test_options(),
        );

        assert_eq!(events.len(), 2);
        assert!(events[0].extra.contains_key("user_id"));
        assert!(!events[1].extra.contains_key("user_id"));
        assert!(!events[1].extra.contains_key("context"));
    }

    #[test]
    fn test_exception_type_override() {
        let reporter = reporter();

        let events = with_captured_events_options(
            || reporter.capture_error(ErrorRecord::new("quota used up").with_type("QuotaExceeded")),
            test_options(),
        );

        let event = &events[0];
        assert_eq!(event.exception.values[0].ty, "QuotaExceeded");
        assert!(!event.extra.contains_key(KEY_EXCEPTION_TYPE));
    }

    #[test]
    fn test_warning_is_a_message_event() {
        let reporter = reporter();

        let events = with_captured_events_options(
            || reporter.capture_warning("disk at 91%"),
            test_options(),
        );

        let event = &events[0];
        assert_eq!(event.level, Level::Warning);
        assert_eq!(event.message.as_deref(), Some("disk at 91%"));
        assert!(event.exception.values.is_empty());
    }

    #[test]
    fn test_apply_exception_type_leaves_messages_alone() {
        let mut event = Event::default();
        event
            .extra
            .insert(KEY_EXCEPTION_TYPE.to_string(), Value::from("Custom"));
        let event = apply_exception_type(event).unwrap();
        assert!(event.extra.contains_key(KEY_EXCEPTION_TYPE));

        let mut event = Event::default();
        event.exception.values.push(Exception {
            ty: "MessageError".to_string(),
            ..Exception::default()
        });
        event
            .extra
            .insert(KEY_EXCEPTION_TYPE.to_string(), Value::from("Custom"));
        let event = apply_exception_type(event).unwrap();
        assert_eq!(event.exception.values[0].ty, "Custom");
        assert!(event.extra.is_empty());
    }

    #[test]
    fn test_config_from_env() {
        let vars: HashMap<&str, &str> = [
            ("ERRORTOOLS_SENTRY_DSN", "https://key@sentry.example.com/42"),
            ("ERRORTOOLS_LIVE", "TRUE"),
            ("ERRORTOOLS_FLUSH_TIMEOUT_MS", "250"),
        ]
        .into_iter()
        .collect();
        let config = SentryConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert!(config.live);
        assert_eq!(config.flush_timeout, Duration::from_millis(250));
        assert_eq!(config.effective_dsn(), Some("https://key@sentry.example.com/42"));
        assert_eq!(config.environment, None);
    }

    #[test]
    fn test_config_defaults_to_test_project() {
        let config = SentryConfig::from_lookup(|_| None);
        assert!(!config.live);
        assert!(config.attach_stacktrace);
        assert_eq!(config.effective_dsn(), Some(SENTRY_DSN_TEST));

        let config = SentryConfig::new("https://key@sentry.example.com/42", false);
        assert_eq!(config.effective_dsn(), Some(SENTRY_DSN_TEST));
    }

    #[test]
    fn test_invalid_dsn() {
        let config = SentryConfig::new("not a dsn", true);
        let error = config.client_options().unwrap_err();
        assert_eq!(error.to_string(), "invalid Sentry DSN");
        assert!(std::error::Error::source(&error).is_some());
    }
}
