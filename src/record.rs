//! The enriched representation of a single error occurrence.
//!
//! An [`ErrorRecord`] carries the human-readable message that will be printed
//! and sent to the backend, plus optional metadata describing where the error
//! happened: the HTTP exchange that triggered it, free-form extras, a grouping
//! fingerprint and an exception type override.
//!
//! Records are usually built implicitly by the capture functions, but building
//! one by hand lets you attach metadata before reporting:
//!
//! ```
//! use errortools::{ErrorRecord, ResponseSnapshot};
//!
//! let mut record = ErrorRecord::new("upstream refused the order");
//! record.set_response(ResponseSnapshot::new(503, "Service Unavailable"));
//! record.set_extra("order_id", 1234);
//! record.set_type("UpstreamError");
//!
//! assert_eq!(record.extra("order_id"), Some("1234"));
//! ```

use core::fmt;

use indexmap::IndexMap;

use crate::input::{Input, IntoInput};

/// Name of the extra that overrides the displayed exception type.
pub const KEY_EXCEPTION_TYPE: &str = "exception_type";

/// A boxed error that can cross threads, as kept by [`ErrorRecord`].
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Owned copy of the HTTP request that triggered an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestSnapshot {
    /// Full request URL.
    pub url: String,
    /// Request method, e.g. `GET`.
    pub method: String,
    /// Request body, if it was captured.
    pub body: Option<Vec<u8>>,
}

impl RequestSnapshot {
    /// Creates a snapshot without a body.
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            body: None,
        }
    }

    /// Attaches a copy of the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Owned copy of the HTTP response that triggered an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseSnapshot {
    /// Numeric status code.
    pub status_code: u16,
    /// Status text, e.g. `Service Unavailable`.
    pub status_text: String,
}

impl ResponseSnapshot {
    /// Creates a response snapshot.
    pub fn new(status_code: u16, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
        }
    }
}

/// An error enriched with everything the reporter sends along with it.
///
/// Every setter mutates exactly one field. Extras are kept in insertion order
/// and setting an existing key overwrites its value.
#[derive(Default)]
pub struct ErrorRecord {
    message: String,
    original_error: Option<BoxError>,
    request: Option<RequestSnapshot>,
    response: Option<ResponseSnapshot>,
    extras: Option<IndexMap<String, String>>,
    fingerprint: Option<Vec<String>>,
}

impl ErrorRecord {
    /// Creates a message-only record.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Creates a record from a typed error, keeping the error itself so the
    /// backend can report its real type.
    pub fn from_error<E>(error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::from_boxed_error(Box::new(error))
    }

    /// Creates a record from an already boxed error.
    pub fn from_boxed_error(error: BoxError) -> Self {
        Self {
            message: error.to_string(),
            original_error: Some(error),
            ..Self::default()
        }
    }

    /// The message that will be printed and reported.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consumes the record, returning its message.
    pub fn into_message(self) -> String {
        self.message
    }

    /// The typed error this record was built from, if any.
    pub fn original_error(&self) -> Option<&(dyn core::error::Error + Send + Sync + 'static)> {
        self.original_error.as_deref()
    }

    /// The request snapshot, if any.
    pub fn request(&self) -> Option<&RequestSnapshot> {
        self.request.as_ref()
    }

    /// The response snapshot, if any.
    pub fn response(&self) -> Option<&ResponseSnapshot> {
        self.response.as_ref()
    }

    /// The record's extras, if any were set.
    pub fn extras(&self) -> Option<&IndexMap<String, String>> {
        self.extras.as_ref()
    }

    /// Looks up a single extra.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.as_ref()?.get(key).map(String::as_str)
    }

    /// The explicit grouping fingerprint, if any.
    pub fn fingerprint(&self) -> Option<&[String]> {
        self.fingerprint.as_deref()
    }

    /// The exception type override, if one was set with
    /// [`set_type`](Self::set_type).
    pub fn exception_type(&self) -> Option<&str> {
        self.extra(KEY_EXCEPTION_TYPE)
    }

    /// Replaces the request snapshot.
    pub fn set_request(&mut self, request: RequestSnapshot) {
        self.request = Some(request);
    }

    /// Replaces the response snapshot.
    pub fn set_response(&mut self, response: ResponseSnapshot) {
        self.response = Some(response);
    }

    /// Replaces the message.
    ///
    /// Accepts the same values as the capture functions: strings are used
    /// verbatim, errors are rendered with `Display` and anything else gets a
    /// diagnostic rendering. Empty input clears the message. The original
    /// error is left untouched.
    pub fn set_message(&mut self, message: impl IntoInput) {
        self.message = match message.into_input() {
            Input::Empty => String::new(),
            Input::PreBuilt(record) => record.message,
            Input::Typed(error) => error.to_string(),
            Input::Text(text) => text,
            other @ Input::Other { .. } => other.describe(),
        };
    }

    /// Sets an extra, overwriting any previous value for `key`.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.extras
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.to_string());
    }

    /// Sets the grouping fingerprint.
    pub fn set_fingerprint<I, S>(&mut self, fingerprint: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fingerprint = Some(fingerprint.into_iter().map(Into::into).collect());
    }

    /// Overrides the exception type shown by the backend.
    ///
    /// This is shorthand for `set_extra("exception_type", type_name)`.
    pub fn set_type(&mut self, type_name: impl fmt::Display) {
        self.set_extra(KEY_EXCEPTION_TYPE, type_name);
    }

    /// Builder form of [`set_request`](Self::set_request).
    #[must_use]
    pub fn with_request(mut self, request: RequestSnapshot) -> Self {
        self.set_request(request);
        self
    }

    /// Builder form of [`set_response`](Self::set_response).
    #[must_use]
    pub fn with_response(mut self, response: ResponseSnapshot) -> Self {
        self.set_response(response);
        self
    }

    /// Builder form of [`set_extra`](Self::set_extra).
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.set_extra(key, value);
        self
    }

    /// Builder form of [`set_fingerprint`](Self::set_fingerprint).
    #[must_use]
    pub fn with_fingerprint<I, S>(mut self, fingerprint: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_fingerprint(fingerprint);
        self
    }

    /// Builder form of [`set_type`](Self::set_type).
    #[must_use]
    pub fn with_type(mut self, type_name: impl fmt::Display) -> Self {
        self.set_type(type_name);
        self
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRecord")
            .field("message", &self.message)
            .field("original_error", &self.original_error)
            .field("request", &self.request)
            .field("response", &self.response)
            .field("extras", &self.extras)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// The error sent to the backend when a record has no typed error of its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageError(pub String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::error::Error for MessageError {}
