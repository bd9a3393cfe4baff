/// Macro to classify any value as an [`Input`](crate::Input).
///
/// Conversions are tried in this order:
///
/// 1. The value's [`IntoInput`](crate::IntoInput) implementation (strings,
///    records, `Option`s, common error types).
/// 2. Any other `Error + Send + Sync + 'static` becomes
///    [`Input::Typed`](crate::Input::Typed).
/// 3. Any other `Debug` value becomes [`Input::Other`](crate::Input::Other).
///
/// # Examples
///
/// ```
/// use errortools::{Input, input};
///
/// #[derive(Debug)]
/// struct Timeout;
///
/// impl std::fmt::Display for Timeout {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "timed out")
///     }
/// }
///
/// impl std::error::Error for Timeout {}
///
/// assert!(matches!(input!(Timeout), Input::Typed(_)));
/// assert!(matches!(input!("timed out"), Input::Text(_)));
/// assert!(matches!(input!((1, 2)), Input::Other { .. }));
/// ```
#[macro_export]
macro_rules! input {
    ($value:expr $(,)?) => {{
        use $crate::__private::kind::*;
        let value = $value;
        let tag = (&&&Wrap(&value)).tag();
        tag.classify(value)
    }};
}

/// Macro to build an [`ErrorRecord`](crate::ErrorRecord) from a format string.
///
/// The arguments are interpreted the same way as by [`format!()`].
///
/// [`format!()`]: std::format
///
/// # Examples
///
/// ```
/// use errortools::record;
///
/// let record = record!("order {} rejected", 17).with_extra("reason", "fraud");
/// assert_eq!(record.message(), "order 17 rejected");
/// ```
#[macro_export]
macro_rules! record {
    ($msg:literal $(,)?) => {
        $crate::__private::format_record($crate::__private::format_args!($msg))
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::ErrorRecord::new($crate::__private::format!($fmt, $($arg)*))
    };
}

/// Formats a message and reports it at info level through the process-wide
/// reporter.
#[macro_export]
macro_rules! capture_infof {
    ($($arg:tt)*) => {
        $crate::capture_info($crate::__private::format!($($arg)*))
    };
}

/// Formats a message and reports it at warning level through the
/// process-wide reporter.
#[macro_export]
macro_rules! capture_warningf {
    ($($arg:tt)*) => {
        $crate::capture_warning($crate::__private::format!($($arg)*))
    };
}

/// Formats a message and reports it at error level through the process-wide
/// reporter.
///
/// # Examples
///
/// ```
/// let attempts = 3;
/// errortools::capture_errorf!("giving up after {attempts} attempts");
/// assert!(errortools::count() >= 1);
/// ```
#[macro_export]
macro_rules! capture_errorf {
    ($($arg:tt)*) => {
        $crate::capture_error($crate::__private::format!($($arg)*))
    };
}

/// Formats a message, reports it at fatal level through the process-wide
/// reporter and terminates the process.
#[macro_export]
macro_rules! capture_fatalf {
    ($($arg:tt)*) => {
        $crate::capture_fatal($crate::__private::format!($($arg)*))
    };
}
