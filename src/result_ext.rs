use core::fmt;

use crate::{
    global::global,
    input::Input,
    record::ErrorRecord,
    reporter::Delivery,
};

mod sealed {
    pub trait Sealed {}
    impl<A, E> Sealed for Result<A, E> {}
}

/// Extension methods reporting the error side of a [`Result`] through the
/// process-wide reporter.
///
/// # Examples
///
/// ```
/// use errortools::ResultExt;
///
/// let port: Option<u16> = "80a".parse::<u16>().capture_err();
/// assert_eq!(port, None);
///
/// let port: u16 = "8080".parse::<u16>().unwrap_or_fatal();
/// assert_eq!(port, 8080);
/// ```
pub trait ResultExt<V, E>: sealed::Sealed {
    /// Reports the error at error level and discards it.
    fn capture_err(self) -> Option<V>
    where
        E: core::error::Error + Send + Sync + 'static;

    /// Reports the error at warning level and discards it.
    fn capture_warn(self) -> Option<V>
    where
        E: core::error::Error + Send + Sync + 'static;

    /// Returns the value, or reports the error at fatal level and terminates
    /// the process.
    fn unwrap_or_fatal(self) -> V
    where
        E: core::error::Error + Send + Sync + 'static;

    /// Prints `prefix` followed by the error on the process-wide reporter's
    /// console, without reporting it.
    fn print_err(self, prefix: &str) -> Option<V>
    where
        E: fmt::Display;
}

impl<V, E> ResultExt<V, E> for Result<V, E> {
    fn capture_err(self) -> Option<V>
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        self.map_err(|error| global().capture_error(Input::error(error)))
            .ok()
    }

    fn capture_warn(self) -> Option<V>
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        self.map_err(|error| global().capture_warning(Input::error(error)))
            .ok()
    }

    fn unwrap_or_fatal(self) -> V
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        match self {
            Ok(value) => value,
            Err(error) => global()
                .capture_fatal_record(ErrorRecord::from_error(error), Delivery::Backend),
        }
    }

    fn print_err(self, prefix: &str) -> Option<V>
    where
        E: fmt::Display,
    {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                global().console().print(&format!("{prefix} {error}"));
                None
            }
        }
    }
}
