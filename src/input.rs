//! Normalization of arbitrary caller values into [`ErrorRecord`]s.
//!
//! Every capture function accepts anything implementing [`IntoInput`]. The
//! value is converted once, at the call boundary, into the closed [`Input`]
//! enum, and the rest of the pipeline only ever matches on that enum.
//!
//! [`IntoInput`] is implemented for strings, records, boxed errors, `Option`s
//! of those and the common standard library error types. For any other value
//! use the [`input!`](crate::input!) macro, which picks the best conversion
//! available for the value's type:
//!
//! ```
//! use errortools::{Input, input};
//!
//! #[derive(Debug)]
//! struct Coordinates(i32, i32);
//!
//! let input = input!(Coordinates(3, 4));
//! assert!(matches!(input, Input::Other { .. }));
//! assert!(input.describe().contains("Coordinates(3, 4)"));
//! ```

use alloc::borrow::Cow;
use core::fmt;

use crate::record::{BoxError, ErrorRecord};

/// A caller-supplied value, classified once at the reporting boundary.
pub enum Input {
    /// Nothing to report.
    Empty,
    /// A record the caller already built and enriched.
    PreBuilt(ErrorRecord),
    /// A typed error, kept so the backend can see its real type.
    Typed(BoxError),
    /// A plain message.
    Text(String),
    /// A value of an unsupported shape, kept as a diagnostic rendering.
    Other {
        /// Name of the value's type.
        type_name: &'static str,
        /// `Debug` rendering of the value.
        rendering: String,
    },
}

impl Input {
    /// Classifies a typed error.
    pub fn error<E>(error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Typed(Box::new(error))
    }

    /// Classifies a value of an unsupported shape by its type name and its
    /// `Debug` rendering.
    pub fn other<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        let mut rendering = format!("{value:?}");
        if rendering.is_empty() {
            rendering.push_str("<empty>");
        }
        Self::Other {
            type_name: core::any::type_name::<T>(),
            rendering,
        }
    }

    /// Returns `true` if there is nothing to report.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The human-readable message this input normalizes to.
    pub fn describe(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::PreBuilt(record) => record.message().to_string(),
            Self::Typed(error) => error.to_string(),
            Self::Text(text) => text.clone(),
            Self::Other {
                type_name,
                rendering,
            } => format!("{type_name}: {rendering}"),
        }
    }

    /// Normalizes the input into a record.
    ///
    /// Returns `None` for [`Input::Empty`]; every other variant yields a
    /// record with a human-readable message.
    pub fn into_record(self) -> Option<ErrorRecord> {
        match self {
            Self::Empty => None,
            Self::PreBuilt(record) => Some(record),
            Self::Typed(error) => Some(ErrorRecord::from_boxed_error(error)),
            Self::Text(text) => Some(ErrorRecord::new(text)),
            other @ Self::Other { .. } => Some(ErrorRecord::new(other.describe())),
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::PreBuilt(record) => f.debug_tuple("PreBuilt").field(record).finish(),
            Self::Typed(error) => f.debug_tuple("Typed").field(error).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Other {
                type_name,
                rendering,
            } => f
                .debug_struct("Other")
                .field("type_name", type_name)
                .field("rendering", rendering)
                .finish(),
        }
    }
}

/// Conversion into an [`Input`].
///
/// Empty strings and `None` convert to [`Input::Empty`], which the reporter
/// treats as "nothing to report".
pub trait IntoInput {
    /// Performs the conversion.
    fn into_input(self) -> Input;
}

impl IntoInput for Input {
    #[inline(always)]
    fn into_input(self) -> Input {
        self
    }
}

impl IntoInput for ErrorRecord {
    #[inline(always)]
    fn into_input(self) -> Input {
        Input::PreBuilt(self)
    }
}

impl IntoInput for BoxError {
    #[inline(always)]
    fn into_input(self) -> Input {
        Input::Typed(self)
    }
}

impl IntoInput for String {
    fn into_input(self) -> Input {
        if self.is_empty() {
            Input::Empty
        } else {
            Input::Text(self)
        }
    }
}

impl IntoInput for &str {
    fn into_input(self) -> Input {
        self.to_string().into_input()
    }
}

impl IntoInput for &String {
    fn into_input(self) -> Input {
        self.as_str().into_input()
    }
}

impl IntoInput for Box<str> {
    fn into_input(self) -> Input {
        String::from(self).into_input()
    }
}

impl IntoInput for Cow<'_, str> {
    fn into_input(self) -> Input {
        self.into_owned().into_input()
    }
}

impl<T: IntoInput> IntoInput for Option<T> {
    fn into_input(self) -> Input {
        match self {
            Some(value) => value.into_input(),
            None => Input::Empty,
        }
    }
}

macro_rules! impl_into_input_for_errors {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoInput for $ty {
                #[inline(always)]
                fn into_input(self) -> Input {
                    Input::error(self)
                }
            }
        )*
    };
}

impl_into_input_for_errors!(
    std::io::Error,
    core::fmt::Error,
    core::num::ParseIntError,
    core::num::ParseFloatError,
    core::num::TryFromIntError,
    core::str::Utf8Error,
    core::str::ParseBoolError,
    alloc::string::FromUtf8Error,
    core::net::AddrParseError,
    std::time::SystemTimeError,
    crate::record::MessageError,
);
