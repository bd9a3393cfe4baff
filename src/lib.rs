#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Enrich errors with request, response and process-wide context, then report
//! them to an error tracker.
//!
//! ## Overview
//!
//! This crate turns whatever a program has at hand when something goes wrong
//! (an error value, a message, a record built earlier) into an
//! [`ErrorRecord`], merges in the process-wide context, sends it to a
//! [`Backend`] such as Sentry, and prints it. Fatal reports then terminate the
//! process.
//!
//! ## Quick Example
//!
//! ```
//! use errortools::{ErrorRecord, ResponseSnapshot};
//!
//! errortools::set_context("env", "staging");
//!
//! errortools::capture_info("worker started");
//!
//! let mut record = ErrorRecord::new("inventory sync failed");
//! record.set_response(ResponseSnapshot::new(503, "Service Unavailable"));
//! record.set_extra("warehouse", "ams-2");
//! errortools::capture_error(record);
//!
//! errortools::capture_errorf!("{} items left unsynced", 12);
//! assert_eq!(errortools::count(), 2);
//! ```
//!
//! ## Core Concepts
//!
//! - A **record** is the enriched form of one error: a message plus optional
//!   HTTP request and response snapshots, free-form **extras**, a grouping
//!   **fingerprint** and an exception type override. See [`record`].
//! - The **context** is a set of key/value pairs attached to every report made
//!   by a reporter, no matter where in the program the report comes from. See
//!   [`ContextStore`].
//! - The **severity** of a report decides what happens locally: info and
//!   warning reports are printed, error reports are printed and counted, and
//!   fatal reports are printed before the process exits.
//! - The **backend** is the external error tracker. The core crate only knows
//!   the [`Backend`] trait; the `errortools-sentry` crate connects it to
//!   Sentry.
//!
//! Any value implementing [`IntoInput`] can be reported. For values that do
//! not, the [`input!`] macro classifies them by what they can do: errors keep
//! their type, everything else is rendered with `Debug` together with its type
//! name.
//!
//! ## Process-wide and local reporters
//!
//! The free functions in this crate all go through one process-wide
//! [`Reporter`], see [`global`](mod@global). Reporters can also be created and
//! used directly, which is mostly useful in tests:
//!
//! ```
//! use std::sync::Arc;
//!
//! use errortools::{NoopBackend, Reporter};
//!
//! let reporter = Reporter::builder().backend(Arc::new(NoopBackend)).build();
//! reporter.set_modify_message_function(|message| format!("[billing] {message}"));
//! reporter.capture_warning("invoice total is zero");
//! ```
//!
//! ## Feature flags
//!
//! - `http` - conversions from [`http`](https://docs.rs/http) requests and
//!   responses into [`RequestSnapshot`] and [`ResponseSnapshot`], see
//!   [`compat`]
//! - `compat-anyhow1`, `compat-eyre06` - report `anyhow` and `eyre` errors, see
//!   [`compat`]

extern crate alloc;

#[macro_use]
mod macros;

pub mod backend;
pub mod compat;
pub mod console;
pub mod context;
pub mod global;
pub mod input;
pub mod record;
pub mod reporter;
pub mod transform;

mod result_ext;

pub use self::{
    backend::{Backend, NoopBackend, Severity},
    console::{Console, StdConsole},
    context::ContextStore,
    global::{
        ReporterAlreadyInstalledError, capture_error, capture_fatal, capture_info,
        capture_warning, count, global, remove_context, remove_modify_message_function,
        remove_tag, report, reset_count, set_context, set_modify_message_function, set_tag,
    },
    input::{Input, IntoInput},
    record::{
        BoxError, ErrorRecord, KEY_EXCEPTION_TYPE, MessageError, RequestSnapshot,
        ResponseSnapshot,
    },
    reporter::{Delivery, Reporter, ReporterBuilder},
    result_ext::ResultExt,
};

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    use alloc::fmt;

    #[doc(hidden)]
    pub use std::{format, format_args};

    use crate::record::ErrorRecord;

    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub fn format_record(args: fmt::Arguments<'_>) -> ErrorRecord {
        if let Some(message) = args.as_str() {
            ErrorRecord::new(message)
        } else {
            ErrorRecord::new(fmt::format(args))
        }
    }

    #[doc(hidden)]
    pub mod kind {
        use core::fmt;

        use crate::input::{Input, IntoInput};

        #[doc(hidden)]
        pub struct Wrap<'a, T>(pub &'a T);

        #[doc(hidden)]
        #[derive(Copy, Clone)]
        pub struct IntoInputTag;

        #[doc(hidden)]
        #[derive(Copy, Clone)]
        pub struct ErrorTag;

        #[doc(hidden)]
        #[derive(Copy, Clone)]
        pub struct DebugTag;

        #[doc(hidden)]
        pub trait IntoInputKind {
            #[inline(always)]
            fn tag(&self) -> IntoInputTag {
                IntoInputTag
            }
        }

        impl<T> IntoInputKind for &&Wrap<'_, T> where T: IntoInput {}

        #[doc(hidden)]
        pub trait ErrorKind {
            #[inline(always)]
            fn tag(&self) -> ErrorTag {
                ErrorTag
            }
        }

        impl<T> ErrorKind for &Wrap<'_, T> where T: core::error::Error + Send + Sync + 'static {}

        #[doc(hidden)]
        pub trait DebugKind {
            #[inline(always)]
            fn tag(&self) -> DebugTag {
                DebugTag
            }
        }

        impl<T> DebugKind for Wrap<'_, T> where T: fmt::Debug {}

        impl IntoInputTag {
            #[doc(hidden)]
            #[inline(always)]
            pub fn classify<T: IntoInput>(self, value: T) -> Input {
                value.into_input()
            }
        }

        impl ErrorTag {
            #[doc(hidden)]
            #[inline(always)]
            pub fn classify<T>(self, value: T) -> Input
            where
                T: core::error::Error + Send + Sync + 'static,
            {
                Input::error(value)
            }
        }

        impl DebugTag {
            #[doc(hidden)]
            #[inline(always)]
            pub fn classify<T: fmt::Debug>(self, value: T) -> Input {
                Input::other(&value)
            }
        }
    }
}
