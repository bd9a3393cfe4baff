//! Reporting errors from other error handling libraries.
//!
//! # Available Integrations
//!
//! - [`anyhow1`] - Report [`anyhow::Error`] values (requires the
//!   `compat-anyhow1` feature flag)
//! - [`eyre06`] - Report [`eyre::Report`] values (requires the
//!   `compat-eyre06` feature flag)
//! - [`http1`] - Snapshot [`http`] 1.x requests and responses (requires the
//!   `http` feature flag)
//!
//! The error integrations implement [`IntoInput`](crate::IntoInput) for the
//! library's error type and keep the error itself, so the backend still sees
//! the full source chain:
//!
//! ```
//! # #[cfg(feature = "compat-anyhow1")] {
//! fn legacy_function() -> anyhow::Result<String> {
//!     anyhow::bail!("something went wrong");
//! }
//!
//! if let Err(error) = legacy_function() {
//!     errortools::capture_error(error);
//! }
//! # }
//! ```
//!
//! [`anyhow::Error`]: https://docs.rs/anyhow/latest/anyhow/struct.Error.html
//! [`eyre::Report`]: https://docs.rs/eyre/latest/eyre/struct.Report.html
//! [`http`]: https://docs.rs/http

#[cfg(feature = "compat-anyhow1")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-anyhow1")))]
pub mod anyhow1;

#[cfg(feature = "compat-eyre06")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-eyre06")))]
pub mod eyre06;

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub mod http1;
