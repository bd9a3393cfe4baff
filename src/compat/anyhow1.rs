//! Integration with the [`anyhow`] 1.x error handling library.
//!
//! This module specifically supports `anyhow` version 1.x. To enable this
//! integration, add the `compat-anyhow1` feature flag to your `Cargo.toml`.
//!
//! [`anyhow::Error`] converts into [`Input::Typed`], so the reported message
//! is the error's top-level `Display` rendering and the backend receives the
//! error together with its context chain.
//!
//! ```
//! use anyhow::Context;
//!
//! fn read_settings() -> anyhow::Result<String> {
//!     std::fs::read_to_string("/nonexistent/settings.toml").context("failed to read settings")
//! }
//!
//! if let Err(error) = read_settings() {
//!     errortools::capture_warning(error);
//! }
//! ```

use crate::input::{Input, IntoInput};

impl IntoInput for anyhow::Error {
    #[inline(always)]
    fn into_input(self) -> Input {
        Input::Typed(self.into())
    }
}
