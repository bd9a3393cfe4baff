//! Integration with the [`eyre`] 0.6.x error handling library.
//!
//! This module specifically supports `eyre` version 0.6.x. To enable this
//! integration, add the `compat-eyre06` feature flag to your `Cargo.toml`.
//!
//! [`eyre::Report`] converts into [`Input::Typed`], keeping the report so the
//! backend receives its wrapped error chain.
//!
//! ```
//! fn connect() -> eyre::Result<()> {
//!     eyre::bail!("connection refused");
//! }
//!
//! if let Err(report) = connect() {
//!     errortools::capture_error(report);
//! }
//! ```

use crate::input::{Input, IntoInput};

impl IntoInput for eyre::Report {
    #[inline(always)]
    fn into_input(self) -> Input {
        Input::Typed(self.into())
    }
}
