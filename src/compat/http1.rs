//! Snapshots of [`http`] 1.x requests and responses.
//!
//! This module specifically supports `http` version 1.x. To enable this
//! integration, add the `http` feature flag to your `Cargo.toml`.
//!
//! ```
//! use errortools::{ErrorRecord, RequestSnapshot, ResponseSnapshot};
//!
//! let request = http::Request::post("https://api.test/v1/orders")
//!     .body(b"{\"qty\":0}".to_vec())
//!     .unwrap();
//! let response = http::Response::builder()
//!     .status(http::StatusCode::UNPROCESSABLE_ENTITY)
//!     .body(())
//!     .unwrap();
//!
//! let record = ErrorRecord::new("order rejected")
//!     .with_request(RequestSnapshot::from(&request))
//!     .with_response(ResponseSnapshot::from(&response));
//!
//! assert_eq!(record.request().unwrap().method, "POST");
//! assert_eq!(record.response().unwrap().status_code, 422);
//! ```

use crate::record::{RequestSnapshot, ResponseSnapshot};

impl<B: AsRef<[u8]>> From<&http::Request<B>> for RequestSnapshot {
    fn from(request: &http::Request<B>) -> Self {
        let body = request.body().as_ref();
        Self {
            url: request.uri().to_string(),
            method: request.method().to_string(),
            body: (!body.is_empty()).then(|| body.to_vec()),
        }
    }
}

impl From<&http::request::Parts> for RequestSnapshot {
    fn from(parts: &http::request::Parts) -> Self {
        Self::new(parts.uri.to_string(), parts.method.to_string())
    }
}

impl From<http::StatusCode> for ResponseSnapshot {
    fn from(status: http::StatusCode) -> Self {
        Self::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
        )
    }
}

impl<B> From<&http::Response<B>> for ResponseSnapshot {
    fn from(response: &http::Response<B>) -> Self {
        response.status().into()
    }
}
