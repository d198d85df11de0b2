//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route: trace
//! identifiers, per-client request limits and response hardening headers.

pub mod rate_limit;
pub mod trace;

use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;

pub use rate_limit::{REQUEST_RATE_LIMITED, RequestRateLimit};
pub use trace::Trace;

/// Hardening headers added to every response.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use smsgate::middleware::security_headers;
///
/// let _app = App::new().wrap(security_headers());
/// ```
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::REFERRER_POLICY, "no-referrer"))
        .add((header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"))
}
