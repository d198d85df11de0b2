//! HTTP inbound adapter exposing the REST endpoints.

pub mod client_identity;
pub mod error;
pub mod health;
pub mod meta;
pub mod payload;
pub mod quota;
pub mod schemas;
pub mod state;
pub mod texts;

use actix_web::web;
use chrono::{DateTime, SecondsFormat, Utc};

pub use error::ApiResult;

/// Register the API routes and body extractor settings.
///
/// Health probes and the not-found fallback are wired by the caller since
/// they depend on server lifecycle state.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use smsgate::inbound::http::{configure, meta::endpoint_not_found};
///
/// let _app = App::new()
///     .configure(configure)
///     .default_service(web::to(endpoint_not_found));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(payload::json_config())
        .app_data(payload::form_config())
        .service(meta::banner)
        .service(meta::regions)
        // The guarded form route must be registered ahead of the JSON route.
        .service(texts::send_text_form)
        .service(texts::send_text)
        .service(texts::text_status)
        .service(quota::get_quota);
}

/// Millisecond-precision RFC 3339 UTC timestamp, e.g. `2026-01-01T00:00:00.000Z`.
pub(crate) fn wire_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
