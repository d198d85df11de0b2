//! SMS dispatch service library.
//!
//! - [`domain`]: value types, ports and the dispatch service.
//! - [`inbound`]: the HTTP adapter.
//! - [`outbound`]: in-memory stores and SMS provider adapters.
//! - [`middleware`]: trace identifiers, request limits, security headers.
//! - [`app`]: assembly of the Actix application.

pub mod app;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
