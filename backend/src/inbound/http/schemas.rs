//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror the wire shape the HTTP adapter produces for them.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The message or route does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request body exceeds the size limit.
    #[schema(rename = "payload_too_large")]
    PayloadTooLarge,
    /// Too many requests in the current window.
    #[schema(rename = "rate_limited")]
    RateLimited,
    /// The free-tier quota is used up.
    #[schema(rename = "quota_exceeded")]
    QuotaExceeded,
    /// The SMS provider refused the message.
    #[schema(rename = "provider_failure")]
    ProviderFailure,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error envelope returned by every failing endpoint.
#[derive(ToSchema)]
#[schema(as = ErrorEnvelope, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorEnvelopeSchema {
    /// Always `false`.
    #[schema(example = false)]
    success: bool,
    /// Human-readable message.
    #[schema(example = "Validation failed")]
    error: String,
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Per-field violations, or the provider's error text.
    details: Option<serde_json::Value>,
    /// Message the failure relates to, for provider failures.
    #[schema(example = "a1b2c3d4e5f6g7h8")]
    text_id: Option<String>,
    /// Zero when the free quota is exhausted.
    #[schema(example = 0)]
    quota_remaining: Option<u32>,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
}
