//! Tests for domain error construction and trace capture.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("Validation failed")
}

#[rstest]
fn invalid_request_constructor_sets_code(base_error: Error) {
    assert_eq!(base_error.code(), ErrorCode::InvalidRequest);
    assert_eq!(base_error.message(), "Validation failed");
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::NotFound, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_blank_values(base_error: Error) {
    let result = base_error.try_with_trace_id(" ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn trace_id_is_none_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[tokio::test]
async fn trace_id_is_captured_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid uuid");
    let error = TraceId::scope(trace_id, async { Error::rate_limited("slow down") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn provider_failure_carries_text_id_and_reason() {
    let error = Error::provider_failure("k3j2h1g0f9e8", "The 'To' number is not a valid phone number.");
    assert_eq!(error.code(), ErrorCode::ProviderFailure);
    assert_eq!(error.message(), "Failed to send SMS");
    assert_eq!(error.text_id(), Some("k3j2h1g0f9e8"));
    assert_eq!(
        error.details(),
        Some(&json!("The 'To' number is not a valid phone number."))
    );
}

#[rstest]
#[case(ErrorCode::InvalidRequest, "invalid_request")]
#[case(ErrorCode::RateLimited, "rate_limited")]
#[case(ErrorCode::QuotaExceeded, "quota_exceeded")]
#[case(ErrorCode::ProviderFailure, "provider_failure")]
fn error_codes_serialise_as_snake_case(#[case] code: ErrorCode, #[case] expected: &str) {
    let value = serde_json::to_value(code).expect("serialise code");
    assert_eq!(value, json!(expected));
}
