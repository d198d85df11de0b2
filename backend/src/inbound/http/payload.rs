//! Body extractor configuration.
//!
//! JSON and form bodies share one size cap. Extractor failures are turned
//! into domain errors so they render as the usual error envelope.

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, UrlencodedError};
use actix_web::web::{FormConfig, JsonConfig};
use serde_json::json;

use crate::domain::Error;

/// Largest accepted request body, in bytes.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Message for bodies above [`MAX_BODY_BYTES`].
pub const BODY_TOO_LARGE: &str = "Request body too large";
/// Message for bodies that cannot be decoded.
pub const INVALID_BODY: &str = "Invalid request body";

/// JSON extractor limits and error mapping.
pub fn json_config() -> JsonConfig {
    JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req: &HttpRequest| json_error(err).into())
}

/// URL-encoded form extractor limits and error mapping.
pub fn form_config() -> FormConfig {
    FormConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req: &HttpRequest| form_error(err).into())
}

fn json_error(err: JsonPayloadError) -> Error {
    match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            Error::payload_too_large(BODY_TOO_LARGE)
        }
        JsonPayloadError::ContentType => Error::invalid_request(INVALID_BODY).with_details(json!({
            "reason": "expected application/json or application/x-www-form-urlencoded"
        })),
        JsonPayloadError::Deserialize(source) => {
            Error::invalid_request(INVALID_BODY).with_details(json!({ "reason": source.to_string() }))
        }
        other => Error::invalid_request(INVALID_BODY).with_details(json!({ "reason": other.to_string() })),
    }
}

fn form_error(err: UrlencodedError) -> Error {
    match err {
        UrlencodedError::Overflow { .. } => Error::payload_too_large(BODY_TOO_LARGE),
        other => Error::invalid_request(INVALID_BODY).with_details(json!({ "reason": other.to_string() })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case::known_length(JsonPayloadError::OverflowKnownLength { length: MAX_BODY_BYTES + 1, limit: MAX_BODY_BYTES })]
    #[case::streamed(JsonPayloadError::Overflow { limit: MAX_BODY_BYTES })]
    fn oversized_json_maps_to_payload_too_large(#[case] err: JsonPayloadError) {
        let mapped = json_error(err);
        assert_eq!(mapped.code(), ErrorCode::PayloadTooLarge);
        assert_eq!(mapped.message(), BODY_TOO_LARGE);
    }

    #[test]
    fn malformed_json_is_an_invalid_request() {
        let source = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated json");
        let mapped = json_error(JsonPayloadError::Deserialize(source));
        assert_eq!(mapped.code(), ErrorCode::InvalidRequest);
        assert_eq!(mapped.message(), INVALID_BODY);
        assert!(mapped.details().is_some());
    }

    #[test]
    fn oversized_forms_map_to_payload_too_large() {
        let mapped = form_error(UrlencodedError::Overflow {
            size: MAX_BODY_BYTES + 1,
            limit: MAX_BODY_BYTES,
        });
        assert_eq!(mapped.code(), ErrorCode::PayloadTooLarge);
    }
}
