//! Field validation for send requests.
//!
//! All fields are checked before anything is charged, and every violation
//! is reported together in the error `details` as
//! `[{ "field": ..., "message": ..., "value"?: ... }]`.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;

use crate::domain::ports::SubmitTextRequest;
use crate::domain::{
    Error, MessageBody, MessageValidationError, PhoneNumber,
    PhoneValidationError, SendTier,
};

pub(super) const VALIDATION_FAILED: &str = "Validation failed";
const KEY_NOT_TEXT: &str = "API key must be a string";
const MESSAGE_NOT_TEXT: &str = "Message must be a string";

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ValidSubmission {
    pub phone: PhoneNumber,
    pub body: MessageBody,
    pub tier: SendTier,
}

#[derive(Debug, Serialize)]
struct FieldViolation<'a> {
    field: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a Value>,
}

impl<'a> FieldViolation<'a> {
    fn new(field: &'static str, message: impl ToString, value: Option<&'a Value>) -> Self {
        Self {
            field,
            message: message.to_string(),
            value,
        }
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        _ => None,
    }
}

fn check_phone(raw: Option<&Value>) -> Result<PhoneNumber, FieldViolation<'_>> {
    let Some(value) = present(raw) else {
        return Err(FieldViolation::new(
            "phone",
            PhoneValidationError::Missing,
            None,
        ));
    };
    let Some(text) = as_text(value) else {
        return Err(FieldViolation::new(
            "phone",
            PhoneValidationError::InvalidFormat,
            Some(value),
        ));
    };
    PhoneNumber::parse(&text).map_err(|err| FieldViolation::new("phone", err, Some(value)))
}

fn check_message(raw: Option<&Value>) -> Result<MessageBody, FieldViolation<'_>> {
    let Some(value) = present(raw) else {
        return Err(FieldViolation::new(
            "message",
            MessageValidationError::Missing,
            None,
        ));
    };
    let Some(text) = as_text(value) else {
        return Err(FieldViolation::new("message", MESSAGE_NOT_TEXT, Some(value)));
    };
    MessageBody::new(text.into_owned()).map_err(|err| {
        // Long bodies are not echoed back.
        let echoed = matches!(err, MessageValidationError::Missing).then_some(value);
        FieldViolation::new("message", err, echoed)
    })
}

fn check_key<'a>(
    raw: Option<&'a Value>,
    free_tier_key: &str,
) -> Result<SendTier, FieldViolation<'a>> {
    match present(raw) {
        None => Ok(SendTier::Free),
        Some(Value::String(key)) => Ok(SendTier::from_key(Some(key), free_tier_key)),
        Some(other) => Err(FieldViolation::new("key", KEY_NOT_TEXT, Some(other))),
    }
}

/// Validate every field of `request`, collecting all violations.
pub(super) fn validate(
    request: &SubmitTextRequest,
    free_tier_key: &str,
) -> Result<ValidSubmission, Error> {
    let phone = check_phone(request.phone.as_ref());
    let body = check_message(request.message.as_ref());
    let tier = check_key(request.key.as_ref(), free_tier_key);

    match (phone, body, tier) {
        (Ok(phone), Ok(body), Ok(tier)) => Ok(ValidSubmission { phone, body, tier }),
        (phone, body, tier) => {
            let violations: Vec<FieldViolation<'_>> = [phone.err(), body.err(), tier.err()]
                .into_iter()
                .flatten()
                .collect();
            let details = serde_json::to_value(&violations)
                .map_err(|err| Error::internal(format!("failed to encode violations: {err}")))?;
            Err(Error::invalid_request(VALIDATION_FAILED).with_details(details))
        }
    }
}
