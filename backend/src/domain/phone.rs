//! Destination phone numbers.
//!
//! Acceptance is deliberately loose: after dropping spaces, dashes and
//! parentheses the input must look like an E.164 number with an optional
//! leading `+`. Normalisation then guesses a country code for bare North
//! American numbers. Neither step is a full numbering-plan validator.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures for raw phone input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneValidationError {
    /// No phone number was supplied.
    #[error("Phone number is required")]
    Missing,
    /// The input does not resemble an international number.
    #[error("Invalid phone number format")]
    InvalidFormat,
}

/// Destination number in `+<digits>` form.
///
/// # Examples
/// ```
/// use smsgate::domain::PhoneNumber;
///
/// let phone = PhoneNumber::parse("(555) 123-4567").expect("valid phone");
/// assert_eq!(phone.as_str(), "+15551234567");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        // ASCII classes only; `\d` would also admit non-Latin digits.
        let pattern = r"^\+?[1-9][0-9]{1,14}$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Check raw input against the accepted shape.
///
/// Spaces, dashes and parentheses are ignored; any other punctuation fails.
pub fn is_plausible_phone(raw: &str) -> bool {
    let compact: String = raw
        .chars()
        .filter(|c| !(c.is_whitespace() || matches!(c, '-' | '(' | ')')))
        .collect();
    phone_regex().is_match(&compact)
}

/// Normalise input to a `+`-prefixed digit string.
///
/// Everything except ASCII digits and `+` is removed. Without a leading `+`,
/// ten digits are treated as US/Canada (`+1`), eleven digits starting with
/// `1` get a bare `+`, and anything else is prefixed with `+` verbatim.
///
/// # Examples
/// ```
/// use smsgate::domain::normalize_phone;
///
/// assert_eq!(normalize_phone("555-123-4567"), "+15551234567");
/// assert_eq!(normalize_phone("15551234567"), "+15551234567");
/// assert_eq!(normalize_phone("447911123456"), "+447911123456");
/// assert_eq!(normalize_phone("+44 7911 123456"), "+447911123456");
/// ```
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if digits.starts_with('+') {
        return digits;
    }
    match digits.len() {
        10 => format!("+1{digits}"),
        _ => format!("+{digits}"),
    }
}

impl PhoneNumber {
    /// Validate and normalise raw input.
    pub fn parse(raw: &str) -> Result<Self, PhoneValidationError> {
        if raw.is_empty() {
            return Err(PhoneValidationError::Missing);
        }
        if !is_plausible_phone(raw) {
            return Err(PhoneValidationError::InvalidFormat);
        }
        Ok(Self(normalize_phone(raw)))
    }

    /// Borrow the normalised number.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Number with all but the last four digits hidden, for logs.
    ///
    /// # Examples
    /// ```
    /// use smsgate::domain::PhoneNumber;
    ///
    /// let phone = PhoneNumber::parse("5551234567").expect("valid phone");
    /// assert_eq!(phone.masked(), "+*******4567");
    /// ```
    pub fn masked(&self) -> String {
        let digits = self.0.trim_start_matches('+');
        let visible = digits.len().saturating_sub(4);
        let (hidden, tail) = digits.split_at(visible);
        format!("+{}{tail}", "*".repeat(hidden.len()))
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}
