//! Caller identity and usage tier.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Key that explicitly opts into the free tier.
pub const DEFAULT_FREE_TIER_KEY: &str = "textbelt";

/// Validation errors for [`ClientId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientIdValidationError {
    /// The identifier was empty after trimming.
    #[error("client identifier must not be empty")]
    Empty,
}

/// Identity that quotas and rate limits are keyed on (the caller's IP).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Wrap a client identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, ClientIdValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientIdValidationError::Empty);
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }

    /// Shared bucket for callers whose address could not be determined.
    pub fn unknown() -> Self {
        Self("unknown".to_owned())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Short anonymised label safe for logs.
    ///
    /// The first eight hex characters of the SHA-256 digest: stable for a
    /// given client, not reversible, low cardinality.
    ///
    /// # Examples
    /// ```
    /// use smsgate::domain::ClientId;
    ///
    /// let label = ClientId::new("203.0.113.7").expect("client").log_label();
    /// assert_eq!(label.len(), 8);
    /// assert!(label.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    pub fn log_label(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..4])
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage class derived from the submitted API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendTier {
    /// No key, an empty key, or the reserved free-tier key: quota applies.
    Free,
    /// Any other key: no daily quota.
    Keyed,
}

impl SendTier {
    /// Classify a submitted key.
    ///
    /// Keys are not verified; anything other than the reserved free-tier
    /// key counts as paid.
    ///
    /// # Examples
    /// ```
    /// use smsgate::domain::{SendTier, DEFAULT_FREE_TIER_KEY};
    ///
    /// assert_eq!(SendTier::from_key(None, DEFAULT_FREE_TIER_KEY), SendTier::Free);
    /// assert_eq!(SendTier::from_key(Some("textbelt"), DEFAULT_FREE_TIER_KEY), SendTier::Free);
    /// assert_eq!(SendTier::from_key(Some("acct-42"), DEFAULT_FREE_TIER_KEY), SendTier::Keyed);
    /// ```
    pub fn from_key(key: Option<&str>, free_tier_key: &str) -> Self {
        match key {
            None | Some("") => Self::Free,
            Some(key) if key == free_tier_key => Self::Free,
            Some(_) => Self::Keyed,
        }
    }

    /// Whether the free-tier quota applies.
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_client_ids_are_rejected(#[case] raw: &str) {
        assert_eq!(ClientId::new(raw), Err(ClientIdValidationError::Empty));
    }

    #[test]
    fn client_ids_are_trimmed() {
        let id = ClientId::new(" 198.51.100.4 ").expect("valid client");
        assert_eq!(id.as_str(), "198.51.100.4");
    }

    #[test]
    fn log_labels_are_stable() {
        let first = ClientId::new("::1").expect("valid client").log_label();
        let second = ClientId::new("::1").expect("valid client").log_label();
        assert_eq!(first, second);
    }

    #[rstest]
    #[case(None, SendTier::Free)]
    #[case(Some(""), SendTier::Free)]
    #[case(Some("free-key"), SendTier::Free)]
    #[case(Some("textbelt"), SendTier::Keyed)]
    #[case(Some("paid"), SendTier::Keyed)]
    fn tiers_follow_the_configured_free_key(
        #[case] key: Option<&str>,
        #[case] expected: SendTier,
    ) {
        assert_eq!(SendTier::from_key(key, "free-key"), expected);
    }
}
