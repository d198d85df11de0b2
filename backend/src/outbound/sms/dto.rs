//! Twilio REST payloads.
//!
//! Only the fields the adapter reads are modelled; everything else in the
//! response is ignored.

use serde::Deserialize;

/// Body of a successful `POST .../Messages.json`.
#[derive(Debug, Deserialize)]
pub(super) struct TwilioMessageDto {
    pub(super) sid: String,
}

/// Body of a Twilio error response.
#[derive(Debug, Deserialize)]
pub(super) struct TwilioErrorDto {
    #[serde(default)]
    pub(super) message: Option<String>,
}

impl TwilioErrorDto {
    /// Twilio's own explanation, if it sent one.
    pub(super) fn into_message(self) -> Option<String> {
        self.message.filter(|message| !message.trim().is_empty())
    }
}
