//! Reqwest-backed Twilio adapter.
//!
//! This adapter owns transport details only: form encoding, basic auth,
//! timeout and HTTP error mapping, and decoding the created message `sid`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use super::credentials::{AuthToken, TwilioCredentials};
use super::dto::{TwilioErrorDto, TwilioMessageDto};
use crate::domain::ports::{
    OutboundSms, ProviderMode, ProviderReceipt, SmsProvider, SmsProviderError,
};

/// Production API root.
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com/";

const USER_AGENT: &str = concat!("smsgate/", env!("CARGO_PKG_VERSION"));

/// Failures while building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum TwilioSetupError {
    /// The HTTP client could not be constructed.
    #[error("failed to build Twilio HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// The messages endpoint could not be derived from the base URL.
    #[error("invalid Twilio API base URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Sends messages through `POST /2010-04-01/Accounts/{sid}/Messages.json`.
pub struct TwilioSmsProvider {
    client: Client,
    messages_url: Url,
    account_sid: String,
    auth_token: AuthToken,
    from_number: String,
}

impl TwilioSmsProvider {
    /// Build an adapter against `api_base` with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// endpoint URL cannot be formed.
    pub fn new(
        credentials: TwilioCredentials,
        api_base: &Url,
        timeout: Duration,
    ) -> Result<Self, TwilioSetupError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let messages_url = messages_url(api_base, &credentials.account_sid)?;
        Ok(Self {
            client,
            messages_url,
            account_sid: credentials.account_sid,
            auth_token: credentials.auth_token,
            from_number: credentials.from_number,
        })
    }
}

fn messages_url(api_base: &Url, account_sid: &str) -> Result<Url, url::ParseError> {
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("2010-04-01/Accounts/{account_sid}/Messages.json"))
}

#[async_trait]
impl SmsProvider for TwilioSmsProvider {
    async fn send(&self, sms: &OutboundSms) -> Result<ProviderReceipt, SmsProviderError> {
        let response = self
            .client
            .post(self.messages_url.clone())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose()))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("To", sms.to.as_str()),
                ("From", self.from_number.as_str()),
                ("Body", sms.body.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let reference = parse_sid(body.as_ref())?;
        debug!(to = %sms.to.masked(), %reference, "Twilio accepted message");
        Ok(ProviderReceipt::Delivered { reference })
    }

    fn mode(&self) -> ProviderMode {
        ProviderMode::Live
    }
}

fn parse_sid(body: &[u8]) -> Result<String, SmsProviderError> {
    let created: TwilioMessageDto = serde_json::from_slice(body).map_err(|error| {
        SmsProviderError::transport(format!("invalid Twilio response payload: {error}"))
    })?;
    Ok(created.sid)
}

fn map_transport_error(error: reqwest::Error) -> SmsProviderError {
    if error.is_timeout() {
        SmsProviderError::timeout(error.to_string())
    } else {
        SmsProviderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SmsProviderError {
    let message = serde_json::from_slice::<TwilioErrorDto>(body)
        .ok()
        .and_then(TwilioErrorDto::into_message)
        .unwrap_or_else(|| {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                format!("status {}: {}", status.as_u16(), preview)
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SmsProviderError::misconfigured(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            SmsProviderError::timeout(message)
        }
        _ if status.is_client_error() => SmsProviderError::rejected(message),
        _ => SmsProviderError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
