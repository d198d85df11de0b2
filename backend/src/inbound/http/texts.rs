//! Text message handlers.
//!
//! ```text
//! POST /text {"phone":"5551234567","message":"Hello","key":"textbelt"}
//! GET /status/{textId}
//! ```
//!
//! `POST /text` also accepts `application/x-www-form-urlencoded` bodies; a
//! route guard picks the form handler for those.

use actix_web::guard::GuardContext;
use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use utoipa::ToSchema;

use super::client_identity::ClientAddress;
use super::schemas::ErrorEnvelopeSchema;
use super::state::HttpState;
use super::{ApiResult, wire_timestamp};
use crate::domain::MessageStatus;
use crate::domain::ports::{QuotaRemaining, SubmitTextRequest, SubmitTextResponse, TextStatusResponse};

/// Note attached to simulated sends.
pub const DEMO_MODE_NOTE: &str = "Demo mode - SMS simulated successfully. To send real SMS, set \
     TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM_NUMBER and restart the server.";

/// JSON request body for `POST /text`.
///
/// Fields are kept as raw JSON so the dispatch service can report missing
/// or mistyped values per field.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SendTextRequest {
    /// Destination number; digits with optional `+`, spaces, dashes or parentheses.
    #[schema(value_type = Option<String>, example = "5551234567")]
    pub phone: Option<Value>,
    /// Message body, 1 to 1600 characters.
    #[schema(value_type = Option<String>, example = "Hello")]
    pub message: Option<Value>,
    /// API key; omit or send `textbelt` for the free tier.
    #[schema(value_type = Option<String>, example = "textbelt")]
    pub key: Option<Value>,
}

/// Form request body for `POST /text`.
#[derive(Debug, Default, Deserialize)]
pub struct SendTextForm {
    pub phone: Option<String>,
    pub message: Option<String>,
    pub key: Option<String>,
}

/// Remaining allowance as a count, or `"unlimited"` for keyed callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaRemainingBody(pub QuotaRemaining);

impl Serialize for QuotaRemainingBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            QuotaRemaining::Limited(remaining) => serializer.serialize_u32(remaining),
            QuotaRemaining::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

/// Successful `POST /text` response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendTextResponse {
    pub success: bool,
    #[schema(example = "a1b2c3d4e5f6g7h8")]
    pub text_id: String,
    /// Sends left today, or `"unlimited"`.
    #[schema(value_type = Object, example = 0)]
    pub quota_remaining: QuotaRemainingBody,
    /// Present when delivery was simulated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<SubmitTextResponse> for SendTextResponse {
    fn from(value: SubmitTextResponse) -> Self {
        Self {
            success: true,
            text_id: value.text_id.into(),
            quota_remaining: QuotaRemainingBody(value.quota_remaining),
            note: value.simulated.then(|| DEMO_MODE_NOTE.to_owned()),
        }
    }
}

/// `GET /status/{textId}` response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextStatusBody {
    pub success: bool,
    #[schema(example = "a1b2c3d4e5f6g7h8")]
    pub text_id: String,
    #[schema(value_type = String, example = "pending")]
    pub status: MessageStatus,
    /// When the message was accepted (RFC 3339, UTC).
    #[schema(example = "2026-01-01T00:00:00.000Z")]
    pub timestamp: String,
}

impl From<TextStatusResponse> for TextStatusBody {
    fn from(value: TextStatusResponse) -> Self {
        Self {
            success: true,
            text_id: value.text_id.into(),
            status: value.status,
            timestamp: wire_timestamp(value.timestamp),
        }
    }
}

/// Route guard matching URL-encoded form bodies.
pub fn is_form(ctx: &GuardContext<'_>) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

async fn submit(state: &HttpState, request: SubmitTextRequest) -> ApiResult<HttpResponse> {
    let response = state.dispatch.submit(request).await?;
    Ok(HttpResponse::Ok().json(SendTextResponse::from(response)))
}

/// Send a text message.
///
/// Free-tier callers share a daily quota; every caller is also held to an
/// hourly send limit whatever the key.
#[utoipa::path(
    post,
    path = "/text",
    request_body = SendTextRequest,
    responses(
        (status = 200, description = "Message accepted", body = SendTextResponse),
        (status = 400, description = "Validation or provider failure", body = ErrorEnvelopeSchema),
        (status = 413, description = "Request body too large", body = ErrorEnvelopeSchema),
        (status = 429, description = "Quota or rate limit exceeded", body = ErrorEnvelopeSchema),
        (status = 500, description = "Internal server error", body = ErrorEnvelopeSchema)
    ),
    tags = ["texts"],
    operation_id = "sendText"
)]
#[post("/text")]
pub async fn send_text(
    state: web::Data<HttpState>,
    client: ClientAddress,
    payload: web::Json<SendTextRequest>,
) -> ApiResult<HttpResponse> {
    let SendTextRequest {
        phone,
        message,
        key,
    } = payload.into_inner();
    let request = SubmitTextRequest {
        phone,
        message,
        key,
        client: client.into_inner(),
    };
    submit(&state, request).await
}

/// Form-encoded variant of [`send_text`].
#[post("/text", guard = "is_form")]
pub async fn send_text_form(
    state: web::Data<HttpState>,
    client: ClientAddress,
    form: web::Form<SendTextForm>,
) -> ApiResult<HttpResponse> {
    let SendTextForm {
        phone,
        message,
        key,
    } = form.into_inner();
    let request = SubmitTextRequest::from_text(phone, message, key, client.into_inner());
    submit(&state, request).await
}

/// Look up the delivery status of a message.
#[utoipa::path(
    get,
    path = "/status/{textId}",
    params(("textId" = String, Path, description = "Identifier returned by POST /text")),
    responses(
        (status = 200, description = "Message status", body = TextStatusBody),
        (status = 404, description = "Message not found", body = ErrorEnvelopeSchema),
        (status = 500, description = "Internal server error", body = ErrorEnvelopeSchema)
    ),
    tags = ["texts"],
    operation_id = "textStatus"
)]
#[get("/status/{textId}")]
pub async fn text_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TextStatusBody>> {
    let status = state.dispatch.status(&path.into_inner()).await?;
    Ok(web::Json(status.into()))
}

#[cfg(test)]
#[path = "texts_tests.rs"]
mod tests;
