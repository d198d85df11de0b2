//! Free-tier quota lookup.

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use super::client_identity::ClientAddress;
use super::schemas::ErrorEnvelopeSchema;
use super::state::HttpState;
use super::{ApiResult, wire_timestamp};
use crate::domain::ports::QuotaSnapshot;

/// `GET /quota` response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotaBody {
    pub success: bool,
    /// Free-tier sends left in the current window.
    #[schema(example = 1)]
    pub quota_remaining: u32,
    /// When the window resets (RFC 3339, UTC).
    #[schema(example = "2026-01-02T00:00:00.000Z")]
    pub reset_time: String,
}

impl From<QuotaSnapshot> for QuotaBody {
    fn from(value: QuotaSnapshot) -> Self {
        Self {
            success: true,
            quota_remaining: value.remaining,
            reset_time: wire_timestamp(value.reset_at),
        }
    }
}

/// Report the caller's free-tier allowance without consuming it.
#[utoipa::path(
    get,
    path = "/quota",
    responses(
        (status = 200, description = "Current allowance", body = QuotaBody),
        (status = 500, description = "Internal server error", body = ErrorEnvelopeSchema)
    ),
    tags = ["texts"],
    operation_id = "getQuota"
)]
#[get("/quota")]
pub async fn get_quota(
    state: web::Data<HttpState>,
    client: ClientAddress,
) -> ApiResult<web::Json<QuotaBody>> {
    let snapshot = state.dispatch.quota(&client.into_inner()).await?;
    Ok(web::Json(snapshot.into()))
}
