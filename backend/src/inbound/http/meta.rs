//! Service banner, region list and the fallback for unknown routes.

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use super::ApiResult;
use crate::domain::Error;

/// Message returned for routes that do not exist.
pub const ENDPOINT_NOT_FOUND: &str = "Endpoint not found";

/// Regions reported by `GET /regions`.
pub const SUPPORTED_REGIONS: [&str; 3] = ["us", "canada", "intl"];

/// Route summary embedded in the banner.
#[derive(Debug, Serialize, ToSchema)]
pub struct EndpointIndex {
    #[schema(example = "POST /text")]
    pub send: &'static str,
    #[schema(example = "GET /status/:textId")]
    pub status: &'static str,
    #[schema(example = "GET /quota")]
    pub quota: &'static str,
    #[schema(example = "GET /regions")]
    pub regions: &'static str,
}

/// `GET /` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct BannerBody {
    pub success: bool,
    #[schema(example = "SMS gateway API server is running")]
    pub message: &'static str,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    pub endpoints: EndpointIndex,
}

impl Default for BannerBody {
    fn default() -> Self {
        Self {
            success: true,
            message: "SMS gateway API server is running",
            version: env!("CARGO_PKG_VERSION"),
            endpoints: EndpointIndex {
                send: "POST /text",
                status: "GET /status/:textId",
                quota: "GET /quota",
                regions: "GET /regions",
            },
        }
    }
}

/// Describe the service and its endpoints.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = BannerBody)),
    tags = ["meta"],
    operation_id = "banner"
)]
#[get("/")]
pub async fn banner() -> web::Json<BannerBody> {
    web::Json(BannerBody::default())
}

/// List supported regions.
#[utoipa::path(
    get,
    path = "/regions",
    responses((status = 200, description = "Supported regions", body = [String], example = json!(["us", "canada", "intl"]))),
    tags = ["meta"],
    operation_id = "regions"
)]
#[get("/regions")]
pub async fn regions() -> HttpResponse {
    HttpResponse::Ok().json(SUPPORTED_REGIONS)
}

/// Default service answering every unmatched route.
pub async fn endpoint_not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found(ENDPOINT_NOT_FOUND))
}
