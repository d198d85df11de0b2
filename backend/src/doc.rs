//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the error envelope schema. The generated document backs Swagger UI
//! (debug builds) and `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::inbound::http::meta::{BannerBody, EndpointIndex};
use crate::inbound::http::quota::QuotaBody;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorEnvelopeSchema};
use crate::inbound::http::texts::{SendTextRequest, SendTextResponse, TextStatusBody};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "smsgate API",
        description = "Send SMS messages through a carrier, or simulate delivery when none is configured."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::meta::banner,
        crate::inbound::http::meta::regions,
        crate::inbound::http::texts::send_text,
        crate::inbound::http::texts::text_status,
        crate::inbound::http::quota::get_quota,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        SendTextRequest,
        SendTextResponse,
        TextStatusBody,
        QuotaBody,
        BannerBody,
        EndpointIndex,
        ErrorEnvelopeSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "texts", description = "Sending messages and reading their state"),
        (name = "meta", description = "Service description"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
