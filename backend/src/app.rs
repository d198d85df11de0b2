//! Actix application assembly.
//!
//! Shared by the server binary and the integration tests so both exercise
//! the same routes and middleware stack.

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::client_identity::ClientIdentityConfig;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::meta::endpoint_not_found;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::configure;
use crate::middleware::{RequestRateLimit, Trace, security_headers};

/// Everything a worker needs to build its [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub identity: ClientIdentityConfig,
    pub request_limit: RequestRateLimit,
}

/// Build the application with routes and the middleware stack.
///
/// Middleware runs outermost first: trace id, CORS, security headers, then
/// the request limiter. Health probes bypass the limiter.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        identity,
        request_limit,
    } = deps;

    // Probes sit outside the limited scope; the catch-all scope must come last.
    let api = web::scope("").configure(configure);

    #[cfg(debug_assertions)]
    let api = api.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let api = api
        .default_service(web::to(endpoint_not_found))
        .wrap(request_limit);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::Data::new(identity))
        .service(ready)
        .service(live)
        .service(api)
        .wrap(security_headers())
        .wrap(Cors::permissive())
        .wrap(Trace)
}
