//! Per-client request rate limiting.
//!
//! Every request is counted against the caller's fixed window in the
//! [`CounterScope::Requests`] scope. Over the limit, the request is answered
//! with a 429 envelope without reaching the handler.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::{Error, ResponseError};
use chrono::{DateTime, Utc};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{AcquireOutcome, WindowCounterStore};
use crate::domain::{CounterKey, CounterScope, Error as DomainError, WindowPolicy};
use crate::inbound::http::client_identity::client_id_for;

/// Message returned once a client exceeds the request limit.
pub const REQUEST_RATE_LIMITED: &str = "Too many requests from this IP, please try again later.";

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Middleware factory limiting requests per client.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use mockable::DefaultClock;
/// use smsgate::domain::WindowPolicy;
/// use smsgate::middleware::RequestRateLimit;
/// use smsgate::outbound::memory::InMemoryWindowCounterStore;
///
/// let limiter = RequestRateLimit::new(
///     Arc::new(InMemoryWindowCounterStore::new()),
///     Arc::new(DefaultClock),
///     WindowPolicy::new(100, chrono::TimeDelta::minutes(15)).expect("policy"),
/// );
/// let _app = App::new().wrap(limiter);
/// ```
#[derive(Clone)]
pub struct RequestRateLimit {
    counters: Arc<dyn WindowCounterStore>,
    clock: Arc<dyn Clock>,
    policy: WindowPolicy,
}

impl RequestRateLimit {
    /// Limit each client to `policy` requests per window.
    pub fn new(
        counters: Arc<dyn WindowCounterStore>,
        clock: Arc<dyn Clock>,
        policy: WindowPolicy,
    ) -> Self {
        Self {
            counters,
            clock,
            policy,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestRateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestRateLimitMiddleware {
            service: Rc::new(service),
            limiter: self.clone(),
        }))
    }
}

/// Service wrapper produced by [`RequestRateLimit`].
pub struct RequestRateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: RequestRateLimit,
}

fn set_header(headers: &mut header::HeaderMap, name: HeaderName, value: impl ToString) {
    if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(name, value);
    }
}

fn retry_after_seconds(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (reset_at - now).num_seconds().max(1)
}

impl<S, B> Service<ServiceRequest> for RequestRateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();
        Box::pin(async move {
            let key = CounterKey::new(CounterScope::Requests, client_id_for(req.request()));
            let now = limiter.clock.utc();
            let outcome = match limiter.counters.try_acquire(&key, &limiter.policy, now).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(%error, "request counter unavailable; skipping rate limit");
                    return service.call(req).await.map(ServiceResponse::map_into_left_body);
                }
            };

            let remaining = outcome.usage().remaining(&limiter.policy);
            match outcome {
                AcquireOutcome::Granted(_) => {
                    let mut res = service.call(req).await?;
                    let headers = res.headers_mut();
                    set_header(headers, HeaderName::from_static(LIMIT_HEADER), limiter.policy.limit());
                    set_header(headers, HeaderName::from_static(REMAINING_HEADER), remaining);
                    Ok(res.map_into_left_body())
                }
                AcquireOutcome::Exhausted(usage) => {
                    info!(
                        client = %key.client.log_label(),
                        reset_at = %usage.reset_at,
                        "request rate limit reached"
                    );
                    let mut response = DomainError::rate_limited(REQUEST_RATE_LIMITED).error_response();
                    let headers = response.headers_mut();
                    set_header(headers, HeaderName::from_static(LIMIT_HEADER), limiter.policy.limit());
                    set_header(headers, HeaderName::from_static(REMAINING_HEADER), 0);
                    set_header(
                        headers,
                        header::RETRY_AFTER,
                        retry_after_seconds(usage.reset_at, now),
                    );
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
