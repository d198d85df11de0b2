//! Caller identity used for quotas and rate limits.
//!
//! By default the socket peer address is used. Behind a reverse proxy, set
//! [`ClientIdentityConfig::trust_forwarded`] so `Forwarded` /
//! `X-Forwarded-For` are honoured instead; never enable it on a directly
//! exposed listener, as clients could pick their own identity.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};

use crate::domain::ClientId;

/// How the caller's address is determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientIdentityConfig {
    /// Use proxy headers rather than the socket peer.
    pub trust_forwarded: bool,
}

fn strip_port(raw: &str) -> String {
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    if let Ok(ip) = raw.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        return ip.to_string();
    }
    raw.to_owned()
}

/// Resolve the [`ClientId`] for `req`.
///
/// Requests without a resolvable address share the `unknown` bucket.
pub fn client_id_for(req: &HttpRequest) -> ClientId {
    let config = req
        .app_data::<web::Data<ClientIdentityConfig>>()
        .map(|config| *config.get_ref())
        .unwrap_or_default();

    let raw = if config.trust_forwarded {
        req.connection_info()
            .realip_remote_addr()
            .map(strip_port)
    } else {
        req.peer_addr().map(|addr| addr.ip().to_string())
    };

    raw.and_then(|raw| ClientId::new(raw).ok())
        .unwrap_or_else(ClientId::unknown)
}

/// Extractor yielding the caller's [`ClientId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub ClientId);

impl ClientAddress {
    /// Unwrap the identity.
    pub fn into_inner(self) -> ClientId {
        self.0
    }
}

impl FromRequest for ClientAddress {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(client_id_for(req))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn peer() -> SocketAddr {
        "198.51.100.4:52100".parse().expect("socket addr")
    }

    #[test]
    fn uses_the_peer_ip_by_default() {
        let req = TestRequest::default()
            .peer_addr(peer())
            .insert_header(("X-Forwarded-For", "203.0.113.9"))
            .to_http_request();
        assert_eq!(client_id_for(&req).as_str(), "198.51.100.4");
    }

    #[test]
    fn honours_forwarded_headers_when_trusted() {
        let req = TestRequest::default()
            .peer_addr(peer())
            .app_data(web::Data::new(ClientIdentityConfig {
                trust_forwarded: true,
            }))
            .insert_header(("X-Forwarded-For", "203.0.113.9, 10.0.0.1"))
            .to_http_request();
        assert_eq!(client_id_for(&req).as_str(), "203.0.113.9");
    }

    #[test]
    fn missing_addresses_share_the_unknown_bucket() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(client_id_for(&req), ClientId::unknown());
    }

    #[rstest]
    #[case("192.0.2.1:8080", "192.0.2.1")]
    #[case("[2001:db8::1]:443", "2001:db8::1")]
    #[case("[2001:db8::1]", "2001:db8::1")]
    #[case("192.0.2.1", "192.0.2.1")]
    #[case("proxy.internal", "proxy.internal")]
    fn ports_are_stripped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_port(raw), expected);
    }
}
