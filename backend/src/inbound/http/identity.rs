//! Request extractors for the authenticated principal and client metadata.
//!
//! The access token is read from the `access_token` cookie or, failing
//! that, an `Authorization: Bearer` header, then verified against the
//! shared codec. Handlers declare [`RequirePrincipal`] where authentication
//! is mandatory; public routes take no extractor at all.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::domain::{ClientMeta, DomainError, Principal};

use super::error::ApiError;
use super::state::HttpState;

const ACCESS_COOKIE: &str = "access_token";

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

fn access_token(req: &HttpRequest) -> Option<String> {
    req.cookie(ACCESS_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .or_else(|| bearer_token(req))
}

fn verify(req: &HttpRequest) -> Result<Option<Principal>, DomainError> {
    let Some(token) = access_token(req) else {
        return Ok(None);
    };
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| DomainError::internal("application state is not configured"))?;
    let verified = state.tokens.verify_access(&token)?;
    Ok(Some(verified.principal))
}

/// Extractor that rejects unauthenticated requests.
///
/// Expired tokens fail with the distinct `token_expired` code so clients
/// know a refresh may still succeed.
pub struct RequirePrincipal(pub Principal);

impl FromRequest for RequirePrincipal {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match verify(req) {
            Ok(Some(principal)) => Ok(Self(principal)),
            Ok(None) => Err(DomainError::unauthorized("authentication required").into()),
            Err(err) => Err(err.into()),
        };
        ready(result)
    }
}

/// Extractor for best-effort client metadata.
///
/// The address honours the first `X-Forwarded-For` entry when present and
/// falls back to the peer address.
pub struct ClientInfo(pub ClientMeta);

impl FromRequest for ClientInfo {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let ip_address = forwarded.or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()));
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        ready(Ok(Self(ClientMeta {
            ip_address,
            user_agent,
        })))
    }
}
