//! Session endpoints: login, refresh, logout, and the principal echo.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::auth_service::Session;
use crate::domain::{DomainError, LoginCredentials, Principal, UserAccount};

use super::error::ApiError;
use super::identity::{ClientInfo, RequirePrincipal};
use super::state::{CookiePolicy, HttpState};

const ACCESS_COOKIE: &str = "access_token";
const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    user: UserAccount,
    #[serde(rename = "accessToken")]
    access_token: String,
}

#[derive(Debug, Serialize)]
struct MeResponse {
    user: Principal,
}

fn auth_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

fn session_response(policy: CookiePolicy, session: Session) -> HttpResponse {
    let access = session.tokens.access;
    HttpResponse::Ok()
        .cookie(auth_cookie(
            ACCESS_COOKIE,
            access.clone(),
            policy.access_ttl_secs,
            policy.secure,
        ))
        .cookie(auth_cookie(
            REFRESH_COOKIE,
            session.tokens.refresh,
            policy.refresh_ttl_secs,
            policy.secure,
        ))
        .json(SessionResponse {
            user: session.user,
            access_token: access,
        })
}

async fn login(
    state: web::Data<HttpState>,
    body: web::Json<LoginRequest>,
    client: ClientInfo,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let credentials = LoginCredentials::new(body.email, body.password)?;
    let session = state.auth.login(credentials, &client.0).await?;
    Ok(session_response(state.cookies, session))
}

async fn refresh(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
) -> Result<HttpResponse, ApiError> {
    let token = req
        .cookie(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .or_else(|| body.and_then(|body| body.into_inner().refresh_token))
        .ok_or_else(|| DomainError::unauthorized("refresh token required"))?;
    let session = state.auth.refresh(&token).await?;
    Ok(session_response(state.cookies, session))
}

async fn logout(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    client: ClientInfo,
) -> HttpResponse {
    state.auth.logout(&principal.0, &client.0).await;
    HttpResponse::Ok()
        .cookie(removal_cookie(ACCESS_COOKIE))
        .cookie(removal_cookie(REFRESH_COOKIE))
        .json(serde_json::json!({ "message": "logged out" }))
}

async fn me(principal: RequirePrincipal) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse { user: principal.0 })
}

/// Mount the session routes under `/auth`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me)),
    );
}
