//! Domain management endpoints.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::DomainDraft;

use super::error::ApiError;
use super::identity::RequirePrincipal;
use super::state::HttpState;

#[derive(Debug, Deserialize)]
struct DomainRequest {
    name: String,
    color: Option<String>,
}

async fn list(state: web::Data<HttpState>) -> Result<HttpResponse, ApiError> {
    let domains = state.domains.list().await?;
    Ok(HttpResponse::Ok().json(domains))
}

async fn create(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    body: web::Json<DomainRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let draft = DomainDraft::new(body.name, body.color)?;
    let domain = state.domains.create(&principal.0, draft).await?;
    Ok(HttpResponse::Created().json(domain))
}

async fn update(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
    body: web::Json<DomainRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let draft = DomainDraft::new(body.name, body.color)?;
    let domain = state
        .domains
        .update(&principal.0, id.into_inner(), draft)
        .await?;
    Ok(HttpResponse::Ok().json(domain))
}

async fn delete(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    state.domains.delete(&principal.0, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mount the domain routes under `/domains`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/domains")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete)),
    );
}
