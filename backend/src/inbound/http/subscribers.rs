//! Newsletter subscription endpoints.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::SubscriberDraft;

use super::error::ApiError;
use super::identity::RequirePrincipal;
use super::state::HttpState;

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    email: String,
    name: String,
}

async fn list(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
) -> Result<HttpResponse, ApiError> {
    let subscribers = state.subscribers.list(&principal.0).await?;
    Ok(HttpResponse::Ok().json(subscribers))
}

async fn subscribe(
    state: web::Data<HttpState>,
    body: web::Json<SubscribeRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let draft = SubscriberDraft::new(body.email, body.name)?;
    let subscriber = state.subscribers.subscribe(draft).await?;
    Ok(HttpResponse::Created().json(subscriber))
}

async fn delete(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    state.subscribers.delete(&principal.0, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mount the subscriber routes under `/subscribers`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscribers")
            .route("", web::get().to(list))
            .route("", web::post().to(subscribe))
            .route("/{id}", web::delete().to(delete)),
    );
}
