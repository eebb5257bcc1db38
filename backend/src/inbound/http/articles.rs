//! Article endpoints: public reads, authoring, and lifecycle actions.
//!
//! Literal segments (`/admin`, `/contributor`, ...) are registered before
//! the `/{id}` routes so they are never captured as ids.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::ports::PublicArticleFilter;
use crate::domain::{ArticleDraft, ArticleEdit, DomainError};

use super::error::ApiError;
use super::identity::{ClientInfo, RequirePrincipal};
use super::state::HttpState;

#[derive(Debug, Deserialize)]
struct PublicQuery {
    domain: Option<i32>,
    q: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CreateArticleRequest {
    title: String,
    content: String,
    domain_id: Option<i32>,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct UpdateArticleRequest {
    title: Option<String>,
    content: Option<String>,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GrantEditRequest {
    email: String,
}

async fn list_public(
    state: web::Data<HttpState>,
    query: web::Query<PublicQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let articles = state
        .articles
        .list_public(PublicArticleFilter {
            domain_id: query.domain,
            query: query.q,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(HttpResponse::Ok().json(articles))
}

async fn get_public(
    state: web::Data<HttpState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let article = state.articles.get_public(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(article))
}

async fn list_admin(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
) -> Result<HttpResponse, ApiError> {
    let articles = state.articles.list_admin(&principal.0).await?;
    Ok(HttpResponse::Ok().json(articles))
}

async fn list_own(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
) -> Result<HttpResponse, ApiError> {
    let articles = state.articles.list_own(&principal.0).await?;
    Ok(HttpResponse::Ok().json(articles))
}

async fn list_archived(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
) -> Result<HttpResponse, ApiError> {
    let articles = state.articles.list_archived(&principal.0).await?;
    Ok(HttpResponse::Ok().json(articles))
}

async fn list_pending(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
) -> Result<HttpResponse, ApiError> {
    let articles = state.articles.list_pending(&principal.0).await?;
    Ok(HttpResponse::Ok().json(articles))
}

async fn create(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    body: web::Json<CreateArticleRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let draft = ArticleDraft::new(body.title, body.content)?;
    let article = state
        .articles
        .create(&principal.0, draft, body.domain_id, body.date)
        .await?;
    Ok(HttpResponse::Created().json(article))
}

async fn update(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
    body: web::Json<UpdateArticleRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let edit = ArticleEdit {
        title: body.title,
        content: body.content,
        date: body.date,
    };
    let article = state
        .articles
        .update(&principal.0, id.into_inner(), edit)
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

async fn delete(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    state.articles.delete(&principal.0, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn toggle_archive(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let article = state
        .articles
        .toggle_archive(&principal.0, id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

async fn validate(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let article = state.articles.validate(&principal.0, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(article))
}

async fn reject(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let article = state.articles.reject(&principal.0, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(article))
}

async fn like(
    state: web::Data<HttpState>,
    id: web::Path<i32>,
    client: ClientInfo,
) -> Result<HttpResponse, ApiError> {
    let ip = client
        .0
        .ip_address
        .ok_or_else(|| DomainError::invalid_request("client address unavailable"))?;
    let likes_count = state.articles.like(id.into_inner(), &ip).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "likes_count": likes_count })))
}

async fn grant_edit(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
    body: web::Json<GrantEditRequest>,
) -> Result<HttpResponse, ApiError> {
    let article = state
        .articles
        .grant_edit(&principal.0, id.into_inner(), &body.email)
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

/// Mount the article routes under `/news`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/news")
            .route("", web::get().to(list_public))
            .route("", web::post().to(create))
            .route("/admin", web::get().to(list_admin))
            .route("/contributor", web::get().to(list_own))
            .route("/archived", web::get().to(list_archived))
            .route("/pending-validation", web::get().to(list_pending))
            .route("/{id}", web::get().to(get_public))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete))
            .route("/{id}/toggle-archive", web::post().to(toggle_archive))
            .route("/{id}/validate", web::post().to(validate))
            .route("/{id}/reject", web::post().to(reject))
            .route("/{id}/like", web::post().to(like))
            .route("/{id}/grant-edit", web::post().to(grant_edit)),
    );
}
