//! User administration endpoints.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroizing;

use crate::domain::{Role, UserDraft, UserUpdate};

use super::error::ApiError;
use super::identity::RequirePrincipal;
use super::state::HttpState;

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    username: String,
    email: String,
    password: String,
    role: Role,
    domain_id: Option<i32>,
}

/// Keeps an absent `domain_id` distinct from an explicit `null`, which
/// clears the assignment.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct UpdateUserRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<Role>,
    #[serde(default, deserialize_with = "double_option")]
    domain_id: Option<Option<i32>>,
}

async fn list(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
) -> Result<HttpResponse, ApiError> {
    let users = state.users.list(&principal.0).await?;
    Ok(HttpResponse::Ok().json(users))
}

async fn get(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let user = state.users.get(&principal.0, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

async fn create(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let draft = UserDraft::new(
        body.username,
        body.email,
        body.password,
        body.role,
        body.domain_id,
    )?;
    let user = state.users.create(&principal.0, draft).await?;
    Ok(HttpResponse::Created().json(user))
}

async fn update(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let update = UserUpdate {
        username: body.username,
        email: body.email,
        password: body.password.map(Zeroizing::new),
        role: body.role,
        domain_id: body.domain_id,
    };
    let user = state
        .users
        .update(&principal.0, id.into_inner(), update)
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

async fn delete(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    state.users.delete(&principal.0, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mount the user routes under `/users`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/{id}", web::get().to(get))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete)),
    );
}
