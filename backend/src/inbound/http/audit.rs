//! Audit trail endpoint.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::error::ApiError;
use super::identity::RequirePrincipal;
use super::state::HttpState;

#[derive(Debug, Deserialize)]
struct AuditQuery {
    limit: Option<i64>,
}

async fn list_recent(
    state: web::Data<HttpState>,
    principal: RequirePrincipal,
    query: web::Query<AuditQuery>,
) -> Result<HttpResponse, ApiError> {
    let entries = state.audit.list_recent(&principal.0, query.limit).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Mount the audit route under `/audit`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/audit", web::get().to(list_recent));
}
