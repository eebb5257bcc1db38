//! Server construction: adapter assembly and route wiring.

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{
    retention, ArticleService, AuditService, AuthService, CachedReads, DomainService,
    SubscriberService, TokenCodec, UserService,
};
use crate::inbound::http::state::{CookiePolicy, HttpState};
use crate::inbound::http::{articles, audit, auth_routes, domains, health, subscribers, users};
use crate::outbound::cache::RedisCacheStore;
use crate::outbound::persistence::{
    DbPool, DieselArticleRepository, DieselAuditLogRepository, DieselDomainRepository,
    DieselSubscriberRepository, DieselUserRepository, PoolConfig, PoolError,
};

/// Mount every route module under the `/api` prefix.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    auth_routes::configure(cfg);
    articles::configure(cfg);
    domains::configure(cfg);
    users::configure(cfg);
    subscribers::configure(cfg);
    audit::configure(cfg);
    health::configure(cfg);
}

/// Assemble the service graph over live PostgreSQL and Redis adapters.
///
/// # Errors
/// Fails when the database pool cannot be built. An unreachable Redis is
/// tolerated; the read model degrades to always-miss until it recovers.
pub async fn build_state(config: &AppConfig) -> Result<HttpState, PoolError> {
    let pool = DbPool::new(PoolConfig::new(&config.database_url)).await?;
    let reads = match RedisCacheStore::connect(&config.redis_url).await {
        Ok(store) => CachedReads::new(Arc::new(store)),
        Err(err) => {
            // The pool is lazy, so this only fires on malformed URLs.
            return Err(PoolError::Build {
                message: format!("redis pool: {err}"),
            });
        }
    };

    let articles = Arc::new(DieselArticleRepository::new(pool.clone()));
    let user_repo = Arc::new(DieselUserRepository::new(pool.clone()));
    let domain_repo = Arc::new(DieselDomainRepository::new(pool.clone()));
    let subscriber_repo = Arc::new(DieselSubscriberRepository::new(pool.clone()));
    let audit_repo = Arc::new(DieselAuditLogRepository::new(pool));
    let tokens = Arc::new(TokenCodec::new(
        &config.jwt_secret,
        &config.jwt_refresh_secret,
        config.access_ttl_secs,
        config.refresh_ttl_secs,
    ));

    Ok(HttpState {
        auth: Arc::new(AuthService::new(
            user_repo.clone(),
            audit_repo.clone(),
            Arc::clone(&tokens),
        )),
        articles: Arc::new(ArticleService::new(
            articles,
            user_repo.clone(),
            domain_repo.clone(),
            reads.clone(),
        )),
        domains: Arc::new(DomainService::new(domain_repo, reads.clone())),
        users: Arc::new(UserService::new(user_repo, reads, config.bcrypt_cost)),
        subscribers: Arc::new(SubscriberService::new(subscriber_repo)),
        audit: Arc::new(AuditService::new(audit_repo)),
        tokens,
        cookies: CookiePolicy {
            secure: config.secure_cookies,
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        },
    })
}

/// Bind the HTTP server and start the daily retention sweep.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn run(config: &AppConfig, state: HttpState) -> std::io::Result<Server> {
    retention::spawn_sweep(
        state.articles.repository(),
        state.articles.reads(),
        config.retention_days,
    );

    let data = web::Data::new(state);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .service(web::scope("/api").configure(configure_api))
    })
    .bind(&config.bind_addr)?
    .run();
    info!(bind_addr = %config.bind_addr, "listening");
    Ok(server)
}
