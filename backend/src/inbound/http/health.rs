//! Liveness endpoint.

use actix_web::{web, HttpResponse};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mount the health route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[actix_web::test]
    async fn health_answers_without_authentication() {
        let app = test::init_service(App::new().service(web::scope("/api").configure(configure)))
            .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/health").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(
            body.get("status").and_then(serde_json::Value::as_str),
            Some("ok")
        );
    }
}
