//! CORS middleware configuration for cross-origin requests.
//!
//! Development is permissive so local web clients and tools can reach the
//! password reset endpoints. Other environments only allow the origins
//! listed in `ALLOWED_ORIGINS`.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use bk_shared::config::{Environment, ServerConfig};

/// Creates a CORS middleware instance for the given environment.
pub fn create_cors(environment: Environment, server: &ServerConfig) -> Cors {
    if environment.is_development() {
        create_development_cors(server.cors_max_age)
    } else {
        create_restricted_cors(&server.allowed_origins, server.cors_max_age)
    }
}

fn create_development_cors(max_age: usize) -> Cors {
    tracing::info!("Configuring CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::USER_AGENT,
        ])
        .max_age(max_age)
}

fn create_restricted_cors(allowed_origins: &[String], max_age: usize) -> Cors {
    tracing::info!(
        origins = allowed_origins.len(),
        "Configuring CORS for restricted environment"
    );

    allowed_origins.iter().fold(
        Cors::default()
            .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(max_age),
        |cors, origin| cors.allowed_origin(origin),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_restricted_cors_allows_configured_origin() {
        let server = ServerConfig {
            allowed_origins: vec!["https://app.bookly.example".to_string()],
            ..ServerConfig::default()
        };
        let app = test::init_service(
            App::new()
                .wrap(create_cors(Environment::Production, &server))
                .route("/test", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header(("Origin", "https://app.bookly.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("https://app.bookly.example")
        );
    }
}
