//! Application state and factory
//!
//! This module holds the shared application state and provides the factory
//! for creating the Actix-web application.

use actix_web::{web, App};
use std::sync::Arc;

use bk_core::{IdentityDelegate, NotificationSender, VerificationCodeManager};

use crate::handlers::{json_error_handler, not_found};
use crate::routes::health::health_check;
use crate::routes::password_reset::{confirm, request_code, verify_code};

/// Application state that holds shared services
pub struct AppState<I: ?Sized, N: ?Sized> {
    pub manager: Arc<VerificationCodeManager<I, N>>,
}

impl<I: ?Sized, N: ?Sized> AppState<I, N> {
    pub fn new(manager: Arc<VerificationCodeManager<I, N>>) -> Self {
        Self { manager }
    }
}

/// Create and configure the application with all dependencies
///
/// Request logging and CORS are wrapped by the caller.
pub fn create_app<I, N>(
    app_state: web::Data<AppState<I, N>>,
    max_payload_size: usize,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    I: IdentityDelegate + ?Sized + 'static,
    N: NotificationSender + ?Sized + 'static,
{
    App::new()
        // Add application state
        .app_data(app_state)
        .app_data(
            web::JsonConfig::default()
                .limit(max_payload_size)
                .error_handler(json_error_handler),
        )
        // Health check endpoint
        .route("/health", web::get().to(health_check::<I, N>))
        // API v1 routes
        .service(
            web::scope("/api/v1").service(
                web::scope("/password-reset")
                    .route("/request-code", web::post().to(request_code::<I, N>))
                    .route("/verify-code", web::post().to(verify_code::<I, N>))
                    .route("/confirm", web::post().to(confirm::<I, N>)),
            ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}
