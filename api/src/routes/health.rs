use actix_web::{web, HttpResponse};

use bk_core::{IdentityDelegate, NotificationSender};

use crate::app::AppState;

/// Handler for GET /health
pub async fn health_check<I, N>(state: web::Data<AppState<I, N>>) -> HttpResponse
where
    I: IdentityDelegate + ?Sized + 'static,
    N: NotificationSender + ?Sized + 'static,
{
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "bookly-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "outstanding_codes": state.manager.outstanding_codes().await,
    }))
}
