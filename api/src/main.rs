use actix_web::{middleware::Logger, web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use bk_api::middleware::create_cors;
use bk_api::telemetry::init_tracing;
use bk_api::{create_app, AppState};
use bk_core::{
    SweepConfig, VerificationCodeManager, VerificationServiceConfig, VerificationSweeper,
};
use bk_infra::{create_identity_delegate, create_notification_sender};
use bk_shared::config::{AppConfig, Environment};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables, environment-specific file first
    dotenvy::from_filename(Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;

    info!(
        environment = %config.environment,
        "Starting Bookly API Server"
    );

    let identity = create_identity_delegate(&config.identity)
        .await
        .context("failed to initialize identity delegate")?;
    let notifier = create_notification_sender(&config.notification, config.environment)
        .context("failed to initialize notification sender")?;

    let manager = Arc::new(VerificationCodeManager::new(
        identity,
        notifier,
        VerificationServiceConfig::from(&config.verification),
    ));

    let sweeper = Arc::new(VerificationSweeper::new(
        manager.clone(),
        SweepConfig::from(&config.verification),
    ))
    .start();

    let app_state = web::Data::new(AppState::new(manager));
    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let environment = config.environment;
    let server_config = config.server.clone();
    let mut server = HttpServer::new(move || {
        create_app(app_state.clone(), server_config.max_payload_size)
            .wrap(create_cors(environment, &server_config))
            .wrap(Logger::default())
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await;

    sweeper.shutdown().await;
    info!("Bookly API Server stopped");

    result.context("server terminated with an error")
}
