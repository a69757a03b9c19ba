use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use omi_backend::domain::OsSeedSource;
use omi_backend::middleware::StructuredLogger;
use omi_backend::{db, routes, telemetry, AppConfig, AppState};
use time::OffsetDateTime;
use tracing::{error, info};

/// How often expired websocket registrations are purged.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let db = match db::connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "failed to open database");
            std::process::exit(1);
        }
    };

    let app_state = AppState::from_config(db, &config, Arc::new(OsSeedSource));

    let registry = app_state.registry.clone();
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            registry.sweep_expired(OffsetDateTime::now_utc());
        }
    });

    info!(host = %config.host, port = config.port, "starting Omi backend");

    let data = web::Data::new(app_state);
    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
