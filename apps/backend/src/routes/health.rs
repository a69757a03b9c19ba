use actix_web::{web, HttpResponse};
use migration::count_applied_migrations;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    db: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_error: Option<String>,
    migrations_applied: Option<usize>,
    time: String,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let time = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let db = &app_state.db;
    let probe = db
        .execute(sea_orm::Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await;

    let response = match probe {
        Ok(_) => HealthResponse {
            status: "ok",
            app_version: env!("CARGO_PKG_VERSION"),
            db: "ok",
            db_error: None,
            migrations_applied: count_applied_migrations(db).await.ok(),
            time,
        },
        Err(e) => HealthResponse {
            status: "degraded",
            app_version: env!("CARGO_PKG_VERSION"),
            db: "error",
            db_error: Some(format!("DB query failed: {e}")),
            migrations_applied: None,
            time,
        },
    };

    let mut builder = if response.db == "ok" {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    Ok(builder.json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
