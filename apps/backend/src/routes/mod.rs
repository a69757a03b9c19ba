use actix_web::web;

pub mod health;
pub mod realtime;
pub mod sessions;

/// Register every route. Shared by `main.rs` and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Session routes: /api/sessions/**
    cfg.service(web::scope("/api/sessions").configure(sessions::configure_routes));

    // Websocket upgrade: /ws
    cfg.service(web::scope("/ws").configure(realtime::configure_routes));
}
