use actix_web::web;

pub mod health;
pub mod realtime;
pub mod rooms;
pub mod sessions;

/// Configure application routes for tests and non-HttpServer contexts.
///
/// In production, `main.rs` wires these under the same scopes with the
/// CORS and request-log middleware on top; tests register the same paths
/// without those wrappers so endpoint behavior can be exercised directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Room routes: /api/rooms/**
    cfg.service(web::scope("/api/rooms").configure(rooms::configure_routes));

    // Session routes: /api/sessions/**
    cfg.service(web::scope("/api/sessions").configure(sessions::configure_routes));

    // Realtime routes: /api/ws
    cfg.service(web::scope("/api/ws").configure(realtime::configure_routes));

    // Health check routes: /api/health. Registered last; the bare /api
    // scope would otherwise shadow the prefixed scopes above.
    cfg.service(web::scope("/api").configure(health::configure_routes));
}
