use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use backend::catalog::SeedCatalog;
use backend::config::EngineConfig;
use backend::middleware::cors::cors_middleware;
use backend::middleware::request_log::RequestLog;
use backend::routes;
use backend::services::progression::LogProgressionSink;
use backend::state::app_state::AppState;
use backend::telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    println!("🚀 Starting Huddle Backend on http://{}:{}", host, port);

    let config = EngineConfig::from_env();
    let app_state = AppState::build(
        config,
        Arc::new(SeedCatalog::new()),
        Arc::new(LogProgressionSink),
    );

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(RequestLog)
            .app_data(data.clone())
            .route("/", web::get().to(routes::health::root))
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
