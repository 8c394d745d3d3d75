// --- File: crates/services/scheduler_backend/src/main.rs ---
use axum::{routing::get, Router};
use http::{header, HeaderValue, Method};
use scheduler_common::logging;
use scheduler_config::{load_config, CorsConfig};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const DEFAULT_STATIC_DIR: &str = "static";

/// `embed.js`, the widget bundle and its stylesheet, mounted under `/static`.
fn static_files(dir: &str) -> Router {
    Router::new().nest_service("/static", ServeDir::new(dir))
}

/// Lets the configured origins call the proxy with credentials.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .origins()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Arc::new(load_config()?);
    logging::init();

    let static_dir = config
        .static_dir
        .clone()
        .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

    let app = Router::new()
        .route("/", get(|| async { "Appointment scheduler API" }))
        .merge(scheduler_gcal::routes(config.clone())?)
        .merge(static_files(&static_dir))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("Serving static files from {} at /static", static_dir);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
