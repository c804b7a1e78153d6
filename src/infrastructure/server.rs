// Server module - router assembly and the listening loop

use axum::Router;
use axum::http::HeaderValue;
use sea_orm::DatabaseConnection;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::api_docs::ApiDoc;
use crate::infrastructure::AppState;

/// CORS layer for the configured origins; any origin when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let mut allowed = Vec::with_capacity(origins.len());
    for origin in origins {
        match origin.parse::<HeaderValue>() {
            Ok(v) => allowed.push(v),
            Err(e) => tracing::error!("Failed to parse CORS origin '{}': {}", origin, e),
        }
    }
    cors.allow_origin(allowed)
}

/// Build the full application router: `/api`, Swagger UI, CORS and request tracing
pub fn build_router(db: DatabaseConnection, cors_allowed_origins: &[String]) -> Router {
    let state = AppState::new(db);
    let api_router = api::api_router_with_state(state);

    Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_router)
        .layer(cors_layer(cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Bind `port` on all interfaces and serve until the process stops
pub async fn serve(app: Router, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("📡 Circulation desk listening on {}", addr);
    axum::serve(listener, app).await
}
