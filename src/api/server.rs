//! HTTP server for the rentdash dashboard.
//!
//! # API Endpoints
//!
//! | Method | Path      | Description                          |
//! |--------|-----------|--------------------------------------|
//! | GET    | `/`       | Render the dashboard page            |
//! | GET    | `/health` | Health check                         |

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::render::render_dashboard;
use crate::auth::{Authenticator, FileTokenStore};
use crate::error::ServerError;
use crate::pipeline::views::{expiring_soon, pending_rsd};
use crate::pipeline::fetch_dashboard_data;
use crate::sheets::SheetsClient;

/// Explicitly constructed dependencies shared across requests.
///
/// Holds the credential provider and the HTTP client; every request builds
/// its own [`SheetsClient`] from a freshly obtained token.
pub struct AppState {
    pub auth: Authenticator<FileTokenStore>,
    pub http: reqwest::Client,
}

/// Start the HTTP server.
pub async fn start_server(port: u16, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 rentdash server running on http://localhost:{}", port);
    println!("   GET /        - Dashboard page");
    println!("   GET /health  - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "rentdash",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Dashboard endpoint: fetch, transform, filter, render.
///
/// Any auth, fetch, or validation failure surfaces as a 500 with the error
/// text; no partial page is rendered.
async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Html<String>, (StatusCode, String)> {
    let data = load_data(&state).await.map_err(|e| {
        eprintln!("❌ Dashboard error: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let expiring = expiring_soon(&data.bookings);
    let pending = pending_rsd(&data.bookings);
    println!("   ✓ {} expiring soon, {} pending RSD", expiring.len(), pending.len());

    Ok(Html(render_dashboard(&expiring, &pending)))
}

async fn load_data(state: &AppState) -> Result<crate::pipeline::DashboardData, ServerError> {
    let token = state
        .auth
        .access_token()
        .await
        .map_err(crate::error::PipelineError::from)
        .map_err(ServerError::from)?;

    let client = SheetsClient::new(state.http.clone(), token);
    Ok(fetch_dashboard_data(&client).await?)
}
