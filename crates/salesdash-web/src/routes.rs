//! Axum routes for the dashboard
//!
//! Every handler goes through the one shared [`DashboardSession`], so renders are
//! serialized and reuse the same script cache and sales store.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use salesdash_core::{DashboardSession, RenderOutput};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::error::WebError;
use crate::render::render_page;

/// Shared dashboard state
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<DashboardSession>>,
}

impl AppState {
    pub fn new(session: DashboardSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Take the session back once every router clone is gone.
    pub fn into_session(self) -> Option<DashboardSession> {
        Arc::try_unwrap(self.session).ok().map(Mutex::into_inner)
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Construct the dashboard router with all endpoints
pub fn dashboard_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/api/report", get(report_json))
        .route("/api/script", get(script_text))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn render(state: &AppState) -> RenderOutput {
    state.session.lock().await.render().await
}

/// GET /
async fn dashboard_page(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    Ok(Html(render_page(&render(&state).await)?))
}

/// GET /api/report
///
/// A halted render answers 503 with its notices.
async fn report_json(State(state): State<AppState>) -> (StatusCode, Json<RenderOutput>) {
    let output = render(&state).await;
    let status = if output.is_halted() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(output))
}

/// GET /api/script
async fn script_text(
    State(state): State<AppState>,
) -> Result<([(header::HeaderName, &'static str); 1], String), WebError> {
    let fetch = state.session.lock().await.fetch_script();
    let fetched = fetch.await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        fetched.text,
    ))
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "salesdash".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
