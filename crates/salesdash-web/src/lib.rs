//! # Salesdash Web
//!
//! Browser dashboard and JSON API over a [`DashboardSession`].
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | HTML dashboard: tables, metrics, charts |
//! | `GET /api/report` | Render output as JSON (`503` when the pipeline halted) |
//! | `GET /api/script` | The SQL script as plain text (`502` when it cannot be fetched) |
//! | `GET /health` | Liveness |

pub mod charts;
pub mod error;
pub mod render;
pub mod routes;

use std::future::Future;
use std::net::SocketAddr;

use salesdash_core::DashboardSession;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use error::WebError;
pub use render::{format_brl, render_page};
pub use routes::{dashboard_router, AppState, HealthResponse};

/// Serve the dashboard on `addr` until `shutdown` resolves, then release the
/// session's sales store.
///
/// # Errors
/// Returns the I/O error from binding or serving.
pub async fn serve<F>(
    addr: SocketAddr,
    session: DashboardSession,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "dashboard listening");

    let state = AppState::new(session);
    axum::serve(listener, dashboard_router(state.clone()))
        .with_graceful_shutdown(shutdown)
        .await?;

    match state.into_session() {
        Some(session) => {
            if let Err(error) = session.shutdown() {
                warn!(%error, "failed to release sales store");
            }
        }
        None => warn!("session still shared after shutdown; store is released on drop"),
    }
    info!("dashboard stopped");
    Ok(())
}
