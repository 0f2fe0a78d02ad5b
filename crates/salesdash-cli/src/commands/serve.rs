use salesdash_core::{DashboardConfig, DashboardSession};
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::error::CliError;

pub async fn run(config: DashboardConfig, args: &ServeArgs) -> Result<(), CliError> {
    info!(source = %config.script_source, discount = %config.discount_model, "starting dashboard");
    let session = DashboardSession::with_reqwest(config);
    salesdash_web::serve(args.bind, session, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(error) => warn!(%error, "cannot listen for ctrl-c, shutting down"),
    }
}
