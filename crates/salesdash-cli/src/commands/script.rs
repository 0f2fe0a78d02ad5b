use std::io::{self, Write};

use salesdash_core::{DashboardConfig, DashboardSession};

use crate::error::CliError;

pub async fn run(config: DashboardConfig) -> Result<(), CliError> {
    let session = DashboardSession::with_reqwest(config);
    let fetched = session.fetch_script().await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(fetched.text.as_bytes())?;
    if !fetched.text.ends_with('\n') {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
