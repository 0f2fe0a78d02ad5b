use std::io::{self, Write};

use salesdash_core::{DashboardConfig, DashboardSession, Notice};

use crate::cli::ReportArgs;
use crate::error::CliError;
use crate::output;

pub async fn run(config: DashboardConfig, args: &ReportArgs) -> Result<(), CliError> {
    let mut session = DashboardSession::with_reqwest(config);
    let rendered = session.render().await;
    session.shutdown()?;

    if rendered.is_halted() {
        output::write_notices(&mut io::stderr().lock(), &rendered.notices)?;
        return Err(CliError::Halted(halt_reason(&rendered.notices)));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::render(&mut out, &rendered, args.format, args.pretty)?;
    out.flush()?;
    Ok(())
}

fn halt_reason(notices: &[Notice]) -> String {
    notices
        .iter()
        .find(|notice| notice.is_error())
        .map(|notice| notice.message.clone())
        .unwrap_or_else(|| String::from("no report was produced"))
}
