mod report;
mod script;
mod serve;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = cli.dashboard_config()?;
    match &cli.command {
        Command::Serve(args) => serve::run(config, args).await,
        Command::Report(args) => report::run(config, args).await,
        Command::Script => script::run(config).await,
    }
}
