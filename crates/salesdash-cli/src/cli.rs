//! CLI argument definitions for salesdash.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the web dashboard |
//! | `report` | Run the analysis once and print it |
//! | `script` | Print the SQL script being analysed |
//!
//! # Global Options
//!
//! | Option | Env | Default |
//! |--------|-----|---------|
//! | `--script-url` | `SALESDASH_SCRIPT_URL` | published sample script |
//! | `--script-file` | `SALESDASH_SCRIPT_FILE` | unset |
//! | `--cache-ttl-secs` | `SALESDASH_CACHE_TTL_SECS` | `300` |
//! | `--discount-model` | `SALESDASH_DISCOUNT_MODEL` | `flat` |
//! | `--timeout-ms` | `SALESDASH_TIMEOUT_MS` | unset |
//!
//! # Examples
//!
//! ```bash
//! salesdash serve --bind 0.0.0.0:8501
//! salesdash report --format json --pretty
//! salesdash --script-file fixtures/vendas.sql report
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use salesdash_core::{
    DashboardConfig, DiscountModel, ScriptSource, DEFAULT_CACHE_TTL, DEFAULT_SCRIPT_URL,
};

use crate::error::CliError;

/// Sales analysis dashboard over a SQL sample script
#[derive(Debug, Parser)]
#[command(
    name = "salesdash",
    author,
    version,
    about = "Sales analysis dashboard over a SQL sample script",
    long_about = "salesdash downloads a SQL script describing sales and products, loads it into \
an in-memory DuckDB database, cleans the joined rows and reports revenue, units sold, \
best-selling products and best days.\n\
\n\
Use 'salesdash <command> --help' for command-specific help."
)]
pub struct Cli {
    /// URL of the SQL script to download.
    #[arg(long, global = true, env = "SALESDASH_SCRIPT_URL", default_value = DEFAULT_SCRIPT_URL)]
    pub script_url: String,

    /// Read the SQL script from a local file instead of the network.
    ///
    /// Takes precedence over --script-url.
    #[arg(long, global = true, env = "SALESDASH_SCRIPT_FILE")]
    pub script_file: Option<PathBuf>,

    /// Seconds a fetched script is reused before downloading it again (0 disables).
    #[arg(long, global = true, env = "SALESDASH_CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    /// How the discount column is applied when recomputing line totals.
    #[arg(long, global = true, value_enum, env = "SALESDASH_DISCOUNT_MODEL", default_value_t = DiscountArg::Flat)]
    pub discount_model: DiscountArg,

    /// Download timeout in milliseconds. No timeout when unset.
    #[arg(long, global = true, env = "SALESDASH_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Dashboard settings described by the global options.
    pub fn dashboard_config(&self) -> Result<DashboardConfig, CliError> {
        let source = match &self.script_file {
            Some(path) => ScriptSource::File(path.clone()),
            None => ScriptSource::Remote(self.script_url.clone()),
        };
        let config = DashboardConfig::default()
            .with_script_source(source)
            .with_cache_ttl(Duration::from_secs(self.cache_ttl_secs))
            .with_discount_model(self.discount_model.into())
            .with_request_timeout_ms(self.timeout_ms);
        config.validate()?;
        Ok(config)
    }
}

/// Discount interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiscountArg {
    /// Discount is an amount subtracted from the unit price.
    Flat,
    /// Discount is a fraction of the unit price.
    Percentage,
}

impl From<DiscountArg> for DiscountModel {
    fn from(value: DiscountArg) -> Self {
        match value {
            DiscountArg::Flat => Self::Flat,
            DiscountArg::Percentage => Self::Percentage,
        }
    }
}

/// Output format options for `report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text tables for terminal display.
    Table,
    /// The full render output as one JSON object.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web dashboard.
    ///
    /// # Examples
    ///
    ///   salesdash serve
    ///   salesdash serve --bind 0.0.0.0:8080
    Serve(ServeArgs),

    /// Run the analysis once and print it.
    ///
    /// # Examples
    ///
    ///   salesdash report
    ///   salesdash report --format json --pretty
    Report(ReportArgs),

    /// Print the SQL script being analysed.
    Script,
}

/// Arguments for the `serve` command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "SALESDASH_BIND", default_value = "127.0.0.1:8501")]
    pub bind: SocketAddr,
}

/// Arguments for the `report` command.
#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}
