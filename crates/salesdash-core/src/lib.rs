//! # Salesdash Core
//!
//! The sales-report pipeline behind the salesdash dashboard.
//!
//! ## Overview
//!
//! Each render runs five stages in order:
//!
//! 1. **Fetch** the SQL script ([`ScriptFetcher`], TTL-memoized via [`CacheStore`])
//! 2. **Build** an in-memory store from it ([`SalesStore::build`], memoized per script)
//! 3. **Load** the sales/products join ([`SalesStore::load`])
//! 4. **Clean** nulls and recompute totals ([`clean`])
//! 5. **Aggregate** business metrics ([`compute_metrics`])
//!
//! [`DashboardSession`] wires the stages together and owns the memoized resources.
//! Every stage is also usable on its own.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Time-bounded script cache |
//! | [`cleaner`] | Null defaults and discount models |
//! | [`config`] | Dashboard configuration and defaults |
//! | [`dataset`] | Cleaned dataset types and date parsing |
//! | [`error`] | Fetch and configuration errors |
//! | [`fetcher`] | Script download / file read |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`metrics`] | Revenue and ranking aggregates |
//! | [`notice`] | User-facing messages |
//! | [`pipeline`] | Session and render orchestration |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use salesdash_core::{DashboardConfig, DashboardSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = DashboardSession::with_reqwest(DashboardConfig::default());
//!
//!     let output = session.render().await;
//!     for notice in &output.notices {
//!         println!("{:?}: {}", notice.level, notice.message);
//!     }
//!     if let Some(report) = &output.report {
//!         println!("Revenue: {:.2}", report.metrics.total_revenue);
//!     }
//!
//!     session.shutdown()?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod metrics;
pub mod notice;
pub mod pipeline;

pub use cache::CacheStore;

pub use cleaner::{clean, clean_sale, DiscountModel, DEFAULT_CATEGORY, UNKNOWN_PRODUCT};

pub use config::{DashboardConfig, ScriptSource, DEFAULT_CACHE_TTL, DEFAULT_SCRIPT_URL};

pub use dataset::{format_date, format_sale_datetime, parse_sale_datetime, CleanDataset, CleanSale};

pub use error::{ConfigError, FetchError};

pub use fetcher::{FetchedScript, ScriptFetcher};

pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, ReqwestHttpClient,
    StaticHttpClient, SCRIPT_ACCEPT,
};

pub use metrics::{
    compute_metrics, CategoryRevenue, DailyRevenue, ProductUnits, SalesMetrics, TOP_N,
};

pub use notice::{Notice, NoticeLevel};

pub use pipeline::{analyze, DashboardReport, DashboardSession, RenderOutput, SessionStats};

// Warehouse (re-exported from salesdash-warehouse)
pub use salesdash_warehouse::{
    ColumnNullCount, RawDataset, RawSale, SalesStore, WarehouseError, SALES_COLUMNS,
    SALES_JOIN_QUERY,
};
