//! Render orchestration: fetch → build → load → clean → metrics.
//!
//! A [`DashboardSession`] owns the two memoized resources of the pipeline:
//!
//! - the fetched script, held in the fetcher's TTL cache;
//! - the populated [`SalesStore`], keyed by the exact script text it was built from.
//!
//! The store outlives individual renders. It is released when a different script
//! replaces it, or once when the session shuts down.

use std::future::Future;
use std::sync::Arc;

use salesdash_warehouse::{ColumnNullCount, RawDataset, SalesStore, WarehouseError};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;
use crate::cleaner::{clean, DiscountModel};
use crate::config::{DashboardConfig, ScriptSource};
use crate::dataset::CleanDataset;
use crate::error::FetchError;
use crate::fetcher::{FetchedScript, ScriptFetcher};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::metrics::{compute_metrics, SalesMetrics};
use crate::notice::Notice;

/// Everything the presentation layer draws for one successful render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub script: String,
    pub raw: RawDataset,
    pub raw_null_counts: Vec<ColumnNullCount>,
    pub cleaned: CleanDataset,
    pub clean_null_counts: Vec<ColumnNullCount>,
    pub metrics: SalesMetrics,
    pub discount_model: DiscountModel,
}

/// Clean a loaded dataset and aggregate it into a report.
pub fn analyze(script: String, raw: RawDataset, model: DiscountModel) -> DashboardReport {
    let cleaned = clean(&raw, model);
    let metrics = compute_metrics(&cleaned);
    DashboardReport {
        script,
        raw_null_counts: raw.null_counts(),
        raw,
        clean_null_counts: cleaned.null_counts(),
        cleaned,
        metrics,
        discount_model: model,
    }
}

/// Result of one render: the messages to show, plus the report unless the pipeline
/// halted before a store existed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutput {
    pub notices: Vec<Notice>,
    pub report: Option<DashboardReport>,
}

impl RenderOutput {
    fn halted(notices: Vec<Notice>) -> Self {
        Self {
            notices,
            report: None,
        }
    }

    pub const fn is_halted(&self) -> bool {
        self.report.is_none()
    }
}

/// Counters describing how much work the memoized stages actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub renders: u64,
    pub store_builds: u64,
    pub dataset_loads: u64,
}

struct CachedStore {
    script: String,
    store: SalesStore,
    /// Last successful load, keyed by the query that produced it.
    dataset: Option<(String, RawDataset)>,
}

impl CachedStore {
    fn release(self) {
        if let Err(error) = self.store.close() {
            warn!(%error, "failed to close replaced sales store");
        }
    }
}

/// Long-lived dashboard state shared by every render.
pub struct DashboardSession {
    config: DashboardConfig,
    fetcher: ScriptFetcher,
    store: Option<CachedStore>,
    stats: SessionStats,
}

impl DashboardSession {
    pub fn new(config: DashboardConfig, client: Arc<dyn HttpClient>) -> Self {
        let fetcher = ScriptFetcher::new(client, CacheStore::new(config.cache_ttl))
            .with_timeout_ms(config.request_timeout_ms);
        Self {
            config,
            fetcher,
            store: None,
            stats: SessionStats::default(),
        }
    }

    /// Session backed by the real network client.
    pub fn with_reqwest(config: DashboardConfig) -> Self {
        Self::new(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Whether a populated store is currently held.
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Fetch the script on its own, through the same cache renders use.
    ///
    /// The returned future owns its inputs, so a lock around the session can be
    /// released before awaiting it.
    pub fn fetch_script(
        &self,
    ) -> impl Future<Output = Result<FetchedScript, FetchError>> + Send + 'static {
        let fetcher = self.fetcher.clone();
        let source = self.config.script_source.clone();
        async move { fetcher.fetch(&source).await }
    }

    /// Run the whole pipeline once.
    ///
    /// Fetch and build failures halt the render; a load failure continues with an
    /// empty dataset so the dashboard shows zeros instead of nothing.
    pub async fn render(&mut self) -> RenderOutput {
        self.stats.renders += 1;
        let mut notices = Vec::new();

        let script = match self.fetcher.fetch(&self.config.script_source).await {
            Ok(fetched) => {
                if !fetched.cache_hit {
                    notices.push(Notice::success("SQL script downloaded successfully."));
                }
                Some(fetched.text)
            }
            Err(error) => {
                error!(%error, "script fetch failed");
                notices.push(Notice::error(format!(
                    "Failed to download the SQL script: {error}"
                )));
                let label = match &self.config.script_source {
                    ScriptSource::Remote(_) => "URL used",
                    ScriptSource::File(_) => "File used",
                };
                notices.push(Notice::error(format!("{label}: {}", error.location())));
                None
            }
        };

        let Some(script) = script else {
            return RenderOutput::halted(notices);
        };
        if !self.prepare_store(&script, &mut notices) {
            return RenderOutput::halted(notices);
        }

        let raw = self.load_dataset(&mut notices);
        let report = analyze(script, raw, self.config.discount_model);
        info!(
            rows = report.cleaned.len(),
            total_revenue = report.metrics.total_revenue,
            "render complete"
        );
        notices.push(Notice::success("Analysis completed successfully!"));

        RenderOutput {
            notices,
            report: Some(report),
        }
    }

    /// Make sure the held store was built from `script`, rebuilding if needed.
    fn prepare_store(&mut self, script: &str, notices: &mut Vec<Notice>) -> bool {
        if self
            .store
            .as_ref()
            .is_some_and(|cached| cached.script == script)
        {
            debug!("reusing memoized sales store");
            return true;
        }

        match SalesStore::build(Some(script)) {
            Ok(Some(store)) => {
                self.stats.store_builds += 1;
                let fresh = CachedStore {
                    script: script.to_string(),
                    store,
                    dataset: None,
                };
                if let Some(previous) = self.store.replace(fresh) {
                    info!("script changed, releasing previous sales store");
                    previous.release();
                }
                true
            }
            Ok(None) => false,
            Err(error) => {
                error!(%error, "sales store build failed");
                notices.push(Notice::error(format!(
                    "Failed to run the SQL script against the database: {error}"
                )));
                if let Some(prefix) = error.script_prefix() {
                    notices.push(Notice::error(format!(
                        "The downloaded script starts with: {prefix}..."
                    )));
                }
                if error.looks_like_html() {
                    notices.push(Notice::warning(
                        "The download returned an HTML page instead of SQL; check the script URL.",
                    ));
                }
                false
            }
        }
    }

    fn load_dataset(&mut self, notices: &mut Vec<Notice>) -> RawDataset {
        let Some(cached) = self.store.as_mut() else {
            return RawDataset::default();
        };

        if let Some((query, dataset)) = &cached.dataset {
            if *query == self.config.query {
                return dataset.clone();
            }
        }

        match cached.store.load(&self.config.query) {
            Ok(dataset) => {
                self.stats.dataset_loads += 1;
                cached.dataset = Some((self.config.query.clone(), dataset.clone()));
                dataset
            }
            Err(error) => {
                error!(%error, "sales dataset load failed");
                notices.push(Notice::error(format!(
                    "Failed to load the sales dataset: {error}"
                )));
                RawDataset::default()
            }
        }
    }

    /// Release the memoized store. Call once when the process is done rendering.
    pub fn shutdown(mut self) -> Result<(), WarehouseError> {
        if let Some(cached) = self.store.take() {
            cached.store.close()?;
            info!(renders = self.stats.renders, "sales store released");
        }
        Ok(())
    }
}
