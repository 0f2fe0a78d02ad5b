//! Dashboard configuration.
//!
//! Every value has a hardcoded default; the CLI layers flags and environment
//! variables on top.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use salesdash_warehouse::SALES_JOIN_QUERY;
use serde::Serialize;

use crate::cleaner::DiscountModel;
use crate::error::ConfigError;

/// Public location of the sample sales script.
pub const DEFAULT_SCRIPT_URL: &str = "https://raw.githubusercontent.com/rafael-albuquerque07/analise-de-vendas/refs/heads/main/scripts_atividade.sql";

/// How long a fetched script is reused before it is downloaded again.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Where the SQL script comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum ScriptSource {
    /// Download over HTTP(S).
    Remote(String),
    /// Read from the local filesystem.
    File(PathBuf),
}

impl ScriptSource {
    /// Cache key for the fetched text.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Remote(url) => format!("url:{url}"),
            Self::File(path) => format!("file:{}", path.display()),
        }
    }
}

impl Default for ScriptSource {
    fn default() -> Self {
        Self::Remote(String::from(DEFAULT_SCRIPT_URL))
    }
}

impl Display for ScriptSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Settings for one dashboard session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardConfig {
    pub script_source: ScriptSource,
    /// Lifetime of a fetched script; zero disables the cache.
    pub cache_ttl: Duration,
    /// Dataset query run against the populated store.
    pub query: String,
    pub discount_model: DiscountModel,
    /// Optional HTTP timeout; `None` keeps the client default.
    pub request_timeout_ms: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            script_source: ScriptSource::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            query: String::from(SALES_JOIN_QUERY),
            discount_model: DiscountModel::default(),
            request_timeout_ms: None,
        }
    }
}

impl DashboardConfig {
    pub fn with_script_source(mut self, source: ScriptSource) -> Self {
        self.script_source = source;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_discount_model(mut self, model: DiscountModel) -> Self {
        self.discount_model = model;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Reject settings that can never produce a render.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let ScriptSource::Remote(url) = &self.script_source {
            let lowered = url.to_ascii_lowercase();
            if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.query.trim().is_empty() {
            return Err(ConfigError::EmptyQuery);
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_dashboard() {
        let config = DashboardConfig::default();

        assert_eq!(
            config.script_source,
            ScriptSource::Remote(DEFAULT_SCRIPT_URL.to_string())
        );
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.query, SALES_JOIN_QUERY);
        assert_eq!(config.discount_model, DiscountModel::Flat);
        assert_eq!(config.request_timeout_ms, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_http_urls_are_rejected() {
        let config = DashboardConfig::default()
            .with_script_source(ScriptSource::Remote(String::from("ftp://example.test/x.sql")));

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidUrl(String::from("ftp://example.test/x.sql")))
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = DashboardConfig::default().with_request_timeout_ms(Some(0));
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn cache_keys_distinguish_sources() {
        let remote = ScriptSource::Remote(String::from("https://example.test/a.sql"));
        let file = ScriptSource::File(PathBuf::from("a.sql"));

        assert_ne!(remote.cache_key(), file.cache_key());
        assert_eq!(file.to_string(), "a.sql");
    }
}
