//! SQL script fetcher with TTL memoization.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::config::ScriptSource;
use crate::error::FetchError;
use crate::http_client::{HttpClient, HttpRequest};

/// Script text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedScript {
    pub text: String,
    /// `true` when the text was served from the cache instead of the source.
    pub cache_hit: bool,
}

/// Downloads (or reads) the SQL script, memoizing successes for the cache TTL.
///
/// Failures are never cached, so the next render tries the source again.
#[derive(Clone)]
pub struct ScriptFetcher {
    client: Arc<dyn HttpClient>,
    cache: CacheStore,
    timeout_ms: Option<u64>,
}

impl ScriptFetcher {
    pub fn new(client: Arc<dyn HttpClient>, cache: CacheStore) -> Self {
        Self {
            client,
            cache,
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Fetch the script from `source`, or from the cache while it is fresh.
    ///
    /// # Errors
    /// Returns [`FetchError`] on transport failures, non-2xx responses, or unreadable
    /// local files.
    pub async fn fetch(&self, source: &ScriptSource) -> Result<FetchedScript, FetchError> {
        let key = source.cache_key();
        if let Some(text) = self.cache.get(&key).await {
            debug!(%source, "script served from cache");
            return Ok(FetchedScript {
                text,
                cache_hit: true,
            });
        }

        let text = match source {
            ScriptSource::Remote(url) => self.download(url).await?,
            ScriptSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| FetchError::File {
                    path: path.clone(),
                    source,
                })?,
        };

        info!(%source, bytes = text.len(), "script fetched");
        self.cache.put(key, text.clone()).await;
        Ok(FetchedScript {
            text,
            cache_hit: false,
        })
    }

    async fn download(&self, url: &str) -> Result<String, FetchError> {
        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !response.is_success() {
            warn!(url, status = response.status, "script download rejected");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        Ok(response.body)
    }
}
