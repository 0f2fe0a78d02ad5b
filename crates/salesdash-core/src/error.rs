use std::path::PathBuf;

use thiserror::Error;

use crate::http_client::HttpError;

/// Failure to obtain the SQL script.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: HttpError,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// A local script file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// URL or path the failing fetch targeted.
    pub fn location(&self) -> String {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } => url.clone(),
            Self::File { path, .. } => path.display().to_string(),
        }
    }

    /// HTTP status of the response, if one arrived.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Invalid dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("script URL must start with http:// or https://, got '{0}'")]
    InvalidUrl(String),

    #[error("dataset query must not be empty")]
    EmptyQuery,

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_mention_url_and_code() {
        let error = FetchError::Status {
            url: String::from("https://example.test/script.sql"),
            status: 404,
        };

        assert_eq!(error.status(), Some(404));
        assert_eq!(error.location(), "https://example.test/script.sql");
        assert_eq!(
            error.to_string(),
            "https://example.test/script.sql returned HTTP 404"
        );
    }

    #[test]
    fn file_errors_report_path() {
        let error = FetchError::File {
            path: PathBuf::from("/tmp/missing.sql"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };

        assert_eq!(error.location(), "/tmp/missing.sql");
        assert_eq!(error.status(), None);
    }
}
