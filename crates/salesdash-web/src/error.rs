use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use salesdash_core::FetchError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum WebError {
    /// The SQL script could not be fetched from its source.
    #[error("script unavailable: {0}")]
    ScriptUnavailable(#[from] FetchError),

    /// The dashboard page template failed to render.
    #[error("failed to render dashboard page: {0}")]
    Template(#[from] minijinja::Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ScriptUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ScriptUnavailable(_) => "SCRIPT_UNAVAILABLE",
            Self::Template(_) => "RENDER_FAILED",
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorEnvelope<'a> {
            error: ErrorBody<'a>,
        }

        #[derive(Serialize)]
        struct ErrorBody<'a> {
            code: &'a str,
            message: String,
        }

        tracing::warn!(error = %self, "request failed");
        let status = self.status();
        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_map_to_bad_gateway() {
        let error = WebError::from(FetchError::Status {
            url: String::from("https://example.test/vendas.sql"),
            status: 404,
        });

        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(error.code(), "SCRIPT_UNAVAILABLE");
        assert!(error.to_string().contains("HTTP 404"));
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn template_failures_map_to_internal_error() {
        let error = WebError::from(minijinja::Error::new(
            minijinja::ErrorKind::UndefinedError,
            "missing value",
        ));

        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.code(), "RENDER_FAILED");
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
