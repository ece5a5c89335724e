use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::engine::EngineError;

/// Every way a search can be refused or fail, as seen by the caller
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Missing search keyword")]
    MissingKeyword,

    #[error("Wrong parameters")]
    WrongParameters,

    #[error("Too deep paging parameters")]
    TooDeepPaging,

    #[error("Too large size")]
    TooLargeSize,

    #[error("Too long keyword")]
    TooLongKeyword,

    /// Carries the underlying cause for logs; never sent to the caller
    #[error("Read search result timeout: {0}")]
    Timeout(String),

    #[error("Search engine error: {detail}")]
    Engine { detail: Value },

    #[error("Something went wrong: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SearchError {
    /// Rejected by admission control, before any engine work
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SearchError::MissingKeyword
                | SearchError::WrongParameters
                | SearchError::TooDeepPaging
                | SearchError::TooLargeSize
                | SearchError::TooLongKeyword
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }

    /// Body sent to the caller
    pub fn body(&self) -> Value {
        match self {
            SearchError::Timeout(_) => json!({ "message": "Read search result timeout" }),
            SearchError::Engine { detail } => {
                json!({ "message": "Search engine error", "detail": detail })
            }
            SearchError::Internal(_) => json!({ "message": "Something went wrong" }),
            rejection => json!({ "message": rejection.to_string() }),
        }
    }
}

impl From<EngineError> for SearchError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Timeout(cause) => SearchError::Timeout(cause),
            EngineError::Transport { detail, .. } => SearchError::Engine { detail },
            EngineError::Other(cause) => SearchError::Internal(cause),
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_bad_request() {
        for error in [
            SearchError::MissingKeyword,
            SearchError::WrongParameters,
            SearchError::TooDeepPaging,
            SearchError::TooLargeSize,
            SearchError::TooLongKeyword,
        ] {
            assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(error.body()["message"], error.to_string());
        }
    }

    #[test]
    fn test_timeout_hides_cause() {
        let error = SearchError::from(EngineError::Timeout("operation timed out after 10s".into()));
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.body(), json!({ "message": "Read search result timeout" }));
    }

    #[test]
    fn test_transport_error_includes_detail() {
        let error = SearchError::from(EngineError::Transport {
            status: Some(500),
            detail: json!({ "reason": "shard failure" }),
        });
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.body()["message"], "Search engine error");
        assert_eq!(error.body()["detail"]["reason"], "shard failure");
    }

    #[test]
    fn test_internal_error_is_generic() {
        let error = SearchError::from(EngineError::Other(anyhow::anyhow!("decode failed")));
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.body(), json!({ "message": "Something went wrong" }));
    }
}
