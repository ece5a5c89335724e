use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::Uri,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, error};

use crate::search::{PageView, SearchError, SearchParams, SearchResult, SearchService};

/// Query-string parameters of the page view
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Log a failed search and hand it back for rendering
fn log_failure(uri: &Uri, err: SearchError) -> SearchError {
    if err.is_client_error() {
        debug!("Rejected search {}: {}", uri, err);
    } else {
        error!("{} {} {}", Utc::now().to_rfc3339(), uri, err);
    }
    err
}

/// Health check
pub async fn ping() -> &'static str {
    "pong"
}

/// Keyword search returning the normalized result
pub async fn search(
    OriginalUri(uri): OriginalUri,
    State(service): State<SearchService>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResult>, SearchError> {
    let result = match params {
        Ok(Query(params)) => match params.parse() {
            Ok(parsed) => service.search(parsed).await,
            Err(e) => Err(e),
        },
        Err(rejection) => {
            debug!("Unreadable search parameters: {}", rejection);
            Err(SearchError::WrongParameters)
        }
    };

    result.map(Json).map_err(|e| log_failure(&uri, e))
}

/// Page view: one fixed-size page of results plus pagination links
pub async fn search_page(
    OriginalUri(uri): OriginalUri,
    State(service): State<SearchService>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<PageView>, SearchError> {
    let Ok(Query(params)) = params else {
        return Err(log_failure(&uri, SearchError::WrongParameters));
    };

    let keyword = params.q.unwrap_or_default();
    let page = match params.page.as_deref().map(str::trim) {
        None | Some("") => 1,
        Some(page) => page
            .parse::<i64>()
            .map_err(|_| log_failure(&uri, SearchError::WrongParameters))?,
    };

    service
        .search_page(&keyword, page)
        .await
        .map(Json)
        .map_err(|e| log_failure(&uri, e))
}
