use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::SearchError;
use super::pagination::{max_page, PageWindow};
use super::params::{parse_node_list, ParsedParams};
use super::result::SearchResult;
use crate::engine::SearchEngine;
use crate::query::{compile, compiler::PRIMARY_ANALYZER, SearchRequest};
use crate::storage::NodeLookup;

pub const MAX_PAGE_SIZE: u64 = 50;
pub const MAX_KEYWORD_LENGTH: usize = 100;
pub const MAX_CLAUSE_COUNT: usize = 30;
pub const DEFAULT_MAX_DEPTH: u64 = 1000;

/// Page size used by the page view
pub const PAGE_VIEW_SIZE: u64 = 10;

/// Admission-control ceilings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: u64,
    pub max_page_size: u64,
    pub max_keyword_length: usize,
    pub max_clause_count: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_page_size: MAX_PAGE_SIZE,
            max_keyword_length: MAX_KEYWORD_LENGTH,
            max_clause_count: MAX_CLAUSE_COUNT,
        }
    }
}

impl SearchLimits {
    pub fn with_max_depth(mut self, max_depth: u64) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Search results plus the page links to render around them
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageView {
    pub result: Option<SearchResult>,
    #[serde(flatten)]
    pub window: PageWindow,
}

/// Validates, compiles and dispatches searches
///
/// Holds no per-request state; clones share the engine and lookup clients.
#[derive(Clone)]
pub struct SearchService {
    engine: Arc<dyn SearchEngine>,
    nodes: Arc<dyn NodeLookup>,
    limits: SearchLimits,
    lookup_timeout: Duration,
}

impl SearchService {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        nodes: Arc<dyn NodeLookup>,
        limits: SearchLimits,
    ) -> Self {
        Self {
            engine,
            nodes,
            limits,
            lookup_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Validate, compile and run one search
    pub async fn search(&self, params: ParsedParams) -> Result<SearchResult, SearchError> {
        self.admit(&params)?;
        self.check_clause_count(&params.keyword).await?;

        let request = self.build_request(params).await;
        debug!("Compiled search request: {:?}", request);

        let body = compile(&request);
        let raw = self.engine.search(&body).await?;
        Ok(SearchResult::from(raw))
    }

    /// Search one page of the page view and compute its pagination links
    pub async fn search_page(&self, keyword: &str, page: i64) -> Result<PageView, SearchError> {
        if keyword.is_empty() {
            return Ok(PageView {
                result: None,
                window: PageWindow::empty(),
            });
        }
        if page < 1 {
            return Err(SearchError::WrongParameters);
        }

        let mut params = ParsedParams::new(keyword);
        params.offset = (page - 1).saturating_mul(PAGE_VIEW_SIZE as i64);
        params.limit = PAGE_VIEW_SIZE as i64;

        let result = self.search(params).await?;
        let last_page = max_page(result.total, PAGE_VIEW_SIZE, self.limits.max_depth);

        Ok(PageView {
            window: PageWindow::new(page as u64, last_page),
            result: Some(result),
        })
    }

    /// Cheap checks that need no I/O, in order; the first failure wins
    pub fn admit(&self, params: &ParsedParams) -> Result<(), SearchError> {
        if params.keyword.trim().is_empty() {
            return Err(SearchError::MissingKeyword);
        }
        if params.offset < 0 || params.limit < 0 {
            return Err(SearchError::WrongParameters);
        }
        let (offset, limit) = (params.offset as u64, params.limit as u64);
        if offset.saturating_add(limit) > self.limits.max_depth {
            return Err(SearchError::TooDeepPaging);
        }
        if limit > self.limits.max_page_size {
            return Err(SearchError::TooLargeSize);
        }
        if params.keyword.chars().count() > self.limits.max_keyword_length {
            return Err(SearchError::TooLongKeyword);
        }
        Ok(())
    }

    /// Reject keywords the analyzer splits into too many clauses
    async fn check_clause_count(&self, keyword: &str) -> Result<(), SearchError> {
        let tokens = self.engine.analyze(keyword, PRIMARY_ANALYZER).await?;
        debug!(
            "Analyzed {:?} into {:?}",
            keyword,
            tokens.iter().map(|t| t.token.as_str()).collect::<Vec<_>>()
        );
        if tokens.len() > self.limits.max_clause_count {
            debug!(
                "Keyword rejected: {} clauses exceeds {}",
                tokens.len(),
                self.limits.max_clause_count
            );
            return Err(SearchError::TooLongKeyword);
        }
        Ok(())
    }

    async fn build_request(&self, params: ParsedParams) -> SearchRequest {
        let (node_ids, exclude) = match params.node.as_deref() {
            Some(filter) => self.resolve_nodes(filter).await,
            None => (Vec::new(), false),
        };

        SearchRequest::new(params.keyword)
            .with_window(params.offset as u64, params.limit as u64)
            .with_sort(params.sort, params.direction)
            .with_created_range(params.created_after, params.created_before)
            .with_nodes(node_ids, exclude)
            .with_member(params.username)
            .with_operator(params.operator)
    }

    /// Resolve node names to ids; names that cannot be resolved are dropped
    pub async fn resolve_nodes(&self, filter: &str) -> (Vec<i64>, bool) {
        let (names, exclude) = parse_node_list(filter);
        let mut ids = BTreeSet::new();

        for name in names {
            match tokio::time::timeout(self.lookup_timeout, self.nodes.find_node(&name)).await {
                Ok(Ok(Some(node))) => {
                    ids.insert(node.id);
                }
                Ok(Ok(None)) => debug!("Ignoring unknown node {:?}", name),
                Ok(Err(e)) => warn!("Node lookup for {:?} failed, ignoring: {}", name, e),
                Err(_) => warn!("Node lookup for {:?} timed out, ignoring", name),
            }
        }

        (ids.into_iter().collect(), exclude)
    }
}
