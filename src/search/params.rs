use serde::Deserialize;

use super::error::SearchError;
use crate::query::{MatchOperator, SortDirection, SortMode};

pub const DEFAULT_SIZE: i64 = 10;

/// Separates multiple node names in the `node` parameter
const ITEM_SEPARATOR: char = ',';

/// Marks a node list as an exclusion list
const EXCLUDE_PREFIX: char = '-';

/// Query-string parameters of `/api/search`, exactly as received
///
/// Everything is kept as text so malformed numbers turn into the
/// `Wrong parameters` rejection instead of an extractor error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(alias = "keyword")]
    pub q: Option<String>,
    #[serde(alias = "offset")]
    pub from: Option<String>,
    #[serde(alias = "limit")]
    pub size: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub gte: Option<String>,
    pub lte: Option<String>,
    #[serde(alias = "category")]
    pub node: Option<String>,
    pub operator: Option<String>,
    pub username: Option<String>,
}

/// Typed parameters, not yet checked against the admission limits
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedParams {
    pub keyword: String,
    pub offset: i64,
    pub limit: i64,
    pub sort: SortMode,
    pub direction: SortDirection,
    pub created_after: Option<i64>,
    pub created_before: Option<i64>,
    pub node: Option<String>,
    pub operator: MatchOperator,
    pub username: Option<String>,
}

impl ParsedParams {
    /// Defaults for a plain keyword search
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            offset: 0,
            limit: DEFAULT_SIZE,
            sort: SortMode::default(),
            direction: SortDirection::default(),
            created_after: None,
            created_before: None,
            node: None,
            operator: MatchOperator::default(),
            username: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_int(value: Option<String>) -> Result<Option<i64>, SearchError> {
    match non_empty(value) {
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| SearchError::WrongParameters),
        None => Ok(None),
    }
}

impl SearchParams {
    /// Apply defaults and type conversions
    ///
    /// Unknown `sort`, `order` and `operator` values fall back to their
    /// defaults; only non-numeric integers are rejected here.
    pub fn parse(self) -> Result<ParsedParams, SearchError> {
        let offset = parse_int(self.from)?.unwrap_or(0);
        let limit = parse_int(self.size)?.unwrap_or(DEFAULT_SIZE);
        let order = parse_int(self.order)?.unwrap_or(0);
        let created_after = parse_int(self.gte)?;
        let created_before = parse_int(self.lte)?;

        let sort = self
            .sort
            .as_deref()
            .map(SortMode::from_param)
            .unwrap_or_default();
        let operator = self
            .operator
            .as_deref()
            .map(MatchOperator::from_param)
            .unwrap_or_default();

        Ok(ParsedParams {
            keyword: self.q.unwrap_or_default(),
            offset,
            limit,
            sort,
            direction: SortDirection::from_param(order),
            created_after,
            created_before,
            node: non_empty(self.node),
            operator,
            username: non_empty(self.username),
        })
    }
}

/// Split a `node` parameter into trimmed names and whether they are excluded
///
/// A `-` prefix on any item turns the whole list into an exclusion list.
pub fn parse_node_list(param: &str) -> (Vec<String>, bool) {
    let mut excluded = false;
    let items = param
        .split(ITEM_SEPARATOR)
        .map(|item| {
            let item = item.trim();
            match item.strip_prefix(EXCLUDE_PREFIX) {
                Some(rest) => {
                    excluded = true;
                    rest.trim().to_string()
                }
                None => item.to_string(),
            }
        })
        .filter(|item| !item.is_empty())
        .collect();

    (items, excluded)
}
