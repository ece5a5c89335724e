use serde::Serialize;

/// How hits are ranked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Summed relevance score with phrase and bonus functions
    #[default]
    Relevance,
    /// Creation time, no scoring
    Chronological,
}

impl SortMode {
    /// Parse the `sort` parameter; unknown values rank by relevance
    pub fn from_param(value: &str) -> Self {
        match value.trim() {
            "created" => SortMode::Chronological,
            _ => SortMode::Relevance,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Parse the numeric `order` parameter (`0` desc, `1` asc); anything else is desc
    pub fn from_param(value: i64) -> Self {
        match value {
            1 => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }
}

/// Whether a field must contain all analyzed keyword terms or any one of them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MatchOperator {
    #[default]
    #[serde(rename = "or")]
    Any,
    #[serde(rename = "and")]
    All,
}

impl MatchOperator {
    /// Parse the `operator` parameter; invalid values fall back to `or`
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("and") {
            MatchOperator::All
        } else {
            MatchOperator::Any
        }
    }
}

/// Category ids a search is restricted to (or barred from)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFilter {
    pub ids: Vec<i64>,
    pub exclude: bool,
}

/// A validated search, ready to compile
///
/// Built once per request by the orchestrator after admission control and
/// category resolution. Optional filters stay `None` when not supplied so the
/// compiler can omit their clauses entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub keyword: String,
    pub offset: u64,
    pub limit: u64,
    pub sort: SortMode,
    pub direction: SortDirection,
    pub created_after: Option<i64>,
    pub created_before: Option<i64>,
    pub nodes: Option<NodeFilter>,
    pub member: Option<String>,
    pub operator: MatchOperator,
}

impl SearchRequest {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            offset: 0,
            limit: 10,
            sort: SortMode::default(),
            direction: SortDirection::default(),
            created_after: None,
            created_before: None,
            nodes: None,
            member: None,
            operator: MatchOperator::default(),
        }
    }

    pub fn with_window(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort: SortMode, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    pub fn with_created_range(mut self, after: Option<i64>, before: Option<i64>) -> Self {
        self.created_after = after;
        self.created_before = before;
        self
    }

    /// An empty id list is the same as no category filter
    pub fn with_nodes(mut self, ids: Vec<i64>, exclude: bool) -> Self {
        self.nodes = if ids.is_empty() {
            None
        } else {
            Some(NodeFilter { ids, exclude })
        };
        self
    }

    pub fn with_member(mut self, member: Option<String>) -> Self {
        self.member = member.filter(|m| !m.is_empty());
        self
    }

    pub fn with_operator(mut self, operator: MatchOperator) -> Self {
        self.operator = operator;
        self
    }
}
