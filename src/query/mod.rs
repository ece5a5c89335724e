//! Typed query tree for the search engine's JSON query DSL
//!
//! Every clause the compiler can emit is a variant of [`Query`], so a
//! malformed body is a type error here instead of a rejection from the engine.
//! Serialization produces the engine's wire format.

pub mod compiler;
pub mod request;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub use compiler::compile;
pub use request::{MatchOperator, NodeFilter, SearchRequest, SortDirection, SortMode};

/// A node of the query tree
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Match(MatchClause),
    MatchPhrase(PhraseClause),
    Term(TermClause),
    Range(RangeClause),
    Nested(NestedClause),
    Bool(BoolClause),
    FunctionScore(FunctionScoreClause),
    ConstantScore(ConstantScoreClause),
}

impl Query {
    /// Render this clause as engine JSON
    pub fn to_json(&self) -> Value {
        match self {
            Query::Match(clause) => json!({ "match": { clause.field.as_str(): clause } }),
            Query::MatchPhrase(clause) => {
                json!({ "match_phrase": { clause.field.as_str(): clause } })
            }
            Query::Term(clause) => match &clause.value {
                TermValue::Many(values) => json!({ "terms": { clause.field.as_str(): values } }),
                value => json!({ "term": { clause.field.as_str(): value } }),
            },
            Query::Range(clause) => json!({ "range": { clause.field.as_str(): clause } }),
            Query::Nested(clause) => json!({ "nested": clause }),
            Query::Bool(clause) => json!({ "bool": clause }),
            Query::FunctionScore(clause) => json!({ "function_score": clause }),
            Query::ConstantScore(clause) => json!({ "constant_score": clause }),
        }
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Full-text match against one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchClause {
    #[serde(skip)]
    pub field: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<MatchOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
}

impl MatchClause {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            analyzer: None,
            operator: None,
            minimum_should_match: None,
            boost: None,
        }
    }

    pub fn analyzer(mut self, analyzer: &str) -> Self {
        self.analyzer = Some(analyzer.to_string());
        self
    }

    pub fn operator(mut self, operator: MatchOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn minimum_should_match(mut self, expr: &str) -> Self {
        self.minimum_should_match = Some(expr.to_string());
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl From<MatchClause> for Query {
    fn from(clause: MatchClause) -> Self {
        Query::Match(clause)
    }
}

/// Exact phrase match against one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseClause {
    #[serde(skip)]
    pub field: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    pub slop: u32,
}

impl PhraseClause {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            analyzer: None,
            slop: 0,
        }
    }

    pub fn analyzer(mut self, analyzer: &str) -> Self {
        self.analyzer = Some(analyzer.to_string());
        self
    }
}

impl From<PhraseClause> for Query {
    fn from(clause: PhraseClause) -> Self {
        Query::MatchPhrase(clause)
    }
}

/// Exact value(s) a keyword field must hold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TermValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Many(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermClause {
    pub field: String,
    pub value: TermValue,
}

impl TermClause {
    pub fn new(field: impl Into<String>, value: TermValue) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }
}

impl From<TermClause> for Query {
    fn from(clause: TermClause) -> Self {
        Query::Term(clause)
    }
}

/// Inclusive numeric/date bounds on one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeClause {
    #[serde(skip)]
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl From<RangeClause> for Query {
    fn from(clause: RangeClause) -> Self {
        Query::Range(clause)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(dead_code)]
pub enum NestedScoreMode {
    Avg,
    Max,
    Min,
    Sum,
    None,
}

/// Query evaluated against sub-documents under `path`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedClause {
    pub path: String,
    pub score_mode: NestedScoreMode,
    pub query: Box<Query>,
}

impl From<NestedClause> for Query {
    fn from(clause: NestedClause) -> Self {
        Query::Nested(clause)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MinimumShouldMatch {
    Count(u32),
    Expr(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolClause {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<MinimumShouldMatch>,
}

impl From<BoolClause> for Query {
    fn from(clause: BoolClause) -> Self {
        Query::Bool(clause)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(dead_code)]
pub enum CombineMode {
    Multiply,
    Sum,
    Avg,
    First,
    Max,
    Min,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(dead_code)]
pub enum FieldModifier {
    None,
    Log,
    Log1p,
    Sqrt,
}

/// Auxiliary scoring function layered on a function-score query
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreFunction {
    /// Fixed weight added to documents matching `filter`
    Weighted { filter: Query, weight: f64 },
    /// Numeric document field folded into the score
    FieldValueFactor {
        field: String,
        missing: f64,
        modifier: FieldModifier,
        factor: f64,
    },
}

impl Serialize for ScoreFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = match self {
            ScoreFunction::Weighted { filter, weight } => {
                json!({ "filter": filter, "weight": weight })
            }
            ScoreFunction::FieldValueFactor {
                field,
                missing,
                modifier,
                factor,
            } => json!({
                "field_value_factor": {
                    "field": field,
                    "missing": missing,
                    "modifier": modifier,
                    "factor": factor,
                }
            }),
        };
        value.serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionScoreClause {
    pub query: Box<Query>,
    pub functions: Vec<ScoreFunction>,
    pub score_mode: CombineMode,
    pub boost_mode: CombineMode,
}

impl From<FunctionScoreClause> for Query {
    fn from(clause: FunctionScoreClause) -> Self {
        Query::FunctionScore(clause)
    }
}

/// Non-scoring wrapper: every match gets the same score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantScoreClause {
    pub filter: Box<Query>,
}

impl From<ConstantScoreClause> for Query {
    fn from(clause: ConstantScoreClause) -> Self {
        Query::ConstantScore(clause)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightField {
    pub number_of_fragments: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub order: String,
    pub fragment_size: u32,
    pub fields: BTreeMap<String, HighlightField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

impl Serialize for SortField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        json!({ self.field.as_str(): { "order": self.direction } }).serialize(serializer)
    }
}

/// Complete request body sent to the engine's `_search` endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchBody {
    pub from: u64,
    pub size: u64,
    #[serde(rename = "_source")]
    pub source: Vec<String>,
    pub highlight: Highlight,
    pub query: Query,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_clause_serialization() {
        let query: Query = MatchClause::new("title", "rust async")
            .analyzer("ik_smart")
            .operator(MatchOperator::All)
            .boost(3.0)
            .into();

        assert_eq!(
            query.to_json(),
            json!({
                "match": {
                    "title": {
                        "query": "rust async",
                        "analyzer": "ik_smart",
                        "operator": "and",
                        "boost": 3.0
                    }
                }
            })
        );
    }

    #[test]
    fn test_term_clause_single_and_many() {
        let single: Query = TermClause::new("deleted", TermValue::Bool(true)).into();
        assert_eq!(single.to_json(), json!({ "term": { "deleted": true } }));

        let many: Query = TermClause::new("node", TermValue::Many(vec![3, 7])).into();
        assert_eq!(many.to_json(), json!({ "terms": { "node": [3, 7] } }));
    }

    #[test]
    fn test_bool_clause_skips_empty_sections() {
        let query: Query = BoolClause {
            should: vec![MatchClause::new("content", "x").into()],
            ..Default::default()
        }
        .into();

        let json = query.to_json();
        assert!(json["bool"].get("must").is_none());
        assert!(json["bool"].get("must_not").is_none());
        assert!(json["bool"].get("minimum_should_match").is_none());
        assert_eq!(json["bool"]["should"][0]["match"]["content"]["query"], "x");
    }

    #[test]
    fn test_score_function_serialization() {
        let functions = vec![
            ScoreFunction::Weighted {
                filter: PhraseClause::new("all_content", "hello").into(),
                weight: 50.0,
            },
            ScoreFunction::FieldValueFactor {
                field: "bonus".to_string(),
                missing: 0.0,
                modifier: FieldModifier::None,
                factor: 1.0,
            },
        ];

        let json = serde_json::to_value(&functions).unwrap();
        assert_eq!(json[0]["weight"], 50.0);
        assert_eq!(json[0]["filter"]["match_phrase"]["all_content"]["slop"], 0);
        assert_eq!(json[1]["field_value_factor"]["field"], "bonus");
        assert_eq!(json[1]["field_value_factor"]["modifier"], "none");
    }

    #[test]
    fn test_sort_field_serialization() {
        let sort = SortField {
            field: "created".to_string(),
            direction: SortDirection::Ascending,
        };
        assert_eq!(
            serde_json::to_value(&sort).unwrap(),
            json!({ "created": { "order": "asc" } })
        );
    }
}
