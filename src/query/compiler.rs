use std::collections::BTreeMap;

use super::{
    BoolClause, CombineMode, ConstantScoreClause, FieldModifier, FunctionScoreClause, Highlight,
    HighlightField, MatchClause, MinimumShouldMatch, NestedClause, NestedScoreMode, PhraseClause,
    Query, RangeClause, ScoreFunction, SearchBody, SearchRequest, SortField, SortMode, TermClause,
    TermValue,
};

/// Analyzer used for matching and for clause counting
pub const PRIMARY_ANALYZER: &str = "ik_smart";

/// Finer-grained analyzer used by the exact-phrase bonus
pub const PHRASE_ANALYZER: &str = "ik_max_word";

/// Per-field threshold in time-ordered mode: all terms up to two, 70% beyond
pub const CHRONOLOGICAL_MINIMUM_SHOULD_MATCH: &str = "2<70%";

pub const TITLE_BOOST: f64 = 3.0;
pub const CONTENT_BOOST: f64 = 2.0;
pub const ALL_REPLY_BOOST: f64 = 1.5;
pub const PHRASE_BONUS_WEIGHT: f64 = 50.0;

const SOURCE_FIELDS: [&str; 7] = [
    "title", "content", "created", "id", "node", "replies", "member",
];

const HIGHLIGHT_FIELDS: [&str; 4] = [
    "title",
    "content",
    "postscript_list.content",
    "reply_list.content",
];

const HIGHLIGHT_FRAGMENT_SIZE: u32 = 80;

/// Compile a validated request into the engine's search body
///
/// Pure and deterministic: the same request always yields an identical body.
pub fn compile(request: &SearchRequest) -> SearchBody {
    let (query, sort) = match request.sort {
        SortMode::Relevance => (relevance_query(request), Vec::new()),
        SortMode::Chronological => (
            chronological_query(request),
            vec![SortField {
                field: "created".to_string(),
                direction: request.direction,
            }],
        ),
    };

    SearchBody {
        from: request.offset,
        size: request.limit,
        source: SOURCE_FIELDS.iter().map(|f| f.to_string()).collect(),
        highlight: highlight(),
        query,
        sort,
    }
}

/// Filters shared by both ranking modes, as `(must, must_not)`
fn hard_filters(request: &SearchRequest) -> (Vec<Query>, Vec<Query>) {
    let mut must: Vec<Query> = Vec::new();
    let mut must_not: Vec<Query> = vec![TermClause::new("deleted", TermValue::Bool(true)).into()];

    if request.created_after.is_some() || request.created_before.is_some() {
        must.push(
            RangeClause {
                field: "created".to_string(),
                gte: request.created_after,
                lte: request.created_before,
                format: Some("epoch_second".to_string()),
            }
            .into(),
        );
    }

    if let Some(nodes) = &request.nodes {
        let value = match nodes.ids.as_slice() {
            [id] => TermValue::Int(*id),
            ids => TermValue::Many(ids.to_vec()),
        };
        let clause: Query = TermClause::new("node", value).into();
        if nodes.exclude {
            must_not.push(clause);
        } else {
            must.push(clause);
        }
    }

    if let Some(member) = &request.member {
        must.push(TermClause::new("member", TermValue::Text(member.clone())).into());
    }

    (must, must_not)
}

/// Once a hard filter sits in `must`, `should` no longer gates matching unless told to
fn should_threshold(must: &[Query]) -> Option<MinimumShouldMatch> {
    if must.is_empty() {
        None
    } else {
        Some(MinimumShouldMatch::Count(1))
    }
}

fn keyword_match(field: &str, request: &SearchRequest) -> MatchClause {
    MatchClause::new(field, request.keyword.as_str())
        .analyzer(PRIMARY_ANALYZER)
        .operator(request.operator)
}

fn postscript_match(clause: MatchClause) -> Query {
    NestedClause {
        path: "postscript_list".to_string(),
        score_mode: NestedScoreMode::Max,
        query: Box::new(clause.into()),
    }
    .into()
}

fn relevance_query(request: &SearchRequest) -> Query {
    let (must, must_not) = hard_filters(request);

    let body_signals = BoolClause {
        should: vec![
            keyword_match("content", request).boost(CONTENT_BOOST).into(),
            postscript_match(
                keyword_match("postscript_list.content", request).boost(CONTENT_BOOST),
            ),
        ],
        ..Default::default()
    };

    let should: Vec<Query> = vec![
        keyword_match("title", request).boost(TITLE_BOOST).into(),
        body_signals.into(),
        keyword_match("all_reply", request)
            .boost(ALL_REPLY_BOOST)
            .into(),
    ];

    let minimum_should_match = should_threshold(&must);
    let base = BoolClause {
        must,
        must_not,
        should,
        minimum_should_match,
    };

    FunctionScoreClause {
        query: Box::new(base.into()),
        functions: vec![
            ScoreFunction::Weighted {
                filter: PhraseClause::new("all_content", request.keyword.as_str())
                    .analyzer(PHRASE_ANALYZER)
                    .into(),
                weight: PHRASE_BONUS_WEIGHT,
            },
            ScoreFunction::FieldValueFactor {
                field: "bonus".to_string(),
                missing: 0.0,
                modifier: FieldModifier::None,
                factor: 1.0,
            },
        ],
        score_mode: CombineMode::Sum,
        boost_mode: CombineMode::Sum,
    }
    .into()
}

fn chronological_query(request: &SearchRequest) -> Query {
    let (must, must_not) = hard_filters(request);

    let selective = |field: &str| {
        keyword_match(field, request).minimum_should_match(CHRONOLOGICAL_MINIMUM_SHOULD_MATCH)
    };

    let body_signals = BoolClause {
        should: vec![
            selective("content").into(),
            postscript_match(selective("postscript_list.content")),
        ],
        ..Default::default()
    };

    let should: Vec<Query> = vec![
        selective("title").into(),
        body_signals.into(),
        PhraseClause::new("all_reply", request.keyword.as_str())
            .analyzer(PRIMARY_ANALYZER)
            .into(),
    ];

    let minimum_should_match = should_threshold(&must);
    let filter = BoolClause {
        must,
        must_not,
        should,
        minimum_should_match,
    };

    ConstantScoreClause {
        filter: Box::new(filter.into()),
    }
    .into()
}

fn highlight() -> Highlight {
    let fields: BTreeMap<String, HighlightField> = HIGHLIGHT_FIELDS
        .iter()
        .map(|field| {
            (
                field.to_string(),
                HighlightField {
                    number_of_fragments: 1,
                },
            )
        })
        .collect();

    Highlight {
        order: "score".to_string(),
        fragment_size: HIGHLIGHT_FRAGMENT_SIZE,
        fields,
    }
}
