use std::fmt;

use serde_json::{json, Value};
use thiserror::Error;

/// Operators accepted by the Quickbase query language.
/// <https://help.quickbase.com/api-guide/do_query.html#queryOperators>
pub const QUERY_OPERATORS: [&str; 20] = [
    "CT", "XCT", "HAS", "XHAS", "EX", "TV", "XTV", "XEX", "SW", "XSW", "BF", "OBF", "AF", "OAF",
    "IR", "XIR", "LT", "LTE", "GT", "GTE",
];

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0:?} is not a supported query operator")]
    UnsupportedOperator(String),

    #[error("joined where clauses require a list value, got {0}")]
    JoinRequiresList(Value),
}

/// Builder for a `{<fid>.<OPERATOR>.<value>}` filter expression.
///
/// The operator is checked against [`QUERY_OPERATORS`] at construction, so an
/// unsupported operator fails before any query is issued.
#[derive(Debug, Clone)]
pub struct Where {
    fid: i64,
    operator: String,
    value: Value,
}

impl Where {
    pub fn new(fid: i64, operator: &str, value: impl Into<Value>) -> Result<Self, QueryError> {
        if !QUERY_OPERATORS.contains(&operator) {
            return Err(QueryError::UnsupportedOperator(operator.to_string()));
        }
        Ok(Self {
            fid,
            operator: operator.to_string(),
            value: value.into(),
        })
    }

    /// Render the filter expression, e.g. `{3.EX.12345}`.
    pub fn build(&self) -> String {
        query_fragment(self.fid, &self.operator, &self.value)
    }

    /// Render one expression per element of a list value, joined with the
    /// given connective: `{3.EX.1}OR{3.EX.2}OR{3.EX.3}`.
    pub fn build_joined(&self, join: &str) -> Result<String, QueryError> {
        let items = match &self.value {
            Value::Array(items) => items,
            other => return Err(QueryError::JoinRequiresList(other.clone())),
        };
        let fragments: Vec<String> = items
            .iter()
            .map(|v| query_fragment(self.fid, &self.operator, v))
            .collect();
        Ok(fragments.join(join))
    }
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

fn query_fragment(fid: i64, operator: &str, value: &Value) -> String {
    let rendered = match value {
        // string values are quoted in the query language
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    };
    format!("{{{fid}.{operator}.{rendered}}}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Builder for the `sortBy` request parameter: pairs of field id and order.
#[derive(Debug, Clone, Default)]
pub struct Sort(pub Vec<(i64, SortOrder)>);

impl Sort {
    pub fn build(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|(fid, order)| json!({"fieldId": fid, "order": order.as_str()}))
                .collect(),
        )
    }
}

/// Builder for the `groupBy` request parameter: pairs of field id and
/// grouping strategy (e.g. `"equal-values"`).
#[derive(Debug, Clone, Default)]
pub struct Group(pub Vec<(i64, String)>);

impl Group {
    pub fn build(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|(fid, grouping)| json!({"fieldId": fid, "grouping": grouping}))
                .collect(),
        )
    }
}
