//! Composable row queries.
//!
//! A `Query` is a conjunction of column filters plus optional ordering and
//! limit. It renders to REST query parameters (`column=op.value`) and can be
//! evaluated locally against rows.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use super::Row;

/// A possibly schema-qualified table, e.g. `inventory.products`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Parses `schema.table` or a bare `table`.
    pub fn parse(qualified: &str) -> Self {
        match qualified.split_once('.') {
            Some((schema, name)) => Self {
                schema: Some(schema.to_string()),
                name: name.to_string(),
            },
            None => Self {
                schema: None,
                name: qualified.to_string(),
            },
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Case-insensitive `LIKE` with `%` wildcards.
    Ilike,
    Gte,
    Lte,
    Lt,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ilike => "ilike",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
            FilterOp::Lt => "lt",
        }
    }

    /// Parses the `op` part of an `op.value` expression.
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "eq" => Some(FilterOp::Eq),
            "ilike" => Some(FilterOp::Ilike),
            "gte" => Some(FilterOp::Gte),
            "lte" => Some(FilterOp::Lte),
            "lt" => Some(FilterOp::Lt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl QueryFilter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.to_string(),
        }
    }

    /// Parses a `column=op.value` expression such as `id=eq.42`.
    pub fn parse(expr: &str) -> Option<Self> {
        let (column, rest) = expr.split_once('=')?;
        let (op, value) = rest.split_once('.')?;
        Some(Self::new(column, FilterOp::parse(op)?, value))
    }

    /// Query parameter value, e.g. `eq.42`.
    pub fn param_value(&self) -> String {
        format!("{}.{}", self.op.as_str(), self.value)
    }

    /// Evaluates the filter against a row. Missing columns never match.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(cell) = row.get(&self.column).and_then(cell_text) else {
            return false;
        };

        match self.op {
            FilterOp::Eq => cell == self.value,
            FilterOp::Ilike => like(&cell.to_lowercase(), &self.value.to_lowercase()),
            FilterOp::Gte => compare(&cell, &self.value) != Ordering::Less,
            FilterOp::Lte => compare(&cell, &self.value) != Ordering::Greater,
            FilterOp::Lt => compare(&cell, &self.value) == Ordering::Less,
        }
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column, self.param_value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub column: String,
    pub ascending: bool,
}

/// Filters, ordering and limit of a select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<QueryFilter>,
    pub order: Option<SortOrder>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl ToString) -> Self {
        self.filters.push(QueryFilter::new(column, op, value));
        self
    }

    pub fn filter_eq(self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    /// Adds a case-insensitive substring match.
    pub fn contains(self, column: impl Into<String>, needle: &str) -> Self {
        self.filter(column, FilterOp::Ilike, format!("%{}%", needle))
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(SortOrder {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// REST query parameters for this query.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| (f.column.clone(), f.param_value()))
            .collect();
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Filters, sorts and truncates `rows` locally.
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let mut selected: Vec<Row> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if let Some(order) = &self.order {
            selected.sort_by(|a, b| {
                let a = a.get(&order.column).and_then(cell_text).unwrap_or_default();
                let b = b.get(&order.column).and_then(cell_text).unwrap_or_default();
                let ordering = compare(&a, &b);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Numeric comparison when both sides parse as numbers, text otherwise.
fn compare(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// `LIKE` matching where `%` is any run of characters and `_` any single one.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}
