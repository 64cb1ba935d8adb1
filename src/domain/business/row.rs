//! Row access helpers shared by the record adapters.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, RecordId, Timestamp};

/// A table row as returned by the backend.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Row is missing required field '{0}'")]
    MissingField(String),

    #[error("Row field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Expected a JSON object row")]
    NotAnObject,
}

impl RowError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        RowError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<RowError> for DomainError {
    fn from(err: RowError) -> Self {
        DomainError::new(ErrorCode::BackendError, err.to_string())
    }
}

/// Unwraps a JSON value into a row.
pub fn as_row(value: Value) -> Result<Row, RowError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RowError::NotAnObject),
    }
}

fn present<'a>(row: &'a Row, field: &str) -> Option<&'a Value> {
    row.get(field).filter(|v| !v.is_null())
}

pub(crate) fn id(row: &Row) -> Result<RecordId, RowError> {
    match present(row, "id") {
        Some(Value::String(s)) => {
            RecordId::parse(s.clone()).map_err(|e| RowError::invalid("id", e.to_string()))
        }
        Some(Value::Number(n)) => Ok(RecordId::from(n.to_string().as_str())),
        Some(_) => Err(RowError::invalid("id", "expected string or number")),
        None => Err(RowError::MissingField("id".to_string())),
    }
}

pub(crate) fn string(row: &Row, field: &str) -> Result<String, RowError> {
    optional_string(row, field)?.ok_or_else(|| RowError::MissingField(field.to_string()))
}

pub(crate) fn optional_string(row: &Row, field: &str) -> Result<Option<String>, RowError> {
    match present(row, field) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RowError::invalid(field, "expected string")),
        None => Ok(None),
    }
}

pub(crate) fn number(row: &Row, field: &str) -> Result<f64, RowError> {
    optional_number(row, field)?.ok_or_else(|| RowError::MissingField(field.to_string()))
}

pub(crate) fn optional_number(row: &Row, field: &str) -> Result<Option<f64>, RowError> {
    match present(row, field) {
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| RowError::invalid(field, "not representable as f64")),
        // numeric columns arrive as strings from some views
        Some(Value::String(s)) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| RowError::invalid(field, "expected number")),
        Some(_) => Err(RowError::invalid(field, "expected number")),
        None => Ok(None),
    }
}

pub(crate) fn integer(row: &Row, field: &str) -> Result<i64, RowError> {
    match present(row, field) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| RowError::invalid(field, "expected integer")),
        Some(_) => Err(RowError::invalid(field, "expected integer")),
        None => Err(RowError::MissingField(field.to_string())),
    }
}

pub(crate) fn boolean_or(row: &Row, field: &str, default: bool) -> Result<bool, RowError> {
    match present(row, field) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(RowError::invalid(field, "expected boolean")),
        None => Ok(default),
    }
}

pub(crate) fn optional_id(row: &Row, field: &str) -> Result<Option<RecordId>, RowError> {
    match present(row, field) {
        Some(Value::String(s)) => Ok(Some(RecordId::from(s.as_str()))),
        Some(Value::Number(n)) => Ok(Some(RecordId::from(n.to_string().as_str()))),
        Some(_) => Err(RowError::invalid(field, "expected id")),
        None => Ok(None),
    }
}

pub(crate) fn optional_timestamp(row: &Row, field: &str) -> Result<Option<Timestamp>, RowError> {
    match present(row, field) {
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|_| RowError::invalid(field, "expected RFC 3339 timestamp")),
        None => Ok(None),
    }
}

pub(crate) fn timestamp(row: &Row, field: &str) -> Result<Timestamp, RowError> {
    optional_timestamp(row, field)?.ok_or_else(|| RowError::MissingField(field.to_string()))
}

/// Inserts `value` unless it is `None`.
pub(crate) fn put_opt<T: Into<Value>>(row: &mut Row, field: &str, value: Option<T>) {
    if let Some(value) = value {
        row.insert(field.to_string(), value.into());
    }
}
