//! Employees stored in `hr.employees`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{RecordId, ValidationError};

use super::row::{self, put_opt, Row, RowError};

pub const EMPLOYEES_TABLE: &str = "hr.employees";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: RecordId,
    pub name: String,
    pub email: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: Option<f64>,
    pub hired_on: Option<NaiveDate>,
    pub active: bool,
}

impl Employee {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let hired_on = row::optional_string(row, "hired_on")?
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|_| RowError::invalid("hired_on", "expected YYYY-MM-DD"))
            })
            .transpose()?;

        Ok(Self {
            id: row::id(row)?,
            name: row::string(row, "name")?,
            email: row::optional_string(row, "email")?,
            department: row::string(row, "department")?,
            position: row::string(row, "position")?,
            salary: row::optional_number(row, "salary")?,
            hired_on,
            active: row::boolean_or(row, "active", true)?,
        })
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::from(self.id.as_str()));
        row.insert("name".to_string(), Value::from(self.name.as_str()));
        put_opt(&mut row, "email", self.email.clone());
        row.insert("department".to_string(), Value::from(self.department.as_str()));
        row.insert("position".to_string(), Value::from(self.position.as_str()));
        put_opt(&mut row, "salary", self.salary);
        put_opt(
            &mut row,
            "hired_on",
            self.hired_on.map(|d| d.format("%Y-%m-%d").to_string()),
        );
        row.insert("active".to_string(), Value::from(self.active));
        row
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub department: String,
    pub position: String,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub hired_on: Option<NaiveDate>,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if self.department.trim().is_empty() {
            return Err(ValidationError::empty_field("department"));
        }
        if self.position.trim().is_empty() {
            return Err(ValidationError::empty_field("position"));
        }
        if matches!(self.salary, Some(salary) if !salary.is_finite() || salary < 0.0) {
            return Err(ValidationError::invalid_format("salary", "cannot be negative"));
        }
        Ok(())
    }

    /// Row to insert; new employees start active.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".to_string(), Value::from(self.name.as_str()));
        put_opt(&mut row, "email", self.email.clone());
        row.insert("department".to_string(), Value::from(self.department.as_str()));
        row.insert("position".to_string(), Value::from(self.position.as_str()));
        put_opt(&mut row, "salary", self.salary);
        put_opt(
            &mut row,
            "hired_on",
            self.hired_on.map(|d| d.format("%Y-%m-%d").to_string()),
        );
        row.insert("active".to_string(), Value::from(true));
        row
    }
}
