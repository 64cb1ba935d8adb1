//! People (customers, suppliers, leads) stored in `people`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{RecordId, Timestamp, ValidationError};

use super::row::{self, put_opt, Row, RowError};

pub const PEOPLE_TABLE: &str = "people";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
    Customer,
    Supplier,
    Lead,
    Partner,
}

impl PersonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonKind::Customer => "customer",
            PersonKind::Supplier => "supplier",
            PersonKind::Lead => "lead",
            PersonKind::Partner => "partner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(PersonKind::Customer),
            "supplier" => Some(PersonKind::Supplier),
            "lead" => Some(PersonKind::Lead),
            "partner" => Some(PersonKind::Partner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: RecordId,
    pub name: String,
    pub kind: PersonKind,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub document: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<Timestamp>,
}

impl Person {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let kind = row::string(row, "kind")?;
        Ok(Self {
            id: row::id(row)?,
            name: row::string(row, "name")?,
            kind: PersonKind::parse(&kind)
                .ok_or_else(|| RowError::invalid("kind", format!("unknown kind '{}'", kind)))?,
            email: row::optional_string(row, "email")?,
            phone: row::optional_string(row, "phone")?,
            document: row::optional_string(row, "document")?,
            notes: row::optional_string(row, "notes")?,
            created_at: row::optional_timestamp(row, "created_at")?,
        })
    }

    pub fn to_row(&self) -> Row {
        let mut row = self.fields().to_row();
        row.insert("id".to_string(), Value::from(self.id.as_str()));
        row
    }

    fn fields(&self) -> NewPerson {
        NewPerson {
            name: self.name.clone(),
            kind: self.kind,
            email: self.email.clone(),
            phone: self.phone.clone(),
            document: self.document.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Input for creating or replacing a person's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    pub name: String,
    pub kind: PersonKind,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewPerson {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if matches!(&self.email, Some(email) if !email.contains('@')) {
            return Err(ValidationError::invalid_format("email", "missing '@'"));
        }
        Ok(())
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".to_string(), Value::from(self.name.as_str()));
        row.insert("kind".to_string(), Value::from(self.kind.as_str()));
        put_opt(&mut row, "email", self.email.clone());
        put_opt(&mut row, "phone", self.phone.clone());
        put_opt(&mut row, "document", self.document.clone());
        put_opt(&mut row, "notes", self.notes.clone());
        row
    }
}
