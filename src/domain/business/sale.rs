//! Sales recorded in `sales.sales`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{RecordId, Timestamp, ValidationError};

use super::row::{self, put_opt, Row, RowError};

pub const SALES_TABLE: &str = "sales.sales";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    Paid,
    Cancelled,
    Refunded,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Paid => "paid",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SaleStatus::Pending),
            "paid" => Some(SaleStatus::Paid),
            "cancelled" => Some(SaleStatus::Cancelled),
            "refunded" => Some(SaleStatus::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: RecordId,
    pub customer_id: Option<RecordId>,
    pub total: f64,
    pub status: SaleStatus,
    pub sold_at: Timestamp,
    pub notes: Option<String>,
}

impl Sale {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let status = row::string(row, "status")?;
        Ok(Self {
            id: row::id(row)?,
            customer_id: row::optional_id(row, "customer_id")?,
            total: row::number(row, "total")?,
            status: SaleStatus::parse(&status).ok_or_else(|| {
                RowError::invalid("status", format!("unknown status '{}'", status))
            })?,
            sold_at: row::timestamp(row, "sold_at")?,
            notes: row::optional_string(row, "notes")?,
        })
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::from(self.id.as_str()));
        put_opt(&mut row, "customer_id", self.customer_id.as_ref().map(|id| id.as_str()));
        row.insert("total".to_string(), Value::from(self.total));
        row.insert("status".to_string(), Value::from(self.status.as_str()));
        row.insert("sold_at".to_string(), Value::from(self.sold_at.to_rfc3339()));
        put_opt(&mut row, "notes", self.notes.clone());
        row
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    #[serde(default)]
    pub customer_id: Option<RecordId>,
    pub total: f64,
    #[serde(default = "default_status")]
    pub status: SaleStatus,
    #[serde(default)]
    pub sold_at: Option<Timestamp>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_status() -> SaleStatus {
    SaleStatus::Pending
}

impl NewSale {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(ValidationError::invalid_format(
                "total",
                "must be a non-negative amount",
            ));
        }
        Ok(())
    }

    /// Row to insert; `sold_at` defaults to now.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        put_opt(&mut row, "customer_id", self.customer_id.as_ref().map(|id| id.as_str()));
        row.insert("total".to_string(), Value::from(self.total));
        row.insert("status".to_string(), Value::from(self.status.as_str()));
        let sold_at = self.sold_at.unwrap_or_else(Timestamp::now);
        row.insert("sold_at".to_string(), Value::from(sold_at.to_rfc3339()));
        put_opt(&mut row, "notes", self.notes.clone());
        row
    }
}
