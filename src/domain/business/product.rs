//! Inventory products stored in `inventory.products`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{RecordId, ValidationError};

use super::row::{self, put_opt, Row, RowError};

pub const PRODUCTS_TABLE: &str = "inventory.products";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: RecordId,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i64,
    pub min_stock: i64,
    pub unit_price: f64,
}

impl Product {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            id: row::id(row)?,
            sku: row::string(row, "sku")?,
            name: row::string(row, "name")?,
            category: row::optional_string(row, "category")?,
            quantity: row::integer(row, "quantity")?,
            min_stock: row::integer(row, "min_stock").or_else(|err| match err {
                RowError::MissingField(_) => Ok(0),
                other => Err(other),
            })?,
            unit_price: row::number(row, "unit_price")?,
        })
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::from(self.id.as_str()));
        row.insert("sku".to_string(), Value::from(self.sku.as_str()));
        row.insert("name".to_string(), Value::from(self.name.as_str()));
        put_opt(&mut row, "category", self.category.clone());
        row.insert("quantity".to_string(), Value::from(self.quantity));
        row.insert("min_stock".to_string(), Value::from(self.min_stock));
        row.insert("unit_price".to_string(), Value::from(self.unit_price));
        row
    }

    /// At or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    pub fn stock_value(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// Quantity after applying `delta`, rejecting negative stock.
    pub fn adjusted_quantity(&self, delta: i64) -> Result<i64, ValidationError> {
        let next = self.quantity.saturating_add(delta);
        if next < 0 {
            return Err(ValidationError::invalid_format(
                "quantity",
                format!("stock of {} cannot drop by {}", self.quantity, -delta),
            ));
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub min_stock: i64,
    pub unit_price: f64,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sku.trim().is_empty() {
            return Err(ValidationError::empty_field("sku"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if self.quantity < 0 {
            return Err(ValidationError::invalid_format("quantity", "cannot be negative"));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(ValidationError::invalid_format(
                "unit_price",
                "must be a non-negative amount",
            ));
        }
        Ok(())
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("sku".to_string(), Value::from(self.sku.as_str()));
        row.insert("name".to_string(), Value::from(self.name.as_str()));
        put_opt(&mut row, "category", self.category.clone());
        row.insert("quantity".to_string(), Value::from(self.quantity));
        row.insert("min_stock".to_string(), Value::from(self.min_stock));
        row.insert("unit_price".to_string(), Value::from(self.unit_price));
        row
    }
}
