//! Inventory products, stock adjustments and valuation.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::domain::business::{NewProduct, Product, Query, Row, TableRef, PRODUCTS_TABLE};
use crate::domain::foundation::RecordId;
use crate::ports::{GatewayError, RpcClient, TableGateway};

use super::{decode_all, delete_one, fetch_one, update_one, BusinessError};

/// Procedure returning the total value of the stock on hand.
pub const INVENTORY_VALUE_FN: &str = "inventory.calculate_inventory_value";

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive match on the product name.
    pub search: Option<String>,
    pub category: Option<String>,
}

pub struct InventoryService {
    gateway: Arc<dyn TableGateway>,
    rpc: Arc<dyn RpcClient>,
    table: TableRef,
}

impl InventoryService {
    pub fn new(gateway: Arc<dyn TableGateway>, rpc: Arc<dyn RpcClient>) -> Self {
        Self {
            gateway,
            rpc,
            table: TableRef::parse(PRODUCTS_TABLE),
        }
    }

    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, BusinessError> {
        let mut query = Query::new().order_by("name", true);
        if let Some(category) = &filter.category {
            query = query.filter_eq("category", category);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.contains("name", search);
        }
        let rows = self.gateway.select(&self.table, &query).await?;
        decode_all(rows, Product::from_row)
    }

    /// Products at or below their minimum stock.
    ///
    /// The comparison is between two columns of the same row, so it is
    /// evaluated here rather than in the query.
    pub async fn low_stock(&self) -> Result<Vec<Product>, BusinessError> {
        let query = Query::new().order_by("quantity", true);
        let rows = self.gateway.select(&self.table, &query).await?;
        Ok(decode_all(rows, Product::from_row)?
            .into_iter()
            .filter(Product::is_low_stock)
            .collect())
    }

    pub async fn get(&self, id: &RecordId) -> Result<Product, BusinessError> {
        fetch_one(self.gateway.as_ref(), &self.table, id, Product::from_row).await
    }

    pub async fn create(&self, new: &NewProduct) -> Result<Product, BusinessError> {
        new.validate()?;
        let row = self.gateway.insert(&self.table, new.to_row()).await?;
        Ok(Product::from_row(&row)?)
    }

    /// Adds `delta` (negative to remove) to the stock of a product.
    pub async fn adjust_stock(&self, id: &RecordId, delta: i64) -> Result<Product, BusinessError> {
        let product = self.get(id).await?;
        let quantity = product.adjusted_quantity(delta)?;

        let mut patch = Row::new();
        patch.insert("quantity".to_string(), Value::from(quantity));
        let updated =
            update_one(self.gateway.as_ref(), &self.table, id, patch, Product::from_row).await?;

        if updated.is_low_stock() {
            tracing::warn!(
                product_id = %updated.id,
                quantity = updated.quantity,
                min_stock = updated.min_stock,
                "Product at or below minimum stock"
            );
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), BusinessError> {
        delete_one(self.gateway.as_ref(), &self.table, id).await
    }

    /// Total stock value as computed by the backend.
    ///
    /// Accepts a bare number or an object with `total_value` or `value`.
    pub async fn calculate_inventory_value(&self) -> Result<f64, BusinessError> {
        let result = self.rpc.call(INVENTORY_VALUE_FN, json!({})).await?;
        let value = match &result {
            Value::Number(n) => n.as_f64(),
            Value::Object(map) => map
                .get("total_value")
                .or_else(|| map.get("value"))
                .and_then(Value::as_f64),
            _ => None,
        };
        value.ok_or_else(|| {
            GatewayError::InvalidResponse(format!("unexpected inventory value: {}", result)).into()
        })
    }
}
