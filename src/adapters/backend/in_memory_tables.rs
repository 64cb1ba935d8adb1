//! In-memory table gateway and RPC client.
//!
//! Evaluates queries locally with the same filter semantics the REST layer
//! applies. Stored procedures are registered as closures. Useful for
//! testing and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::business::{Query, Row, TableRef};
use crate::ports::{GatewayError, RpcClient, TableGateway};

type RpcHandler = Arc<dyn Fn(&Value) -> Result<Value, GatewayError> + Send + Sync>;

pub struct InMemoryTableGateway {
    tables: RwLock<HashMap<TableRef, Vec<Row>>>,
    functions: RwLock<HashMap<String, RpcHandler>>,
    calls: RwLock<Vec<(String, Value)>>,
    next_id: AtomicU64,
}

impl InMemoryTableGateway {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            functions: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Replaces the rows of `table` (useful for seeding tests).
    pub async fn seed(&self, table: &str, rows: Vec<Row>) {
        self.tables.write().await.insert(TableRef::parse(table), rows);
    }

    /// Registers a stored procedure implementation.
    pub async fn register_function<F>(&self, name: &str, handler: F)
    where
        F: Fn(&Value) -> Result<Value, GatewayError> + Send + Sync + 'static,
    {
        self.functions
            .write()
            .await
            .insert(name.to_string(), Arc::new(handler));
    }

    /// RPC calls made so far, in order.
    pub async fn calls(&self) -> Vec<(String, Value)> {
        self.calls.read().await.clone()
    }

    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(&TableRef::parse(table))
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryTableGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableGateway for InMemoryTableGateway {
    async fn select(&self, table: &TableRef, query: &Query) -> Result<Vec<Row>, GatewayError> {
        let tables = self.tables.read().await;
        let rows = tables.get(table).cloned().unwrap_or_default();
        Ok(query.apply(rows))
    }

    async fn insert(&self, table: &TableRef, mut row: Row) -> Result<Row, GatewayError> {
        if !row.contains_key("id") {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            row.insert("id".to_string(), Value::from(id.to_string()));
        }
        self.tables
            .write()
            .await
            .entry(table.clone())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &TableRef,
        query: &Query,
        patch: Row,
    ) -> Result<Vec<Row>, GatewayError> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|row| query.matches(row)) {
            for (column, value) in &patch {
                row.insert(column.clone(), value.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &TableRef, query: &Query) -> Result<usize, GatewayError> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !query.matches(row));
        Ok(before - rows.len())
    }
}

#[async_trait]
impl RpcClient for InMemoryTableGateway {
    async fn call(&self, function: &str, args: Value) -> Result<Value, GatewayError> {
        self.calls
            .write()
            .await
            .push((function.to_string(), args.clone()));

        let handler = self.functions.read().await.get(function).cloned();
        match handler {
            Some(handler) => handler(&args),
            None => Err(GatewayError::Backend {
                status: 404,
                message: format!("function {} does not exist", function),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_id_when_missing() {
        let gateway = InMemoryTableGateway::new();
        let table = TableRef::parse("people");

        let stored = gateway.insert(&table, row(json!({"name": "Ana"}))).await.unwrap();
        assert_eq!(stored["id"], "1");

        let explicit = gateway
            .insert(&table, row(json!({"id": "p9", "name": "Bia"})))
            .await
            .unwrap();
        assert_eq!(explicit["id"], "p9");
    }

    #[tokio::test]
    async fn select_applies_filters() {
        let gateway = InMemoryTableGateway::new();
        gateway
            .seed(
                "inventory.products",
                vec![
                    row(json!({"id": "1", "quantity": 2, "min_stock": 5})),
                    row(json!({"id": "2", "quantity": 50, "min_stock": 5})),
                ],
            )
            .await;

        let rows = gateway
            .select(
                &TableRef::parse("inventory.products"),
                &Query::new().filter("quantity", crate::domain::business::FilterOp::Lt, 10),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "1");
    }

    #[tokio::test]
    async fn update_merges_patch_into_matches() {
        let gateway = InMemoryTableGateway::new();
        gateway
            .seed("hr.employees", vec![row(json!({"id": "e1", "active": true, "name": "Caio"}))])
            .await;

        let updated = gateway
            .update(
                &TableRef::parse("hr.employees"),
                &Query::new().filter_eq("id", "e1"),
                row(json!({"active": false})),
            )
            .await
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["active"], false);
        assert_eq!(updated[0]["name"], "Caio");
    }

    #[tokio::test]
    async fn delete_counts_removed_rows() {
        let gateway = InMemoryTableGateway::new();
        gateway
            .seed("people", vec![row(json!({"id": "1"})), row(json!({"id": "2"}))])
            .await;

        let removed = gateway
            .delete(&TableRef::parse("people"), &Query::new().filter_eq("id", "1"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(gateway.rows("people").await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_function_is_a_backend_error() {
        let gateway = InMemoryTableGateway::new();
        let err = gateway.call("agent.predict_sales", json!({})).await.unwrap_err();
        assert!(matches!(err, GatewayError::Backend { status: 404, .. }));
        assert_eq!(gateway.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn registered_function_receives_args() {
        let gateway = InMemoryTableGateway::new();
        gateway
            .register_function("inventory.calculate_inventory_value", |args| {
                Ok(json!({"echo": args["warehouse"]}))
            })
            .await;

        let result = gateway
            .call("inventory.calculate_inventory_value", json!({"warehouse": "main"}))
            .await
            .unwrap();
        assert_eq!(result["echo"], "main");
    }
}
