//! RPC port - stored procedures of the hosted backend.

use async_trait::async_trait;
use serde_json::Value;

use super::GatewayError;

#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Calls `function` (optionally schema-qualified, e.g. `agent.predict_sales`).
    async fn call(&self, function: &str, args: Value) -> Result<Value, GatewayError>;
}
