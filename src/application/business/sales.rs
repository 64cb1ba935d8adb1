//! Sales records and the sales forecast procedure.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::domain::business::{
    FilterOp, NewSale, Query, Row, Sale, SaleStatus, TableRef, SALES_TABLE,
};
use crate::domain::foundation::{RecordId, Timestamp, ValidationError};
use crate::ports::{RpcClient, TableGateway};

use super::{decode_all, delete_one, fetch_one, update_one, BusinessError};

/// Forecasting agent exposed as a stored procedure.
pub const PREDICT_SALES_FN: &str = "agent.predict_sales";

const MAX_FORECAST_DAYS: u32 = 365;

#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub status: Option<SaleStatus>,
    /// Inclusive lower bound on `sold_at`.
    pub from: Option<Timestamp>,
    /// Exclusive upper bound on `sold_at`.
    pub until: Option<Timestamp>,
}

pub struct SalesService {
    gateway: Arc<dyn TableGateway>,
    rpc: Arc<dyn RpcClient>,
    table: TableRef,
}

impl SalesService {
    pub fn new(gateway: Arc<dyn TableGateway>, rpc: Arc<dyn RpcClient>) -> Self {
        Self {
            gateway,
            rpc,
            table: TableRef::parse(SALES_TABLE),
        }
    }

    /// Sales matching `filter`, newest first.
    pub async fn list(&self, filter: &SaleFilter) -> Result<Vec<Sale>, BusinessError> {
        let mut query = Query::new().order_by("sold_at", false);
        if let Some(status) = filter.status {
            query = query.filter_eq("status", status.as_str());
        }
        if let Some(from) = filter.from {
            query = query.filter("sold_at", FilterOp::Gte, from.to_rfc3339());
        }
        if let Some(until) = filter.until {
            query = query.filter("sold_at", FilterOp::Lt, until.to_rfc3339());
        }

        let rows = self.gateway.select(&self.table, &query).await?;
        decode_all(rows, Sale::from_row)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Sale, BusinessError> {
        fetch_one(self.gateway.as_ref(), &self.table, id, Sale::from_row).await
    }

    pub async fn create(&self, new: &NewSale) -> Result<Sale, BusinessError> {
        new.validate()?;
        let row = self.gateway.insert(&self.table, new.to_row()).await?;
        let sale = Sale::from_row(&row)?;
        tracing::info!(sale_id = %sale.id, total = sale.total, "Sale recorded");
        Ok(sale)
    }

    pub async fn update_status(
        &self,
        id: &RecordId,
        status: SaleStatus,
    ) -> Result<Sale, BusinessError> {
        let mut patch = Row::new();
        patch.insert("status".to_string(), Value::from(status.as_str()));
        update_one(self.gateway.as_ref(), &self.table, id, patch, Sale::from_row).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), BusinessError> {
        delete_one(self.gateway.as_ref(), &self.table, id).await
    }

    /// Runs the forecasting procedure for the next `horizon_days` days.
    ///
    /// The forecast shape belongs to the procedure and is passed through.
    pub async fn predict_sales(&self, horizon_days: u32) -> Result<Value, BusinessError> {
        if horizon_days == 0 || horizon_days > MAX_FORECAST_DAYS {
            return Err(ValidationError::out_of_range(
                "horizonDays",
                1,
                MAX_FORECAST_DAYS as i32,
                horizon_days.min(i32::MAX as u32) as i32,
            )
            .into());
        }
        let forecast = self
            .rpc
            .call(PREDICT_SALES_FN, json!({ "horizon_days": horizon_days }))
            .await?;
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backend::InMemoryTableGateway;
    use crate::domain::business::as_row;

    fn sale_row(id: &str, status: &str, day: i64) -> Row {
        let sold_at = Timestamp::from_unix_secs(1_717_200_000).plus_days(day);
        as_row(json!({
            "id": id,
            "customer_id": "p1",
            "total": 100.0 + day as f64,
            "status": status,
            "sold_at": sold_at.to_rfc3339(),
        }))
        .unwrap()
    }

    async fn service() -> (Arc<InMemoryTableGateway>, SalesService) {
        let gateway = Arc::new(InMemoryTableGateway::new());
        gateway
            .seed(
                SALES_TABLE,
                vec![
                    sale_row("s1", "paid", 0),
                    sale_row("s2", "pending", 1),
                    sale_row("s3", "paid", 2),
                ],
            )
            .await;
        let service = SalesService::new(gateway.clone(), gateway.clone());
        (gateway, service)
    }

    fn ids(sales: &[Sale]) -> Vec<&str> {
        sales.iter().map(|s| s.id.as_str()).collect()
    }

    #[tokio::test]
    async fn list_filters_by_status_newest_first() {
        let (_, service) = service().await;
        let filter = SaleFilter {
            status: Some(SaleStatus::Paid),
            ..Default::default()
        };
        assert_eq!(ids(&service.list(&filter).await.unwrap()), vec!["s3", "s1"]);
    }

    #[tokio::test]
    async fn list_filters_by_date_range() {
        let (_, service) = service().await;
        let start = Timestamp::from_unix_secs(1_717_200_000);
        let filter = SaleFilter {
            from: Some(start.plus_days(1)),
            until: Some(start.plus_days(2)),
            ..Default::default()
        };
        assert_eq!(ids(&service.list(&filter).await.unwrap()), vec!["s2"]);
    }

    #[tokio::test]
    async fn update_status_changes_only_status() {
        let (_, service) = service().await;
        let sale = service
            .update_status(&RecordId::from("s2"), SaleStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(sale.status, SaleStatus::Cancelled);
        assert_eq!(sale.total, 101.0);
    }

    #[tokio::test]
    async fn negative_total_is_rejected() {
        let (gateway, service) = service().await;
        let result = service
            .create(&NewSale {
                customer_id: None,
                total: -1.0,
                status: SaleStatus::Pending,
                sold_at: None,
                notes: None,
            })
            .await;
        assert!(matches!(result, Err(BusinessError::Validation(_))));
        assert_eq!(gateway.rows(SALES_TABLE).await.len(), 3);
    }

    #[tokio::test]
    async fn predict_sales_calls_the_agent() {
        let (gateway, service) = service().await;
        gateway
            .register_function(PREDICT_SALES_FN, |args| {
                Ok(json!({ "days": args["horizon_days"], "expectedTotal": 1234.5 }))
            })
            .await;

        let forecast = service.predict_sales(30).await.unwrap();

        assert_eq!(forecast["days"], 30);
        assert_eq!(gateway.calls().await[0].0, PREDICT_SALES_FN);
        assert!(matches!(
            service.predict_sales(0).await,
            Err(BusinessError::Validation(_))
        ));
    }
}
