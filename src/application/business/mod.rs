//! CRUD services over the hosted backend's business tables.
//!
//! Each service owns one table and converts rows through the record's
//! `from_row`/`to_row` pair. Failures are reported to the caller and leave
//! nothing cached; there are no retries.

mod hr;
mod inventory;
mod people;
mod sales;

pub use hr::{EmployeeFilter, HrService};
pub use inventory::{InventoryService, ProductFilter, INVENTORY_VALUE_FN};
pub use people::{PeopleFilter, PeopleService};
pub use sales::{SaleFilter, SalesService, PREDICT_SALES_FN};

use thiserror::Error;

use crate::domain::business::{Query, Row, RowError, TableRef};
use crate::domain::foundation::{DomainError, ErrorCode, RecordId, ValidationError};
use crate::ports::{GatewayError, TableGateway};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BusinessError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl BusinessError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BusinessError::Validation(_) => ErrorCode::ValidationFailed,
            BusinessError::Gateway(e) => e.code(),
        }
    }
}

impl From<RowError> for BusinessError {
    fn from(err: RowError) -> Self {
        BusinessError::Gateway(GatewayError::Row(err))
    }
}

impl From<BusinessError> for DomainError {
    fn from(err: BusinessError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

fn by_id(id: &RecordId) -> Query {
    Query::new().filter_eq("id", id)
}

fn decode_all<T>(
    rows: Vec<Row>,
    decode: fn(&Row) -> Result<T, RowError>,
) -> Result<Vec<T>, BusinessError> {
    rows.iter()
        .map(|row| decode(row).map_err(BusinessError::from))
        .collect()
}

async fn fetch_one<T>(
    gateway: &dyn TableGateway,
    table: &TableRef,
    id: &RecordId,
    decode: fn(&Row) -> Result<T, RowError>,
) -> Result<T, BusinessError> {
    let row = gateway
        .select_one(table, &by_id(id))
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("{} {}", table, id)))?;
    Ok(decode(&row)?)
}

async fn update_one<T>(
    gateway: &dyn TableGateway,
    table: &TableRef,
    id: &RecordId,
    patch: Row,
    decode: fn(&Row) -> Result<T, RowError>,
) -> Result<T, BusinessError> {
    let rows = gateway.update(table, &by_id(id), patch).await?;
    let row = rows
        .first()
        .ok_or_else(|| GatewayError::NotFound(format!("{} {}", table, id)))?;
    Ok(decode(row)?)
}

async fn delete_one(
    gateway: &dyn TableGateway,
    table: &TableRef,
    id: &RecordId,
) -> Result<(), BusinessError> {
    if gateway.delete(table, &by_id(id)).await? == 0 {
        return Err(GatewayError::NotFound(format!("{} {}", table, id)).into());
    }
    Ok(())
}
