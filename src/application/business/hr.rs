//! Employees in `hr.employees`.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::business::{Employee, NewEmployee, Query, Row, TableRef, EMPLOYEES_TABLE};
use crate::domain::foundation::RecordId;
use crate::ports::TableGateway;

use super::{decode_all, fetch_one, update_one, BusinessError};

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub active_only: bool,
}

pub struct HrService {
    gateway: Arc<dyn TableGateway>,
    table: TableRef,
}

impl HrService {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self {
            gateway,
            table: TableRef::parse(EMPLOYEES_TABLE),
        }
    }

    pub async fn list(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, BusinessError> {
        let mut query = Query::new().order_by("name", true);
        if let Some(department) = &filter.department {
            query = query.filter_eq("department", department);
        }
        if filter.active_only {
            query = query.filter_eq("active", true);
        }
        let rows = self.gateway.select(&self.table, &query).await?;
        decode_all(rows, Employee::from_row)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Employee, BusinessError> {
        fetch_one(self.gateway.as_ref(), &self.table, id, Employee::from_row).await
    }

    pub async fn create(&self, new: &NewEmployee) -> Result<Employee, BusinessError> {
        new.validate()?;
        let row = self.gateway.insert(&self.table, new.to_row()).await?;
        let employee = Employee::from_row(&row)?;
        tracing::info!(
            employee_id = %employee.id,
            department = %employee.department,
            "Employee hired"
        );
        Ok(employee)
    }

    /// Replaces the editable fields; the active flag is left as is.
    pub async fn update(
        &self,
        id: &RecordId,
        fields: &NewEmployee,
    ) -> Result<Employee, BusinessError> {
        fields.validate()?;
        let mut patch = fields.to_row();
        patch.remove("active");
        update_one(self.gateway.as_ref(), &self.table, id, patch, Employee::from_row).await
    }

    /// Marks an employee inactive. Employees are never deleted.
    pub async fn deactivate(&self, id: &RecordId) -> Result<Employee, BusinessError> {
        let mut patch = Row::new();
        patch.insert("active".to_string(), Value::from(false));
        let employee =
            update_one(self.gateway.as_ref(), &self.table, id, patch, Employee::from_row).await?;
        tracing::info!(employee_id = %employee.id, "Employee deactivated");
        Ok(employee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backend::InMemoryTableGateway;
    use crate::domain::business::as_row;
    use crate::ports::GatewayError;
    use serde_json::json;

    async fn service() -> HrService {
        let gateway = Arc::new(InMemoryTableGateway::new());
        gateway
            .seed(
                EMPLOYEES_TABLE,
                vec![
                    as_row(json!({"id": "e1", "name": "Caio", "department": "vendas",
                        "position": "vendedor", "active": true}))
                    .unwrap(),
                    as_row(json!({"id": "e2", "name": "Bea", "department": "vendas",
                        "position": "gerente", "active": false}))
                    .unwrap(),
                    as_row(json!({"id": "e3", "name": "Alice", "department": "estoque",
                        "position": "auxiliar", "active": true}))
                    .unwrap(),
                ],
            )
            .await;
        HrService::new(gateway)
    }

    fn names(employees: &[Employee]) -> Vec<&str> {
        employees.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn list_filters_department_and_active() {
        let service = service().await;
        let filter = EmployeeFilter {
            department: Some("vendas".to_string()),
            active_only: true,
        };
        assert_eq!(names(&service.list(&filter).await.unwrap()), vec!["Caio"]);

        let everyone = service.list(&EmployeeFilter::default()).await.unwrap();
        assert_eq!(names(&everyone), vec!["Alice", "Bea", "Caio"]);
    }

    #[tokio::test]
    async fn deactivate_keeps_the_record() {
        let service = service().await;
        let id = RecordId::from("e1");

        assert!(!service.deactivate(&id).await.unwrap().active);
        assert!(!service.get(&id).await.unwrap().active);
    }

    #[tokio::test]
    async fn update_does_not_reactivate() {
        let service = service().await;
        let id = RecordId::from("e2");
        let fields = NewEmployee {
            name: "Bea Santos".to_string(),
            email: None,
            department: "vendas".to_string(),
            position: "diretora".to_string(),
            salary: Some(9000.0),
            hired_on: None,
        };

        let updated = service.update(&id, &fields).await.unwrap();
        assert_eq!(updated.position, "diretora");
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn deactivating_unknown_employee_is_not_found() {
        let service = service().await;
        let result = service.deactivate(&RecordId::from("missing")).await;
        assert!(matches!(
            result,
            Err(BusinessError::Gateway(GatewayError::NotFound(_)))
        ));
    }
}
