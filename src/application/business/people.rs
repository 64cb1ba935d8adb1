//! People: customers, suppliers, leads and partners.

use std::sync::Arc;

use crate::domain::business::{NewPerson, Person, PersonKind, Query, TableRef, PEOPLE_TABLE};
use crate::domain::foundation::RecordId;
use crate::ports::TableGateway;

use super::{decode_all, delete_one, fetch_one, update_one, BusinessError};

#[derive(Debug, Clone, Default)]
pub struct PeopleFilter {
    /// Matched against the email when it contains `@`, otherwise the name.
    pub search: Option<String>,
    pub kind: Option<PersonKind>,
}

pub struct PeopleService {
    gateway: Arc<dyn TableGateway>,
    table: TableRef,
}

impl PeopleService {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self {
            gateway,
            table: TableRef::parse(PEOPLE_TABLE),
        }
    }

    pub async fn list(&self, filter: &PeopleFilter) -> Result<Vec<Person>, BusinessError> {
        let mut query = Query::new().order_by("name", true);
        if let Some(kind) = filter.kind {
            query = query.filter_eq("kind", kind.as_str());
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let column = if search.contains('@') { "email" } else { "name" };
            query = query.contains(column, search);
        }

        let rows = self.gateway.select(&self.table, &query).await?;
        decode_all(rows, Person::from_row)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Person, BusinessError> {
        fetch_one(self.gateway.as_ref(), &self.table, id, Person::from_row).await
    }

    pub async fn create(&self, new: &NewPerson) -> Result<Person, BusinessError> {
        new.validate()?;
        let row = self.gateway.insert(&self.table, new.to_row()).await?;
        let person = Person::from_row(&row)?;
        tracing::info!(person_id = %person.id, kind = person.kind.as_str(), "Person created");
        Ok(person)
    }

    /// Replaces the editable fields of a person.
    pub async fn update(&self, id: &RecordId, fields: &NewPerson) -> Result<Person, BusinessError> {
        fields.validate()?;
        update_one(
            self.gateway.as_ref(),
            &self.table,
            id,
            fields.to_row(),
            Person::from_row,
        )
        .await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), BusinessError> {
        delete_one(self.gateway.as_ref(), &self.table, id).await
    }
}
