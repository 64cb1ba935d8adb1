//! Business records of the hosted backend.
//!
//! One typed record per table, each with a single `from_row`/`to_row` pair
//! converting between the snake_case row JSON and the record. Queries are
//! composed from `QueryFilter`s and evaluated either remotely or by the
//! in-memory gateway.

mod employee;
mod person;
mod product;
mod query;
mod row;
mod sale;

pub use employee::{Employee, NewEmployee, EMPLOYEES_TABLE};
pub use person::{NewPerson, Person, PersonKind, PEOPLE_TABLE};
pub use product::{NewProduct, Product, PRODUCTS_TABLE};
pub use query::{FilterOp, Query, QueryFilter, SortOrder, TableRef};
pub use row::{as_row, Row, RowError};
pub use sale::{NewSale, Sale, SaleStatus, SALES_TABLE};
