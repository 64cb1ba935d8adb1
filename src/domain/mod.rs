//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `decision` - Rules, decisions and the option recommendation heuristic
//! - `delivery` - Delivery tracking payloads and signed tracking links
//! - `business` - Typed records of the hosted backend tables

pub mod business;
pub mod decision;
pub mod delivery;
pub mod foundation;
