//! Bizhub - business management backend core
//!
//! Decision-maker rules and recommendations, realtime delivery tracking and
//! typed services over the hosted relational backend.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
