//! slawatch - Working-hours SLA tracker for support tickets
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod data;
pub mod export;
pub mod report;
pub mod search;
pub mod sla;
pub mod store;
pub mod tracker;
pub mod util;
pub mod watch;
