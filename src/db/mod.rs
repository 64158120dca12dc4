//! SQLite persistence for the durable capture ledger.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - Repository layer for captures and price observations

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{CaptureRow, Repository};
