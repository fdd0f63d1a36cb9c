//! Order analytics - recomputes order reporting tables from a transactional
//! orders table.
//!
//! This library exposes the core modules for the binary and the integration
//! tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod etl;
