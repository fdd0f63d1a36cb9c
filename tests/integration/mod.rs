//! Integration tests for the order analytics runner.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable to run them.

pub mod pipeline_test;
pub mod schema_test;
