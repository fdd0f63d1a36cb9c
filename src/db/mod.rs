//! Storage abstraction for the reporting store.
//!
//! Provides a trait-based interface over the source and destination
//! relations, allowing the Postgres backend and the in-memory test backend to
//! be used interchangeably. The upsert contract is "exactly one record per
//! key, last-write-wins on the listed fields"; any keyed store that honors it
//! is a valid implementation.

mod mock;
mod postgres;
mod types;

pub use mock::{FailingReportStore, FailingStep, MockReportStore};
pub use postgres::PostgresStore;
pub use types::{DailyVolume, OrderRecord, ProductSales};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Creates a report store for the given connection configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn ReportStore>> {
    let store = PostgresStore::connect(config).await?;
    Ok(Box::new(store))
}

/// Trait defining the interface to the reporting store.
///
/// Each method is one independently atomic unit of work against the store;
/// no transaction spans multiple calls. All operations are async and return
/// Results with EtlError.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Idempotently creates the two destination tables if they do not exist.
    async fn ensure_schema(&self) -> Result<()>;

    /// Aggregates the full order history per product: row count, total and
    /// mean of `amount`.
    async fn product_performance(&self) -> Result<Vec<ProductSales>>;

    /// Upserts the given product rows in a single batched write, stamping
    /// each with the execution date. On key conflict the count, total,
    /// average, and report date are overwritten.
    async fn upsert_product_performance(&self, rows: &[ProductSales]) -> Result<()>;

    /// Aggregates the full order history per calendar date, ordered by date
    /// ascending.
    async fn daily_trends(&self) -> Result<Vec<DailyVolume>>;

    /// Upserts the given daily rows in a single batched write. On key
    /// conflict the count and sum are overwritten.
    async fn upsert_daily_trends(&self, rows: &[DailyVolume]) -> Result<()>;

    /// Closes the store connection.
    async fn close(&self) -> Result<()>;
}
