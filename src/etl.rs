//! The ETL runner.
//!
//! One invocation is one run: ensure the destination schema, recompute the
//! product performance table, recompute the daily trends table, in that fixed
//! order. Each step commits independently; the first error aborts the
//! remaining steps and propagates. Retries and scheduling belong to the
//! external orchestrator that invokes the binary.

use crate::db::ReportStore;
use crate::error::Result;
use tracing::info;

/// Drives the three-step pipeline against a report store.
pub struct EtlRunner<'a> {
    store: &'a dyn ReportStore,
}

impl<'a> EtlRunner<'a> {
    pub fn new(store: &'a dyn ReportStore) -> Self {
        Self { store }
    }

    /// Runs the full pipeline: schema ensure, product performance, daily
    /// trends. Steps already committed stay committed when a later step
    /// fails.
    pub async fn run(&self) -> Result<()> {
        info!("Starting order analytics run");

        self.store.ensure_schema().await?;
        self.refresh_product_performance().await?;
        self.refresh_daily_trends().await?;

        info!("Order analytics run completed successfully");
        Ok(())
    }

    /// Recomputes per-product aggregates and upserts them in one batch.
    ///
    /// An empty source produces zero groups and therefore zero writes.
    async fn refresh_product_performance(&self) -> Result<()> {
        let rows = self.store.product_performance().await?;

        info!("Product performance report:");
        for row in &rows {
            info!(
                "Product: {}, Orders: {}, Total Sales: {}, Avg Sales: {}",
                row.product, row.order_count, row.total_sales, row.avg_sales
            );
        }

        if !rows.is_empty() {
            self.store.upsert_product_performance(&rows).await?;
        }
        Ok(())
    }

    /// Recomputes per-date aggregates and upserts them in one batch.
    async fn refresh_daily_trends(&self) -> Result<()> {
        let rows = self.store.daily_trends().await?;

        info!("Daily trends report:");
        for row in &rows {
            info!(
                "Date: {}, Daily Orders: {}, Daily Sales: {}",
                row.order_date, row.daily_orders, row.daily_sales
            );
        }

        if !rows.is_empty() {
            self.store.upsert_daily_trends(&rows).await?;
        }
        Ok(())
    }
}
