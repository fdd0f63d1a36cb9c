//! In-memory report store for testing.
//!
//! `MockReportStore` holds a source order list and computes the same
//! aggregates the Postgres backend queries for, applying last-write-wins
//! upserts to plain maps. `FailingReportStore` errors at a configurable step
//! so the runner's abort behavior can be exercised.

use super::{DailyVolume, OrderRecord, ProductSales, ReportStore};
use crate::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A destination row in the mock product_performance table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPerformanceRecord {
    pub order_count: i64,
    pub total_sales: Decimal,
    pub avg_sales: Decimal,
    pub report_date: NaiveDate,
}

#[derive(Debug, Default)]
struct MockState {
    orders: Vec<OrderRecord>,
    product_performance: BTreeMap<String, ProductPerformanceRecord>,
    daily_trends: BTreeMap<NaiveDate, DailyVolume>,
    schema_calls: usize,
    product_writes: usize,
    trends_writes: usize,
}

/// An in-memory report store backed by plain maps.
pub struct MockReportStore {
    state: Mutex<MockState>,
    today: Mutex<NaiveDate>,
}

impl MockReportStore {
    /// Creates an empty mock store; "today" defaults to the current UTC date.
    pub fn new() -> Self {
        Self::with_today(Utc::now().date_naive())
    }

    /// Creates a mock store with a fixed execution date, for deterministic
    /// report_date assertions.
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            today: Mutex::new(today),
        }
    }

    /// Advances the mock execution date, as a later run would see it.
    pub fn set_today(&self, today: NaiveDate) {
        *self.today.lock().unwrap() = today;
    }

    /// Replaces the source order list.
    pub fn set_orders(&self, orders: Vec<OrderRecord>) {
        self.state.lock().unwrap().orders = orders;
    }

    /// Returns the mock product_performance table, keyed by product.
    pub fn product_rows(&self) -> BTreeMap<String, ProductPerformanceRecord> {
        self.state.lock().unwrap().product_performance.clone()
    }

    /// Returns the mock daily_trends table, keyed by date.
    pub fn trend_rows(&self) -> BTreeMap<NaiveDate, DailyVolume> {
        self.state.lock().unwrap().daily_trends.clone()
    }

    /// Number of times ensure_schema has been called.
    pub fn schema_calls(&self) -> usize {
        self.state.lock().unwrap().schema_calls
    }

    /// Number of batched product upserts performed.
    pub fn product_writes(&self) -> usize {
        self.state.lock().unwrap().product_writes
    }

    /// Number of batched daily-trend upserts performed.
    pub fn trends_writes(&self) -> usize {
        self.state.lock().unwrap().trends_writes
    }
}

impl Default for MockReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for MockReportStore {
    async fn ensure_schema(&self) -> Result<()> {
        self.state.lock().unwrap().schema_calls += 1;
        Ok(())
    }

    async fn product_performance(&self) -> Result<Vec<ProductSales>> {
        let state = self.state.lock().unwrap();

        let mut groups: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();
        for order in &state.orders {
            let entry = groups.entry(order.product.clone()).or_default();
            entry.0 += 1;
            entry.1 += order.amount;
        }

        Ok(groups
            .into_iter()
            .map(|(product, (order_count, total_sales))| ProductSales {
                product,
                order_count,
                total_sales,
                avg_sales: total_sales / Decimal::from(order_count),
            })
            .collect())
    }

    async fn upsert_product_performance(&self, rows: &[ProductSales]) -> Result<()> {
        let today = *self.today.lock().unwrap();
        let mut state = self.state.lock().unwrap();
        for row in rows {
            state.product_performance.insert(
                row.product.clone(),
                ProductPerformanceRecord {
                    order_count: row.order_count,
                    total_sales: row.total_sales,
                    avg_sales: row.avg_sales,
                    report_date: today,
                },
            );
        }
        state.product_writes += 1;
        Ok(())
    }

    async fn daily_trends(&self) -> Result<Vec<DailyVolume>> {
        let state = self.state.lock().unwrap();

        let mut groups: BTreeMap<NaiveDate, (i64, Decimal)> = BTreeMap::new();
        for order in &state.orders {
            let entry = groups.entry(order.created_at.date()).or_default();
            entry.0 += 1;
            entry.1 += order.amount;
        }

        // BTreeMap iteration gives dates ascending, matching the SQL ORDER BY.
        Ok(groups
            .into_iter()
            .map(|(order_date, (daily_orders, daily_sales))| DailyVolume {
                order_date,
                daily_orders,
                daily_sales,
            })
            .collect())
    }

    async fn upsert_daily_trends(&self, rows: &[DailyVolume]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for row in rows {
            state.daily_trends.insert(row.order_date, row.clone());
        }
        state.trends_writes += 1;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// The step at which a `FailingReportStore` returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailingStep {
    Schema,
    ProductRead,
    ProductWrite,
    TrendsRead,
    TrendsWrite,
}

/// A report store that fails at one chosen step and otherwise behaves like
/// `MockReportStore`.
pub struct FailingReportStore {
    inner: MockReportStore,
    fail_at: FailingStep,
}

impl FailingReportStore {
    pub fn new(inner: MockReportStore, fail_at: FailingStep) -> Self {
        Self { inner, fail_at }
    }

    pub fn inner(&self) -> &MockReportStore {
        &self.inner
    }
}

#[async_trait]
impl ReportStore for FailingReportStore {
    async fn ensure_schema(&self) -> Result<()> {
        if self.fail_at == FailingStep::Schema {
            return Err(EtlError::schema("injected DDL failure"));
        }
        self.inner.ensure_schema().await
    }

    async fn product_performance(&self) -> Result<Vec<ProductSales>> {
        if self.fail_at == FailingStep::ProductRead {
            return Err(EtlError::query("injected read failure"));
        }
        self.inner.product_performance().await
    }

    async fn upsert_product_performance(&self, rows: &[ProductSales]) -> Result<()> {
        if self.fail_at == FailingStep::ProductWrite {
            return Err(EtlError::write("injected write failure"));
        }
        self.inner.upsert_product_performance(rows).await
    }

    async fn daily_trends(&self) -> Result<Vec<DailyVolume>> {
        if self.fail_at == FailingStep::TrendsRead {
            return Err(EtlError::query("injected read failure"));
        }
        self.inner.daily_trends().await
    }

    async fn upsert_daily_trends(&self, rows: &[DailyVolume]) -> Result<()> {
        if self.fail_at == FailingStep::TrendsWrite {
            return Err(EtlError::write("injected write failure"));
        }
        self.inner.upsert_daily_trends(rows).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }
}
