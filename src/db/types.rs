//! Row types shared by the storage layer.
//!
//! Money columns are NUMERIC in the store and `Decimal` here so sums and
//! averages round-trip exactly; counts come back as BIGINT from the
//! aggregation queries.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// One row of the read-only source relation `"order"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub product: String,
    pub amount: Decimal,
    pub created_at: NaiveDateTime,
}

impl OrderRecord {
    pub fn new(product: impl Into<String>, amount: Decimal, created_at: NaiveDateTime) -> Self {
        Self {
            product: product.into(),
            amount,
            created_at,
        }
    }
}

/// Per-product aggregate over the full order history.
///
/// One run's upsert writes each of these into `product_performance`, stamping
/// the row with the execution date.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductSales {
    pub product: String,
    pub order_count: i64,
    pub total_sales: Decimal,
    pub avg_sales: Decimal,
}

/// Per-calendar-date aggregate over the full order history.
///
/// Keyed by the date portion of `created_at`; upserted into `daily_trends`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DailyVolume {
    pub order_date: NaiveDate,
    pub daily_orders: i64,
    pub daily_sales: Decimal,
}
