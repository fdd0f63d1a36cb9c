//! PostgreSQL report store implementation.
//!
//! Provides the `PostgresStore` struct that implements the `ReportStore`
//! trait using sqlx. Each operation is a single statement executed on a pool
//! connection, so each step commits on its own; the run never holds a
//! transaction across steps.

use crate::config::{ConnectionConfig, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_USER};
use crate::db::{DailyVolume, ProductSales, ReportStore};
use crate::error::{EtlError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;
use tracing::debug;

/// DDL for the product performance destination table.
const CREATE_PRODUCT_PERFORMANCE: &str = r#"
CREATE TABLE IF NOT EXISTS product_performance (
    product VARCHAR(255) PRIMARY KEY,
    order_count INTEGER,
    total_sales NUMERIC,
    avg_sales NUMERIC,
    report_date DATE DEFAULT CURRENT_DATE
)
"#;

/// DDL for the daily trends destination table.
const CREATE_DAILY_TRENDS: &str = r#"
CREATE TABLE IF NOT EXISTS daily_trends (
    order_date DATE PRIMARY KEY,
    daily_orders INTEGER,
    daily_sales NUMERIC
)
"#;

/// PostgreSQL report store.
#[derive(Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects to the database described by `config`.
    ///
    /// A single attempt only: connectivity failures propagate immediately,
    /// and the external scheduler decides whether to re-invoke the run.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string();

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Connected to {}", config.display_string());
        Ok(Self { pool })
    }

    /// Creates a new PostgresStore from an existing connection pool.
    ///
    /// This is primarily useful for testing.
    #[allow(dead_code)]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PostgresStore {
    async fn ensure_schema(&self) -> Result<()> {
        for ddl in [CREATE_PRODUCT_PERFORMANCE, CREATE_DAILY_TRENDS] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| EtlError::schema(format_db_error(e)))?;
        }
        Ok(())
    }

    async fn product_performance(&self) -> Result<Vec<ProductSales>> {
        sqlx::query_as::<_, ProductSales>(
            r#"
            SELECT
                product,
                COUNT(*) AS order_count,
                SUM(amount) AS total_sales,
                AVG(amount) AS avg_sales
            FROM "order"
            GROUP BY product
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EtlError::query(format_db_error(e)))
    }

    async fn upsert_product_performance(&self, rows: &[ProductSales]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO product_performance \
             (product, order_count, total_sales, avg_sales, report_date) ",
        );
        builder.push_values(rows, |mut b, row| {
            b.push_bind(row.product.clone())
                .push_bind(row.order_count)
                .push_bind(row.total_sales)
                .push_bind(row.avg_sales)
                .push("CURRENT_DATE");
        });
        builder.push(
            " ON CONFLICT (product) DO UPDATE SET \
             order_count = EXCLUDED.order_count, \
             total_sales = EXCLUDED.total_sales, \
             avg_sales = EXCLUDED.avg_sales, \
             report_date = CURRENT_DATE",
        );

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| EtlError::write(format_db_error(e)))?;
        Ok(())
    }

    async fn daily_trends(&self) -> Result<Vec<DailyVolume>> {
        sqlx::query_as::<_, DailyVolume>(
            r#"
            SELECT
                created_at::date AS order_date,
                COUNT(*) AS daily_orders,
                SUM(amount) AS daily_sales
            FROM "order"
            GROUP BY order_date
            ORDER BY order_date
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EtlError::query(format_db_error(e)))
    }

    async fn upsert_daily_trends(&self, rows: &[DailyVolume]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO daily_trends (order_date, daily_orders, daily_sales) ",
        );
        builder.push_values(rows, |mut b, row| {
            b.push_bind(row.order_date)
                .push_bind(row.daily_orders)
                .push_bind(row.daily_sales);
        });
        builder.push(
            " ON CONFLICT (order_date) DO UPDATE SET \
             daily_orders = EXCLUDED.daily_orders, \
             daily_sales = EXCLUDED.daily_sales",
        );

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| EtlError::write(format_db_error(e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> EtlError {
    let host = config.host.as_deref().unwrap_or(DEFAULT_HOST);
    let port = config.port;
    let user = config.user.as_deref().unwrap_or(DEFAULT_USER);
    let database = config.database.as_deref().unwrap_or(DEFAULT_DATABASE);

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        EtlError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        EtlError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        EtlError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        EtlError::connection(
            "Server requires SSL. Add '?sslmode=require' to connection string.".to_string(),
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        EtlError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        EtlError::connection(error.to_string())
    }
}

/// Formats a statement error, surfacing Postgres detail and hints if present.
fn format_db_error(error: sqlx::Error) -> String {
    let mut result = String::new();

    if let Some(db_error) = error.as_database_error() {
        result.push_str("ERROR: ");
        result.push_str(db_error.message());

        if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
            if let Some(detail) = pg_error.detail() {
                result.push_str("\n  DETAIL: ");
                result.push_str(detail);
            }

            if let Some(hint) = pg_error.hint() {
                result.push_str("\n  HINT: ");
                result.push_str(hint);
            }

            if let Some(table) = pg_error.table() {
                result.push_str("\n  TABLE: ");
                result.push_str(table);
            }

            if let Some(constraint) = pg_error.constraint() {
                result.push_str("\n  CONSTRAINT: ");
                result.push_str(constraint);
            }
        }
    } else {
        result = error.to_string();
    }

    result
}
