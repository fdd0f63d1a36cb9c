//! Full pipeline integration test against a real Postgres database.
//!
//! Walks the whole lifecycle in one test so the fixed-name source and
//! destination tables are not mutated by concurrently running tests:
//! seed, run, verify, re-run, verify overwrite, empty the source, verify
//! nothing is touched.

use chrono::NaiveDate;
use order_analytics::db::{PostgresStore, ReportStore};
use order_analytics::etl::EtlRunner;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;

fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

async fn seed_orders(pool: &PgPool) {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS "order" (
            id SERIAL PRIMARY KEY,
            product VARCHAR(255),
            amount NUMERIC,
            created_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(r#"TRUNCATE "order""#).execute(pool).await.unwrap();

    sqlx::query(
        r#"
        INSERT INTO "order" (product, amount, created_at) VALUES
            ('A', 10, '2025-01-01T10:00:00'),
            ('A', 20, '2025-01-02T09:30:00'),
            ('B', 5, '2025-01-01T15:45:00')
        "#,
    )
    .execute(pool)
    .await
    .unwrap();
}

async fn product_rows(pool: &PgPool) -> Vec<(String, i32, Decimal, Decimal, NaiveDate)> {
    sqlx::query_as(
        "SELECT product, order_count, total_sales, avg_sales, report_date \
         FROM product_performance ORDER BY product",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

async fn trend_rows(pool: &PgPool) -> Vec<(NaiveDate, i32, Decimal)> {
    sqlx::query_as(
        "SELECT order_date, daily_orders, daily_sales \
         FROM daily_trends ORDER BY order_date",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_full_pipeline_lifecycle() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let pool = PgPool::connect(&url).await.unwrap();

    let store = PostgresStore::from_pool(pool.clone());
    let runner = EtlRunner::new(&store);

    // Destinations must exist before we can clear leftovers from past runs.
    store.ensure_schema().await.unwrap();
    sqlx::query("TRUNCATE product_performance, daily_trends")
        .execute(&pool)
        .await
        .unwrap();
    seed_orders(&pool).await;

    // First run.
    runner.run().await.unwrap();

    let server_today: NaiveDate = sqlx::query_scalar("SELECT CURRENT_DATE")
        .fetch_one(&pool)
        .await
        .unwrap();

    let products = product_rows(&pool).await;
    assert_eq!(
        products,
        vec![
            (
                "A".to_string(),
                2,
                Decimal::from(30),
                Decimal::from(15),
                server_today
            ),
            (
                "B".to_string(),
                1,
                Decimal::from(5),
                Decimal::from(5),
                server_today
            ),
        ]
    );

    let trends = trend_rows(&pool).await;
    assert_eq!(
        trends,
        vec![
            (
                "2025-01-01".parse().unwrap(),
                2,
                Decimal::from(15)
            ),
            (
                "2025-01-02".parse().unwrap(),
                1,
                Decimal::from(20)
            ),
        ]
    );

    // Second run with unchanged source: identical rows, no duplication.
    runner.run().await.unwrap();
    assert_eq!(product_rows(&pool).await, products);
    assert_eq!(trend_rows(&pool).await, trends);

    // Empty source: both steps perform zero writes, rows stay untouched.
    sqlx::query(r#"TRUNCATE "order""#).execute(&pool).await.unwrap();
    runner.run().await.unwrap();
    assert_eq!(product_rows(&pool).await, products);
    assert_eq!(trend_rows(&pool).await, trends);

    store.close().await.unwrap();
}
