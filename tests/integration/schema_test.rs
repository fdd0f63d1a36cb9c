//! Destination schema integration tests.

use order_analytics::config::ConnectionConfig;
use order_analytics::db::{PostgresStore, ReportStore};

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Helper to create a test store.
async fn get_test_store() -> Option<PostgresStore> {
    let url = get_test_database_url()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    PostgresStore::connect(&config).await.ok()
}

#[tokio::test]
async fn test_ensure_schema_creates_destination_tables() {
    let Some(store) = get_test_store().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    store.ensure_schema().await.unwrap();
    // Running it again must not error and must not change the schema.
    store.ensure_schema().await.unwrap();

    let url = get_test_database_url().unwrap();
    let pool = sqlx::postgres::PgPool::connect(&url).await.unwrap();

    let columns: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT column_name::text
        FROM information_schema.columns
        WHERE table_schema = 'public' AND table_name = 'product_performance'
        ORDER BY ordinal_position
        "#,
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(
        columns,
        vec![
            "product",
            "order_count",
            "total_sales",
            "avg_sales",
            "report_date"
        ]
    );

    let columns: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT column_name::text
        FROM information_schema.columns
        WHERE table_schema = 'public' AND table_name = 'daily_trends'
        ORDER BY ordinal_position
        "#,
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(columns, vec!["order_date", "daily_orders", "daily_sales"]);

    store.close().await.unwrap();
}
