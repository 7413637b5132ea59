//! Database module
//!
//! Database connection and schema verification utilities.
//! Schema itself lives in raw SQL files under migrations/.

use sqlx::PgPool;

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let required_tables = vec![
        "api_keys",
        "rate_limit_buckets",
        "profiles",
        "orders",
        "order_status_history",
        "notifications",
        "equipment",
        "inventory_items",
    ];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    // An empty profiles table is valid on first boot, but a shop with no
    // admin cannot manage anything, so warn about it.
    let admin_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE role = 'admin' AND is_active")
            .fetch_one(pool)
            .await?;

    if admin_count == 0 {
        tracing::warn!("No active admin profile found. Seed one before going live.");
    }

    Ok(true)
}
