//! Database connection and schema management

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Connect to the results database with proper configuration.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let pool = SqlitePool::connect(&database_url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", db_path.display()))?;

    // Configure SQLite for better concurrency and safety
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .context("Failed to enable WAL mode")?;

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await
        .context("Failed to set synchronous mode")?;

    sqlx::query("PRAGMA temp_store = MEMORY")
        .execute(&pool)
        .await
        .context("Failed to set temp store")?;

    log::debug!("Connected to SQLite database: {}", db_path.display());

    crate::store::migrations::migrate_up(&pool).await?;

    Ok(pool)
}

/// Connect to an in-memory database for testing.
pub async fn connect_memory() -> Result<SqlitePool> {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .context("Failed to connect to in-memory database")?;

    crate::store::migrations::migrate_up(&pool).await?;

    log::debug!("Connected to in-memory SQLite database");
    Ok(pool)
}
