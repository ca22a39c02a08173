//! Embedded schema migrations for the results database, tracked in a
//! `schema_migrations` table so the store can evolve without wiping history.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up_sql: String,
}

/// All available migrations, embedded at compile time.
pub fn load_migrations() -> BTreeMap<i64, Migration> {
    let mut migrations = BTreeMap::new();

    migrations.insert(
        1,
        Migration {
            version: 1,
            name: "initial".to_string(),
            up_sql: include_str!("migrations/001_initial.sql").to_string(),
        },
    );

    migrations
}

/// Checksum for a migration's SQL, used to detect edited migration files.
pub fn calculate_checksum(sql: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    sql.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

async fn init_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            checksum TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<(i64, String)>> {
    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT version, checksum FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .context("Failed to get applied migrations")?;

    Ok(rows)
}

/// Run all pending migrations, validating checksums of already-applied ones.
pub async fn migrate_up(pool: &SqlitePool) -> Result<()> {
    init_migration_table(pool).await?;

    let available = load_migrations();
    let applied = applied_versions(pool).await?;

    for (version, checksum) in &applied {
        let Some(migration) = available.get(version) else {
            anyhow::bail!("Applied migration {} not found in available migrations", version);
        };
        let expected = calculate_checksum(&migration.up_sql);
        if *checksum != expected {
            anyhow::bail!(
                "Migration {} checksum mismatch! Applied: {}, Expected: {}. \
                This indicates the migration file has been modified after being applied.",
                version,
                checksum,
                expected
            );
        }
    }

    let applied_set: std::collections::HashSet<i64> =
        applied.into_iter().map(|(v, _)| v).collect();

    for (version, migration) in available {
        if applied_set.contains(&version) {
            continue;
        }

        log::info!("Applying migration {} '{}'", version, migration.name);

        let mut tx = pool.begin().await.context("Failed to start transaction")?;

        for statement in migration.up_sql.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to apply migration {}", version))?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, name, checksum) VALUES (?, ?, ?)")
            .bind(version)
            .bind(&migration.name)
            .bind(calculate_checksum(&migration.up_sql))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to record migration {}", version))?;

        tx.commit().await.context("Failed to commit migration")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_available() {
        let migrations = load_migrations();
        assert!(migrations.contains_key(&1));
    }

    #[test]
    fn checksum_is_stable() {
        let sql = "CREATE TABLE test (id INTEGER);";
        assert_eq!(calculate_checksum(sql), calculate_checksum(sql));
        assert_ne!(calculate_checksum(sql), calculate_checksum("CREATE TABLE other (id INTEGER);"));
    }

    #[tokio::test]
    async fn migrate_up_is_idempotent() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        migrate_up(&pool).await.unwrap();
        migrate_up(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
