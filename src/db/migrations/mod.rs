//! Database schema migrations.
//!
//! Migration files are stored in this directory with the naming convention:
//! - `migration_NN_up.sql` - Upgrades schema from version `NN-1` to version `NN`
//! - `migration_NN_down.sql` - Downgrades schema from version `NN` to version `NN-1`

use crate::Res;
use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

/// The schema version this build of the program works with.
pub(crate) const CURRENT_VERSION: i32 = 1;

struct Migration {
    version: i32,
    up_sql: &'static str,
    down_sql: &'static str,
}

/// (migration version, sql, schema version after running it)
type Step = (i32, &'static str, i32);

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

/// Creates the `schema_version` table at version 0 if the database does not have one yet.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Res<()> {
    pool.execute("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .await
        .context("Failed to create schema_version table")?;
    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to count schema_version rows")?;
    if rows == 0 {
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(pool)
            .await
            .context("Failed to insert initial schema version")?;
    }
    Ok(())
}

/// Reads the schema version recorded in the database.
pub(crate) async fn version(pool: &SqlitePool) -> Res<i32> {
    let (version,): (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    Ok(version)
}

/// Moves the schema from `from` to `to`, one version at a time, up or down. Every step runs in
/// its own transaction together with the `schema_version` update.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Res<()> {
    if from == to {
        debug!("Database already at schema version {to}");
        return Ok(());
    }
    if from > CURRENT_VERSION {
        bail!(
            "The database schema version {from} is newer than this program supports \
            ({CURRENT_VERSION}), is a newer version of stock available?"
        );
    }

    // Resolve every step before running any of them
    let steps = if from < to {
        (from + 1..=to)
            .map(|v| -> Res<Step> { Ok((v, find(v)?.up_sql, v)) })
            .collect::<Res<Vec<Step>>>()?
    } else {
        (to + 1..=from)
            .rev()
            .map(|v| -> Res<Step> { Ok((v, find(v)?.down_sql, v - 1)) })
            .collect::<Res<Vec<Step>>>()?
    };

    for (version, sql, new_version) in steps {
        debug!("Running migration {version:02} to reach schema version {new_version}");
        let mut tx = pool
            .begin()
            .await
            .context("Failed to begin migration transaction")?;
        tx.execute(sql)
            .await
            .with_context(|| format!("Failed to execute migration {version:02}"))?;
        sqlx::query("UPDATE schema_version SET version = ?")
            .bind(new_version)
            .execute(&mut *tx)
            .await
            .context("Failed to update schema_version")?;
        tx.commit()
            .await
            .context("Failed to commit migration transaction")?;
    }
    Ok(())
}

fn find(version: i32) -> Res<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("Migration {version} is missing"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::TempDir;

    async fn create_test_db() -> (TempDir, SqlitePool) {
        let temp_dir = TempDir::new().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(temp_dir.path().join("test.sqlite"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        bootstrap(&pool).await.unwrap();
        (temp_dir, pool)
    }

    async fn table_exists(pool: &SqlitePool, table_name: &str) -> bool {
        let (count,): (i32,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?")
                .bind(table_name)
                .fetch_one(pool)
                .await
                .unwrap();
        count > 0
    }

    #[tokio::test]
    async fn test_bootstrap_is_repeatable() {
        let (_temp_dir, pool) = create_test_db().await;
        bootstrap(&pool).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_migration_up_and_down() {
        let (_temp_dir, pool) = create_test_db().await;

        run(&pool, 0, CURRENT_VERSION).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), CURRENT_VERSION);
        assert!(table_exists(&pool, "items").await);

        run(&pool, CURRENT_VERSION, 0).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), 0);
        assert!(!table_exists(&pool, "items").await);
    }

    #[tokio::test]
    async fn test_migration_no_op_when_already_at_target() {
        let (_temp_dir, pool) = create_test_db().await;
        run(&pool, 0, 1).await.unwrap();
        run(&pool, 1, 1).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_migration_runs_nothing() {
        let (_temp_dir, pool) = create_test_db().await;
        assert!(run(&pool, 0, 2).await.is_err());
        assert_eq!(version(&pool).await.unwrap(), 0);
        assert!(!table_exists(&pool, "items").await);
    }

    #[tokio::test]
    async fn test_newer_database_is_rejected() {
        let (_temp_dir, pool) = create_test_db().await;
        assert!(run(&pool, CURRENT_VERSION + 1, CURRENT_VERSION).await.is_err());
    }
}
