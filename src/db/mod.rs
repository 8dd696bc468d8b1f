//! This module is responsible for reading, writing and managing the SQLite database that holds the
//! inventory between runs.

mod memory;
mod migrations;

pub use memory::MemoryStore;

use crate::model::{Amount, InventoryItem, ItemId};
use crate::Res;
use anyhow::{bail, Context};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Where the inventory lives between runs.
///
/// Runs call `load_all` when they start and `replace_all` when they finish. The last write wins and
/// is fully visible to the next `load_all`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Replaces every stored item with `items`, keeping their order.
    async fn replace_all(&self, items: &[InventoryItem]) -> Res<()>;

    /// Loads every stored item in order.
    async fn load_all(&self) -> Res<Vec<InventoryItem>>;

    /// Removes a single item. Returns `false` if there was no item with that id.
    async fn delete(&self, id: &ItemId) -> Res<bool>;
}

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Creates a SQLite client
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let pool = connect(path, false).await?;
        migrations::bootstrap(&pool).await?;
        let version = migrations::version(&pool).await?;
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;
        migrations::bootstrap(&pool).await?;
        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// Returns the number of stored items.
    #[cfg(test)]
    pub(crate) async fn count_items(&self) -> Res<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count items")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

async fn connect(path: &Path, create: bool) -> Res<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open SQLite database at '{}'", path.display()))
}

/// A row of the `items` table, in `SELECT` column order.
type ItemRow = (String, String, String, String, i64, String, String);

const SELECT_ITEMS: &str = "SELECT id, name, category, quantity_on_hand, observed_sales, \
    unit_price, unit_cost FROM items ORDER BY position";

fn from_row(row: ItemRow) -> Res<InventoryItem> {
    let (id, name, category, quantity, sales, price, cost) = row;
    let quantity_on_hand = Decimal::from_str(&quantity)
        .with_context(|| format!("Invalid quantity '{quantity}' stored for item {id}"))?;
    let observed_sales = u64::try_from(sales)
        .with_context(|| format!("Invalid sales count {sales} stored for item {id}"))?;
    let unit_price = Amount::from_str(&price)
        .with_context(|| format!("Invalid unit price '{price}' stored for item {id}"))?;
    let unit_cost = Amount::from_str(&cost)
        .with_context(|| format!("Invalid unit cost '{cost}' stored for item {id}"))?;
    Ok(InventoryItem::from_parts(
        ItemId::from(id),
        name,
        category,
        quantity_on_hand,
        observed_sales,
        unit_price,
        unit_cost,
    ))
}

#[async_trait]
impl Store for Db {
    async fn replace_all(&self, items: &[InventoryItem]) -> Res<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM items")
            .execute(&mut *tx)
            .await
            .context("Failed to clear items")?;

        for (position, item) in items.iter().enumerate() {
            let sales = i64::try_from(item.observed_sales()).with_context(|| {
                format!("The sales count of '{}' is too large to store", item.name())
            })?;
            sqlx::query(
                "INSERT INTO items (id, position, name, category, quantity_on_hand, \
                observed_sales, unit_price, unit_cost) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(item.id().as_str())
            .bind(position as i64)
            .bind(item.name())
            .bind(item.category())
            .bind(item.quantity_on_hand().to_string())
            .bind(sales)
            .bind(item.unit_price().value().to_string())
            .bind(item.unit_cost().value().to_string())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert item '{}'", item.name()))?;
        }

        tx.commit().await.context("Failed to commit items")?;
        debug!("Stored {} item(s)", items.len());
        Ok(())
    }

    async fn load_all(&self) -> Res<Vec<InventoryItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(SELECT_ITEMS)
            .fetch_all(&self.pool)
            .await
            .context("Failed to load items")?;
        rows.into_iter().map(from_row).collect()
    }

    async fn delete(&self, id: &ItemId) -> Res<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete item {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}
