//! # Partitioned Key-Value Storage
//!
//! Generic JSON storage over named partitions ("object stores").
//!
//! ## Contract
//! - Keys are validated before any I/O: non-empty, ≤ 255 chars, no
//!   control characters. Invalid keys reject immediately with
//!   [`CacheError::InvalidKey`].
//! - Values round-trip: anything written under a valid key reads back
//!   structurally equal until overwritten.
//! - `get_all` returns values in write order (oldest first).

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::Row;
use tracing::debug;

use crate::error::{CacheError, CacheResult};
use crate::pool::LocalCache;

// =============================================================================
// Partitions
// =============================================================================

/// The named partitions of the local cache.
///
/// One per mirrored entity type, plus the pending-sale queue and the cart
/// recovery slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Products,
    Categories,
    Stores,
    Users,
    Clients,
    InventoryBatches,
    Sales,
    PendingSales,
    Cart,
    Transfers,
    ShoppingList,
    Expenses,
    CashClosings,
    MinStockLevels,
}

impl Partition {
    /// Storage name of the partition.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Partition::Products => "products",
            Partition::Categories => "categories",
            Partition::Stores => "stores",
            Partition::Users => "users",
            Partition::Clients => "clients",
            Partition::InventoryBatches => "inventory_batches",
            Partition::Sales => "sales",
            Partition::PendingSales => "pending_sales",
            Partition::Cart => "cart",
            Partition::Transfers => "transfers",
            Partition::ShoppingList => "shopping_list",
            Partition::Expenses => "expenses",
            Partition::CashClosings => "cash_closings",
            Partition::MinStockLevels => "min_stock_levels",
        }
    }
}

// =============================================================================
// Key Validation
// =============================================================================

/// Validates a storage key before any read or write touches SQLite.
fn validate_key(key: &str) -> CacheResult<()> {
    if key.is_empty() {
        return Err(CacheError::invalid_key(key, "key must not be empty"));
    }
    if key.len() > 255 {
        return Err(CacheError::invalid_key(key, "key exceeds 255 characters"));
    }
    if key.chars().any(|c| c.is_control()) {
        return Err(CacheError::invalid_key(key, "key contains control characters"));
    }
    Ok(())
}

// =============================================================================
// Operations
// =============================================================================

impl LocalCache {
    /// Upserts a value under (partition, key).
    pub async fn put<T: Serialize>(
        &self,
        partition: Partition,
        key: &str,
        value: &T,
    ) -> CacheResult<()> {
        validate_key(key)?;
        let json = serde_json::to_string(value)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_entries (partition, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (partition, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(partition.as_str())
        .bind(key)
        .bind(json)
        .bind(now)
        .execute(self.pool())
        .await?;

        debug!(partition = partition.as_str(), key, "Cache put");
        Ok(())
    }

    /// Reads one value, or `None` when the key is absent.
    pub async fn get<T: DeserializeOwned>(
        &self,
        partition: Partition,
        key: &str,
    ) -> CacheResult<Option<T>> {
        validate_key(key)?;

        let row = sqlx::query("SELECT value FROM kv_entries WHERE partition = ?1 AND key = ?2")
            .bind(partition.as_str())
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => {
                let json: String = row.get("value");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    /// Reads every value in a partition, oldest write first.
    pub async fn get_all<T: DeserializeOwned>(&self, partition: Partition) -> CacheResult<Vec<T>> {
        let rows = sqlx::query(
            "SELECT value FROM kv_entries WHERE partition = ?1 ORDER BY updated_at, key",
        )
        .bind(partition.as_str())
        .fetch_all(self.pool())
        .await?;

        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            let json: String = row.get("value");
            values.push(serde_json::from_str(&json)?);
        }
        Ok(values)
    }

    /// Deletes a key. Returns whether something was removed.
    pub async fn delete(&self, partition: Partition, key: &str) -> CacheResult<bool> {
        validate_key(key)?;

        let result = sqlx::query("DELETE FROM kv_entries WHERE partition = ?1 AND key = ?2")
            .bind(partition.as_str())
            .bind(key)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Empties a partition.
    pub async fn clear(&self, partition: Partition) -> CacheResult<()> {
        sqlx::query("DELETE FROM kv_entries WHERE partition = ?1")
            .bind(partition.as_str())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Replaces a partition's contents with a fresh mirror of remote data.
    ///
    /// Clear + inserts run in one transaction so a crash mid-mirror cannot
    /// leave a half-replaced partition behind.
    pub async fn replace_all<T: Serialize>(
        &self,
        partition: Partition,
        entries: &[(String, T)],
    ) -> CacheResult<()> {
        for (key, _) in entries {
            validate_key(key)?;
        }

        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM kv_entries WHERE partition = ?1")
            .bind(partition.as_str())
            .execute(&mut *tx)
            .await?;

        let now = Utc::now().to_rfc3339();
        for (key, value) in entries {
            let json = serde_json::to_string(value)?;
            sqlx::query(
                "INSERT INTO kv_entries (partition, key, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(partition.as_str())
            .bind(key)
            .bind(json)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            partition = partition.as_str(),
            count = entries.len(),
            "Cache partition mirrored"
        );
        Ok(())
    }

    /// Counts entries in a partition.
    pub async fn count(&self, partition: Partition) -> CacheResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM kv_entries WHERE partition = ?1")
            .bind(partition.as_str())
            .fetch_one(self.pool())
            .await?;
        Ok(row.get("n"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::CacheConfig;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: String,
        weight: i64,
        tags: Vec<String>,
    }

    async fn cache() -> LocalCache {
        LocalCache::open(CacheConfig::in_memory()).await.unwrap()
    }

    fn widget(id: &str, weight: i64) -> Widget {
        Widget {
            id: id.to_string(),
            weight,
            tags: vec!["a".into(), "b".into()],
        }
    }

    #[tokio::test]
    async fn test_round_trip_structural_equality() {
        let cache = cache().await;
        let w = widget("w1", 42);

        cache.put(Partition::Products, "w1", &w).await.unwrap();
        let back: Widget = cache
            .get(Partition::Products, "w1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(back, w);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = cache().await;
        cache.put(Partition::Products, "w1", &widget("w1", 1)).await.unwrap();
        cache.put(Partition::Products, "w1", &widget("w1", 2)).await.unwrap();

        let back: Widget = cache.get(Partition::Products, "w1").await.unwrap().unwrap();
        assert_eq!(back.weight, 2);
        assert_eq!(cache.count(Partition::Products).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_keys_reject_immediately() {
        let cache = cache().await;
        let w = widget("w1", 1);

        let err = cache.put(Partition::Products, "", &w).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey { .. }));

        let err = cache.put(Partition::Products, "bad\nkey", &w).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey { .. }));

        let long = "k".repeat(300);
        let err = cache.get::<Widget>(Partition::Products, &long).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey { .. }));
    }

    #[tokio::test]
    async fn test_partitions_are_isolated() {
        let cache = cache().await;
        cache.put(Partition::Products, "k", &widget("w1", 1)).await.unwrap();

        let missing: Option<Widget> = cache.get(Partition::Sales, "k").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = cache().await;
        cache.put(Partition::Products, "w1", &widget("w1", 1)).await.unwrap();
        cache.put(Partition::Products, "w2", &widget("w2", 2)).await.unwrap();

        assert!(cache.delete(Partition::Products, "w1").await.unwrap());
        assert!(!cache.delete(Partition::Products, "w1").await.unwrap());

        cache.clear(Partition::Products).await.unwrap();
        assert_eq!(cache.count(Partition::Products).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_replace_all_mirrors_partition() {
        let cache = cache().await;
        cache.put(Partition::Products, "stale", &widget("stale", 0)).await.unwrap();

        let fresh = vec![
            ("w1".to_string(), widget("w1", 1)),
            ("w2".to_string(), widget("w2", 2)),
        ];
        cache.replace_all(Partition::Products, &fresh).await.unwrap();

        let all: Vec<Widget> = cache.get_all(Partition::Products).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|w| w.id != "stale"));
    }
}
