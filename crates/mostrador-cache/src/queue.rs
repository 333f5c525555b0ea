//! # Pending-Sale Queue & Cart Recovery
//!
//! Convenience wrappers over the key-value layer for the two places the
//! cache is more than a mirror:
//!
//! - **Pending sales**: sales completed offline wait in their own
//!   partition, keyed by client token, until the network monitor replays
//!   them. The token doubles as the idempotency key sent to the gateway,
//!   so a replay interrupted mid-submit cannot duplicate a sale.
//! - **Cart recovery**: the in-memory cart is mirrored after every
//!   mutation so a crash or reload restores the session.

use tracing::debug;

use mostrador_core::{Cart, Sale};

use crate::error::CacheResult;
use crate::kv::Partition;
use crate::pool::LocalCache;

/// Fixed key for the single recoverable cart per device.
const CART_KEY: &str = "current";

impl LocalCache {
    // =========================================================================
    // Pending Sales
    // =========================================================================

    /// Queues an offline sale, keyed by its client token.
    pub async fn enqueue_pending_sale(&self, sale: &Sale) -> CacheResult<()> {
        debug!(token = %sale.client_token, total = %sale.total, "Queuing pending sale");
        self.put(Partition::PendingSales, &sale.client_token, sale)
            .await
    }

    /// All queued sales, oldest first (replay order).
    pub async fn pending_sales(&self) -> CacheResult<Vec<Sale>> {
        self.get_all(Partition::PendingSales).await
    }

    /// Removes a queued sale after successful submission.
    pub async fn remove_pending_sale(&self, client_token: &str) -> CacheResult<bool> {
        debug!(token = %client_token, "Removing pending sale");
        self.delete(Partition::PendingSales, client_token).await
    }

    /// Number of sales waiting for replay.
    pub async fn pending_sale_count(&self) -> CacheResult<i64> {
        self.count(Partition::PendingSales).await
    }

    // =========================================================================
    // Cart Recovery
    // =========================================================================

    /// Mirrors the current cart for crash/reload recovery.
    pub async fn save_cart(&self, cart: &Cart) -> CacheResult<()> {
        self.put(Partition::Cart, CART_KEY, cart).await
    }

    /// Restores the mirrored cart, if any.
    pub async fn load_cart(&self) -> CacheResult<Option<Cart>> {
        self.get(Partition::Cart, CART_KEY).await
    }

    /// Drops the mirrored cart (after checkout).
    pub async fn clear_cart(&self) -> CacheResult<()> {
        self.delete(Partition::Cart, CART_KEY).await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
