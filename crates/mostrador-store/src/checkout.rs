//! # Checkout
//!
//! The one path from cart to sale.
//!
//! ## Flow
//! ```text
//! cart ──► FEFO plan over a working batch copy
//!             │ any shortfall ──► reject whole checkout, nothing mutated
//!             ▼
//!          online? ──yes──► idempotent insert ──ok──► push batch patches
//!             │                    │
//!             │no                  │connectivity error
//!             ▼                    ▼
//!          enqueue pending sale (durable, keyed by client token)
//!             │
//!             ▼
//!          mirror batches + sale + cart to cache, THEN mutate memory:
//!          batches, sales, alerts, clear cart/discount/note
//! ```
//! The cart is only cleared after the sale is durably somewhere (server
//! row or pending queue) and the cache mirrors are written; a failure
//! before that leaves the cart intact for retry.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use mostrador_cache::Partition;
use mostrador_core::{
    deduct, stock_on_hand, CheckoutPayment, CoreError, Discount, Money, Quantity, Sale,
};

use crate::error::StoreResult;
use crate::state::AppStore;

/// Tender captured at the register for one checkout. Discount and note
/// come from the staged state, not from here.
#[derive(Debug, Clone, Default)]
pub struct CheckoutTender {
    pub cash: Money,
    pub card: Money,
    pub card_commission: Money,
    pub commission_in_cash: bool,
}

impl AppStore {
    /// Completes the sale in the cart.
    ///
    /// Atomic against stock: if ANY line cannot be fully covered by FEFO
    /// deduction at the session's store, the whole checkout is rejected
    /// and neither cart nor batches change. Untracked products (no batch
    /// rows) deduct nothing.
    pub async fn checkout(&self, tender: CheckoutTender) -> StoreResult<Sale> {
        let mut state = self.state.lock().await;
        let session = state.session()?;

        if state.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        // Plan all deductions against a working copy before touching
        // anything.
        let mut working = state.batches.clone();
        let mut touched: Vec<String> = Vec::new();
        for line in &state.cart.lines {
            let tracked = working.iter().any(|b| b.product_id == line.product_id);
            if !tracked {
                continue;
            }

            let outcome = deduct(&working, &line.product_id, &session.store_id, line.quantity);
            if outcome.shortfall.is_positive() {
                let available =
                    stock_on_hand(&state.batches, &line.product_id, &session.store_id);
                return Err(CoreError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }
            working = outcome.batches;
            touched.extend(outcome.touched);
        }

        touched.sort();
        touched.dedup();
        let updates: Vec<(String, Quantity)> = working
            .iter()
            .filter(|b| touched.contains(&b.id))
            .map(|b| (b.id.clone(), b.quantity))
            .collect();

        let payment = CheckoutPayment {
            cash: tender.cash,
            card: tender.card,
            card_commission: tender.card_commission,
            commission_in_cash: tender.commission_in_cash,
            discount: state.pending_discount,
            note: state.pending_note.clone(),
        };

        let token = Uuid::new_v4().to_string();
        let candidate = Sale::compose(
            state.cart.to_sale_lines(),
            &payment,
            &session.user_id,
            &session.store_id,
            &token,
            &format!("offline-sale-{}", token),
            Utc::now(),
        );

        // Try the server first when we believe we are online; a
        // connectivity failure downgrades to the offline path instead of
        // failing the checkout.
        let server_sale = if self.connectivity.is_online() {
            match self.remote.insert_sale(&candidate).await {
                Ok(Some(stored)) => Some(stored),
                Ok(None) => {
                    // Fresh token already known server-side: an earlier
                    // interrupted attempt landed it. Keep the local copy.
                    warn!(token = %token, "Fresh sale token already recorded");
                    Some(candidate.clone())
                }
                Err(err) if err.is_connectivity() => {
                    warn!(error = %err, "Sale insert unreachable, queueing offline");
                    self.connectivity.set_online(false);
                    None
                }
                Err(err) => return Err(err.into()),
            }
        } else {
            None
        };

        let sale = match server_sale {
            Some(stored) => {
                if let Err(err) = self.remote.apply_batch_quantities(&updates).await {
                    // The sale is recorded; quantities are absolute and
                    // will be re-pushed on the next sync.
                    warn!(error = %err, "Batch quantity push failed after sale");
                    self.connectivity.set_online(false);
                }
                stored
            }
            None => {
                self.cache.enqueue_pending_sale(&candidate).await?;
                info!(token = %token, total = %candidate.total, "Sale queued for replay");
                candidate
            }
        };

        // Durable mirrors before the in-memory commit.
        self.cache.put(Partition::Sales, &sale.id, &sale).await?;
        self.mirror_batches(&working).await?;
        self.cache.clear_cart().await?;

        state.batches = working;
        state.sales.insert(0, sale.clone());
        state.cart.clear();
        state.pending_discount = Discount::None;
        state.pending_note = None;
        state.recompute_alerts();

        info!(
            id = %sale.id,
            total = %sale.total,
            lines = sale.lines.len(),
            online = self.connectivity.is_online(),
            "Checkout complete"
        );
        Ok(sale)
    }
}
