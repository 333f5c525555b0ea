//! # Pending Sale Replay
//!
//! Drains the offline queue once connectivity returns.
//!
//! ## Replay Semantics
//! - A mutex serializes replays; a second caller waits instead of
//!   double-submitting.
//! - Each sale is inserted idempotently on its client token. `None`
//!   (token already known) dequeues without re-deducting stock: the
//!   earlier attempt owned that deduction.
//! - Deductions are re-derived against FRESH remote batches, not the
//!   local offline view, so replay converges even if the server moved
//!   while we were away.
//! - A connectivity error stops the replay (the rest stays queued); any
//!   other per-sale error is logged and skipped.

use tracing::{info, warn};

use mostrador_cache::Partition;
use mostrador_core::{deduct, Quantity};

use crate::error::StoreResult;
use crate::state::AppStore;

/// Outcome of one replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Sales inserted by this pass.
    pub submitted: usize,
    /// Sales the server had already seen (dequeued, not re-inserted).
    pub already_recorded: usize,
    /// Sales skipped on non-connectivity errors (left queued).
    pub failed: usize,
    /// Sales still queued when the pass ended.
    pub remaining: usize,
}

impl AppStore {
    /// Replays queued offline sales against the remote service.
    pub async fn sync_pending_sales(&self) -> StoreResult<SyncReport> {
        let _guard = self.sync_guard.lock().await;

        let pending = self.cache.pending_sales().await?;
        let mut report = SyncReport {
            remaining: pending.len(),
            ..SyncReport::default()
        };
        if pending.is_empty() {
            return Ok(report);
        }
        info!(count = pending.len(), "Replaying pending sales");

        // Fresh server batches; offline deductions are re-derived on top.
        let mut working = match self.remote.fetch_batches().await {
            Ok(batches) => batches,
            Err(err) if err.is_connectivity() => {
                warn!(error = %err, "Still offline, replay postponed");
                self.connectivity.set_online(false);
                return Ok(report);
            }
            Err(err) => return Err(err.into()),
        };
        let mut touched: Vec<String> = Vec::new();

        for sale in pending {
            match self.remote.insert_sale(&sale).await {
                Ok(stored) => {
                    let landed_now = stored.is_some();
                    if landed_now {
                        for line in &sale.lines {
                            let outcome =
                                deduct(&working, &line.product_id, &sale.store_id, line.quantity);
                            // Shortfall here means the server ran dry in
                            // the meantime; the sale stands, stock floors
                            // at zero.
                            working = outcome.batches;
                            touched.extend(outcome.touched);
                        }
                        report.submitted += 1;
                    } else {
                        report.already_recorded += 1;
                    }

                    let recorded = stored.unwrap_or_else(|| sale.clone());
                    self.cache.remove_pending_sale(&sale.client_token).await?;
                    self.cache.delete(Partition::Sales, &sale.id).await?;
                    self.cache
                        .put(Partition::Sales, &recorded.id, &recorded)
                        .await?;
                    report.remaining -= 1;

                    let mut state = self.state.lock().await;
                    if let Some(slot) = state
                        .sales
                        .iter_mut()
                        .find(|s| s.client_token == sale.client_token)
                    {
                        *slot = recorded;
                    } else {
                        state.sales.insert(0, recorded);
                    }
                }
                Err(err) if err.is_connectivity() => {
                    warn!(error = %err, "Connectivity lost mid-replay");
                    self.connectivity.set_online(false);
                    break;
                }
                Err(err) => {
                    warn!(token = %sale.client_token, error = %err, "Sale replay rejected, skipping");
                    report.failed += 1;
                }
            }
        }

        if report.submitted > 0 {
            touched.sort();
            touched.dedup();
            let updates: Vec<(String, Quantity)> = working
                .iter()
                .filter(|b| touched.contains(&b.id))
                .map(|b| (b.id.clone(), b.quantity))
                .collect();
            if let Err(err) = self.remote.apply_batch_quantities(&updates).await {
                warn!(error = %err, "Batch quantity push failed after replay");
            }

            self.mirror_batches(&working).await?;
            let mut state = self.state.lock().await;
            state.batches = working;
            state.recompute_alerts();
        }

        info!(
            submitted = report.submitted,
            already_recorded = report.already_recorded,
            failed = report.failed,
            remaining = report.remaining,
            "Replay pass finished"
        );
        Ok(report)
    }
}
