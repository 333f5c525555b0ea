//! # Expenses, Shopping List, Clients, Closings & Consumption
//!
//! The back-office mutations. Expenses and shopping list entries created
//! by a cashier start `Pending` and wait for an admin; an admin's own
//! entries are auto-approved.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use mostrador_cache::Partition;
use mostrador_core::{
    deduct, stock_on_hand, validate_quantity, ApprovalStatus, CashClosing, Client,
    ConsumptionEntry, CoreError, Expense, Money, Quantity, Sale, ShoppingListItem, UserRole,
};

use crate::error::{StoreError, StoreResult};
use crate::state::AppStore;
use crate::transfers::ReceivedLot;

impl AppStore {
    // =========================================================================
    // Expenses
    // =========================================================================

    /// Records a new expense. Cashier entries start `Pending`.
    pub async fn record_expense(
        &self,
        description: &str,
        expected_cost: Money,
    ) -> StoreResult<Expense> {
        let mut state = self.state.lock().await;
        let session = state.session()?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            description: description.trim().to_string(),
            expected_cost,
            actual_cost: None,
            approval: approval_for(session.role),
            created_at: Utc::now(),
        };

        let stored = self.remote.insert_expense(&expense).await?;
        self.cache
            .put(Partition::Expenses, &stored.id, &stored)
            .await?;
        state.expenses.insert(0, stored.clone());
        Ok(stored)
    }

    /// Updates an expense (actual cost, approval).
    pub async fn update_expense(&self, expense: Expense) -> StoreResult<()> {
        self.remote.update_expense(&expense).await?;
        self.cache
            .put(Partition::Expenses, &expense.id, &expense)
            .await?;

        let mut state = self.state.lock().await;
        let slot = state
            .expenses
            .iter_mut()
            .find(|e| e.id == expense.id)
            .ok_or_else(|| StoreError::not_found("expense", &expense.id))?;
        *slot = expense;
        Ok(())
    }

    /// Deletes an expense.
    pub async fn delete_expense(&self, id: &str) -> StoreResult<()> {
        self.remote.delete_expense(id).await?;
        self.cache.delete(Partition::Expenses, id).await?;
        self.state.lock().await.expenses.retain(|e| e.id != id);
        Ok(())
    }

    // =========================================================================
    // Shopping List
    // =========================================================================

    /// Adds a shopping list entry.
    pub async fn add_shopping_item(
        &self,
        description: &str,
        expected_cost: Money,
    ) -> StoreResult<ShoppingListItem> {
        let mut state = self.state.lock().await;
        let session = state.session()?;

        let item = ShoppingListItem {
            id: Uuid::new_v4().to_string(),
            description: description.trim().to_string(),
            expected_cost,
            actual_cost: None,
            purchased: false,
            approval: approval_for(session.role),
            created_at: Utc::now(),
        };

        let stored = self.remote.insert_shopping_item(&item).await?;
        self.cache
            .put(Partition::ShoppingList, &stored.id, &stored)
            .await?;
        state.shopping_list.push(stored.clone());
        Ok(stored)
    }

    /// Updates a shopping list entry (purchased flag, actual cost,
    /// approval).
    pub async fn update_shopping_item(&self, item: ShoppingListItem) -> StoreResult<()> {
        self.remote.update_shopping_item(&item).await?;
        self.cache
            .put(Partition::ShoppingList, &item.id, &item)
            .await?;

        let mut state = self.state.lock().await;
        let slot = state
            .shopping_list
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| StoreError::not_found("shopping item", &item.id))?;
        *slot = item;
        Ok(())
    }

    /// Removes a shopping list entry.
    pub async fn delete_shopping_item(&self, id: &str) -> StoreResult<()> {
        self.remote.delete_shopping_item(id).await?;
        self.cache.delete(Partition::ShoppingList, id).await?;
        self.state.lock().await.shopping_list.retain(|i| i.id != id);
        Ok(())
    }

    /// Promotes a purchased shopping list entry into a real product with
    /// an initial batch at the session's store, then removes the entry.
    pub async fn promote_shopping_item(
        &self,
        item_id: &str,
        product: mostrador_core::Product,
        initial_lot: ReceivedLot,
    ) -> StoreResult<mostrador_core::Product> {
        {
            let state = self.state.lock().await;
            state.session()?;
            if !state.shopping_list.iter().any(|i| i.id == item_id) {
                return Err(StoreError::not_found("shopping item", item_id));
            }
        }

        let stored = self.create_product(product).await?;

        let session = self.state.lock().await.session()?;
        let batch = mostrador_core::InventoryBatch {
            id: Uuid::new_v4().to_string(),
            product_id: stored.id.clone(),
            location_id: session.store_id.clone(),
            quantity: initial_lot.quantity,
            unit_cost: initial_lot.unit_cost,
            expires_at: initial_lot.expires_at,
            created_at: Utc::now(),
        };
        let stored_batch = self.remote.insert_batch(&batch).await?;

        self.delete_shopping_item(item_id).await?;

        let mut state = self.state.lock().await;
        state.batches.push(stored_batch);
        let batches = state.batches.clone();
        drop(state);
        self.mirror_batches(&batches).await?;
        self.state.lock().await.recompute_alerts();

        info!(item = item_id, product = %stored.id, "Shopping item promoted to product");
        Ok(stored)
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// Creates a client. Credit limit/balance are carried as data only.
    pub async fn create_client(&self, mut client: Client) -> StoreResult<Client> {
        if client.id.is_empty() {
            client.id = Uuid::new_v4().to_string();
        }
        let stored = self.remote.insert_client(&client).await?;
        self.cache
            .put(Partition::Clients, &stored.id, &stored)
            .await?;
        self.state.lock().await.clients.push(stored.clone());
        Ok(stored)
    }

    /// Updates a client.
    pub async fn update_client(&self, client: Client) -> StoreResult<()> {
        self.remote.update_client(&client).await?;
        self.cache
            .put(Partition::Clients, &client.id, &client)
            .await?;

        let mut state = self.state.lock().await;
        let slot = state
            .clients
            .iter_mut()
            .find(|c| c.id == client.id)
            .ok_or_else(|| StoreError::not_found("client", &client.id))?;
        *slot = client;
        Ok(())
    }

    /// Deletes a client.
    pub async fn delete_client(&self, id: &str) -> StoreResult<()> {
        self.remote.delete_client(id).await?;
        self.cache.delete(Partition::Clients, id).await?;
        self.state.lock().await.clients.retain(|c| c.id != id);
        Ok(())
    }

    // =========================================================================
    // Employee Consumption
    // =========================================================================

    /// Records stock consumed by an employee: FEFO deduction at the
    /// session's store, a session-local log entry, no sale.
    pub async fn record_employee_consumption(
        &self,
        product_id: &str,
        quantity: Quantity,
    ) -> StoreResult<ConsumptionEntry> {
        validate_quantity("quantity", quantity).map_err(CoreError::from)?;

        let mut state = self.state.lock().await;
        let session = state.session()?;
        let product_name = state
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| StoreError::Core(CoreError::ProductNotFound(product_id.to_string())))?;

        let outcome = deduct(&state.batches, product_id, &session.store_id, quantity);
        if outcome.shortfall.is_positive() {
            let available = stock_on_hand(&state.batches, product_id, &session.store_id);
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available,
                requested: quantity,
            }
            .into());
        }

        let updates: Vec<(String, Quantity)> = outcome
            .batches
            .iter()
            .filter(|b| outcome.touched.contains(&b.id))
            .map(|b| (b.id.clone(), b.quantity))
            .collect();
        if let Err(err) = self.remote.apply_batch_quantities(&updates).await {
            if err.is_connectivity() {
                warn!(error = %err, "Consumption quantity push deferred to next sync");
                self.connectivity.set_online(false);
            } else {
                return Err(err.into());
            }
        }

        self.mirror_batches(&outcome.batches).await?;
        state.batches = outcome.batches;
        state.recompute_alerts();

        let entry = ConsumptionEntry {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            product_name,
            quantity,
            user_id: session.user_id.clone(),
            store_id: session.store_id.clone(),
            recorded_at: Utc::now(),
        };
        state.consumption_log.push(entry.clone());
        info!(product = product_id, quantity = %quantity, "Employee consumption recorded");
        Ok(entry)
    }

    // =========================================================================
    // Cash Closings
    // =========================================================================

    /// Closes the cashier's shift: bundles their open sales into a
    /// closing, which removes those sales from the open history.
    pub async fn create_cash_closing(
        &self,
        opening_float: Money,
        closing_float: Money,
    ) -> StoreResult<CashClosing> {
        let mut state = self.state.lock().await;
        let session = state.session()?;

        let own_sales: Vec<Sale> = state
            .sales
            .iter()
            .filter(|s| s.cashier_id == session.user_id)
            .cloned()
            .collect();

        let mut sales_total = Money::zero();
        let mut cash_total = Money::zero();
        let mut card_total = Money::zero();
        for sale in &own_sales {
            // Card portion is capped at the total; the rest was paid (or
            // changed) in cash.
            let card = if sale.card_tendered > sale.total {
                sale.total
            } else {
                sale.card_tendered
            };
            sales_total = sales_total + sale.total;
            card_total = card_total + card;
            cash_total = cash_total + (sale.total - card);
        }

        let closing = CashClosing {
            id: Uuid::new_v4().to_string(),
            cashier_id: session.user_id.clone(),
            opening_float,
            sales_total,
            cash_total,
            card_total,
            closing_float,
            sale_ids: own_sales.iter().map(|s| s.id.clone()).collect(),
            created_at: Utc::now(),
        };

        let stored = self.remote.insert_closing(&closing).await?;
        self.cache
            .put(Partition::CashClosings, &stored.id, &stored)
            .await?;
        for sale in &own_sales {
            self.cache.delete(Partition::Sales, &sale.id).await?;
        }

        state
            .sales
            .retain(|s| s.cashier_id != session.user_id);
        state.closings.insert(0, stored.clone());
        info!(
            id = %stored.id,
            sales = stored.sale_ids.len(),
            total = %stored.sales_total,
            "Cash closing recorded"
        );
        Ok(stored)
    }
}

/// Admin entries are auto-approved; everyone else waits.
fn approval_for(role: UserRole) -> ApprovalStatus {
    match role {
        UserRole::Admin => ApprovalStatus::Approved,
        UserRole::Cashier => ApprovalStatus::Pending,
    }
}
