//! # Expenses & Shopping List Operations

use chrono::Utc;
use tracing::info;

use mostrador_core::{Expense, ShoppingListItem};

use crate::client::Gateway;
use crate::error::GatewayResult;
use crate::wire::{ExpenseRow, ShoppingItemRow};

const EXPENSES: &str = "expenses";
const SHOPPING: &str = "shopping_list_items";

impl Gateway {
    // =========================================================================
    // Expenses
    // =========================================================================

    /// All expenses, newest first.
    pub async fn fetch_expenses(&self) -> GatewayResult<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = self
            .fetch_rows(EXPENSES, &[("order", "created_at.desc")])
            .await?;
        Ok(rows.into_iter().map(Expense::from).collect())
    }

    /// Records an expense. `created_at` is stamped here.
    pub async fn insert_expense(&self, expense: &Expense) -> GatewayResult<Expense> {
        let row = ExpenseRow::from_expense(expense, Utc::now());
        let stored: ExpenseRow = self.insert_returning(EXPENSES, &row).await?;
        info!(id = %stored.id, "Expense recorded");
        Ok(stored.into())
    }

    /// Updates an expense (actual cost, approval).
    pub async fn update_expense(&self, expense: &Expense) -> GatewayResult<()> {
        let patch = serde_json::json!({
            "description": expense.description,
            "expected_cost_cents": expense.expected_cost.cents(),
            "actual_cost_cents": expense.actual_cost.map(|m| m.cents()),
            "approval": expense.approval,
        });
        self.patch_by_id(EXPENSES, &expense.id, &patch).await
    }

    /// Deletes an expense.
    pub async fn delete_expense(&self, id: &str) -> GatewayResult<()> {
        self.delete_by_ids(EXPENSES, std::slice::from_ref(&id.to_string()))
            .await
    }

    // =========================================================================
    // Shopping List
    // =========================================================================

    /// The full shopping list, oldest first.
    pub async fn fetch_shopping_list(&self) -> GatewayResult<Vec<ShoppingListItem>> {
        let rows: Vec<ShoppingItemRow> = self
            .fetch_rows(SHOPPING, &[("order", "created_at.asc")])
            .await?;
        Ok(rows.into_iter().map(ShoppingListItem::from).collect())
    }

    /// Adds a shopping list entry. `created_at` is stamped here.
    pub async fn insert_shopping_item(
        &self,
        item: &ShoppingListItem,
    ) -> GatewayResult<ShoppingListItem> {
        let row = ShoppingItemRow::from_item(item, Utc::now());
        let stored: ShoppingItemRow = self.insert_returning(SHOPPING, &row).await?;
        Ok(stored.into())
    }

    /// Updates a shopping list entry (purchased flag, actual cost,
    /// approval).
    pub async fn update_shopping_item(&self, item: &ShoppingListItem) -> GatewayResult<()> {
        let patch = serde_json::json!({
            "description": item.description,
            "expected_cost_cents": item.expected_cost.cents(),
            "actual_cost_cents": item.actual_cost.map(|m| m.cents()),
            "purchased": item.purchased,
            "approval": item.approval,
        });
        self.patch_by_id(SHOPPING, &item.id, &patch).await
    }

    /// Removes a shopping list entry (typically after promotion to a
    /// product).
    pub async fn delete_shopping_item(&self, id: &str) -> GatewayResult<()> {
        self.delete_by_ids(SHOPPING, std::slice::from_ref(&id.to_string()))
            .await
    }
}
