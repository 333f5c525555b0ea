//! # Remote Backend Seam
//!
//! The trait the store talks to instead of a concrete HTTP client. The
//! production implementation is [`mostrador_gateway::Gateway`]; tests plug
//! in an in-memory fake to exercise the offline queue without a network.
//!
//! Errors keep the gateway's vocabulary: a connectivity error (per
//! [`GatewayError::is_connectivity`]) triggers the offline fallback,
//! anything else surfaces to the caller.

use async_trait::async_trait;

use mostrador_core::{
    CashClosing, Category, Client, Expense, InventoryBatch, MinStockLevel, Product, Quantity,
    Sale, ShoppingListItem, StoreLocation, TransferOrder, User,
};
use mostrador_gateway::{Gateway, GatewayError, GatewayResult};

/// Remote persistence operations the state store depends on.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    // -- collection fetches ---------------------------------------------------
    async fn fetch_products(&self) -> GatewayResult<Vec<Product>>;
    async fn fetch_categories(&self) -> GatewayResult<Vec<Category>>;
    async fn fetch_stores(&self) -> GatewayResult<Vec<StoreLocation>>;
    async fn fetch_users(&self) -> GatewayResult<Vec<User>>;
    async fn fetch_clients(&self) -> GatewayResult<Vec<Client>>;
    async fn fetch_batches(&self) -> GatewayResult<Vec<InventoryBatch>>;
    async fn fetch_min_stock_levels(&self) -> GatewayResult<Vec<MinStockLevel>>;
    async fn fetch_sales(&self) -> GatewayResult<Vec<Sale>>;
    async fn fetch_transfers(&self) -> GatewayResult<Vec<TransferOrder>>;
    async fn fetch_expenses(&self) -> GatewayResult<Vec<Expense>>;
    async fn fetch_shopping_list(&self) -> GatewayResult<Vec<ShoppingListItem>>;
    async fn fetch_closings(&self) -> GatewayResult<Vec<CashClosing>>;

    // -- sales & inventory ----------------------------------------------------
    /// Idempotent on the sale's client token; `None` means the token
    /// already landed and the insert was dropped server-side.
    async fn insert_sale(&self, sale: &Sale) -> GatewayResult<Option<Sale>>;
    async fn apply_batch_quantities(&self, updates: &[(String, Quantity)]) -> GatewayResult<()>;
    async fn insert_batch(&self, batch: &InventoryBatch) -> GatewayResult<InventoryBatch>;

    // -- transfers ------------------------------------------------------------
    async fn insert_transfer(&self, order: &TransferOrder) -> GatewayResult<TransferOrder>;
    async fn update_transfer(&self, order: &TransferOrder) -> GatewayResult<()>;

    // -- catalog --------------------------------------------------------------
    async fn insert_product(&self, product: &Product) -> GatewayResult<Product>;
    async fn update_product(&self, product: &Product) -> GatewayResult<()>;
    async fn delete_product(&self, id: &str) -> GatewayResult<()>;
    async fn insert_category(&self, category: &Category) -> GatewayResult<Category>;
    async fn update_category(&self, category: &Category) -> GatewayResult<()>;
    async fn delete_categories(&self, ids: &[String]) -> GatewayResult<()>;

    // -- clients, expenses, shopping list, closings ---------------------------
    async fn insert_client(&self, client: &Client) -> GatewayResult<Client>;
    async fn update_client(&self, client: &Client) -> GatewayResult<()>;
    async fn delete_client(&self, id: &str) -> GatewayResult<()>;
    async fn insert_expense(&self, expense: &Expense) -> GatewayResult<Expense>;
    async fn update_expense(&self, expense: &Expense) -> GatewayResult<()>;
    async fn delete_expense(&self, id: &str) -> GatewayResult<()>;
    async fn insert_shopping_item(&self, item: &ShoppingListItem) -> GatewayResult<ShoppingListItem>;
    async fn update_shopping_item(&self, item: &ShoppingListItem) -> GatewayResult<()>;
    async fn delete_shopping_item(&self, id: &str) -> GatewayResult<()>;
    async fn insert_closing(&self, closing: &CashClosing) -> GatewayResult<CashClosing>;

    // -- connectivity ---------------------------------------------------------
    /// Cheap reachability probe for the network monitor.
    async fn ping(&self) -> bool;
}

#[async_trait]
impl RemoteBackend for Gateway {
    async fn fetch_products(&self) -> GatewayResult<Vec<Product>> {
        Gateway::fetch_products(self).await
    }
    async fn fetch_categories(&self) -> GatewayResult<Vec<Category>> {
        Gateway::fetch_categories(self).await
    }
    async fn fetch_stores(&self) -> GatewayResult<Vec<StoreLocation>> {
        Gateway::fetch_stores(self).await
    }
    async fn fetch_users(&self) -> GatewayResult<Vec<User>> {
        Gateway::fetch_users(self).await
    }
    async fn fetch_clients(&self) -> GatewayResult<Vec<Client>> {
        Gateway::fetch_clients(self).await
    }
    async fn fetch_batches(&self) -> GatewayResult<Vec<InventoryBatch>> {
        Gateway::fetch_batches(self).await
    }
    async fn fetch_min_stock_levels(&self) -> GatewayResult<Vec<MinStockLevel>> {
        Gateway::fetch_min_stock_levels(self).await
    }
    async fn fetch_sales(&self) -> GatewayResult<Vec<Sale>> {
        Gateway::fetch_sales(self).await
    }
    async fn fetch_transfers(&self) -> GatewayResult<Vec<TransferOrder>> {
        Gateway::fetch_transfers(self).await
    }
    async fn fetch_expenses(&self) -> GatewayResult<Vec<Expense>> {
        Gateway::fetch_expenses(self).await
    }
    async fn fetch_shopping_list(&self) -> GatewayResult<Vec<ShoppingListItem>> {
        Gateway::fetch_shopping_list(self).await
    }
    async fn fetch_closings(&self) -> GatewayResult<Vec<CashClosing>> {
        Gateway::fetch_closings(self).await
    }

    async fn insert_sale(&self, sale: &Sale) -> GatewayResult<Option<Sale>> {
        Gateway::insert_sale(self, sale).await
    }
    async fn apply_batch_quantities(&self, updates: &[(String, Quantity)]) -> GatewayResult<()> {
        Gateway::apply_batch_quantities(self, updates).await
    }
    async fn insert_batch(&self, batch: &InventoryBatch) -> GatewayResult<InventoryBatch> {
        Gateway::insert_batch(self, batch).await
    }

    async fn insert_transfer(&self, order: &TransferOrder) -> GatewayResult<TransferOrder> {
        Gateway::insert_transfer(self, order).await
    }
    async fn update_transfer(&self, order: &TransferOrder) -> GatewayResult<()> {
        Gateway::update_transfer(self, order).await
    }

    async fn insert_product(&self, product: &Product) -> GatewayResult<Product> {
        Gateway::insert_product(self, product).await
    }
    async fn update_product(&self, product: &Product) -> GatewayResult<()> {
        Gateway::update_product(self, product).await
    }
    async fn delete_product(&self, id: &str) -> GatewayResult<()> {
        Gateway::delete_product(self, id).await
    }
    async fn insert_category(&self, category: &Category) -> GatewayResult<Category> {
        Gateway::insert_category(self, category).await
    }
    async fn update_category(&self, category: &Category) -> GatewayResult<()> {
        Gateway::update_category(self, category).await
    }
    async fn delete_categories(&self, ids: &[String]) -> GatewayResult<()> {
        Gateway::delete_categories(self, ids).await
    }

    async fn insert_client(&self, client: &Client) -> GatewayResult<Client> {
        Gateway::insert_client(self, client).await
    }
    async fn update_client(&self, client: &Client) -> GatewayResult<()> {
        Gateway::update_client(self, client).await
    }
    async fn delete_client(&self, id: &str) -> GatewayResult<()> {
        Gateway::delete_client(self, id).await
    }
    async fn insert_expense(&self, expense: &Expense) -> GatewayResult<Expense> {
        Gateway::insert_expense(self, expense).await
    }
    async fn update_expense(&self, expense: &Expense) -> GatewayResult<()> {
        Gateway::update_expense(self, expense).await
    }
    async fn delete_expense(&self, id: &str) -> GatewayResult<()> {
        Gateway::delete_expense(self, id).await
    }
    async fn insert_shopping_item(
        &self,
        item: &ShoppingListItem,
    ) -> GatewayResult<ShoppingListItem> {
        Gateway::insert_shopping_item(self, item).await
    }
    async fn update_shopping_item(&self, item: &ShoppingListItem) -> GatewayResult<()> {
        Gateway::update_shopping_item(self, item).await
    }
    async fn delete_shopping_item(&self, id: &str) -> GatewayResult<()> {
        Gateway::delete_shopping_item(self, id).await
    }
    async fn insert_closing(&self, closing: &CashClosing) -> GatewayResult<CashClosing> {
        Gateway::insert_closing(self, closing).await
    }

    async fn ping(&self) -> bool {
        Gateway::ping(self).await
    }
}

/// Shorthand for "we know we are offline" used by fakes and the monitor.
pub fn unreachable_error() -> GatewayError {
    GatewayError::Unreachable("offline".to_string())
}
