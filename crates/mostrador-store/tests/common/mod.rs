//! Shared test support: an in-memory remote backend with a switchable
//! online flag, plus seeded fixtures.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use mostrador_cache::{CacheConfig, LocalCache};
use mostrador_core::{
    CashClosing, Category, Client, Expense, InventoryBatch, MinStockLevel, Money, Product,
    Quantity, Sale, ShoppingListItem, StoreLocation, TransferOrder, UnitOfMeasure, User, UserRole,
};
use mostrador_gateway::GatewayResult;
use mostrador_store::{unreachable_error, AppStore, RemoteBackend};

// =============================================================================
// Fake Backend
// =============================================================================

#[derive(Default)]
pub struct FakeData {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub stores: Vec<StoreLocation>,
    pub users: Vec<User>,
    pub clients: Vec<Client>,
    pub batches: Vec<InventoryBatch>,
    pub min_stock_levels: Vec<MinStockLevel>,
    pub sales: Vec<Sale>,
    pub seen_tokens: HashSet<String>,
    pub transfers: Vec<TransferOrder>,
    pub expenses: Vec<Expense>,
    pub shopping_list: Vec<ShoppingListItem>,
    pub closings: Vec<CashClosing>,
    pub deleted_category_ids: Vec<String>,
}

/// In-memory remote backend. Flip `set_online(false)` and every call
/// fails with a connectivity error, exactly like a dead network.
pub struct FakeBackend {
    online: AtomicBool,
    pub data: Mutex<FakeData>,
}

impl FakeBackend {
    pub fn new(data: FakeData) -> Arc<Self> {
        Arc::new(FakeBackend {
            online: AtomicBool::new(true),
            data: Mutex::new(data),
        })
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn guard(&self) -> GatewayResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(unreachable_error())
        }
    }

    pub fn batch_quantity(&self, id: &str) -> Quantity {
        self.data
            .lock()
            .unwrap()
            .batches
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.quantity)
            .unwrap_or(Quantity::zero())
    }

    pub fn sale_count(&self) -> usize {
        self.data.lock().unwrap().sales.len()
    }

    /// Pretends a sale already landed on an earlier, interrupted replay:
    /// the token is known but nothing else happened yet.
    pub fn mark_token_seen(&self, token: &str, sale: &Sale) {
        let mut data = self.data.lock().unwrap();
        data.seen_tokens.insert(token.to_string());
        let mut landed = sale.clone();
        landed.id = format!("srv-{}", token);
        data.sales.push(landed);
    }
}

#[async_trait]
impl RemoteBackend for FakeBackend {
    async fn fetch_products(&self) -> GatewayResult<Vec<Product>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().products.clone())
    }
    async fn fetch_categories(&self) -> GatewayResult<Vec<Category>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().categories.clone())
    }
    async fn fetch_stores(&self) -> GatewayResult<Vec<StoreLocation>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().stores.clone())
    }
    async fn fetch_users(&self) -> GatewayResult<Vec<User>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().users.clone())
    }
    async fn fetch_clients(&self) -> GatewayResult<Vec<Client>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().clients.clone())
    }
    async fn fetch_batches(&self) -> GatewayResult<Vec<InventoryBatch>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().batches.clone())
    }
    async fn fetch_min_stock_levels(&self) -> GatewayResult<Vec<MinStockLevel>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().min_stock_levels.clone())
    }
    async fn fetch_sales(&self) -> GatewayResult<Vec<Sale>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().sales.clone())
    }
    async fn fetch_transfers(&self) -> GatewayResult<Vec<TransferOrder>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().transfers.clone())
    }
    async fn fetch_expenses(&self) -> GatewayResult<Vec<Expense>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().expenses.clone())
    }
    async fn fetch_shopping_list(&self) -> GatewayResult<Vec<ShoppingListItem>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().shopping_list.clone())
    }
    async fn fetch_closings(&self) -> GatewayResult<Vec<CashClosing>> {
        self.guard()?;
        Ok(self.data.lock().unwrap().closings.clone())
    }

    async fn insert_sale(&self, sale: &Sale) -> GatewayResult<Option<Sale>> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        if data.seen_tokens.contains(&sale.client_token) {
            return Ok(None);
        }
        data.seen_tokens.insert(sale.client_token.clone());

        let mut stored = sale.clone();
        if stored.id.starts_with("offline-sale-") {
            stored.id = format!("srv-{}", stored.client_token);
        }
        data.sales.push(stored.clone());
        Ok(Some(stored))
    }

    async fn apply_batch_quantities(&self, updates: &[(String, Quantity)]) -> GatewayResult<()> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        for (id, quantity) in updates {
            if let Some(batch) = data.batches.iter_mut().find(|b| b.id == *id) {
                batch.quantity = *quantity;
            }
        }
        Ok(())
    }

    async fn insert_batch(&self, batch: &InventoryBatch) -> GatewayResult<InventoryBatch> {
        self.guard()?;
        self.data.lock().unwrap().batches.push(batch.clone());
        Ok(batch.clone())
    }

    async fn insert_transfer(&self, order: &TransferOrder) -> GatewayResult<TransferOrder> {
        self.guard()?;
        self.data.lock().unwrap().transfers.push(order.clone());
        Ok(order.clone())
    }
    async fn update_transfer(&self, order: &TransferOrder) -> GatewayResult<()> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        if let Some(slot) = data.transfers.iter_mut().find(|t| t.id == order.id) {
            *slot = order.clone();
        }
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> GatewayResult<Product> {
        self.guard()?;
        self.data.lock().unwrap().products.push(product.clone());
        Ok(product.clone())
    }
    async fn update_product(&self, product: &Product) -> GatewayResult<()> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        if let Some(slot) = data.products.iter_mut().find(|p| p.id == product.id) {
            *slot = product.clone();
        }
        Ok(())
    }
    async fn delete_product(&self, id: &str) -> GatewayResult<()> {
        self.guard()?;
        self.data.lock().unwrap().products.retain(|p| p.id != id);
        Ok(())
    }
    async fn insert_category(&self, category: &Category) -> GatewayResult<Category> {
        self.guard()?;
        self.data.lock().unwrap().categories.push(category.clone());
        Ok(category.clone())
    }
    async fn update_category(&self, category: &Category) -> GatewayResult<()> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        if let Some(slot) = data.categories.iter_mut().find(|c| c.id == category.id) {
            *slot = category.clone();
        }
        Ok(())
    }
    async fn delete_categories(&self, ids: &[String]) -> GatewayResult<()> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        data.deleted_category_ids.extend(ids.iter().cloned());
        data.categories.retain(|c| !ids.contains(&c.id));
        Ok(())
    }

    async fn insert_client(&self, client: &Client) -> GatewayResult<Client> {
        self.guard()?;
        self.data.lock().unwrap().clients.push(client.clone());
        Ok(client.clone())
    }
    async fn update_client(&self, client: &Client) -> GatewayResult<()> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        if let Some(slot) = data.clients.iter_mut().find(|c| c.id == client.id) {
            *slot = client.clone();
        }
        Ok(())
    }
    async fn delete_client(&self, id: &str) -> GatewayResult<()> {
        self.guard()?;
        self.data.lock().unwrap().clients.retain(|c| c.id != id);
        Ok(())
    }
    async fn insert_expense(&self, expense: &Expense) -> GatewayResult<Expense> {
        self.guard()?;
        self.data.lock().unwrap().expenses.push(expense.clone());
        Ok(expense.clone())
    }
    async fn update_expense(&self, expense: &Expense) -> GatewayResult<()> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        if let Some(slot) = data.expenses.iter_mut().find(|e| e.id == expense.id) {
            *slot = expense.clone();
        }
        Ok(())
    }
    async fn delete_expense(&self, id: &str) -> GatewayResult<()> {
        self.guard()?;
        self.data.lock().unwrap().expenses.retain(|e| e.id != id);
        Ok(())
    }
    async fn insert_shopping_item(
        &self,
        item: &ShoppingListItem,
    ) -> GatewayResult<ShoppingListItem> {
        self.guard()?;
        self.data.lock().unwrap().shopping_list.push(item.clone());
        Ok(item.clone())
    }
    async fn update_shopping_item(&self, item: &ShoppingListItem) -> GatewayResult<()> {
        self.guard()?;
        let mut data = self.data.lock().unwrap();
        if let Some(slot) = data.shopping_list.iter_mut().find(|i| i.id == item.id) {
            *slot = item.clone();
        }
        Ok(())
    }
    async fn delete_shopping_item(&self, id: &str) -> GatewayResult<()> {
        self.guard()?;
        self.data.lock().unwrap().shopping_list.retain(|i| i.id != id);
        Ok(())
    }
    async fn insert_closing(&self, closing: &CashClosing) -> GatewayResult<CashClosing> {
        self.guard()?;
        self.data.lock().unwrap().closings.push(closing.clone());
        Ok(closing.clone())
    }

    async fn ping(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn product(id: &str, name: &str, price_cents: i64, unit: UnitOfMeasure) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Money::from_cents(price_cents),
        cost: Money::from_cents(price_cents / 2),
        unit,
        barcode: None,
        sku: None,
        category_id: None,
        image_url: None,
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn batch(id: &str, product_id: &str, store: &str, qty_milli: i64, exp: Option<&str>) -> InventoryBatch {
    InventoryBatch {
        id: id.to_string(),
        product_id: product_id.to_string(),
        location_id: store.to_string(),
        quantity: Quantity::from_milli(qty_milli),
        unit_cost: Money::from_cents(500),
        expires_at: exp.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
        created_at: Utc::now(),
    }
}

fn user(id: &str, role: UserRole, store: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("User {}", id),
        role,
        store_id: Some(store.to_string()),
    }
}

/// Two stores, three users, two products, FEFO-relevant batches for `p1`
/// at `storeA`. Expiration dates are far in the future so no fixture
/// trips the near-expiration alert by accident.
pub fn seeded_data() -> FakeData {
    FakeData {
        products: vec![
            product("p1", "Leche Entera 1L", 1000, UnitOfMeasure::Unit),
            product("queso", "Queso Manchego", 18000, UnitOfMeasure::Kg),
        ],
        stores: vec![
            StoreLocation {
                id: "storeA".to_string(),
                name: "Sucursal Centro".to_string(),
            },
            StoreLocation {
                id: "storeB".to_string(),
                name: "Sucursal Norte".to_string(),
            },
        ],
        users: vec![
            user("cashier-1", UserRole::Cashier, "storeA"),
            user("cashier-2", UserRole::Cashier, "storeB"),
            user("admin-1", UserRole::Admin, "storeA"),
        ],
        batches: vec![
            batch("early", "p1", "storeA", 2_000, Some("2099-01-01")),
            batch("late", "p1", "storeA", 5_000, Some("2099-06-01")),
            batch("cheese", "queso", "storeA", 2_000, Some("2099-03-01")),
        ],
        ..FakeData::default()
    }
}

/// Store over an in-memory cache and the given fake.
pub async fn store_over(fake: Arc<FakeBackend>) -> AppStore {
    let cache = LocalCache::open(CacheConfig::in_memory()).await.unwrap();
    AppStore::new(cache, fake, true)
}

/// Loaded store with a signed-in cashier at storeA.
pub async fn ready_store(fake: Arc<FakeBackend>) -> AppStore {
    let store = store_over(fake).await;
    store.load_all().await.unwrap();
    store.sign_in("cashier-1", "storeA").await.unwrap();
    store
}
