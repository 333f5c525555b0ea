//! # Application State Store
//!
//! The single logical writer of application state. Every mutation goes
//! through [`AppStore`] methods, which take the state mutex once and hold
//! it across the operation's cache/gateway awaits, so concurrent callers
//! serialize and no interleaving can observe a half-applied checkout.
//!
//! ## Load Pattern
//! ```text
//! load_products ──► remote fetch ──ok──► mirror to cache, set state
//!                        │
//!                        └─connectivity err──► mark offline,
//!                                              serve cached mirror
//!                                              (empty set if cache fails)
//! ```
//! Non-connectivity errors surface; a 401 is a bug, not an outage.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use mostrador_cache::{LocalCache, Partition};
use mostrador_core::{
    check_all_alerts, CashClosing, Cart, Category, Client, ConsumptionEntry, Discount, Expense,
    InventoryBatch, MinStockLevel, Product, Sale, ShoppingListItem, StockAlert, StoreLocation,
    TransferOrder, User, UserRole, DEFAULT_EXPIRY_LEAD_DAYS,
};

use crate::error::{StoreError, StoreResult};
use crate::network::Connectivity;
use crate::source::RemoteBackend;

// =============================================================================
// Session
// =============================================================================

/// The signed-in user and their working store.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub store_id: String,
    pub role: UserRole,
}

// =============================================================================
// Application State
// =============================================================================

/// Everything the UI projects from. Owned by [`AppStore`]; read through
/// [`AppStore::with_state`].
#[derive(Debug, Default)]
pub struct AppState {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub stores: Vec<StoreLocation>,
    pub users: Vec<User>,
    pub clients: Vec<Client>,
    pub batches: Vec<InventoryBatch>,
    pub min_stock_levels: Vec<MinStockLevel>,
    pub sales: Vec<Sale>,
    pub transfers: Vec<TransferOrder>,
    pub expenses: Vec<Expense>,
    pub shopping_list: Vec<ShoppingListItem>,
    pub closings: Vec<CashClosing>,

    pub cart: Cart,
    /// Discount staged for the next checkout.
    pub pending_discount: Discount,
    /// Note staged for the next checkout.
    pub pending_note: Option<String>,

    /// Derived: recomputed after every inventory-affecting mutation.
    pub alerts: Vec<StockAlert>,
    /// Session-local log of employee consumption (not persisted).
    pub consumption_log: Vec<ConsumptionEntry>,

    pub session: Option<Session>,
}

impl AppState {
    /// Rederives the alert list from current batches and thresholds.
    pub(crate) fn recompute_alerts(&mut self) {
        self.alerts = check_all_alerts(
            &self.batches,
            &self.min_stock_levels,
            Utc::now().date_naive(),
            DEFAULT_EXPIRY_LEAD_DAYS,
        );
    }

    pub(crate) fn session(&self) -> StoreResult<Session> {
        self.session.clone().ok_or(StoreError::NoSession)
    }
}

// =============================================================================
// App Store
// =============================================================================

/// Handle to the application state store.
///
/// Cloning is cheap; all clones share the same state, cache, gateway and
/// connectivity flag.
#[derive(Clone)]
pub struct AppStore {
    pub(crate) state: Arc<Mutex<AppState>>,
    pub(crate) cache: LocalCache,
    pub(crate) remote: Arc<dyn RemoteBackend>,
    pub(crate) connectivity: Arc<Connectivity>,
    /// Serializes pending-sale replay; a second concurrent sync waits
    /// instead of double-submitting.
    pub(crate) sync_guard: Arc<Mutex<()>>,
}

impl AppStore {
    /// Creates a store over a cache and a remote backend.
    pub fn new(cache: LocalCache, remote: Arc<dyn RemoteBackend>, initially_online: bool) -> Self {
        AppStore {
            state: Arc::new(Mutex::new(AppState::default())),
            cache,
            remote,
            connectivity: Connectivity::new(initially_online),
            sync_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Reads state through a closure, without exposing the lock.
    pub async fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    pub fn connectivity(&self) -> &Arc<Connectivity> {
        &self.connectivity
    }

    pub(crate) fn remote(&self) -> &Arc<dyn RemoteBackend> {
        &self.remote
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Reports a connectivity change (e.g. from a UI online/offline
    /// event). The monitor reacts to the resulting edge.
    pub fn set_online(&self, online: bool) {
        self.connectivity.set_online(online);
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Signs a user in, fixing their working store for the session.
    pub async fn sign_in(&self, user_id: &str, store_id: &str) -> StoreResult<Session> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StoreError::not_found("user", user_id))?;

        let session = Session {
            user_id: user.id.clone(),
            store_id: store_id.to_string(),
            role: user.role,
        };
        info!(user = %session.user_id, store = %session.store_id, "Signed in");
        state.session = Some(session.clone());
        Ok(session)
    }

    /// Signs out, dropping the session and the in-progress cart.
    pub async fn sign_out(&self) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.session = None;
        state.cart.clear();
        state.pending_discount = Discount::None;
        state.pending_note = None;
        self.cache.clear_cart().await?;
        Ok(())
    }

    // =========================================================================
    // Mirror Helpers
    // =========================================================================

    /// Rederives the alert set from current batches and thresholds.
    pub async fn refresh_alerts(&self) -> Vec<StockAlert> {
        let mut state = self.state.lock().await;
        state.recompute_alerts();
        state.alerts.clone()
    }

    /// Replaces the cached batch mirror with the given set.
    pub(crate) async fn mirror_batches(&self, batches: &[InventoryBatch]) -> StoreResult<()> {
        let entries: Vec<(String, InventoryBatch)> = batches
            .iter()
            .map(|b| (b.id.clone(), b.clone()))
            .collect();
        self.cache
            .replace_all(Partition::InventoryBatches, &entries)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Collection Loads
// =============================================================================

/// Generates a remote-first load with mirror and cached fallback.
macro_rules! mirror_load {
    ($(#[$meta:meta])* $fn_name:ident, $fetch:ident, $partition:expr, $field:ident, $key:expr) => {
        $(#[$meta])*
        pub async fn $fn_name(&self) -> StoreResult<()> {
            match self.remote.$fetch().await {
                Ok(records) => {
                    self.connectivity.set_online(true);
                    let entries: Vec<_> = records
                        .iter()
                        .map(|r| (($key)(r), r.clone()))
                        .collect();
                    self.cache.replace_all($partition, &entries).await?;
                    self.state.lock().await.$field = records;
                }
                Err(err) if err.is_connectivity() => {
                    warn!(
                        partition = $partition.as_str(),
                        error = %err,
                        "Remote unavailable, serving cached mirror"
                    );
                    self.connectivity.set_online(false);
                    let cached = match self.cache.get_all($partition).await {
                        Ok(cached) => cached,
                        Err(cache_err) => {
                            warn!(error = %cache_err, "Cache fallback failed, serving empty set");
                            Vec::new()
                        }
                    };
                    self.state.lock().await.$field = cached;
                }
                Err(err) => return Err(err.into()),
            }
            Ok(())
        }
    };
}

impl AppStore {
    mirror_load!(
        /// Loads the product catalog.
        load_products, fetch_products, Partition::Products, products,
        |p: &Product| p.id.clone()
    );
    mirror_load!(
        /// Loads the category tree.
        load_categories, fetch_categories, Partition::Categories, categories,
        |c: &Category| c.id.clone()
    );
    mirror_load!(
        /// Loads store locations.
        load_stores, fetch_stores, Partition::Stores, stores,
        |s: &StoreLocation| s.id.clone()
    );
    mirror_load!(
        /// Loads users.
        load_users, fetch_users, Partition::Users, users,
        |u: &User| u.id.clone()
    );
    mirror_load!(
        /// Loads clients.
        load_clients, fetch_clients, Partition::Clients, clients,
        |c: &Client| c.id.clone()
    );
    mirror_load!(
        /// Loads inventory batches.
        load_batches, fetch_batches, Partition::InventoryBatches, batches,
        |b: &InventoryBatch| b.id.clone()
    );
    mirror_load!(
        /// Loads minimum-stock thresholds.
        load_min_stock_levels, fetch_min_stock_levels, Partition::MinStockLevels, min_stock_levels,
        |m: &MinStockLevel| format!("{}:{}", m.product_id, m.store_id)
    );
    mirror_load!(
        /// Loads transfer orders.
        load_transfers, fetch_transfers, Partition::Transfers, transfers,
        |t: &TransferOrder| t.id.clone()
    );
    mirror_load!(
        /// Loads expenses.
        load_expenses, fetch_expenses, Partition::Expenses, expenses,
        |e: &Expense| e.id.clone()
    );
    mirror_load!(
        /// Loads the shopping list.
        load_shopping_list, fetch_shopping_list, Partition::ShoppingList, shopping_list,
        |i: &ShoppingListItem| i.id.clone()
    );
    mirror_load!(
        /// Loads cash closings.
        load_closings, fetch_closings, Partition::CashClosings, closings,
        |c: &CashClosing| c.id.clone()
    );

    /// Loads the sales history.
    ///
    /// Hand-rolled instead of macro-generated because queued offline sales
    /// must stay visible: they are prepended to whatever the mirror holds.
    pub async fn load_sales(&self) -> StoreResult<()> {
        let mut sales = match self.remote.fetch_sales().await {
            Ok(sales) => {
                self.connectivity.set_online(true);
                let entries: Vec<_> = sales.iter().map(|s| (s.id.clone(), s.clone())).collect();
                self.cache.replace_all(Partition::Sales, &entries).await?;
                sales
            }
            Err(err) if err.is_connectivity() => {
                warn!(error = %err, "Remote unavailable, serving cached sales");
                self.connectivity.set_online(false);
                self.cache.get_all(Partition::Sales).await.unwrap_or_else(|cache_err| {
                    warn!(error = %cache_err, "Cache fallback failed, serving empty set");
                    Vec::new()
                })
            }
            Err(err) => return Err(err.into()),
        };

        let pending = self.cache.pending_sales().await?;
        for sale in pending.into_iter().rev() {
            if !sales.iter().any(|s| s.client_token == sale.client_token) {
                sales.insert(0, sale);
            }
        }

        self.state.lock().await.sales = sales;
        Ok(())
    }

    /// Loads every collection, restores a mirrored cart if the in-memory
    /// one is empty, and rederives alerts.
    pub async fn load_all(&self) -> StoreResult<()> {
        self.load_products().await?;
        self.load_categories().await?;
        self.load_stores().await?;
        self.load_users().await?;
        self.load_clients().await?;
        self.load_batches().await?;
        self.load_min_stock_levels().await?;
        self.load_sales().await?;
        self.load_transfers().await?;
        self.load_expenses().await?;
        self.load_shopping_list().await?;
        self.load_closings().await?;

        let recovered = self.cache.load_cart().await?;
        let mut state = self.state.lock().await;
        if state.cart.is_empty() {
            if let Some(cart) = recovered {
                if !cart.is_empty() {
                    info!(lines = cart.lines.len(), "Recovered mirrored cart");
                    state.cart = cart;
                }
            }
        }
        state.recompute_alerts();
        info!(
            products = state.products.len(),
            batches = state.batches.len(),
            alerts = state.alerts.len(),
            online = self.connectivity.is_online(),
            "State loaded"
        );
        Ok(())
    }
}
