//! Durability scenarios over a file-backed cache: everything written
//! before a shutdown must be there after reopening the same file.

use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use mostrador_cache::{CacheConfig, LocalCache, Partition};
use mostrador_core::{Cart, CheckoutPayment, Money, Product, Quantity, Sale, SaleLine, UnitOfMeasure};

/// A unique cache file in the system temp dir, removed on drop.
struct TempCacheFile {
    path: PathBuf,
}

impl TempCacheFile {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("mostrador-cache-{}.db", Uuid::new_v4()));
        TempCacheFile { path }
    }
}

impl Drop for TempCacheFile {
    fn drop(&mut self) {
        // WAL mode leaves sidecar files next to the database.
        for suffix in ["", "-wal", "-shm"] {
            let mut name = self.path.as_os_str().to_os_string();
            name.push(suffix);
            let _ = std::fs::remove_file(name);
        }
    }
}

fn offline_sale(token: &str) -> Sale {
    let payment = CheckoutPayment {
        cash: Money::from_cents(2500),
        ..Default::default()
    };
    Sale::compose(
        vec![SaleLine {
            product_id: "p1".to_string(),
            name: "Leche Entera 1L".to_string(),
            unit_price: Money::from_cents(2500),
            quantity: Quantity::from_units(1),
        }],
        &payment,
        "cashier-1",
        "storeA",
        token,
        &format!("offline-sale-{}", token),
        Utc::now(),
    )
}

fn product(id: &str) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {}", id),
        price: Money::from_cents(1000),
        cost: Money::from_cents(600),
        unit: UnitOfMeasure::Unit,
        barcode: None,
        sku: None,
        category_id: None,
        image_url: None,
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn pending_queue_and_cart_survive_reopen() {
    let file = TempCacheFile::new();

    let sale = offline_sale("tok-durable");
    {
        let cache = LocalCache::open(CacheConfig::new(&file.path)).await.unwrap();
        cache.enqueue_pending_sale(&sale).await.unwrap();

        let mut cart = Cart::new();
        cart.add(&product("p1"), None).unwrap();
        cache.save_cart(&cart).await.unwrap();

        cache.close().await;
    }

    let reopened = LocalCache::open(CacheConfig::new(&file.path)).await.unwrap();

    let pending = reopened.pending_sales().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].client_token, sale.client_token);
    assert_eq!(pending[0].total, sale.total);

    let cart = reopened.load_cart().await.unwrap().unwrap();
    assert_eq!(cart.quantity_of("p1"), Quantity::from_units(1));
}

#[tokio::test]
async fn mirror_partition_survives_reopen() {
    let file = TempCacheFile::new();

    {
        let cache = LocalCache::open(CacheConfig::new(&file.path)).await.unwrap();
        let entries = vec![
            ("p1".to_string(), product("p1")),
            ("p2".to_string(), product("p2")),
        ];
        cache.replace_all(Partition::Products, &entries).await.unwrap();
        cache.close().await;
    }

    let reopened = LocalCache::open(CacheConfig::new(&file.path)).await.unwrap();
    let products: Vec<Product> = reopened.get_all(Partition::Products).await.unwrap();
    assert_eq!(products.len(), 2);
}

#[tokio::test]
async fn dequeued_sale_stays_gone_after_reopen() {
    let file = TempCacheFile::new();

    {
        let cache = LocalCache::open(CacheConfig::new(&file.path)).await.unwrap();
        cache.enqueue_pending_sale(&offline_sale("tok-a")).await.unwrap();
        cache.enqueue_pending_sale(&offline_sale("tok-b")).await.unwrap();
        assert!(cache.remove_pending_sale("tok-a").await.unwrap());
        cache.close().await;
    }

    let reopened = LocalCache::open(CacheConfig::new(&file.path)).await.unwrap();
    let pending = reopened.pending_sales().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].client_token, "tok-b");
}
