//! End-to-end checkout and offline replay scenarios against an in-memory
//! remote backend.

mod common;

use common::{ready_store, seeded_data, FakeBackend};
use mostrador_core::{CoreError, Money, Quantity};
use mostrador_store::{CheckoutTender, StoreError};

fn tender_cash(cents: i64) -> CheckoutTender {
    CheckoutTender {
        cash: Money::from_cents(cents),
        ..CheckoutTender::default()
    }
}

#[tokio::test]
async fn online_checkout_records_sale_and_deducts_fefo() {
    let fake = FakeBackend::new(seeded_data());
    let store = ready_store(fake.clone()).await;

    store.add_to_cart("p1").await.unwrap();
    store.add_to_cart("p1").await.unwrap();
    store.add_to_cart("p1").await.unwrap();
    store.add_to_cart("p1").await.unwrap();

    let sale = store.checkout(tender_cash(4000)).await.unwrap();

    assert!(!sale.id.starts_with("offline-sale-"));
    assert_eq!(sale.total.cents(), 4000);
    assert_eq!(fake.sale_count(), 1);

    // FEFO: the earlier-expiring lot drains first.
    assert_eq!(fake.batch_quantity("early"), Quantity::zero());
    assert_eq!(fake.batch_quantity("late"), Quantity::from_units(3));

    store
        .with_state(|s| {
            assert!(s.cart.is_empty());
            assert_eq!(s.sales.len(), 1);
        })
        .await;
}

#[tokio::test]
async fn offline_checkout_queues_then_replays_on_reconnect() {
    let fake = FakeBackend::new(seeded_data());
    let store = ready_store(fake.clone()).await;

    fake.set_online(false);
    store.set_online(false);

    store.add_to_cart("p1").await.unwrap();
    store.add_to_cart("p1").await.unwrap();
    let sale = store.checkout(tender_cash(2000)).await.unwrap();

    // Queued, not on the server; local view already deducted.
    assert!(sale.id.starts_with("offline-sale-"));
    assert_eq!(fake.sale_count(), 0);
    assert_eq!(fake.batch_quantity("early"), Quantity::from_units(2));
    store
        .with_state(|s| {
            let early = s.batches.iter().find(|b| b.id == "early").unwrap();
            assert!(early.quantity.is_zero());
            assert_eq!(s.sales[0].id, sale.id);
        })
        .await;

    fake.set_online(true);
    let report = store.sync_pending_sales().await.unwrap();

    assert_eq!(report.submitted, 1);
    assert_eq!(report.remaining, 0);
    assert_eq!(fake.sale_count(), 1);
    // Replay re-derived the deduction against server batches.
    assert_eq!(fake.batch_quantity("early"), Quantity::zero());
    assert_eq!(fake.batch_quantity("late"), Quantity::from_units(5));

    // The placeholder id was swapped for the server-kept one.
    store
        .with_state(|s| {
            assert_eq!(s.sales.len(), 1);
            assert_eq!(s.sales[0].id, format!("srv-{}", sale.client_token));
        })
        .await;
}

#[tokio::test]
async fn interrupted_replay_does_not_duplicate_or_double_deduct() {
    let fake = FakeBackend::new(seeded_data());
    let store = ready_store(fake.clone()).await;

    fake.set_online(false);
    store.set_online(false);
    store.add_to_cart("p1").await.unwrap();
    let sale = store.checkout(tender_cash(1000)).await.unwrap();

    // The earlier replay attempt landed the sale but died before
    // dequeueing it.
    fake.set_online(true);
    fake.mark_token_seen(&sale.client_token, &sale);
    let before = fake.batch_quantity("early");

    let report = store.sync_pending_sales().await.unwrap();

    assert_eq!(report.already_recorded, 1);
    assert_eq!(report.submitted, 0);
    assert_eq!(fake.sale_count(), 1);
    assert_eq!(fake.batch_quantity("early"), before);
}

#[tokio::test]
async fn replay_postponed_while_still_offline() {
    let fake = FakeBackend::new(seeded_data());
    let store = ready_store(fake.clone()).await;

    fake.set_online(false);
    store.set_online(false);
    store.add_to_cart("p1").await.unwrap();
    store.checkout(tender_cash(1000)).await.unwrap();

    // Still offline: the pass postpones without draining the queue.
    let report = store.sync_pending_sales().await.unwrap();
    assert_eq!(report.submitted, 0);
    assert_eq!(report.remaining, 1);
    assert_eq!(fake.sale_count(), 0);
}

#[tokio::test]
async fn checkout_rejects_atomically_on_shortfall() {
    let fake = FakeBackend::new(seeded_data());
    let store = ready_store(fake.clone()).await;

    // 7 units on hand; fill the cart to the ceiling...
    for _ in 0..7 {
        store.add_to_cart("p1").await.unwrap();
    }
    // ...then lose one unit to employee consumption before checkout.
    store
        .record_employee_consumption("p1", Quantity::from_units(1))
        .await
        .unwrap();

    let err = store.checkout(tender_cash(7000)).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Core(CoreError::InsufficientStock { .. })
    ));

    // Nothing moved: cart intact, no sale anywhere, queue empty.
    assert_eq!(fake.sale_count(), 0);
    store
        .with_state(|s| {
            assert_eq!(s.cart.quantity_of("p1"), Quantity::from_units(7));
            assert!(s.sales.is_empty());
        })
        .await;
}

#[tokio::test]
async fn weighed_product_checkout_uses_fractional_quantities() {
    let fake = FakeBackend::new(seeded_data());
    let store = ready_store(fake.clone()).await;

    // 0.450 kg of cheese at $180.00/kg = $81.00.
    store
        .add_to_cart_weighed("queso", Quantity::from_milli(450))
        .await
        .unwrap();
    let sale = store.checkout(tender_cash(8100)).await.unwrap();

    assert_eq!(sale.total.cents(), 8100);
    assert_eq!(fake.batch_quantity("cheese"), Quantity::from_milli(1550));
}

#[tokio::test]
async fn offline_loads_serve_cached_mirror() {
    let fake = FakeBackend::new(seeded_data());
    let store = ready_store(fake.clone()).await;

    fake.set_online(false);
    store.load_all().await.unwrap();

    store
        .with_state(|s| {
            assert_eq!(s.products.len(), 2);
            assert_eq!(s.batches.len(), 3);
        })
        .await;
    assert!(!store.is_online());
}
