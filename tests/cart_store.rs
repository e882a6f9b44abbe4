use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_storefront_api::client::store::{AppStore, CartSync};
use axum_storefront_api::dto::auth::UserView;
use axum_storefront_api::models::{CartMap, Product};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;
use uuid::Uuid;

struct RecordingSync {
    tx: mpsc::UnboundedSender<CartMap>,
}

#[async_trait]
impl CartSync for RecordingSync {
    async fn push_cart(&self, items: CartMap) -> anyhow::Result<()> {
        self.tx.send(items).ok();
        Ok(())
    }
}

struct FailingSync;

#[async_trait]
impl CartSync for FailingSync {
    async fn push_cart(&self, _items: CartMap) -> anyhow::Result<()> {
        anyhow::bail!("backend unreachable")
    }
}

fn product(name: &str, offer_price: Decimal, in_stock: bool) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: vec!["test".to_string()],
        price: offer_price + dec!(0.50),
        offer_price,
        image: Vec::new(),
        category: "Test".to_string(),
        in_stock,
        created_at: Utc::now(),
    }
}

fn session_user() -> UserView {
    UserView {
        id: Uuid::new_v4(),
        name: "Shopper".to_string(),
        email: "shopper@example.com".to_string(),
        role: "user".to_string(),
    }
}

fn store_with_recorder() -> (AppStore, mpsc::UnboundedReceiver<CartMap>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let store = AppStore::new(Arc::new(RecordingSync { tx }));
    (store, rx)
}

#[tokio::test]
async fn add_creates_entry_at_one_then_increments() {
    let (mut store, _rx) = store_with_recorder();
    let id = Uuid::new_v4();

    store.add_to_cart(id);
    assert_eq!(store.cart_items().get(&id), Some(&1));

    store.add_to_cart(id);
    assert_eq!(store.cart_items().get(&id), Some(&2));
    assert_eq!(store.cart_count(), 2);
}

#[tokio::test]
async fn remove_decrements_then_deletes_at_zero() {
    let (mut store, _rx) = store_with_recorder();
    let id = Uuid::new_v4();

    store.add_to_cart(id);
    store.add_to_cart(id);

    store.remove_from_cart(id);
    assert_eq!(store.cart_items().get(&id), Some(&1));

    store.remove_from_cart(id);
    assert!(!store.cart_items().contains_key(&id));
}

#[tokio::test]
async fn remove_on_absent_entry_is_a_noop() {
    let (mut store, _rx) = store_with_recorder();
    store.remove_from_cart(Uuid::new_v4());
    assert!(store.cart_items().is_empty());
}

#[tokio::test]
async fn update_sets_exact_quantity_and_keeps_zero_entries() {
    let (mut store, _rx) = store_with_recorder();
    let id = Uuid::new_v4();

    store.update_cart_item(id, 5);
    assert_eq!(store.cart_items().get(&id), Some(&5));

    // Updating to 0 keeps the key; only remove deletes it.
    store.update_cart_item(id, 0);
    assert_eq!(store.cart_items().get(&id), Some(&0));
    assert_eq!(store.cart_count(), 0);
    assert!(store.cart_lines().is_empty());
}

#[tokio::test]
async fn amount_sums_offer_prices_and_floors_to_cents() {
    let (mut store, _rx) = store_with_recorder();
    let apples = product("Apples", dec!(10.00), true);
    let loose_tea = product("Loose Tea", dec!(0.333), true);
    let apples_id = apples.id;
    let tea_id = loose_tea.id;
    store.set_products(vec![apples, loose_tea]);

    store.update_cart_item(apples_id, 3);
    assert_eq!(store.cart_amount(), dec!(30.00));

    // 2 × 0.333 = 0.666, floored to 0.66 rather than rounded to 0.67.
    store.update_cart_item(apples_id, 0);
    store.update_cart_item(tea_id, 2);
    assert_eq!(store.cart_amount(), dec!(0.66));
}

#[tokio::test]
async fn amount_skips_unknown_products() {
    let (mut store, _rx) = store_with_recorder();
    let known = product("Bread", dec!(2.75), true);
    let known_id = known.id;
    store.set_products(vec![known]);

    store.update_cart_item(known_id, 1);
    store.update_cart_item(Uuid::new_v4(), 4);

    assert_eq!(store.cart_amount(), dec!(2.75));
    assert_eq!(store.cart_lines().len(), 1);
    // The unknown entry still counts as units in the basket badge.
    assert_eq!(store.cart_count(), 5);
}

#[tokio::test]
async fn visible_products_filter_by_search_query_and_stock() {
    let (mut store, _rx) = store_with_recorder();
    store.set_products(vec![
        product("Red Apples", dec!(3.50), true),
        product("Green Apples", dec!(3.20), false),
        product("Bananas", dec!(1.10), true),
    ]);

    assert_eq!(store.visible_products().len(), 2);

    store.set_search_query("apple");
    let visible = store.visible_products();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Red Apples");
}

#[tokio::test]
async fn no_sync_without_a_session() {
    let (mut store, mut rx) = store_with_recorder();
    store.add_to_cart(Uuid::new_v4());

    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn mutations_push_the_full_mapping_once_signed_in() {
    let (mut store, mut rx) = store_with_recorder();
    store.hydrate_session(session_user(), CartMap::new());

    let id = Uuid::new_v4();
    store.add_to_cart(id);

    let pushed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("sync should fire")
        .expect("channel open");
    assert_eq!(pushed.get(&id), Some(&1));
}

#[tokio::test]
async fn hydrating_a_session_does_not_sync_back() {
    let (mut store, mut rx) = store_with_recorder();
    let mut cart = CartMap::new();
    cart.insert(Uuid::new_v4(), 2);

    store.hydrate_session(session_user(), cart);
    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn sync_failure_leaves_local_state_intact() {
    let mut store = AppStore::new(Arc::new(FailingSync));
    store.hydrate_session(session_user(), CartMap::new());

    let id = Uuid::new_v4();
    store.add_to_cart(id);
    tokio::task::yield_now().await;

    assert_eq!(store.cart_items().get(&id), Some(&1));
}
