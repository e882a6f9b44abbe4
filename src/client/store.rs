use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::{
    dto::auth::UserView,
    models::{CartMap, Product},
};

/// Backend sink for cart state. Pushes replace the stored mapping wholesale;
/// overlapping pushes carry the full state, so losing one is harmless.
#[async_trait]
pub trait CartSync: Send + Sync {
    async fn push_cart(&self, items: CartMap) -> anyhow::Result<()>;
}

/// A cart entry joined with its catalog product, as the cart page renders it.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i32,
}

/// Global UI state container. Mutations go through the methods below; each
/// one schedules a background sync once a user session exists.
pub struct AppStore {
    products: Vec<Product>,
    cart_items: CartMap,
    user: Option<UserView>,
    search_query: String,
    sync: Arc<dyn CartSync>,
}

impl AppStore {
    pub fn new(sync: Arc<dyn CartSync>) -> Self {
        Self {
            products: Vec::new(),
            cart_items: CartMap::new(),
            user: None,
            search_query: String::new(),
            sync,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn cart_items(&self) -> &CartMap {
        &self.cart_items
    }

    pub fn user(&self) -> Option<&UserView> {
        self.user.as_ref()
    }

    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    /// Install the session fetched from the backend, replacing the local cart
    /// with the stored one. No sync: this state just came from the server.
    pub fn hydrate_session(&mut self, user: UserView, cart_items: CartMap) {
        self.user = Some(user);
        self.cart_items = cart_items;
    }

    pub fn clear_session(&mut self) {
        self.user = None;
        self.cart_items.clear();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Add one unit: a missing entry starts at 1, an existing one increments.
    pub fn add_to_cart(&mut self, product_id: Uuid) {
        *self.cart_items.entry(product_id).or_insert(0) += 1;
        self.queue_sync();
    }

    /// Set an exact quantity. Setting 0 keeps the entry around; only
    /// `remove_from_cart` deletes keys. The cart page never offers 0 in its
    /// quantity picker, so the zombie entry is invisible there, and both the
    /// count and the amount ignore it.
    pub fn update_cart_item(&mut self, product_id: Uuid, quantity: i32) {
        self.cart_items.insert(product_id, quantity);
        self.queue_sync();
    }

    /// Remove one unit; the entry disappears when it reaches zero.
    pub fn remove_from_cart(&mut self, product_id: Uuid) {
        if let Some(quantity) = self.cart_items.get_mut(&product_id) {
            *quantity -= 1;
            if *quantity == 0 {
                self.cart_items.remove(&product_id);
            }
        }
        self.queue_sync();
    }

    /// Drop every entry, e.g. after a cash-on-delivery order goes through.
    pub fn clear_cart(&mut self) {
        self.cart_items.clear();
        self.queue_sync();
    }

    /// Total number of units across all entries.
    pub fn cart_count(&self) -> i64 {
        self.cart_items.values().map(|q| i64::from(*q)).sum()
    }

    /// Cart subtotal at offer prices, floored to cents. Entries whose product
    /// is not in the catalog (or whose quantity is not positive) are skipped.
    pub fn cart_amount(&self) -> Decimal {
        let total: Decimal = self
            .cart_items
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .filter_map(|(id, quantity)| {
                self.products
                    .iter()
                    .find(|product| product.id == *id)
                    .map(|product| product.offer_price * Decimal::from(*quantity))
            })
            .sum();

        total.round_dp_with_strategy(2, RoundingStrategy::ToZero)
    }

    /// The joined view the cart page iterates over.
    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.cart_items
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .filter_map(|(id, quantity)| {
                self.products
                    .iter()
                    .find(|product| product.id == *id)
                    .map(|product| CartLine {
                        product: product.clone(),
                        quantity: *quantity,
                    })
            })
            .collect()
    }

    /// Catalog filtered the way the listing page shows it: in-stock products
    /// whose name matches the search query.
    pub fn visible_products(&self) -> Vec<&Product> {
        let query = self.search_query.to_lowercase();
        self.products
            .iter()
            .filter(|product| product.in_stock)
            .filter(|product| query.is_empty() || product.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Fire-and-forget push of the full mapping. Only runs with a session;
    /// failures are logged as transient, never bubbled into the UI state.
    fn queue_sync(&self) {
        if self.user.is_none() {
            return;
        }
        let sync = Arc::clone(&self.sync);
        let items = self.cart_items.clone();
        tokio::spawn(async move {
            if let Err(err) = sync.push_cart(items).await {
                tracing::warn!(error = %err, "cart sync failed");
            }
        });
    }
}
