use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dto::{address::AddressInput, auth::UserView, orders::OrderItemInput},
    models::{Address, CartMap, Product},
};

use super::store::CartSync;

/// Cookie-carrying HTTP client for the storefront API; the session token set
/// at login rides along on every later call.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    user: Option<UserView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    success: bool,
    user: Option<UserView>,
    #[serde(default)]
    cart_items: CartMap,
}

#[derive(Debug, Deserialize)]
struct AddressesResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    addresses: Vec<Address>,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    url: Option<String>,
}

fn envelope_message(message: Option<String>) -> anyhow::Error {
    anyhow::anyhow!(message.unwrap_or_else(|| "request failed".to_string()))
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> anyhow::Result<UserView> {
        let resp: AuthResponse = self
            .http
            .post(self.url("/api/user/register"))
            .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?
            .json()
            .await?;

        match (resp.success, resp.user) {
            (true, Some(user)) => Ok(user),
            (_, _) => Err(envelope_message(resp.message)),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<UserView> {
        let resp: AuthResponse = self
            .http
            .post(self.url("/api/user/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?
            .json()
            .await?;

        match (resp.success, resp.user) {
            (true, Some(user)) => Ok(user),
            (_, _) => Err(envelope_message(resp.message)),
        }
    }

    /// Returns the session user and stored cart, or `None` when no valid
    /// session cookie is held.
    pub async fn fetch_session(&self) -> anyhow::Result<Option<(UserView, CartMap)>> {
        let response = self.http.get(self.url("/api/user/is-auth")).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let resp: SessionResponse = response.json().await?;
        match (resp.success, resp.user) {
            (true, Some(user)) => Ok(Some((user, resp.cart_items))),
            _ => Ok(None),
        }
    }

    pub async fn fetch_products(&self) -> anyhow::Result<Vec<Product>> {
        let resp: ProductsResponse = self
            .http
            .get(self.url("/api/product/list"))
            .send()
            .await?
            .json()
            .await?;

        if !resp.success {
            return Err(envelope_message(resp.message));
        }
        Ok(resp.products)
    }

    pub async fn fetch_addresses(&self) -> anyhow::Result<Vec<Address>> {
        let resp: AddressesResponse = self
            .http
            .get(self.url("/api/address/get"))
            .send()
            .await?
            .json()
            .await?;

        if !resp.success {
            return Err(envelope_message(resp.message));
        }
        Ok(resp.addresses)
    }

    pub async fn add_address(&self, address: &AddressInput) -> anyhow::Result<()> {
        let resp: StatusResponse = self
            .http
            .post(self.url("/api/address/add"))
            .json(&serde_json::json!({ "address": address }))
            .send()
            .await?
            .json()
            .await?;

        if !resp.success {
            return Err(envelope_message(resp.message));
        }
        Ok(())
    }

    /// Cash-on-delivery checkout; returns the confirmation message.
    pub async fn place_order_cod(
        &self,
        items: &[OrderItemInput],
        address: Uuid,
    ) -> anyhow::Result<String> {
        let resp: StatusResponse = self
            .http
            .post(self.url("/api/order/cod"))
            .json(&serde_json::json!({ "items": items, "address": address }))
            .send()
            .await?
            .json()
            .await?;

        if !resp.success {
            return Err(envelope_message(resp.message));
        }
        Ok(resp.message.unwrap_or_default())
    }

    /// Hosted-checkout flow; returns the session URL to redirect the shopper
    /// to. `origin` becomes the base of the success/cancel redirects.
    pub async fn place_order_online(
        &self,
        items: &[OrderItemInput],
        address: Uuid,
        origin: &str,
    ) -> anyhow::Result<String> {
        let resp: CheckoutResponse = self
            .http
            .post(self.url("/api/order/stripe"))
            .header(header::ORIGIN, origin)
            .json(&serde_json::json!({ "items": items, "address": address }))
            .send()
            .await?
            .json()
            .await?;

        match (resp.success, resp.url) {
            (true, Some(url)) => Ok(url),
            _ => Err(envelope_message(resp.message)),
        }
    }
}

#[async_trait]
impl CartSync for ApiClient {
    async fn push_cart(&self, items: CartMap) -> anyhow::Result<()> {
        let resp: StatusResponse = self
            .http
            .post(self.url("/api/cart/update"))
            .json(&serde_json::json!({ "cartItems": items }))
            .send()
            .await?
            .json()
            .await?;

        if !resp.success {
            return Err(envelope_message(resp.message));
        }
        Ok(())
    }
}
