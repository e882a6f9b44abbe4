use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Stored cart mapping: product id -> quantity.
pub type CartMap = BTreeMap<Uuid, i32>;

/// Catalog product as served to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Vec<String>,
    pub price: Decimal,
    pub offer_price: Decimal,
    pub image: Vec<String>,
    pub category: String,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

/// Delivery address owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Account row. Never serialized to clients directly; see `dto::auth::UserView`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub cart_items: sqlx::types::Json<CartMap>,
    pub created_at: DateTime<Utc>,
}

pub const ROLE_USER: &str = "user";
pub const ROLE_SELLER: &str = "seller";

pub const PAYMENT_COD: &str = "COD";
pub const PAYMENT_ONLINE: &str = "Online";
