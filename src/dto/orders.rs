use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Address, Product};

/// One line item of an order request: a product reference and a quantity.
/// The client never submits prices.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItemInput>,
    pub address: Uuid,
}

/// Line item expanded with the product details for order listings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderLineView {
    pub product: Product,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderLineView>,
    pub amount: Decimal,
    pub address: Address,
    pub payment_type: String,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListData {
    pub orders: Vec<OrderView>,
}

/// Hosted-checkout redirect returned by `POST /api/order/stripe`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutUrlData {
    pub url: String,
}
