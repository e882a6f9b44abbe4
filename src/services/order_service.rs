use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rust_decimal_macros::dec;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::orders::{
        CheckoutUrlData, OrderItemInput, OrderLineView, OrderListData, OrderView, PlaceOrderRequest,
    },
    entity::{
        addresses::{Entity as Addresses, Model as AddressModel},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::{Address, PAYMENT_COD, PAYMENT_ONLINE},
    payments::stripe::{CheckoutLineItem, CreateCheckoutSession},
    response::ApiResponse,
    services::product_service::product_from_entity,
    state::AppState,
};

const TAX_RATE: Decimal = dec!(0.02);

/// Order total: item subtotal plus the flat 2% tax, at cent precision.
fn order_total(subtotal: Decimal) -> Decimal {
    (subtotal + subtotal * TAX_RATE).round_dp(2)
}

/// Per-unit charge sent to the hosted-checkout provider, in minor currency
/// units and tax-inclusive, rounded half-up the way the provider expects.
fn gross_unit_amount(offer_price: Decimal) -> Option<i64> {
    ((offer_price + offer_price * TAX_RATE) * dec!(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

struct PricedLine {
    product: ProductModel,
    quantity: i32,
}

/// Look up every referenced product and accumulate the subtotal from live
/// offer prices. Lookups run sequentially; the first missing product aborts
/// the whole computation so no partial order is ever created.
async fn price_items(
    orm: &OrmConn,
    items: &[OrderItemInput],
) -> AppResult<(Vec<PricedLine>, Decimal)> {
    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal = Decimal::ZERO;

    for item in items {
        if item.quantity <= 0 {
            return Err(AppError::Invalid("Invalid quantity".into()));
        }
        let product = Products::find_by_id(item.product)
            .one(orm)
            .await?
            .ok_or_else(|| {
                AppError::Invalid(format!("Product with id {} not found", item.product))
            })?;

        subtotal += product.offer_price * Decimal::from(item.quantity);
        lines.push(PricedLine {
            product,
            quantity: item.quantity,
        });
    }

    Ok((lines, subtotal))
}

async fn insert_order(
    orm: &OrmConn,
    user_id: Uuid,
    address_id: Uuid,
    amount: Decimal,
    payment_type: &str,
    lines: &[PricedLine],
) -> AppResult<OrderModel> {
    let txn = orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        address_id: Set(address_id),
        amount: Set(amount),
        payment_type: Set(payment_type.to_string()),
        is_paid: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in lines {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product.id),
            quantity: Set(line.quantity),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(order)
}

/// Cash-on-delivery checkout: recompute the amount server side and persist.
pub async fn place_order_cod(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<()>> {
    if payload.items.is_empty() {
        return Err(AppError::Invalid("Invalid data".into()));
    }

    let (lines, subtotal) = price_items(&state.orm, &payload.items).await?;
    let amount = order_total(subtotal);

    let order = insert_order(
        &state.orm,
        user.user_id,
        payload.address,
        amount,
        PAYMENT_COD,
        &lines,
    )
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_cod",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "amount": amount })),
    )
    .await;

    Ok(ApiResponse::ok("Order Placed Successfully"))
}

/// Hosted-checkout flow: persist the unpaid order first, then hand the
/// priced line items to the provider and return the redirect URL. The order
/// stays unpaid (and invisible in listings) until the webhook confirms it.
pub async fn place_order_online(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
    origin: &str,
) -> AppResult<ApiResponse<CheckoutUrlData>> {
    if payload.items.is_empty() {
        return Err(AppError::Invalid("Invalid data".into()));
    }

    let (lines, subtotal) = price_items(&state.orm, &payload.items).await?;
    let amount = order_total(subtotal);

    let order = insert_order(
        &state.orm,
        user.user_id,
        payload.address,
        amount,
        PAYMENT_ONLINE,
        &lines,
    )
    .await?;

    let mut line_items = Vec::with_capacity(lines.len());
    for line in &lines {
        let unit_amount = gross_unit_amount(line.product.offer_price)
            .ok_or_else(|| AppError::Invalid("Amount out of range".into()))?;
        line_items.push(CheckoutLineItem {
            name: line.product.name.clone(),
            unit_amount,
            quantity: i64::from(line.quantity),
        });
    }

    let session = state
        .stripe
        .create_checkout_session(CreateCheckoutSession {
            line_items,
            success_url: format!("{origin}/loader?next=my-orders"),
            cancel_url: format!("{origin}/cart"),
            order_id: order.id.to_string(),
            user_id: user.user_id.to_string(),
        })
        .await
        .map_err(|err| AppError::Payment(err.to_string()))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_online",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "session_id": session.id })),
    )
    .await;

    Ok(ApiResponse::with_data(CheckoutUrlData { url: session.url }))
}

/// Post-payment update driven by a verified webhook. The metadata ids are
/// untrusted until checked against the store: the order must exist and belong
/// to the claimed user. Marking paid and clearing the cart are independent
/// writes; replaying the same event reapplies both harmlessly.
pub async fn confirm_checkout(state: &AppState, order_id: Uuid, user_id: Uuid) -> AppResult<()> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await
        .map_err(|err| AppError::WebhookUpdate(err.into()))?
        .ok_or_else(|| AppError::WebhookUpdate(anyhow::anyhow!("order {order_id} not found")))?;

    if order.user_id != user_id {
        return Err(AppError::WebhookUpdate(anyhow::anyhow!(
            "order {order_id} does not belong to user {user_id}"
        )));
    }

    let mut active: OrderActive = order.into();
    active.is_paid = Set(true);
    active.updated_at = Set(Utc::now().into());
    active
        .update(&state.orm)
        .await
        .map_err(|err| AppError::WebhookUpdate(err.into()))?;

    sqlx::query("UPDATE users SET cart_items = '{}'::jsonb WHERE id = $1")
        .bind(user_id)
        .execute(&state.pool)
        .await
        .map_err(|err| AppError::WebhookUpdate(err.into()))?;

    audit::record(
        &state.pool,
        Some(user_id),
        "order_paid",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order_id })),
    )
    .await;

    Ok(())
}

/// Settled orders only: COD counts from creation, Online once the webhook
/// has flipped `is_paid`.
fn settled() -> Condition {
    Condition::any()
        .add(OrderCol::PaymentType.eq(PAYMENT_COD))
        .add(OrderCol::IsPaid.eq(true))
}

pub async fn list_user_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderListData>> {
    let orders = Orders::find()
        .filter(Condition::all().add(OrderCol::UserId.eq(user.user_id)).add(settled()))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        views.push(expand_order(&state.orm, order).await?);
    }

    Ok(ApiResponse::with_data(OrderListData { orders: views }))
}

/// Operator view: every settled order across all users.
pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderListData>> {
    ensure_seller(user)?;

    let orders = Orders::find()
        .filter(settled())
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        views.push(expand_order(&state.orm, order).await?);
    }

    Ok(ApiResponse::with_data(OrderListData { orders: views }))
}

/// Expand an order row into the listing shape: line items joined with their
/// product details (items whose product has since disappeared are dropped)
/// and the delivery address inlined.
async fn expand_order(orm: &OrmConn, order: OrderModel) -> AppResult<OrderView> {
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .find_also_related(Products)
        .all(orm)
        .await?;

    let items = rows
        .into_iter()
        .filter_map(|(item, product)| {
            product.map(|p| OrderLineView {
                product: product_from_entity(p),
                quantity: item.quantity,
            })
        })
        .collect();

    let address = Addresses::find_by_id(order.address_id)
        .one(orm)
        .await?
        .ok_or_else(|| AppError::Invalid("Address not found".into()))?;

    Ok(OrderView {
        id: order.id,
        user_id: order.user_id,
        items,
        amount: order.amount,
        address: address_from_entity(address),
        payment_type: order.payment_type,
        is_paid: order.is_paid,
        created_at: order.created_at.with_timezone(&Utc),
        updated_at: order.updated_at.with_timezone(&Utc),
    })
}

fn address_from_entity(model: AddressModel) -> Address {
    Address {
        id: model.id,
        user_id: model.user_id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        street: model.street,
        city: model.city,
        state: model.state,
        zipcode: model.zipcode,
        country: model.country,
        phone: model.phone,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::{gross_unit_amount, order_total};
    use rust_decimal_macros::dec;

    #[test]
    fn total_applies_flat_two_percent_tax() {
        // 3 × 10.00 → 30.00 + 2% = 30.60
        assert_eq!(order_total(dec!(30.00)), dec!(30.60));
        assert_eq!(order_total(dec!(0)), dec!(0));
    }

    #[test]
    fn total_rounds_to_cents() {
        // 9.99 × 1.02 = 10.1898 → 10.19
        assert_eq!(order_total(dec!(9.99)), dec!(10.19));
        // 0.49 × 1.02 = 0.4998 → 0.50
        assert_eq!(order_total(dec!(0.49)), dec!(0.50));
    }

    #[test]
    fn unit_amount_is_tax_inclusive_minor_units() {
        assert_eq!(gross_unit_amount(dec!(10.00)), Some(1020));
        // 9.99 × 1.02 = 10.1898 → 1018.98 → 1019
        assert_eq!(gross_unit_amount(dec!(9.99)), Some(1019));
        // half-up at the midpoint: 1.25 × 1.02 = 1.275 → 127.5 → 128
        assert_eq!(gross_unit_amount(dec!(1.25)), Some(128));
    }
}
