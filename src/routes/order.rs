use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    routing::{get, post},
};

use crate::{
    dto::orders::{CheckoutUrlData, OrderListData, PlaceOrderRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cod", post(place_order_cod))
        .route("/stripe", post(place_order_stripe))
        .route("/user", get(list_user_orders))
        .route("/seller", get(list_all_orders))
}

#[utoipa::path(
    post,
    path = "/api/order/cod",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Order placed, or an envelope failure"),
        (status = 401, description = "Missing or invalid session token")
    ),
    security(("cookie_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order_cod(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = order_service::place_order_cod(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/order/stripe",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Hosted checkout session URL", body = ApiResponse<CheckoutUrlData>),
        (status = 401, description = "Missing or invalid session token")
    ),
    security(("cookie_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order_stripe(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<ApiResponse<CheckoutUrlData>>> {
    // The success/cancel redirects point back at whichever frontend origin
    // initiated the checkout.
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Invalid("Missing origin header".into()))?;

    let resp = order_service::place_order_online(&state, &user, payload, origin).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/order/user",
    responses(
        (status = 200, description = "Session user's settled orders, newest first", body = ApiResponse<OrderListData>),
        (status = 401, description = "Missing or invalid session token")
    ),
    security(("cookie_auth" = [])),
    tag = "Orders"
)]
pub async fn list_user_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderListData>>> {
    let resp = order_service::list_user_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/order/seller",
    responses(
        (status = 200, description = "All settled orders (operator view)", body = ApiResponse<OrderListData>),
        (status = 401, description = "Not an operator session")
    ),
    security(("cookie_auth" = [])),
    tag = "Orders"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderListData>>> {
    let resp = order_service::list_all_orders(&state, &user).await?;
    Ok(Json(resp))
}
