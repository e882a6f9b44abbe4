use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::cart::UpdateCartRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/update", post(update_cart))
}

#[utoipa::path(
    post,
    path = "/api/cart/update",
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Stored cart replaced"),
        (status = 401, description = "Missing or invalid session token")
    ),
    security(("cookie_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateCartRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = cart_service::update_cart(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}
