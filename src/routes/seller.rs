use axum::{Json, Router, response::IntoResponse, routing::get};

use crate::{
    error::AppResult,
    middleware::auth::{AuthUser, ensure_seller},
    response::ApiResponse,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/is-auth", get(is_auth))
}

#[utoipa::path(
    get,
    path = "/api/seller/is-auth",
    responses(
        (status = 200, description = "Session carries the operator role"),
        (status = 401, description = "Not an operator session")
    ),
    security(("cookie_auth" = [])),
    tag = "Seller"
)]
pub async fn is_auth(user: AuthUser) -> AppResult<impl IntoResponse> {
    ensure_seller(&user)?;
    Ok(Json(ApiResponse::<serde_json::Value>::ok("Authorized")))
}
