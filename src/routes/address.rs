use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::address::{AddAddressRequest, AddressListData},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_address))
        .route("/get", get(get_addresses))
}

#[utoipa::path(
    post,
    path = "/api/address/add",
    request_body = AddAddressRequest,
    responses(
        (status = 200, description = "Address stored for the session user"),
        (status = 401, description = "Missing or invalid session token")
    ),
    security(("cookie_auth" = [])),
    tag = "Addresses"
)]
pub async fn add_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddAddressRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = address_service::add_address(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/address/get",
    responses(
        (status = 200, description = "All addresses owned by the session user", body = ApiResponse<AddressListData>),
        (status = 401, description = "Missing or invalid session token")
    ),
    security(("cookie_auth" = [])),
    tag = "Addresses"
)]
pub async fn get_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AddressListData>>> {
    let resp = address_service::get_addresses(&state.pool, &user).await?;
    Ok(Json(resp))
}
