use axum::Router;

use crate::state::AppState;

pub mod address;
pub mod cart;
pub mod doc;
pub mod health;
pub mod order;
pub mod product;
pub mod seller;
pub mod user;
pub mod webhook;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/user", user::router())
        .nest("/seller", seller::router())
        .nest("/product", product::router())
        .nest("/cart", cart::router())
        .nest("/address", address::router())
        .nest("/order", order::router())
}
