use crate::{
    db::DbPool,
    dto::cart::UpdateCartRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
};

/// Replace the subject's stored cart with the mapping the frontend pushed.
/// The store syncs its whole state after every local mutation, so this is a
/// full overwrite rather than a delta.
pub async fn update_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<()>> {
    let result = sqlx::query("UPDATE users SET cart_items = $2 WHERE id = $1")
        .bind(user.user_id)
        .bind(sqlx::types::Json(payload.cart_items))
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Invalid("User not found".into()));
    }

    Ok(ApiResponse::ok("Cart updated"))
}
