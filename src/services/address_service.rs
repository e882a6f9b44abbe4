use crate::{
    audit,
    db::DbPool,
    dto::address::{AddAddressRequest, AddressListData},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::ApiResponse,
};
use uuid::Uuid;

pub async fn add_address(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddAddressRequest,
) -> AppResult<ApiResponse<()>> {
    let address = match payload.address {
        Some(a) => a,
        None => return Err(AppError::Invalid("Address data is required".into())),
    };

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO addresses
            (id, user_id, first_name, last_name, email, street, city, state, zipcode, country, phone)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(address.first_name)
    .bind(address.last_name)
    .bind(address.email)
    .bind(address.street)
    .bind(address.city)
    .bind(address.state)
    .bind(address.zipcode)
    .bind(address.country)
    .bind(address.phone)
    .execute(pool)
    .await?;

    audit::record(
        pool,
        Some(user.user_id),
        "address_add",
        Some("addresses"),
        Some(serde_json::json!({ "address_id": id })),
    )
    .await;

    Ok(ApiResponse::ok("Address added successfully"))
}

pub async fn get_addresses(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressListData>> {
    let addresses: Vec<Address> = sqlx::query_as(
        "SELECT * FROM addresses WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::with_data(AddressListData { addresses }))
}
