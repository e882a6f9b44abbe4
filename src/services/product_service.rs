use chrono::Utc;
use sea_orm::{EntityTrait, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::products::{ProductData, ProductListData},
    entity::products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::Product,
    response::ApiResponse,
    state::AppState,
};

pub async fn list_products(state: &AppState) -> AppResult<ApiResponse<ProductListData>> {
    let products = Products::find()
        .order_by_desc(ProdCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::with_data(ProductListData { products }))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductData>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);

    match product {
        Some(product) => Ok(ApiResponse::with_data(ProductData { product })),
        None => Err(AppError::Invalid("Product not found".into())),
    }
}

/// Entity rows keep `description` and `image` as JSON arrays; flatten them
/// into the typed catalog model the API serves.
pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: serde_json::from_value(model.description).unwrap_or_default(),
        price: model.price,
        offer_price: model.offer_price,
        image: serde_json::from_value(model.image).unwrap_or_default(),
        category: model.category,
        in_stock: model.in_stock,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
