use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartMap;

/// Full replacement of the stored cart mapping, pushed by the frontend store
/// after every local mutation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    #[schema(value_type = std::collections::BTreeMap<String, i32>)]
    pub cart_items: CartMap,
}
