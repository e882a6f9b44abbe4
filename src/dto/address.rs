use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Address;

/// Address fields as submitted from the checkout form; the owning user id is
/// always taken from the session, never from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddAddressRequest {
    pub address: Option<AddressInput>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressListData {
    pub addresses: Vec<Address>,
}
