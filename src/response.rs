use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Success envelope shared by every JSON endpoint: a `success` flag, an
/// optional human-readable message, and the payload fields flattened into the
/// envelope (`{"success": true, "orders": [...]}`).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success with a message and no payload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Success carrying a payload.
    pub fn with_data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Success carrying both a message and a payload.
    pub fn with_message_and_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}
