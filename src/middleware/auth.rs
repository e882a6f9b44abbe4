use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::ROLE_SELLER};

/// Cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// The authenticated subject attached to a request once the session cookie
/// has been verified. Verification is stateless; every request re-checks the
/// signature.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

/// Operator-level access: sellers see the unscoped order listing.
pub fn ensure_seller(user: &AuthUser) -> Result<(), AppError> {
    if user.role != ROLE_SELLER {
        return Err(AppError::Unauthorized("Not authorized".into()));
    }
    Ok(())
}

fn token_from_cookie_header(value: &str) -> Option<&str> {
    value.split(';').find_map(|pair| {
        let (name, token) = pair.trim().split_once('=')?;
        (name == TOKEN_COOKIE).then_some(token)
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let cookies = parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Not authorized, token not found".into()))?;

        let token = token_from_cookie_header(cookies)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, token not found".into()))?;

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Not authorized, token failed".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Not authorized, token failed".into()))?;

        Ok(AuthUser {
            user_id,
            role: decoded.claims.role.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::token_from_cookie_header;

    #[test]
    fn finds_token_among_other_cookies() {
        let header = "theme=dark; token=abc.def.ghi; lang=en";
        assert_eq!(token_from_cookie_header(header), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_token_cookie() {
        assert_eq!(token_from_cookie_header("theme=dark; lang=en"), None);
        assert_eq!(token_from_cookie_header(""), None);
    }
}
