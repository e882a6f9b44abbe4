use axum::{
    Json, Router,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};

use crate::{
    dto::auth::{AuthData, LoginRequest, RegisterRequest, SessionData},
    error::AppResult,
    middleware::auth::{AuthUser, TOKEN_COOKIE},
    response::ApiResponse,
    services::auth_service::{self, SESSION_TTL_DAYS},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/is-auth", get(is_auth))
}

fn session_cookie(token: &str) -> String {
    let max_age = SESSION_TTL_DAYS * 24 * 60 * 60;
    format!("{TOKEN_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}")
}

fn expired_cookie() -> String {
    format!("{TOKEN_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created; session cookie set", body = ApiResponse<AuthData>)
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let (resp, token) = auth_service::register_user(&state.pool, payload).await?;
    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie(&token))]),
        Json(resp),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = ApiResponse<AuthData>)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (resp, token) = auth_service::login_user(&state.pool, payload).await?;
    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie(&token))]),
        Json(resp),
    ))
}

#[utoipa::path(
    get,
    path = "/api/user/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    ),
    tag = "Auth"
)]
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, expired_cookie())]),
        Json(ApiResponse::<serde_json::Value>::ok("Logged out")),
    )
}

#[utoipa::path(
    get,
    path = "/api/user/is-auth",
    responses(
        (status = 200, description = "Session user and stored cart", body = ApiResponse<SessionData>),
        (status = 401, description = "Missing or invalid session token")
    ),
    security(("cookie_auth" = [])),
    tag = "Auth"
)]
pub async fn is_auth(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SessionData>>> {
    let resp = auth_service::is_auth(&state.pool, &user).await?;
    Ok(Json(resp))
}
