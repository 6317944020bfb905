use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse},
        error::AuthError,
        extractors::{cookie_value, BearerToken, JWT_COOKIE},
    },
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AuthError> {
    validate_register(&payload)?;

    let user = state
        .auth
        .register(&payload.email, &payload.username, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user.into()))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<ApiResponse<LoginResponse>>), AuthError> {
    validate_login(&payload)?;

    let token = state.auth.login(&payload.email, &payload.password).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, login_cookie(&token, &state));
    Ok((headers, Json(ApiResponse::ok(LoginResponse { token }))))
}

#[instrument(skip(state, token))]
pub async fn me(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<UserResponse>>, AuthError> {
    let user = state.auth.current_user(token.as_deref()).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

#[instrument(skip(headers))]
pub async fn logout(headers: HeaderMap) -> (HeaderMap, Json<ApiResponse<()>>) {
    let mut response_headers = HeaderMap::new();

    if cookie_value(&headers, JWT_COOKIE).is_none() {
        return (
            response_headers,
            Json(ApiResponse::message("Already logged out")),
        );
    }

    response_headers.insert(header::SET_COOKIE, clear_cookie());
    info!("user logged out");
    (
        response_headers,
        Json(ApiResponse::message("Logged out successfully")),
    )
}

/// HttpOnly strict cookie whose lifetime matches the token's.
fn login_cookie(token: &str, state: &AppState) -> HeaderValue {
    format!(
        "{JWT_COOKIE}={token}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={}",
        state.auth.jwt().ttl.whole_seconds()
    )
    .parse()
    .unwrap()
}

fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "jwt=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0",
    )
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

// Length bounds count characters, not bytes.
fn validate_register(payload: &RegisterRequest) -> Result<(), AuthError> {
    if !is_valid_email(payload.email.trim()) {
        return Err(AuthError::Validation("Invalid email format.".into()));
    }
    let username_chars = payload.username.chars().count();
    if username_chars < 3 {
        return Err(AuthError::Validation(
            "Username must be at least 3 characters long.".into(),
        ));
    }
    if username_chars > 50 {
        return Err(AuthError::Validation(
            "Username must not exceed 50 characters.".into(),
        ));
    }
    let password_chars = payload.password.chars().count();
    if password_chars < 8 {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters long.".into(),
        ));
    }
    if password_chars > 128 {
        return Err(AuthError::Validation(
            "Password must not exceed 128 characters.".into(),
        ));
    }
    Ok(())
}

fn validate_login(payload: &LoginRequest) -> Result<(), AuthError> {
    if !is_valid_email(payload.email.trim()) {
        return Err(AuthError::Validation("Invalid email format.".into()));
    }
    if payload.password.chars().count() < 8 {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters long.".into(),
        ));
    }
    Ok(())
}
