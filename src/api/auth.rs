//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    i18n::{Locale, Message, MessageCatalog},
    models::user::{CreateUser, User},
    AppState,
};

use super::{AdminUser, AppJson, AuthenticatedUser, RequestLocale};

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Badge login
#[derive(Deserialize, ToSchema)]
pub struct UuidLoginRequest {
    pub uuid: Uuid,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserInfo,
}

/// Public view of a user
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub locale: Locale,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            roles: user.roles,
            locale: user.locale,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Created account with a confirmation message
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: UserInfo,
    pub message: String,
}

fn login_response(state: &AppState, token: String, user: User) -> LoginResponse {
    LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.jwt_expiration_hours * 3600,
        user: user.into(),
    }
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;

    Ok(Json(login_response(&state, token, user)))
}

/// Login with a badge (the user's UUID)
#[utoipa::path(
    post,
    path = "/auth/login/uuid",
    tag = "auth",
    request_body = UuidLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Unknown badge or badge login disabled", body = crate::error::ErrorResponse)
    )
)]
pub async fn login_uuid(
    State(state): State<AppState>,
    AppJson(request): AppJson<UuidLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state.services.users.authenticate_uuid(request.uuid).await?;
    Ok(Json(login_response(&state, token, user)))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user info", body = UserInfo),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user.into()))
}

/// Register a new user (admin)
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 409, description = "Username already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    RequestLocale(locale): RequestLocale,
    AppJson(form): AppJson<CreateUser>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state.services.users.register(form).await?;
    Ok((StatusCode::CREATED, Json(registered(user, locale))))
}

/// Create the first administrator on an empty installation
#[utoipa::path(
    post,
    path = "/auth/init",
    tag = "auth",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Administrator created", body = RegisterResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Users already exist", body = crate::error::ErrorResponse)
    )
)]
pub async fn init(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    AppJson(form): AppJson<CreateUser>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state.services.users.init_admin(form).await?;
    Ok((StatusCode::CREATED, Json(registered(user, locale))))
}

fn registered(user: User, locale: Locale) -> RegisterResponse {
    let message = Message::new("msg.user.registered")
        .arg("username", &user.username)
        .render(MessageCatalog::global(), locale);
    RegisterResponse {
        user: user.into(),
        message,
    }
}
