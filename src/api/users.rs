//! User management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    i18n::{Message, MessageCatalog},
    models::{
        access::{authorize, Requirement},
        user::{AdminEdit, Role, SelfEdit, UserShort},
    },
    AppState,
};

use super::{auth::UserInfo, AdminUser, AppJson, AuthenticatedUser, RequestLocale};

/// Which edit form applies to the viewed account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// Caller views their own account: password + language
    #[serde(rename = "self")]
    SelfService,
    /// Administrator views another account: password reset + admin flag
    Admin,
}

#[derive(Serialize, ToSchema)]
pub struct UserView {
    pub user: UserInfo,
    pub mode: EditMode,
}

#[derive(Serialize, ToSchema)]
pub struct UserEditResponse {
    pub user: UserInfo,
    pub message: String,
}

/// Badge payload (Code 128)
#[derive(Serialize, ToSchema)]
pub struct BarcodeResponse {
    pub username: String,
    pub symbology: String,
    /// User id in simple hex form
    pub payload: String,
    /// Rendered badge
    pub svg: String,
}

/// List all users
#[utoipa::path(
    get,
    path = "/auth/userlist",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<UserShort>),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    RequestLocale(locale): RequestLocale,
) -> AppResult<Json<Vec<UserShort>>> {
    let users = state
        .services
        .users
        .list(MessageCatalog::global(), locale)
        .await?;
    Ok(Json(users))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/auth/user/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserView),
        (status = 403, description = "Not allowed to view this user", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserView>> {
    authorize(&claims, &Requirement::SelfOrRole(id, Role::Admin)).into_result()?;

    let user = state.services.users.get_by_id(id).await?;
    let mode = if id == claims.user_id {
        EditMode::SelfService
    } else {
        EditMode::Admin
    };

    Ok(Json(UserView {
        user: user.into(),
        mode,
    }))
}

/// Edit a user.
///
/// On one's own account the body is a [`SelfEdit`]; an administrator
/// editing someone else sends an [`AdminEdit`].
#[utoipa::path(
    put,
    path = "/auth/user/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body(content = SelfEdit, description = "SelfEdit for one's own account, AdminEdit otherwise"),
    responses(
        (status = 200, description = "User updated", body = UserEditResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Incorrect old password", body = crate::error::ErrorResponse),
        (status = 403, description = "Not allowed to edit this user", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn edit_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<serde_json::Value>,
) -> AppResult<Json<UserEditResponse>> {
    authorize(&claims, &Requirement::SelfOrRole(id, Role::Admin)).into_result()?;

    if id == claims.user_id {
        let edit: SelfEdit = parse_body(body)?;
        let user = state.services.users.self_edit(id, edit).await?;
        // Confirm in the language just chosen
        let message = Message::new("msg.user.updated")
            .arg("username", &user.username)
            .render(MessageCatalog::global(), user.locale);
        return Ok(Json(UserEditResponse {
            user: user.into(),
            message,
        }));
    }

    let edit: AdminEdit = parse_body(body)?;
    let user = state.services.users.admin_edit(id, edit).await?;
    let message = Message::new("msg.user.updated_by_admin").render(MessageCatalog::global(), locale);
    Ok(Json(UserEditResponse {
        user: user.into(),
        message,
    }))
}

/// The caller's own badge
#[utoipa::path(
    get,
    path = "/auth/user/{id}/barcode",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Badge payload", body = BarcodeResponse),
        (status = 403, description = "Not the caller's badge", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn barcode(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BarcodeResponse>> {
    authorize(&claims, &Requirement::Owner(id)).into_result()?;

    let (payload, svg) = state.services.users.barcode(id).await?;
    Ok(Json(BarcodeResponse {
        username: claims.sub,
        symbology: "code128".to_string(),
        payload,
        svg,
    }))
}

fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(body).map_err(|e| {
        AppError::Validation(Message::new("error.form.invalid_body").arg("details", e))
    })
}
