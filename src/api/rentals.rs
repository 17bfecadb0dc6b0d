//! Rent / return endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    i18n::MessageCatalog,
    models::{item::Item, rental::RentalAction},
    AppState,
};

use super::{AuthenticatedUser, RequestLocale};

#[derive(Serialize, ToSchema)]
pub struct RentResponse {
    /// What the toggle did
    pub action: RentalAction,
    /// Item after the change
    pub item: Item,
    pub message: String,
}

/// Toggle the rental of an item for the caller.
///
/// Rents an available item, gives back an item the caller holds, and is
/// rejected when someone else holds it.
#[utoipa::path(
    post,
    path = "/rent_item/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item rented or returned", body = RentResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Item rented by another user", body = crate::error::ErrorResponse)
    )
)]
pub async fn toggle_rental(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<i32>,
) -> AppResult<Json<RentResponse>> {
    let outcome = state
        .services
        .rentals
        .toggle(id, claims.username())
        .await?;

    let message = outcome.message().render(MessageCatalog::global(), locale);

    Ok(Json(RentResponse {
        action: outcome.action,
        item: outcome.item,
        message,
    }))
}
