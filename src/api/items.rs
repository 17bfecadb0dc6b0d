//! Item (catalog) and search endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    i18n::{Message, MessageCatalog},
    models::{
        item::{CategoryOption, Item, ItemForm, ItemQuery},
        search::{SearchForm, SearchParams, SearchQuery, SearchResults},
    },
    AppState,
};

use super::{AdminUser, AppJson, AuthenticatedUser, RequestLocale};

/// Item with a confirmation message
#[derive(Serialize, ToSchema)]
pub struct ItemResponse {
    pub item: Item,
    pub message: String,
}

/// Catalog listing (home page)
#[utoipa::path(
    get,
    path = "/",
    tag = "items",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Full catalog", body = SearchResults),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn catalog(
    state: State<AppState>,
    user: AuthenticatedUser,
    locale: RequestLocale,
) -> AppResult<Json<SearchResults>> {
    run_search(state, user, locale, "").await
}

/// List items, optionally of one kind
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    security(("bearer_auth" = [])),
    params(ItemQuery),
    responses(
        (status = 200, description = "List of items", body = Vec<Item>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ItemQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let items = state.services.catalog.list_items(query.kind).await?;
    Ok(Json(items))
}

/// Get item details by ID (edit view)
#[utoipa::path(
    get,
    path = "/item/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = Item),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Item>> {
    let item = state.services.catalog.get_item(id).await?;
    Ok(Json(item))
}

/// Create a new item
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    security(("bearer_auth" = [])),
    request_body = ItemForm,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    RequestLocale(locale): RequestLocale,
    AppJson(form): AppJson<ItemForm>,
) -> AppResult<(StatusCode, Json<ItemResponse>)> {
    let item = state.services.catalog.create_item(form).await?;
    let message = Message::new("msg.item.created").render(MessageCatalog::global(), locale);
    Ok((StatusCode::CREATED, Json(ItemResponse { item, message })))
}

/// Update an existing item. The rental state is kept.
#[utoipa::path(
    put,
    path = "/item/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    request_body = ItemForm,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    RequestLocale(locale): RequestLocale,
    Path(id): Path<i32>,
    AppJson(form): AppJson<ItemForm>,
) -> AppResult<Json<ItemResponse>> {
    let item = state.services.catalog.update_item(id, form).await?;
    let message = Message::new("msg.item.updated").render(MessageCatalog::global(), locale);
    Ok(Json(ItemResponse { item, message }))
}

/// Categories available to a kind, with translated labels
#[utoipa::path(
    get,
    path = "/categories",
    tag = "items",
    params(ItemQuery),
    responses(
        (status = 200, description = "Category choices", body = Vec<CategoryOption>)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<ItemQuery>,
) -> Json<Vec<CategoryOption>> {
    Json(
        state
            .services
            .catalog
            .categories(query.kind, MessageCatalog::global(), locale),
    )
}

/// Search the catalog (`?q=`)
#[utoipa::path(
    get,
    path = "/search",
    tag = "search",
    security(("bearer_auth" = [])),
    params(SearchParams),
    responses(
        (status = 200, description = "Search results", body = SearchResults),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_get(
    state: State<AppState>,
    user: AuthenticatedUser,
    locale: RequestLocale,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResults>> {
    run_search(state, user, locale, params.q.as_deref().unwrap_or("")).await
}

/// Search the catalog from the search form
#[utoipa::path(
    post,
    path = "/search",
    tag = "search",
    security(("bearer_auth" = [])),
    request_body = SearchForm,
    responses(
        (status = 200, description = "Search results", body = SearchResults),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_post(
    state: State<AppState>,
    user: AuthenticatedUser,
    locale: RequestLocale,
    AppJson(form): AppJson<SearchForm>,
) -> AppResult<Json<SearchResults>> {
    run_search(state, user, locale, &form.search).await
}

/// Results page without a query: the full catalog
#[utoipa::path(
    get,
    path = "/results",
    tag = "search",
    security(("bearer_auth" = [])),
    params(SearchParams),
    responses(
        (status = 200, description = "Search results", body = SearchResults),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn results(
    state: State<AppState>,
    user: AuthenticatedUser,
    locale: RequestLocale,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResults>> {
    run_search(state, user, locale, params.q.as_deref().unwrap_or("")).await
}

/// Results page for a query in the path
#[utoipa::path(
    get,
    path = "/results/{query}",
    tag = "search",
    security(("bearer_auth" = [])),
    params(
        ("query" = String, Path, description = "Free-text query")
    ),
    responses(
        (status = 200, description = "Search results", body = SearchResults),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn results_for(
    state: State<AppState>,
    user: AuthenticatedUser,
    locale: RequestLocale,
    Path(query): Path<String>,
) -> AppResult<Json<SearchResults>> {
    run_search(state, user, locale, &query).await
}

async fn run_search(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    RequestLocale(locale): RequestLocale,
    input: &str,
) -> AppResult<Json<SearchResults>> {
    let query = SearchQuery::parse(input);
    let items = state.services.catalog.search_items(&query).await?;

    let message = items
        .is_empty()
        .then(|| Message::new("msg.search.no_results").render(MessageCatalog::global(), locale));

    Ok(Json(SearchResults {
        query: query.raw().to_string(),
        total: items.len(),
        items,
        editable: claims.is_admin(),
        message,
    }))
}
