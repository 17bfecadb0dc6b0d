//! API handlers for Shelfkeep REST endpoints

pub mod auth;
pub mod health;
pub mod items;
pub mod meta;
pub mod openapi;
pub mod rentals;
pub mod users;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, AUTHORIZATION},
        request::Parts,
        HeaderMap,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, ErrorMessage},
    i18n::{Locale, Message},
    models::{
        access::{authorize, Requirement},
        user::{Role, UserClaims},
    },
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.services.users.verify_token(token)?;
        Ok(AuthenticatedUser(claims))
    }
}

/// Extractor for a caller holding the Admin role.
///
/// The role check runs during extraction, before the handler body.
pub struct AdminUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        authorize(&claims, &Requirement::Role(Role::Admin)).into_result()?;
        Ok(AdminUser(claims))
    }
}

/// Caller claims when a valid token is present, `None` otherwise
pub struct MaybeUser(pub Option<UserClaims>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_token(&parts.headers)
            .ok()
            .and_then(|token| state.services.users.verify_token(token).ok());
        Ok(MaybeUser(claims))
    }
}

/// Locale negotiated for this request by [`locale_middleware`]
#[derive(Debug, Clone, Copy)]
pub struct RequestLocale(pub Locale);

#[async_trait]
impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let locale = parts
            .extensions
            .get::<Locale>()
            .copied()
            .unwrap_or(state.config.i18n.default_locale);
        Ok(RequestLocale(locale))
    }
}

/// JSON body extractor whose rejections are reported as [`AppError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(
            Message::new("error.form.invalid_body").arg("details", rejection.body_text()),
        )
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication(Message::new("error.auth.missing_header")))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication(Message::new("error.auth.invalid_header")))
}

/// Pick the request locale: the caller's stored preference, then
/// `Accept-Language`, then the configured default.
pub fn negotiate_locale(state: &AppState, headers: &HeaderMap) -> Locale {
    let from_token = bearer_token(headers)
        .ok()
        .and_then(|token| state.services.users.verify_token(token).ok())
        .map(|claims| claims.locale);

    from_token
        .or_else(|| {
            headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok())
                .and_then(Locale::negotiate)
        })
        .unwrap_or(state.config.i18n.default_locale)
}

/// Stores the request [`Locale`] in extensions and renders error bodies in it
pub async fn locale_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let locale = negotiate_locale(&state, request.headers());
    request.extensions_mut().insert(locale);

    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorMessage>() {
        Some(error) => {
            let status = response.status();
            (status, Json(error.into_body(locale))).into_response()
        }
        None => response,
    }
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication and users
        .route("/auth/login", post(auth::login))
        .route("/auth/login/uuid", post(auth::login_uuid))
        .route("/auth/me", get(auth::me))
        .route("/auth/register", post(auth::register))
        .route("/auth/init", post(auth::init))
        .route("/auth/userlist", get(users::list_users))
        .route(
            "/auth/user/:id",
            get(users::get_user).put(users::edit_user).post(users::edit_user),
        )
        .route("/auth/user/:id/barcode", get(users::barcode))
        // Catalog
        .route("/", get(items::catalog))
        .route("/items", get(items::list_items).post(items::create_item))
        .route(
            "/item/:id",
            get(items::get_item).put(items::update_item).post(items::update_item),
        )
        .route("/categories", get(items::list_categories))
        // Search
        .route("/search", get(items::search_get).post(items::search_post))
        .route("/results", get(items::results))
        .route("/results/:query", get(items::results_for))
        // Rentals
        .route("/rent_item/:id", post(rentals::toggle_rental))
        // Meta
        .route("/locales", get(meta::list_locales))
        .route("/navigation", get(meta::navigation))
        .layer(middleware::from_fn_with_state(state.clone(), locale_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
