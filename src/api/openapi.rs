//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, health, items, meta, rentals, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfkeep API",
        version = "0.3.0",
        description = "Lending tracker for a shared shelf of books and games",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::login_uuid,
        auth::me,
        auth::register,
        auth::init,
        // Users
        users::list_users,
        users::get_user,
        users::edit_user,
        users::barcode,
        // Items
        items::catalog,
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::list_categories,
        // Search
        items::search_get,
        items::search_post,
        items::results,
        items::results_for,
        // Rentals
        rentals::toggle_rental,
        // Meta
        meta::list_locales,
        meta::navigation,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::UuidLoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            auth::RegisterResponse,
            // Users
            crate::models::user::Role,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::SelfEdit,
            crate::models::user::AdminEdit,
            users::EditMode,
            users::UserView,
            users::UserEditResponse,
            users::BarcodeResponse,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemKind,
            crate::models::item::Category,
            crate::models::item::ItemForm,
            crate::models::item::CategoryOption,
            items::ItemResponse,
            // Search
            crate::models::search::SearchForm,
            crate::models::search::SearchResults,
            // Rentals
            crate::models::rental::RentalAction,
            rentals::RentResponse,
            // Meta
            crate::i18n::Locale,
            meta::LocaleOption,
            meta::NavEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "items", description = "Catalog item management"),
        (name = "search", description = "Catalog search"),
        (name = "rentals", description = "Rent and return items"),
        (name = "meta", description = "Languages and navigation")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
