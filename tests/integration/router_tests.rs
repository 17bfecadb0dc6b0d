//! In-process router tests.
//!
//! The pool connects lazily, so only paths that are decided before any
//! database access are exercised here.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use shelfkeep_server::{
    api, config::AppConfig, i18n::Locale, models::user::UserClaims, repository::Repository,
    AppState,
};

fn app() -> (Router, AppConfig) {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .min_connections(0)
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    let state = AppState::new(config.clone(), Repository::new(pool));
    (api::router(state), config)
}

fn token(config: &AppConfig, roles: &[&str], locale: Locale) -> String {
    let now = chrono::Utc::now().timestamp();
    UserClaims {
        sub: "alice".to_string(),
        user_id: Uuid::new_v4(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        locale,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&config.auth.jwt_secret)
    .expect("token")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = send(app, get("/api/v1/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_catalog_requires_login() {
    let (app, _) = app();
    let request = get("/api/v1")
        .header(header::ACCEPT_LANGUAGE, "en")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2);
    assert_eq!(body["message"], "Missing authorization header");
}

#[tokio::test]
async fn test_rent_requires_login() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/rent_item/1")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let (app, _) = app();
    let request = get("/api/v1/search?q=Moliere")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .header(header::ACCEPT_LANGUAGE, "en")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_errors_follow_accept_language() {
    let (app, _) = app();
    let request = get("/api/v1/auth/me")
        .header(header::ACCEPT_LANGUAGE, "de-DE,de;q=0.9,en;q=0.5")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authorization-Header fehlt");
}

#[tokio::test]
async fn test_errors_default_to_configured_locale() {
    let (app, _) = app();
    let (_, body) = send(app, get("/api/v1/auth/me").body(Body::empty()).unwrap()).await;
    assert_eq!(body["message"], "En-tête d'autorisation manquant");
}

#[tokio::test]
async fn test_member_denied_admin_routes() {
    let (app, config) = app();
    let member = token(&config, &[], Locale::En);

    for uri in ["/api/v1/auth/userlist", "/api/v1/item/1"] {
        let request = get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", member))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["code"], 3);
        assert_eq!(body["message"], "The Admin role is required");
    }
}

#[tokio::test]
async fn test_token_locale_wins_over_header() {
    let (app, config) = app();
    let member = token(&config, &[], Locale::Fr);
    let request = get("/api/v1/auth/userlist")
        .header(header::AUTHORIZATION, format!("Bearer {}", member))
        .header(header::ACCEPT_LANGUAGE, "en")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Le rôle Admin est requis");
}

#[tokio::test]
async fn test_member_cannot_view_other_user() {
    let (app, config) = app();
    let member = token(&config, &[], Locale::En);
    let request = get(&format!("/api/v1/auth/user/{}", Uuid::new_v4()))
        .header(header::AUTHORIZATION, format!("Bearer {}", member))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cannot_view_other_badge() {
    let (app, config) = app();
    let admin = token(&config, &["Admin"], Locale::En);
    let request = get(&format!("/api/v1/auth/user/{}/barcode", Uuid::new_v4()))
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_item_with_twelve_digit_code_rejected() {
    let (app, config) = app();
    let admin = token(&config, &["Admin"], Locale::En);
    let mut request = post_json(
        "/api/v1/items",
        &json!({
            "kind": "book",
            "title": "Le Cid",
            "publisher": "Larousse",
            "author": "Corneille",
            "catalog_code": "978203587126",
            "category": "literature"
        }),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", admin).parse().unwrap(),
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6);
    assert_eq!(body["message"], "ISBN 13 must be 13 characters long");
}

#[tokio::test]
async fn test_item_without_title_rejected() {
    let (app, config) = app();
    let admin = token(&config, &["Admin"], Locale::En);
    let mut request = post_json(
        "/api/v1/items",
        &json!({ "kind": "game", "title": "  ", "publisher": "Asmodee", "category": "game" }),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", admin).parse().unwrap(),
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "title is required");
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let (app, config) = app();
    let admin = token(&config, &["Admin"], Locale::En);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/items")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_uuid_login_disabled_by_default() {
    let (app, _) = app();
    let mut request = post_json("/api/v1/auth/login/uuid", &json!({ "uuid": Uuid::new_v4() }));
    request
        .headers_mut()
        .insert(header::ACCEPT_LANGUAGE, "en".parse().unwrap());

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Badge login is disabled");
}

#[tokio::test]
async fn test_game_categories() {
    let (app, _) = app();
    let request = get("/api/v1/categories?kind=game")
        .header(header::ACCEPT_LANGUAGE, "de")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "key": "game", "label": "Spiel" }]));
}

#[tokio::test]
async fn test_locales_listed_in_request_language() {
    let (app, _) = app();
    let request = get("/api/v1/locales")
        .header(header::ACCEPT_LANGUAGE, "en")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "code": "fr", "label": "French" },
            { "code": "en", "label": "English" },
            { "code": "de", "label": "German" }
        ])
    );
}

#[tokio::test]
async fn test_navigation_for_admin() {
    let (app, config) = app();
    let admin = token(&config, &["Admin"], Locale::En);

    let (_, anonymous) = send(app.clone(), get("/api/v1/navigation").body(Body::empty()).unwrap()).await;
    assert_eq!(anonymous.as_array().unwrap().len(), 1);
    assert_eq!(anonymous[0]["key"], "login");

    let request = get("/api/v1/navigation")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["home", "items", "add_user", "user_list", "account"]);
    assert_eq!(body[0]["label"], "Home");
    assert_eq!(body[4]["label"], "alice");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let (app, _) = app();
    let (status, body) = send(app, get("/api-docs/openapi.json").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Shelfkeep API");
}
