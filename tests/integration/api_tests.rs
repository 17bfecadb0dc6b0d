//! API integration tests against a running server.
//!
//! Expects the default seeded accounts (`admin` / `user`, password
//! `Password1`) and a server on localhost:8080.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const PASSWORD: &str = "Password1";

/// Log in and return (token, user id)
async fn login(client: &Client, username: &str, password: &str) -> (String, String) {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "login as {} failed", username);
    let body: Value = response.json().await.expect("Failed to parse login response");
    (
        body["token"].as_str().expect("No token in response").to_string(),
        body["user"]["id"].as_str().expect("No user id").to_string(),
    )
}

/// Register a fresh non-admin account and log it in
async fn fresh_user(client: &Client, admin_token: &str, prefix: &str) -> (String, String, String) {
    let username = format!("{}_{}", prefix, uuid::Uuid::new_v4().simple());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .bearer_auth(admin_token)
        .json(&json!({
            "username": username,
            "password": PASSWORD,
            "admin": false,
            "language": "en"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let (token, id) = login(client, &username, PASSWORD).await;
    (username, token, id)
}

async fn create_item(client: &Client, admin_token: &str, item: Value) -> Value {
    let response = client
        .post(format!("{}/items", BASE_URL))
        .bearer_auth(admin_token)
        .json(&item)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["item"].clone()
}

async fn rent(client: &Client, token: &str, id: i64) -> reqwest::Response {
    client
        .post(format!("{}/rent_item/{}", BASE_URL, id))
        .bearer_auth(token)
        .header("Accept-Language", "en")
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_rent_reject_return_scenario() {
    let client = Client::new();
    let (admin, _) = login(&client, "admin", PASSWORD).await;
    let (alice, alice_token, _) = fresh_user(&client, &admin, "alice").await;
    let (_, bob_token, _) = fresh_user(&client, &admin, "bob").await;

    let item = create_item(
        &client,
        &admin,
        json!({ "kind": "book", "title": "Le Cid", "publisher": "Larousse", "category": "literature" }),
    )
    .await;
    let id = item["id"].as_i64().unwrap();
    assert!(item["renter_name"].is_null());
    assert!(item["rented_at"].is_null());

    // alice rents
    let response = rent(&client, &alice_token, id).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["action"], "rented");
    assert_eq!(body["item"]["renter_name"], alice.as_str());
    assert!(body["item"]["rented_at"].is_string());
    assert_eq!(body["message"], "You rented Le Cid.");

    // bob is turned away, nothing changes
    let response = rent(&client, &bob_token, id).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        format!("ERROR Le Cid is already rented by {}.", alice)
    );

    let response = client
        .get(format!("{}/item/{}", BASE_URL, id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let current: Value = response.json().await.unwrap();
    assert_eq!(current["renter_name"], alice.as_str());

    // alice gives it back
    let response = rent(&client, &alice_token, id).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["action"], "returned");
    assert!(body["item"]["renter_name"].is_null());
    assert!(body["item"]["rented_at"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_concurrent_rents_have_one_winner() {
    let client = Client::new();
    let (admin, _) = login(&client, "admin", PASSWORD).await;
    let (_, first, _) = fresh_user(&client, &admin, "first").await;
    let (_, second, _) = fresh_user(&client, &admin, "second").await;

    let item = create_item(
        &client,
        &admin,
        json!({ "kind": "game", "title": "Dixit", "publisher": "Libellud", "category": "game" }),
    )
    .await;
    let id = item["id"].as_i64().unwrap();

    let (a, b) = tokio::join!(rent(&client, &first, id), rent(&client, &second, id));
    let mut statuses = vec![a.status().as_u16(), b.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![200, 409]);
}

#[tokio::test]
#[ignore]
async fn test_missing_item() {
    let client = Client::new();
    let (token, _) = login(&client, "user", PASSWORD).await;
    let response = rent(&client, &token, i32::MAX as i64).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_search() {
    let client = Client::new();
    let (admin, _) = login(&client, "admin", PASSWORD).await;
    let marker = uuid::Uuid::new_v4().simple().to_string();

    create_item(
        &client,
        &admin,
        json!({
            "kind": "book",
            "title": format!("Le Misanthrope {}", marker),
            "publisher": "Hachette",
            "author": "Moliere",
            "catalog_code": "9782010008993",
            "category": "literature"
        }),
    )
    .await;

    // token match on author
    let response = client
        .get(format!("{}/search", BASE_URL))
        .query(&[("q", "Moliere")])
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert!(!items.is_empty());
    for item in items {
        let fields = ["title", "author", "publisher", "catalog_code", "category"];
        assert!(fields
            .iter()
            .any(|f| item[*f].as_str().map_or(false, |v| v.contains("Moliere"))));
    }
    assert_eq!(body["editable"], true);

    // matching is case-sensitive
    let response = client
        .get(format!("{}/search", BASE_URL))
        .query(&[("q", "moliere")])
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(!body["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|item| item["title"].as_str().map_or(false, |t| t.contains(&marker))));

    // path form, whitespace runs between tokens
    let response = client
        .get(format!("{}/results/{}%20%20Hachette", BASE_URL, marker))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["total"].as_u64().unwrap() >= 1);

    // nothing matches
    let response = client
        .post(format!("{}/search", BASE_URL))
        .bearer_auth(&admin)
        .header("Accept-Language", "en")
        .json(&json!({ "search": format!("zz{}zz", marker) }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], 0);
    assert_eq!(body["message"], "No results found!");
}

#[tokio::test]
#[ignore]
async fn test_empty_search_lists_catalog() {
    let client = Client::new();
    let (token, _) = login(&client, "user", PASSWORD).await;

    let all: Value = client
        .get(format!("{}/items", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let results: Value = client
        .get(format!("{}/results", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(results["total"].as_u64().unwrap() as usize, all.as_array().unwrap().len());
    assert_eq!(results["editable"], false);
}

#[tokio::test]
#[ignore]
async fn test_edit_keeps_rental() {
    let client = Client::new();
    let (admin, _) = login(&client, "admin", PASSWORD).await;
    let (renter, renter_token, _) = fresh_user(&client, &admin, "renter").await;

    let item = create_item(
        &client,
        &admin,
        json!({ "kind": "book", "title": "Phedre", "publisher": "Larousse", "category": "literature" }),
    )
    .await;
    let id = item["id"].as_i64().unwrap();
    assert_eq!(rent(&client, &renter_token, id).await.status(), 200);

    let response = client
        .put(format!("{}/item/{}", BASE_URL, id))
        .bearer_auth(&admin)
        .json(&json!({ "kind": "book", "title": "Phèdre", "publisher": "Larousse", "author": "Racine", "category": "literature" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["item"]["title"], "Phèdre");
    assert_eq!(body["item"]["renter_name"], renter.as_str());
}

#[tokio::test]
#[ignore]
async fn test_self_edit_wrong_old_password_changes_nothing() {
    let client = Client::new();
    let (admin, _) = login(&client, "admin", PASSWORD).await;
    let (username, token, id) = fresh_user(&client, &admin, "carol").await;

    let response = client
        .put(format!("{}/auth/user/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({
            "old_password": "wrong",
            "new_password": "Another1",
            "confirm_password": "Another1",
            "language": "de"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // old password still works and the language is unchanged
    let (token, _) = login(&client, &username, PASSWORD).await;
    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["locale"], "en");
}

#[tokio::test]
#[ignore]
async fn test_admin_edit_grants_admin() {
    let client = Client::new();
    let (admin, _) = login(&client, "admin", PASSWORD).await;
    let (username, _, id) = fresh_user(&client, &admin, "dave").await;

    let response = client
        .post(format!("{}/auth/user/{}", BASE_URL, id))
        .bearer_auth(&admin)
        .json(&json!({ "password": "Reset123", "admin": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["user"]["roles"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "Admin"));

    login(&client, &username, "Reset123").await;
}

#[tokio::test]
#[ignore]
async fn test_own_barcode() {
    let client = Client::new();
    let (token, id) = login(&client, "user", PASSWORD).await;

    let response = client
        .get(format!("{}/auth/user/{}/barcode", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payload"], id.replace('-', ""));
    assert_eq!(body["symbology"], "code128");
    assert!(body["svg"].as_str().unwrap().contains("<svg"));
}

#[tokio::test]
#[ignore]
async fn test_concurrent_registrations_conflict() {
    let client = Client::new();
    let (admin, _) = login(&client, "admin", PASSWORD).await;
    let username = format!("twin_{}", uuid::Uuid::new_v4().simple());
    let form = json!({ "username": username, "password": PASSWORD });

    let register = || {
        client
            .post(format!("{}/auth/register", BASE_URL))
            .bearer_auth(&admin)
            .json(&form)
            .send()
    };
    let (a, b) = tokio::join!(register(), register());
    let mut statuses = vec![a.unwrap().status().as_u16(), b.unwrap().status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![201, 409]);
}

#[tokio::test]
#[ignore]
async fn test_blank_username_rejected() {
    let client = Client::new();
    let (admin, _) = login(&client, "admin", PASSWORD).await;

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .bearer_auth(&admin)
        .header("Accept-Language", "en")
        .json(&json!({ "username": "   ", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_init_refused_once_users_exist() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/init", BASE_URL))
        .json(&json!({ "username": "root", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}
