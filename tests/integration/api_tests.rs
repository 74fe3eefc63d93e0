//! API integration tests
//!
//! Need a running server on a fresh database:
//! `cargo run` then `cargo test -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}_{}", prefix, nanos)
}

/// Unique alphabetic tag, so numeric search terms never match it
fn unique_tag() -> String {
    unique("")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .map(|c| (b'a' + (c as u8 - b'0')) as char)
        .collect()
}

/// Register a fresh user and return its bearer token
async fn new_user_token(client: &Client) -> String {
    let username = unique("user");
    let password = "password123";

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create_book(client: &Client, token: &str, name: &str, price: &str, author: &str) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "name": name, "price": price, "author_name": author }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    response.json().await.expect("Failed to parse response")
}

async fn patch_relation(
    client: &Client,
    token: &str,
    book_id: i64,
    body: Value,
) -> reqwest::Response {
    client
        .patch(format!("{}/book_relations/{}", BASE_URL, book_id))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn get_book(client: &Client, book_id: i64) -> Value {
    client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": unique("nobody"), "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_create_requires_authentication() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "name": "Anonymous", "price": "1.00", "author_name": "Nobody" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_new_book_has_empty_aggregates() {
    let client = Client::new();
    let token = new_user_token(&client).await;

    let book = create_book(&client, &token, &unique("Lonely Book"), "25", "Test Author").await;

    assert_eq!(book["price"], "25.00");
    assert_eq!(book["likes_count"], 0);
    assert!(book["rating"].is_null());
    assert!(book["owner"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_likes_count_and_rating() {
    let client = Client::new();
    let owner = new_user_token(&client).await;
    let book_1 = create_book(&client, &owner, &unique("Test Book 1"), "25", "Test Author").await;
    let book_2 = create_book(&client, &owner, &unique("Test Book 2"), "52", "Test Author").await;
    let id_1 = book_1["id"].as_i64().unwrap();
    let id_2 = book_2["id"].as_i64().unwrap();

    let user_1 = new_user_token(&client).await;
    let user_2 = new_user_token(&client).await;
    let user_3 = new_user_token(&client).await;

    patch_relation(&client, &user_1, id_1, json!({ "like": true, "rate": 4 })).await;
    patch_relation(&client, &user_2, id_1, json!({ "like": true, "rate": 5 })).await;
    patch_relation(&client, &user_3, id_2, json!({ "like": true })).await;

    let book_1 = get_book(&client, id_1).await;
    assert_eq!(book_1["likes_count"], 2);
    assert_eq!(book_1["rating"], "4.50");

    let book_2 = get_book(&client, id_2).await;
    assert_eq!(book_2["likes_count"], 1);
    assert!(book_2["rating"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_repeated_relation_updates_do_not_inflate_likes() {
    let client = Client::new();
    let owner = new_user_token(&client).await;
    let book = create_book(&client, &owner, &unique("Popular"), "10", "Author").await;
    let id = book["id"].as_i64().unwrap();

    let fan = new_user_token(&client).await;
    for _ in 0..3 {
        let response = patch_relation(&client, &fan, id, json!({ "like": true })).await;
        assert!(response.status().is_success());
    }
    let response = patch_relation(&client, &fan, id, json!({ "rate": 3 })).await;
    let relation: Value = response.json().await.unwrap();
    assert_eq!(relation["like"], true);
    assert_eq!(relation["rate"], 3);

    let book = get_book(&client, id).await;
    assert_eq!(book["likes_count"], 1);
    assert_eq!(book["rating"], "3.00");
}

#[tokio::test]
#[ignore]
async fn test_rate_out_of_range() {
    let client = Client::new();
    let token = new_user_token(&client).await;
    let book = create_book(&client, &token, &unique("Rated"), "10", "Author").await;

    let id = book["id"].as_i64().unwrap();
    let response = patch_relation(&client, &token, id, json!({ "rate": 6 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_search_and_ordering() {
    let client = Client::new();
    let token = new_user_token(&client).await;
    let tag = unique_tag();

    create_book(&client, &token, &format!("{} Book 1", tag), "25", "Author 1").await;
    create_book(&client, &token, &format!("{} Book 2 from Author 2", tag), "55", "Author 1").await;
    create_book(&client, &token, &format!("{} Book 3", tag), "60", "Author 2").await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .query(&[("search", format!("{} Author 2", tag).as_str()), ("ordering", "-price")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let prices: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["price"].as_str().unwrap())
        .collect();
    assert_eq!(prices, vec!["60.00", "55.00"]);
}

#[tokio::test]
#[ignore]
async fn test_invalid_ordering_is_bad_request() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .query(&[("ordering", "owner")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_only_owner_may_update() {
    let client = Client::new();
    let owner = new_user_token(&client).await;
    let stranger = new_user_token(&client).await;
    let book = create_book(&client, &owner, &unique("Mine"), "10", "Author").await;
    let id = book["id"].as_i64().unwrap();

    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(&stranger)
        .json(&json!({ "price": "1.00" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(&owner)
        .json(&json!({ "price": "12.5" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["price"], "12.50");

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
