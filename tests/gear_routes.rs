//! Gear Route Tests
//!
//! Drives the full router with `oneshot` requests against the
//! in-memory store:
//! - Inserted records read back unchanged apart from the server id
//! - List queries page, sort and filter
//! - Updates must match and modify exactly one record
//! - Deletes always answer 204
//! - Malformed path identifiers answer 500, not 400

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use gear_crud::http_server::GearServer;
use gear_crud::model::{Armor, GearId, Weapon};
use gear_crud::rest_api::{ErrorResponse, GearService};
use gear_crud::store::{InMemoryGearStore, StoreError};
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (Arc<InMemoryGearStore>, Router) {
    let store = Arc::new(InMemoryGearStore::new());
    let service = GearService::with_version(store.clone(), "test");
    (store, GearServer::build_router(service))
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn error(&self) -> String {
        serde_json::from_slice::<ErrorResponse>(&self.body)
            .unwrap()
            .error
    }

    /// Id carried by the `Location` header of an insert
    fn location_id(&self) -> String {
        let location = self.headers[LOCATION].to_str().unwrap();
        location.rsplit('/').next().unwrap().to_string()
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<String>) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}

async fn post_json(router: &Router, uri: &str, body: Value) -> TestResponse {
    send(router, Method::POST, uri, Some(body.to_string())).await
}

async fn put_json(router: &Router, uri: &str, body: Value) -> TestResponse {
    send(router, Method::PUT, uri, Some(body.to_string())).await
}

async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Method::GET, uri, None).await
}

async fn delete(router: &Router, uri: &str) -> TestResponse {
    send(router, Method::DELETE, uri, None).await
}

fn padded_armor() -> Value {
    json!({
        "type": "Padded Armor",
        "defense": 0,
        "soak": 2,
        "price": 500,
        "encumbrance": 2,
        "hardPoints": 2,
        "rarity": 1
    })
}

fn blaster_pistol() -> Value {
    json!({
        "type": "Energy Weapon",
        "name": "Blaster Pistol",
        "skill": "Ranged (Light)",
        "damage": "6",
        "critical": 3,
        "range": "Medium",
        "encumberence": 1,
        "hp": 3,
        "price": 400,
        "rarity": 4,
        "special": "Stun setting"
    })
}

/// Insert `count` armor records priced 1..=count and return their ids
async fn seed_armor(router: &Router, count: i64) -> Vec<String> {
    let mut ids = Vec::new();
    for price in 1..=count {
        let response = post_json(router, "/armor", json!({"type": "Seed", "price": price})).await;
        assert_eq!(response.status, StatusCode::OK);
        ids.push(response.location_id());
    }
    ids
}

// =============================================================================
// Liveness
// =============================================================================

/// Ping reports the version without touching the store.
#[tokio::test]
async fn test_ping() {
    let (store, router) = setup();
    store.fail_with(StoreError::persistence("down"));

    let response = get(&router, "/ping").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"OK, test");
}

/// Health answers 200 when the store responds.
#[tokio::test]
async fn test_health_ok() {
    let (_store, router) = setup();

    let response = get(&router, "/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!("Gear Database Healthy"));
}

/// Health answers 424 with the version and store error when unreachable.
#[tokio::test]
async fn test_health_failed_dependency() {
    let (store, router) = setup();
    store.fail_with(StoreError::persistence("server selection timeout"));

    let response = get(&router, "/health").await;
    assert_eq!(response.status, StatusCode::FAILED_DEPENDENCY);

    let body = response.json();
    assert_eq!(body["apiVersion"], "test");
    assert!(body["dbError"]
        .as_str()
        .unwrap()
        .contains("server selection timeout"));
}

// =============================================================================
// Insert
// =============================================================================

/// A posted record reads back equal apart from the server-assigned id.
#[tokio::test]
async fn test_insert_then_get_by_id() {
    let (_store, router) = setup();

    let response = post_json(&router, "/armor", padded_armor()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!("Armor Object Created"));

    let id = response.location_id();
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

    let fetched = get(&router, &format!("/armor/{}", id)).await;
    assert_eq!(fetched.status, StatusCode::OK);

    let mut body = fetched.json();
    assert_eq!(body["_id"], id.as_str());
    body.as_object_mut().unwrap().remove("_id");
    assert_eq!(body, padded_armor());
}

/// A client-supplied `_id` is overwritten by a fresh one.
#[tokio::test]
async fn test_insert_ignores_client_id() {
    let (_store, router) = setup();
    let client_id = "5f1b2c3d4e5f60718293a4b5";

    let mut body = blaster_pistol();
    body["_id"] = json!(client_id);

    let response = post_json(&router, "/weapon", body).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!("Weapon Object Created"));
    assert_ne!(response.location_id(), client_id);

    let missing = get(&router, &format!("/weapon/{}", client_id)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

/// A blank `_id` (null or empty string) is treated as absent.
#[tokio::test]
async fn test_insert_blank_client_id() {
    let (_store, router) = setup();

    for blank in [json!(null), json!("")] {
        let response = post_json(&router, "/armor", json!({"_id": blank, "type": "Padded"})).await;
        assert_eq!(response.status, StatusCode::OK);

        let id = response.location_id();
        assert!(!GearId::parse(&id).unwrap().is_nil());

        let fetched: Armor =
            serde_json::from_value(get(&router, &format!("/armor/{}", id)).await.json()).unwrap();
        assert_eq!(fetched.armor_type, "Padded");
    }
}

/// Unparsable JSON is rejected before the store is reached.
#[tokio::test]
async fn test_insert_bad_json() {
    let (store, router) = setup();
    // A store hit would answer 500
    store.fail_with(StoreError::persistence("store must not be called"));

    let response = send(&router, Method::POST, "/armor", Some("{bad json".to_string())).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Invalid Request Payload");

    let response = post_json(&router, "/weapon", json!({"critical": "high"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

/// Store failures on insert are classified and their message returned.
#[tokio::test]
async fn test_insert_store_error() {
    let (store, router) = setup();
    store.fail_with(StoreError::persistence("test error"));

    let response = post_json(&router, "/armor", padded_armor()).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.error().contains("test error"));
}

/// Concurrent inserts never share an identifier.
#[tokio::test]
async fn test_concurrent_inserts_get_distinct_ids() {
    let (_store, router) = setup();
    let burst = 50;

    let mut tasks = Vec::new();
    for i in 0..burst {
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            post_json(&router, "/weapon", json!({"name": format!("Blaster {}", i)})).await
        }));
    }

    let mut ids = HashSet::new();
    for task in tasks {
        let response = task.await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        ids.insert(response.location_id());
    }
    assert_eq!(ids.len(), burst);

    let listed: Vec<Weapon> =
        serde_json::from_value(get(&router, "/weapon?pageSize=100").await.json()).unwrap();
    let listed_ids: HashSet<String> = listed.iter().map(|w| w.id.to_hex()).collect();
    assert_eq!(listed_ids, ids);
}

// =============================================================================
// List
// =============================================================================

/// No parameters: ascending by id, capped at the default page size.
#[tokio::test]
async fn test_list_defaults() {
    let (_store, router) = setup();
    let mut ids = seed_armor(&router, 30).await;
    ids.sort();

    let response = get(&router, "/armor").await;
    assert_eq!(response.status, StatusCode::OK);

    let armor: Vec<Armor> = serde_json::from_value(response.json()).unwrap();
    let listed: Vec<String> = armor.iter().map(|a| a.id.to_hex()).collect();
    assert_eq!(listed, ids[..25].to_vec());
}

/// Page 2 skips exactly one page of the sorted order.
#[tokio::test]
async fn test_list_second_page() {
    let (_store, router) = setup();
    seed_armor(&router, 7).await;

    let response = get(&router, "/armor?sort=price&page=2&pageSize=3").await;
    assert_eq!(response.status, StatusCode::OK);

    let prices: Vec<i64> = serde_json::from_value::<Vec<Armor>>(response.json())
        .unwrap()
        .iter()
        .map(|a| a.price)
        .collect();
    assert_eq!(prices, vec![4, 5, 6]);
}

/// Recognized fields filter; unknown keys are ignored.
#[tokio::test]
async fn test_list_filter() {
    let (_store, router) = setup();
    post_json(&router, "/weapon", blaster_pistol()).await;
    post_json(
        &router,
        "/weapon",
        json!({"type": "Melee", "name": "Vibroknife", "damage": "+1", "skill": "Melee"}),
    )
    .await;

    let response = get(&router, "/weapon?skill=Melee&colour=blue").await;
    assert_eq!(response.status, StatusCode::OK);

    let weapons: Vec<Weapon> = serde_json::from_value(response.json()).unwrap();
    assert_eq!(weapons.len(), 1);
    assert_eq!(weapons[0].name, "Vibroknife");
    assert_eq!(weapons[0].damage, "+1");
}

/// An empty collection lists as an empty array.
#[tokio::test]
async fn test_list_empty() {
    let (_store, router) = setup();

    let response = get(&router, "/weapon").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

/// Store failure on list answers 500.
#[tokio::test]
async fn test_list_store_error() {
    let (store, router) = setup();
    store.fail_with(StoreError::persistence("cursor killed"));

    let response = get(&router, "/armor").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Get By Id
// =============================================================================

/// A well-formed id with no record answers 404.
#[tokio::test]
async fn test_get_missing() {
    let (_store, router) = setup();

    let response = get(&router, &format!("/armor/{}", GearId::new())).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Update
// =============================================================================

/// A changed body replaces the record and echoes the id as a JSON string.
#[tokio::test]
async fn test_update_existing() {
    let (_store, router) = setup();
    let id = post_json(&router, "/weapon", blaster_pistol())
        .await
        .location_id();

    let mut changed = blaster_pistol();
    changed["damage"] = json!("7");
    changed["name"] = json!("Heavy Blaster Pistol");

    let response = put_json(&router, &format!("/weapon/{}", id), changed).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        String::from_utf8(response.body.to_vec()).unwrap(),
        format!("\"{}\"", id)
    );

    let fetched: Weapon =
        serde_json::from_value(get(&router, &format!("/weapon/{}", id)).await.json()).unwrap();
    assert_eq!(fetched.id.to_hex(), id);
    assert_eq!(fetched.name, "Heavy Blaster Pistol");
    assert_eq!(fetched.damage, "7");
    assert_eq!(fetched.special, "Stun setting");
}

/// Updating an id with no record fails (matched count 0).
#[tokio::test]
async fn test_update_missing() {
    let (_store, router) = setup();

    let response = put_json(&router, &format!("/armor/{}", GearId::new()), padded_armor()).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.error().contains("matched 0"));
}

/// Re-submitting the stored value fails (modified count 0).
#[tokio::test]
async fn test_update_identical_is_rejected() {
    let (_store, router) = setup();
    let id = post_json(&router, "/armor", padded_armor())
        .await
        .location_id();

    let response = put_json(&router, &format!("/armor/{}", id), padded_armor()).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.error().contains("modified 0"));
}

/// The path id wins over any `_id` in the body.
#[tokio::test]
async fn test_update_keeps_path_id() {
    let (_store, router) = setup();
    let id = post_json(&router, "/armor", padded_armor())
        .await
        .location_id();

    let mut changed = padded_armor();
    changed["_id"] = json!(GearId::new().to_hex());
    changed["soak"] = json!(3);

    let response = put_json(&router, &format!("/armor/{}", id), changed).await;
    assert_eq!(response.status, StatusCode::OK);

    let fetched: Armor =
        serde_json::from_value(get(&router, &format!("/armor/{}", id)).await.json()).unwrap();
    assert_eq!(fetched.id.to_hex(), id);
    assert_eq!(fetched.soak, 3);
}

/// An undecodable update body answers 400.
#[tokio::test]
async fn test_update_bad_json() {
    let (_store, router) = setup();
    let id = post_json(&router, "/armor", padded_armor())
        .await
        .location_id();

    let response = send(
        &router,
        Method::PUT,
        &format!("/armor/{}", id),
        Some("{\"soak\":".to_string()),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Invalid Request Payload");
}

// =============================================================================
// Delete
// =============================================================================

/// Delete answers 204 whether or not the record existed.
#[tokio::test]
async fn test_delete_always_no_content() {
    let (_store, router) = setup();
    let id = post_json(&router, "/weapon", blaster_pistol())
        .await
        .location_id();
    let uri = format!("/weapon/{}", id);

    let response = delete(&router, &uri).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());

    assert_eq!(get(&router, &uri).await.status, StatusCode::NOT_FOUND);

    let again = delete(&router, &uri).await;
    assert_eq!(again.status, StatusCode::NO_CONTENT);
}

/// A store failure on delete is logged, and the client still sees 204.
#[tokio::test]
async fn test_delete_swallows_store_error() {
    let (store, router) = setup();
    store.fail_with(StoreError::persistence("not primary"));

    let response = delete(&router, &format!("/armor/{}", GearId::new())).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}

// =============================================================================
// Malformed Identifiers
// =============================================================================

/// Malformed path ids go through the store-error path and answer 500.
#[tokio::test]
async fn test_malformed_id_is_server_error() {
    let (_store, router) = setup();

    for prefix in ["/armor", "/weapon"] {
        let uri = format!("{}/not-an-id", prefix);

        assert_eq!(
            get(&router, &uri).await.status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            put_json(&router, &uri, json!({})).await.status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            delete(&router, &uri).await.status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

/// The path id is checked before the body, so a bad id wins over a bad body.
#[tokio::test]
async fn test_malformed_id_checked_before_body() {
    let (_store, router) = setup();

    for prefix in ["/armor", "/weapon"] {
        let response = send(
            &router,
            Method::PUT,
            &format!("{}/not-an-id", prefix),
            Some("{bad json".to_string()),
        )
        .await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(response.error(), "Invalid Request Payload");
    }
}
