//! HttpRecipeStore against a throwaway json-server lookalike.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use recipebox_core::{
    CollectionState, HttpRecipeStore, ListFilter, Recipe, RecipeId, RecipePatch, RecipeStore,
    StoreError,
};

#[derive(Clone, Default)]
struct FakeServer {
    records: Arc<Mutex<Vec<Value>>>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    patches: Arc<Mutex<Vec<Value>>>,
    fail_list: Arc<AtomicBool>,
}

fn id_of(record: &Value) -> String {
    match &record["id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn list_recipes(
    State(server): State<FakeServer>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if server.fail_list.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    server.queries.lock().unwrap().push(params.clone());

    let records = server.records.lock().unwrap();
    let favorites_only = params.get("isFavorite").map(String::as_str) == Some("true");
    let matching: Vec<Value> = records
        .iter()
        .filter(|r| !favorites_only || r["isFavorite"] == json!(true))
        .cloned()
        .collect();
    Json(Value::Array(matching)).into_response()
}

async fn create_recipe(State(server): State<FakeServer>, Json(mut body): Json<Value>) -> Response {
    let mut records = server.records.lock().unwrap();
    body["id"] = json!(records.len() as u64 + 100);
    records.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_recipe(State(server): State<FakeServer>, Path(id): Path<String>) -> Response {
    let records = server.records.lock().unwrap();
    match records.iter().find(|r| id_of(r) == id) {
        Some(record) => Json(record.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn patch_recipe(
    State(server): State<FakeServer>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    server.patches.lock().unwrap().push(patch.clone());
    let mut records = server.records.lock().unwrap();
    let Some(record) = records.iter_mut().find(|r| id_of(r) == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
    };
    if let (Some(target), Some(fields)) = (record.as_object_mut(), patch.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(record.clone()).into_response()
}

async fn delete_recipe(State(server): State<FakeServer>, Path(id): Path<String>) -> Response {
    let mut records = server.records.lock().unwrap();
    let before = records.len();
    records.retain(|r| id_of(r) != id);
    if records.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
    }
    Json(json!({})).into_response()
}

async fn spawn_server(seed: Vec<Value>) -> (HttpRecipeStore, FakeServer) {
    let server = FakeServer::default();
    *server.records.lock().unwrap() = seed;

    let app = Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).patch(patch_recipe).delete(delete_recipe),
        )
        .with_state(server.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = HttpRecipeStore::builder()
        .api_url(format!("http://{}", addr))
        .build()
        .unwrap();
    (store, server)
}

fn seed() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "title": "Tomato Soup",
            "description": "Warming and simple",
            "ingredients": ["4 tomatoes", "1 onion"],
            "instructions": "Simmer everything, then blend.",
            "isFavorite": null,
            "rating": null,
            "tags": null,
            "createdAt": "2024-01-10T10:00:00.000Z"
        }),
        json!({
            "id": "k3x9",
            "title": "Apple Pie",
            "description": "Grandma's pie",
            "ingredients": ["6 apples"],
            "instructions": "Bake for an hour at 180C.",
            "isFavorite": true,
            "rating": 7,
            "tags": ["Dessert", "dessert"],
            "createdAt": "2024-02-01T10:00:00.000Z"
        }),
    ]
}

#[tokio::test]
async fn test_list_normalizes_records() {
    let (store, _server) = spawn_server(seed()).await;

    let recipes = store.list(&ListFilter::default()).await.unwrap();
    assert_eq!(recipes.len(), 2);

    let soup = &recipes[0];
    assert_eq!(soup.id, Some(RecipeId::Number(1)));
    assert!(!soup.is_favorite);
    assert_eq!(soup.rating, 0.0);
    assert!(soup.tags.is_empty());

    let pie = &recipes[1];
    assert_eq!(pie.id, Some(RecipeId::Text("k3x9".to_string())));
    assert_eq!(pie.rating, 5.0);
    assert_eq!(pie.tags, vec!["Dessert"]);
}

#[tokio::test]
async fn test_list_passes_filter_through() {
    let (store, server) = spawn_server(seed()).await;

    let filter = ListFilter {
        query: Some("pie".to_string()),
        favorites_only: true,
        page: Some(1),
        limit: Some(5),
    };
    let recipes = store.list(&filter).await.unwrap();
    assert_eq!(recipes.len(), 1);

    let queries = server.queries.lock().unwrap();
    let params = &queries[0];
    assert_eq!(params.get("title_like").map(String::as_str), Some("pie"));
    assert_eq!(params.get("ingredients_like").map(String::as_str), Some("pie"));
    assert_eq!(params.get("isFavorite").map(String::as_str), Some("true"));
    assert_eq!(params.get("_page").map(String::as_str), Some("1"));
    assert_eq!(params.get("_limit").map(String::as_str), Some("5"));
}

#[tokio::test]
async fn test_create_then_get() {
    let (store, _server) = spawn_server(vec![]).await;

    let new_recipe: Recipe = serde_json::from_value(json!({
        "title": "Lemonade",
        "description": "Sour and sweet",
        "ingredients": ["3 lemons", "1 cup sugar"],
        "instructions": "Squeeze, stir, chill and serve.",
        "createdAt": "2024-05-01T12:00:00.000Z"
    }))
    .unwrap();

    let created = store.create(&new_recipe).await.unwrap();
    let id = created.id.clone().unwrap();
    assert_eq!(id, RecipeId::Number(100));

    let fetched = store.get(&id).await.unwrap();
    assert_eq!(fetched.title, "Lemonade");
    assert_eq!(fetched.created_at.as_deref(), Some("2024-05-01T12:00:00.000Z"));
}

#[tokio::test]
async fn test_update_sends_only_patched_fields() {
    let (store, server) = spawn_server(seed()).await;
    let id = RecipeId::Text("k3x9".to_string());

    let updated = store
        .update(&id, &RecipePatch::favorite(false))
        .await
        .unwrap();
    assert!(!updated.is_favorite);
    assert_eq!(updated.title, "Apple Pie");

    let patches = server.patches.lock().unwrap();
    assert_eq!(patches[0], json!({"isFavorite": false}));
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let (store, _server) = spawn_server(seed()).await;
    let id = RecipeId::Number(404);

    assert!(matches!(store.get(&id).await, Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete(&id).await, Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.update(&id, &RecipePatch::favorite(true)).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_server_error_surfaces_status() {
    let (store, server) = spawn_server(seed()).await;
    server.fail_list.store(true, Ordering::SeqCst);

    match store.list(&ListFilter::default()).await {
        Err(StoreError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_empties_collection() {
    // Grab a free port and close it again
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpRecipeStore::builder()
        .api_url(format!("http://{}", addr))
        .build()
        .unwrap();
    let stale: Recipe = serde_json::from_value(json!({"id": 1, "title": "Stale"})).unwrap();
    let mut state = CollectionState::default().with_recipes(vec![stale]);

    let err = state.load(&store).await.unwrap_err();
    assert!(matches!(err, StoreError::Request(_)));
    assert!(state.recipes().is_empty());
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_collection_state_over_http() {
    let (store, server) = spawn_server(seed()).await;
    let mut state = CollectionState::default();
    state.load(&store).await.unwrap();

    let titles: Vec<&str> = state.derived_view().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Apple Pie", "Tomato Soup"]);

    let soup = RecipeId::Number(1);
    state.toggle_favorite(&store, &soup).await.unwrap();
    assert!(state.get(&soup).unwrap().is_favorite);

    state.delete(&store, &soup).await.unwrap();
    assert!(state.get(&soup).is_none());
    assert_eq!(server.records.lock().unwrap().len(), 1);
}
