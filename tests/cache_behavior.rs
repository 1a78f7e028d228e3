use campaign_api::cache::{ApiCache, CacheBackend, CacheError};
use campaign_api::config::{ApiConfig, BatchPolicy};
use campaign_api::models::Candidate;
use campaign_api::routes::candidates;
use campaign_api::test_support::{TestDatabase, TestRocketBuilder};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::routes;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

fn candidate_routes() -> Vec<rocket::Route> {
    routes![
        candidates::create_candidate,
        candidates::list_candidates,
        candidates::get_candidate,
        candidates::update_candidate,
    ]
}

async fn post_candidate(client: &Client, first_name: &str) -> Candidate {
    let response = client
        .post("/v1/candidates")
        .header(ContentType::JSON)
        .body(
            json!({
                "firstName": first_name,
                "lastName": "Mothma",
                "district": "Chandrila",
                "office": "Senator"
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    response.into_json().await.expect("candidate should deserialize")
}

async fn get_candidate(client: &Client, id: i32) -> Candidate {
    let response = client.get(format!("/v1/candidates/{id}")).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    response.into_json().await.expect("candidate should deserialize")
}

/// Rename a candidate behind the API's back, leaving cached entries
/// untouched.
async fn rename_directly(pool: &PgPool, id: i32, first_name: &str) {
    sqlx::query("UPDATE candidates SET first_name = $2 WHERE id = $1")
        .bind(id)
        .bind(first_name)
        .execute(pool)
        .await
        .expect("direct update");
}

#[tokio::test]
async fn reads_are_cached_and_writes_invalidate() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let pool = test_db.pool_clone();

    let client = TestRocketBuilder::new()
        .manage_pg_pool(pool.clone())
        .mount_api_routes(candidate_routes())
        .async_client()
        .await;

    let created = post_candidate(&client, "Mon").await;

    // Fill the cache, then prove the next read is served from it.
    assert_eq!(get_candidate(&client, created.id).await.first_name, "Mon");
    rename_directly(&pool, created.id, "Shadow").await;
    assert_eq!(get_candidate(&client, created.id).await.first_name, "Mon");

    // A write through the API deletes the stale entry; the next read sees
    // fresh data.
    let response = client
        .patch(format!("/v1/candidates/{}", created.id))
        .header(ContentType::JSON)
        .body(json!({"district": "Coruscant"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let fetched = get_candidate(&client, created.id).await;
    assert_eq!(fetched.first_name, "Shadow");
    assert_eq!(fetched.district, "Coruscant");

    drop(response);
    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn expired_entries_are_treated_as_absent() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let pool = test_db.pool_clone();

    let client = TestRocketBuilder::new()
        .manage_pg_pool(pool.clone())
        .manage_config(ApiConfig {
            item_ttl: Duration::from_millis(50),
            list_ttl: Duration::from_millis(50),
            batch_policy: BatchPolicy::ContinueOnError,
        })
        .mount_api_routes(candidate_routes())
        .async_client()
        .await;

    let created = post_candidate(&client, "Mon").await;
    assert_eq!(get_candidate(&client, created.id).await.first_name, "Mon");

    rename_directly(&pool, created.id, "Fresh").await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(get_candidate(&client, created.id).await.first_name, "Fresh");

    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn collection_cache_is_invalidated_by_creates() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let pool = test_db.pool_clone();

    let client = TestRocketBuilder::new()
        .manage_pg_pool(pool.clone())
        .mount_api_routes(candidate_routes())
        .async_client()
        .await;

    post_candidate(&client, "Mon").await;

    let response = client.get("/v1/candidates").dispatch().await;
    let listed: Vec<Candidate> = response.into_json().await.expect("list should deserialize");
    assert_eq!(listed.len(), 1);

    post_candidate(&client, "Padme").await;

    let response = client.get("/v1/candidates").dispatch().await;
    let listed: Vec<Candidate> = response.into_json().await.expect("list should deserialize");
    assert_eq!(listed.len(), 2);

    drop(client);
    test_db.close().await.expect("drop test database");
}

struct UnreachableBackend;

impl CacheBackend for UnreachableBackend {
    fn get(&self, _: &str) -> Result<Option<Value>, CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }
    fn set(&self, _: &str, _: Value, _: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }
    fn delete(&self, _: &str) -> Result<bool, CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }
    fn delete_prefix(&self, _: &str) -> Result<u64, CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }
}

#[tokio::test]
async fn unreachable_cache_never_blocks_fresh_reads() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let pool = test_db.pool_clone();

    let client = TestRocketBuilder::new()
        .manage_pg_pool(pool.clone())
        .manage_cache(ApiCache::with_backend(Arc::new(UnreachableBackend)))
        .mount_api_routes(candidate_routes())
        .async_client()
        .await;

    let created = post_candidate(&client, "Mon").await;
    assert_eq!(get_candidate(&client, created.id).await.first_name, "Mon");

    let response = client.get("/v1/candidates").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let listed: Vec<Candidate> = response.into_json().await.expect("list should deserialize");
    assert_eq!(listed.len(), 1);

    drop(client);
    test_db.close().await.expect("drop test database");
}
