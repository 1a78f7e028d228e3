use campaign_api::models::Role;
use campaign_api::routes::roles;
use campaign_api::test_support::{TestDatabase, TestRocketBuilder};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::routes;
use serde_json::json;
use sqlx::PgPool;

fn role_routes() -> Vec<rocket::Route> {
    routes![
        roles::create_role,
        roles::list_roles,
        roles::get_role,
        roles::update_role,
    ]
}

async fn client_for(pool: PgPool) -> Client {
    TestRocketBuilder::new()
        .manage_pg_pool(pool)
        .mount_api_routes(role_routes())
        .async_client()
        .await
}

async fn post_role(client: &Client, body: serde_json::Value) -> Role {
    let response = client
        .post("/v1/roles")
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    response.into_json().await.expect("role should deserialize")
}

#[tokio::test]
async fn create_then_read_back_returns_same_data() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let client = client_for(test_db.pool_clone()).await;

    let created = post_role(
        &client,
        json!({"name": "Canvasser", "description": "Door-to-door outreach"}),
    )
    .await;

    let response = client.get(format!("/v1/roles/{}", created.id)).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let fetched: Role = response.into_json().await.expect("role should deserialize");
    assert_eq!(fetched.name, "Canvasser");
    assert_eq!(fetched.description.as_deref(), Some("Door-to-door outreach"));

    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn duplicate_name_conflicts() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let client = client_for(test_db.pool_clone()).await;

    post_role(&client, json!({"name": "Canvasser"})).await;

    let response = client
        .post("/v1/roles")
        .header(ContentType::JSON)
        .body(json!({"name": "Canvasser"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);

    drop(response);
    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn create_requires_name() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let client = client_for(test_db.pool_clone()).await;

    let response = client
        .post("/v1/roles")
        .header(ContentType::JSON)
        .body(json!({"description": "No name supplied"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    drop(response);
    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn list_orders_by_name() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let client = client_for(test_db.pool_clone()).await;

    post_role(&client, json!({"name": "Phone Banker"})).await;
    post_role(&client, json!({"name": "Canvasser"})).await;
    post_role(&client, json!({"name": "Event Coordinator"})).await;

    let response = client.get("/v1/roles").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let listed: Vec<Role> = response.into_json().await.expect("list should deserialize");
    let names: Vec<&str> = listed.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Canvasser", "Event Coordinator", "Phone Banker"]);

    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn patch_keeps_absent_fields() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let client = client_for(test_db.pool_clone()).await;

    let created = post_role(
        &client,
        json!({"name": "Canvasser", "description": "Door-to-door outreach"}),
    )
    .await;

    let response = client
        .patch(format!("/v1/roles/{}", created.id))
        .header(ContentType::JSON)
        .body(json!({"description": "Neighborhood outreach"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated: Role = response.into_json().await.expect("role should deserialize");
    assert_eq!(updated.name, "Canvasser");
    assert_eq!(updated.description.as_deref(), Some("Neighborhood outreach"));

    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn unknown_role_returns_not_found() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let client = client_for(test_db.pool_clone()).await;

    let response = client.get("/v1/roles/4242").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    drop(response);
    drop(client);
    test_db.close().await.expect("drop test database");
}
