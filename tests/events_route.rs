use campaign_api::models::{Event, EventWithLinks};
use campaign_api::routes::events;
use campaign_api::test_support::{TestDatabase, TestFixtures, TestRocketBuilder};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::routes;
use serde_json::json;
use sqlx::PgPool;

fn event_routes() -> Vec<rocket::Route> {
    routes![
        events::create_event,
        events::list_events,
        events::get_event,
        events::update_event,
    ]
}

async fn client_for(pool: PgPool) -> Client {
    TestRocketBuilder::new()
        .manage_pg_pool(pool)
        .mount_api_routes(event_routes())
        .async_client()
        .await
}

#[tokio::test]
async fn create_records_existing_staff_and_skips_unknown_ids() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let pool = test_db.pool_clone();
    let fixtures = TestFixtures::new(&pool);
    let first = fixtures.insert_volunteer("Leia Organa").await.expect("insert volunteer");
    let second = fixtures.insert_volunteer("Luke Skywalker").await.expect("insert volunteer");

    let client = client_for(pool).await;

    let response = client
        .post("/v1/events")
        .header(ContentType::JSON)
        .body(
            json!({
                "name": "Naboo Fundraiser",
                "moneyRaised": 1000.0,
                "date": "2024-02-13",
                "startTime": "10:00:00",
                "endTime": "11:00:00",
                "staff": [first, second, 9999]
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let created: Event = response.into_json().await.expect("event should deserialize");
    assert_eq!(created.money_raised, 1000.0);

    let response = client.get(format!("/v1/events/{}", created.id)).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let detail: EventWithLinks = response.into_json().await.expect("event should deserialize");
    assert_eq!(detail.volunteer_ids, vec![first, second]);
    assert!(detail.attendance_ids.is_empty());

    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn create_requires_amount_and_schedule() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let client = client_for(test_db.pool_clone()).await;

    let response = client
        .post("/v1/events")
        .header(ContentType::JSON)
        .body(json!({"name": "No schedule"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let body = response.into_string().await.expect("body should be text");
    assert!(body.contains("moneyRaised"));
    assert!(body.contains("date"));
    assert!(body.contains("startTime"));
    assert!(body.contains("endTime"));

    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn negative_money_raised_is_rejected_by_the_store() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let client = client_for(test_db.pool_clone()).await;

    let response = client
        .post("/v1/events")
        .header(ContentType::JSON)
        .body(
            json!({
                "moneyRaised": -5.0,
                "date": "2024-02-13",
                "startTime": "10:00:00",
                "endTime": "11:00:00"
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    drop(response);
    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn patch_updates_only_supplied_fields() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let pool = test_db.pool_clone();
    let fixtures = TestFixtures::new(&pool);
    let event_id = fixtures.insert_event(1500.0, "2024-02-13").await.expect("insert event");

    let client = client_for(pool).await;

    let response = client
        .patch(format!("/v1/events/{event_id}"))
        .header(ContentType::JSON)
        .body(json!({"date": "2024-03-14"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated: Event = response.into_json().await.expect("event should deserialize");
    assert_eq!(updated.date.to_string(), "2024-03-14");
    assert_eq!(updated.money_raised, 1500.0);

    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn list_orders_by_date_then_start_time() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let pool = test_db.pool_clone();
    let fixtures = TestFixtures::new(&pool);
    let later = fixtures.insert_event(1500.0, "2024-03-05").await.expect("insert event");
    let earlier = fixtures.insert_event(1000.0, "2024-02-13").await.expect("insert event");

    let client = client_for(pool).await;

    let response = client.get("/v1/events").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let listed: Vec<EventWithLinks> = response.into_json().await.expect("list should deserialize");
    let ids: Vec<i32> = listed.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![earlier, later]);

    drop(client);
    test_db.close().await.expect("drop test database");
}

#[tokio::test]
async fn unknown_event_returns_not_found() {
    let test_db = TestDatabase::new().await.expect("provision test database");
    let client = client_for(test_db.pool_clone()).await;

    let response = client.get("/v1/events/4242").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .patch("/v1/events/4242")
        .header(ContentType::JSON)
        .body(json!({"date": "2024-03-14"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);

    drop(response);
    drop(client);
    test_db.close().await.expect("drop test database");
}
