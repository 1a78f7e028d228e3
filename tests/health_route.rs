use campaign_api::routes::health::{HealthResponse, health_check};
use campaign_api::test_support::TestRocketBuilder;
use rocket::http::Status;
use rocket::routes;

#[tokio::test]
async fn health_check_reports_ok() {
    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![health_check])
        .async_client()
        .await;

    let response = client.get("/v1/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let payload: HealthResponse = response
        .into_json()
        .await
        .expect("payload should deserialize");
    assert_eq!(payload.status, "ok");
}

#[tokio::test]
async fn unknown_route_names_method_and_path() {
    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![health_check])
        .async_client()
        .await;

    let response = client.get("/v1/no-such-resource").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    let body = response.into_string().await.expect("body should be text");
    assert_eq!(body, "Route not found :: GET /v1/no-such-resource");
}
