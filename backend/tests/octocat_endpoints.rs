//! End-to-end tests for the octocat collection over the full HTTP wiring.

use actix_web::http::{StatusCode, header};
use actix_web::{test as actix_test, web};
use chrono::Utc;
use serde_json::{Value, json};

use octocat_api::inbound::http::health::HealthState;
use octocat_api::server::build_app;
use octocat_api::test_support::TestHarness;

const SCENARIO_NAMES: [&str; 7] = [
    "octocat1",
    "second_octocat",
    "octocat-thrice",
    "tetraWIDG",
    "PENTA-widg-GON-et",
    "hexa_octocat",
    "sep7",
];

async fn spawn_app(
    harness: TestHarness,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    actix_test::init_service(build_app(
        web::Data::new(HealthState::new()),
        web::Data::new(harness.state),
    ))
    .await
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn create_body(name: &str) -> Value {
    json!({
        "name": name,
        "url": "http://www.one.com",
        "deadline": Utc::now().date_naive().to_string(),
    })
}

async fn create_octocat<S>(app: &S, token: &str, name: &str) -> StatusCode
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/octocats")
        .insert_header(bearer(token))
        .set_json(create_body(name))
        .to_request();
    actix_test::call_service(app, request).await.status()
}

async fn get_json<S>(app: &S, token: &str, uri: &str) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let request = actix_test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(token))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    let status = response.status();
    let value: Value =
        serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
    (status, value)
}

#[actix_web::test]
async fn create_retrieve_round_trip_preserves_attributes() {
    let harness = TestHarness::new();
    let admin = harness.admin_token();
    let app = spawn_app(harness).await;

    assert_eq!(create_octocat(&app, &admin, "octocat1").await, StatusCode::CREATED);

    let (status, value) = get_json(&app, &admin, "/api/v1/octocats/octocat1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value.get("name").and_then(Value::as_str), Some("octocat1"));
    assert_eq!(
        value.get("url").and_then(Value::as_str),
        Some("http://www.one.com")
    );
    assert_eq!(
        value.get("link").and_then(Value::as_str),
        Some("/api/v1/octocats/octocat1")
    );
    assert!(value.pointer("/owner/email").is_some());
    assert!(value.get("created_at").is_some());
}

#[actix_web::test]
async fn duplicate_names_conflict_with_the_exact_message() {
    let harness = TestHarness::new();
    let admin = harness.admin_token();
    let app = spawn_app(harness).await;

    assert_eq!(create_octocat(&app, &admin, "octocat1").await, StatusCode::CREATED);

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/octocats")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "name": "octocat1",
            "url": "https://www.two.net",
            "deadline": Utc::now().date_naive().to_string(),
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let value: Value =
        serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("Octocat name: octocat1 already exists, must be unique.")
    );
}

#[actix_web::test]
async fn seven_octocats_paginate_across_two_pages_of_five() {
    let harness = TestHarness::new();
    let admin = harness.admin_token();
    let member = harness.member_token();
    let app = spawn_app(harness).await;

    for name in SCENARIO_NAMES {
        assert_eq!(create_octocat(&app, &admin, name).await, StatusCode::CREATED);
    }

    let (status, page1) = get_json(&app, &member, "/api/v1/octocats?page=1&per_page=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page1.get("total_items").and_then(Value::as_u64), Some(7));
    assert_eq!(page1.get("total_pages").and_then(Value::as_u64), Some(2));
    assert_eq!(page1.get("has_prev").and_then(Value::as_bool), Some(false));
    assert_eq!(page1.get("has_next").and_then(Value::as_bool), Some(true));
    let items = page1.get("items").and_then(Value::as_array).expect("items");
    let names: Vec<&str> = items
        .iter()
        .filter_map(|item| item.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, &SCENARIO_NAMES[..5]);
    assert_eq!(
        page1.pointer("/links/next").and_then(Value::as_str),
        Some("/api/v1/octocats?page=2&per_page=5")
    );
    assert!(page1.pointer("/links/prev").is_none());
    assert_eq!(
        page1.pointer("/links/self").and_then(Value::as_str),
        Some("/api/v1/octocats?page=1&per_page=5")
    );

    let (status, page2) = get_json(&app, &member, "/api/v1/octocats?page=2&per_page=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page2.get("has_prev").and_then(Value::as_bool), Some(true));
    assert_eq!(page2.get("has_next").and_then(Value::as_bool), Some(false));
    let items = page2.get("items").and_then(Value::as_array).expect("items");
    assert_eq!(items.len(), 2);
    assert!(page2.pointer("/links/next").is_none());
}

#[actix_web::test]
async fn default_pagination_is_page_one_of_ten() {
    let harness = TestHarness::new();
    let admin = harness.admin_token();
    let app = spawn_app(harness).await;

    for name in SCENARIO_NAMES {
        assert_eq!(create_octocat(&app, &admin, name).await, StatusCode::CREATED);
    }

    let (status, page) = get_json(&app, &admin, "/api/v1/octocats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.get("page").and_then(Value::as_u64), Some(1));
    assert_eq!(page.get("items_per_page").and_then(Value::as_u64), Some(10));
    assert_eq!(page.get("total_pages").and_then(Value::as_u64), Some(1));
    assert_eq!(
        page.get("items").and_then(Value::as_array).map(Vec::len),
        Some(7)
    );
}

#[actix_web::test]
async fn pages_beyond_the_collection_are_empty_not_errors() {
    let harness = TestHarness::new();
    let admin = harness.admin_token();
    let app = spawn_app(harness).await;

    assert_eq!(create_octocat(&app, &admin, "only_one").await, StatusCode::CREATED);

    let (status, page) = get_json(&app, &admin, "/api/v1/octocats?page=9&per_page=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        page.get("items").and_then(Value::as_array).map(Vec::len),
        Some(0)
    );
    assert_eq!(page.get("has_next").and_then(Value::as_bool), Some(false));
    assert_eq!(page.get("total_items").and_then(Value::as_u64), Some(1));
}

#[actix_web::test]
async fn empty_collections_report_zero_pages() {
    let harness = TestHarness::new();
    let member = harness.member_token();
    let app = spawn_app(harness).await;

    let (status, page) = get_json(&app, &member, "/api/v1/octocats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.get("total_pages").and_then(Value::as_u64), Some(0));
    assert_eq!(page.get("has_next").and_then(Value::as_bool), Some(false));
    assert_eq!(
        page.pointer("/links/last").and_then(Value::as_str),
        Some("/api/v1/octocats?page=1&per_page=10")
    );
}

#[actix_web::test]
async fn non_admin_callers_can_read_but_not_mutate() {
    let harness = TestHarness::new();
    let admin = harness.admin_token();
    let member = harness.member_token();
    let app = spawn_app(harness).await;

    assert_eq!(create_octocat(&app, &admin, "octocat1").await, StatusCode::CREATED);
    assert_eq!(create_octocat(&app, &member, "octocat2").await, StatusCode::FORBIDDEN);

    let (status, _) = get_json(&app, &member, "/api/v1/octocats/octocat1").await;
    assert_eq!(status, StatusCode::OK);

    let request = actix_test::TestRequest::delete()
        .uri("/api/v1/octocats/octocat1")
        .insert_header(bearer(&member))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let value: Value =
        serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("You are not authorized to perform this action.")
    );
}

#[actix_web::test]
async fn update_replaces_only_the_supplied_attributes() {
    let harness = TestHarness::new();
    let admin = harness.admin_token();
    let app = spawn_app(harness).await;

    assert_eq!(create_octocat(&app, &admin, "octocat1").await, StatusCode::CREATED);

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/octocats/octocat1")
        .insert_header(bearer(&admin))
        .set_json(json!({ "url": "http://test.fr" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let value: Value =
        serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
    assert_eq!(
        value.get("url").and_then(Value::as_str),
        Some("http://test.fr")
    );
    assert_eq!(value.get("name").and_then(Value::as_str), Some("octocat1"));
}

#[actix_web::test]
async fn updating_an_absent_octocat_is_not_found_not_an_upsert() {
    let harness = TestHarness::new();
    let admin = harness.admin_token();
    let app = spawn_app(harness).await;

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/octocats/ghost")
        .insert_header(bearer(&admin))
        .set_json(json!({ "url": "http://test.fr" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The failed update must not have created anything.
    let (status, _) = get_json(&app, &admin, "/api/v1/octocats/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_then_retrieve_is_not_found() {
    let harness = TestHarness::new();
    let admin = harness.admin_token();
    let app = spawn_app(harness).await;

    assert_eq!(create_octocat(&app, &admin, "short_lived").await, StatusCode::CREATED);

    let request = actix_test::TestRequest::delete()
        .uri("/api/v1/octocats/short_lived")
        .insert_header(bearer(&admin))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, value) = get_json(&app, &admin, "/api/v1/octocats/short_lived").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("short_lived not found in database.")
    );
}

#[actix_web::test]
async fn responses_carry_a_trace_id_header() {
    let harness = TestHarness::new();
    let member = harness.member_token();
    let app = spawn_app(harness).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/octocats")
        .insert_header(bearer(&member))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert!(response.headers().get("trace-id").is_some());
}
