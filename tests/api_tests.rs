//! HTTP surface tests
//!
//! Drives `/shortie` routes through `actix_web::test` with the in-memory
//! backend.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::Utc;
use serde_json::{Value, json};

use shortie::analytics::day_bucket_key;
use shortie::api::middleware::AccessLog;
use shortie::api::services::shortie_routes;
use shortie::services::{ServiceSettings, ShortieService};
use shortie::storage::{MemoryStorage, UsageBuckets};

const URL: &str = "https://example.com/data/hi";
const ID: &str = "4e24c46962";

fn build_service(storage: Arc<MemoryStorage>) -> Arc<ShortieService> {
    Arc::new(ShortieService::new(storage, ServiceSettings::default()))
}

macro_rules! init_app {
    ($storage:expr) => {
        test::init_service(
            App::new()
                .wrap(AccessLog)
                .app_data(web::Data::new(build_service($storage)))
                .service(shortie_routes()),
        )
        .await
    };
}

#[actix_web::test]
async fn test_create_returns_short_url() {
    let app = init_app!(Arc::new(MemoryStorage::new()));

    let req = TestRequest::post()
        .uri("/shortie")
        .set_json(json!({ "url": URL, "expiration": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "shortUrl": format!("http://localhost:8421/shortie/{}", ID) })
    );
}

#[actix_web::test]
async fn test_create_twice_returns_same_url() {
    let app = init_app!(Arc::new(MemoryStorage::new()));

    let mut urls = Vec::new();
    for _ in 0..2 {
        let req = TestRequest::post()
            .uri("/shortie")
            .set_json(json!({ "url": URL }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        urls.push(body["shortUrl"].as_str().unwrap().to_string());
    }
    assert_eq!(urls[0], urls[1]);
}

#[actix_web::test]
async fn test_malformed_body_is_bad_request() {
    let app = init_app!(Arc::new(MemoryStorage::new()));

    let req = TestRequest::post()
        .uri("/shortie")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_redirect_and_not_found() {
    let storage = Arc::new(MemoryStorage::new());
    let app = init_app!(storage.clone());

    let req = TestRequest::post()
        .uri("/shortie")
        .set_json(json!({ "url": URL }))
        .to_request();
    test::call_service(&app, req).await;

    let req = TestRequest::get().uri(&format!("/shortie/{}", ID)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers().get("Location").unwrap(), URL);

    let req = TestRequest::get().uri("/shortie/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(body, "Not Found");
}

#[actix_web::test]
async fn test_delete_is_idempotent() {
    let app = init_app!(Arc::new(MemoryStorage::new()));

    let req = TestRequest::post()
        .uri("/shortie")
        .set_json(json!({ "url": URL }))
        .to_request();
    test::call_service(&app, req).await;

    for _ in 0..2 {
        let req = TestRequest::delete()
            .uri(&format!("/shortie/{}", ID))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = TestRequest::get().uri(&format!("/shortie/{}", ID)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_stats_count_redirects() {
    let app = init_app!(Arc::new(MemoryStorage::new()));

    let req = TestRequest::get()
        .uri(&format!("/shortie/{}/stats", ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "lastDay": 0, "lastWeek": 0, "allTime": 0 }));

    let req = TestRequest::post()
        .uri("/shortie")
        .set_json(json!({ "url": URL }))
        .to_request();
    test::call_service(&app, req).await;

    for _ in 0..3 {
        let req = TestRequest::get().uri(&format!("/shortie/{}", ID)).to_request();
        test::call_service(&app, req).await;
    }

    let req = TestRequest::get()
        .uri(&format!("/shortie/{}/stats", ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "lastDay": 3, "lastWeek": 3, "allTime": 3 }));
}

#[actix_web::test]
async fn test_stats_week_window_excludes_old_buckets() {
    let storage = Arc::new(MemoryStorage::new());
    let app = init_app!(storage.clone());

    let req = TestRequest::post()
        .uri("/shortie")
        .set_json(json!({ "url": URL }))
        .to_request();
    test::call_service(&app, req).await;

    let now = Utc::now();
    let mut usage = UsageBuckets::new();
    usage.insert(day_bucket_key(now), 1);
    usage.insert(day_bucket_key(now - chrono::Duration::days(3)), 4);
    usage.insert(day_bucket_key(now - chrono::Duration::days(10)), 20);
    assert!(storage.merge_usage(ID, usage));

    let req = TestRequest::get()
        .uri(&format!("/shortie/{}/stats", ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "lastDay": 1, "lastWeek": 5, "allTime": 25 }));
}
