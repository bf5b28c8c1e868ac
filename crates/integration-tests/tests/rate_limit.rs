//! End-to-end tests for the request rate limiter.

use std::time::Duration;

use axum::http::StatusCode;

use grillpoint_integration_tests::{
    TestRequest, read_json, test_app_with_config, test_config,
};

fn limited_app(max_requests: u64, window: Duration) -> axum::Router {
    let mut config = test_config();
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.window = window;
    test_app_with_config(config)
}

#[tokio::test]
async fn requests_over_the_limit_are_denied() {
    let app = limited_app(3, Duration::from_secs(60));

    for _ in 0..3 {
        let response = TestRequest::new("GET", "/api/cart")
            .header("x-forwarded-for", "203.0.113.7")
            .send(&app)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let (status, body) = read_json(
        TestRequest::new("GET", "/api/cart")
            .header("x-forwarded-for", "203.0.113.7")
            .send(&app)
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");
}

#[tokio::test]
async fn other_clients_are_unaffected() {
    let app = limited_app(1, Duration::from_secs(60));

    let response = TestRequest::new("GET", "/api/cart")
        .header("x-forwarded-for", "203.0.113.7")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = TestRequest::new("GET", "/api/cart")
        .header("x-forwarded-for", "203.0.113.8")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = TestRequest::new("GET", "/api/cart")
        .header("x-forwarded-for", "203.0.113.7")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn window_elapse_admits_new_requests() {
    let app = limited_app(2, Duration::from_millis(100));

    for _ in 0..2 {
        let response = TestRequest::new("GET", "/api/cart")
            .header("x-forwarded-for", "203.0.113.7")
            .send(&app)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = TestRequest::new("GET", "/api/cart")
        .header("x-forwarded-for", "203.0.113.7")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(150)).await;

    let response = TestRequest::new("GET", "/api/cart")
        .header("x-forwarded-for", "203.0.113.7")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn the_gate_runs_before_authentication() {
    let app = limited_app(1, Duration::from_secs(60));

    // Exhaust the window on an unauthenticated route.
    let response = TestRequest::new("GET", "/api/cart")
        .header("x-forwarded-for", "203.0.113.7")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The denial answers before any token is even looked at.
    let response = TestRequest::new("GET", "/api/profile")
        .header("x-forwarded-for", "203.0.113.7")
        .bearer("whatever")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Health endpoints sit outside the limited group.
    let response = TestRequest::new("GET", "/health").send(&app).await;
    assert_eq!(response.status(), StatusCode::OK);
}
