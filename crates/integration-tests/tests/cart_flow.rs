//! End-to-end tests for cart operations and session identity.

use axum::http::StatusCode;
use serde_json::json;

use grillpoint_integration_tests::{
    TestRequest, read_json, register_and_login, session_cookie_from, test_app,
};

#[tokio::test]
async fn first_contact_sets_a_session_cookie() {
    let app = test_app();

    let response = TestRequest::new("GET", "/api/cart").send(&app).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("cookie set on first contact")
        .to_str()
        .expect("readable header")
        .to_owned();
    assert!(set_cookie.starts_with("cart_session="));
    assert!(set_cookie.contains("Max-Age=2592000"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("HttpOnly"));

    let (_, body) = read_json(response).await;
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn session_cookie_resolves_the_same_cart() {
    let app = test_app();

    // First contact: add an item, receive the cookie.
    let response = TestRequest::json(
        "POST",
        "/api/cart/add",
        &json!({"productId": 7, "quantity": 2}),
    )
    .send(&app)
    .await;
    let session_id = session_cookie_from(&response).expect("cookie issued");

    // Replaying the cookie lands on the same cart, and no new cookie is
    // handed out.
    let response = TestRequest::new("GET", "/api/cart")
        .header("cookie", &format!("cart_session={session_id}"))
        .send(&app)
        .await;
    assert!(session_cookie_from(&response).is_none());

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([{"productId": 7, "quantity": 2}]));

    // A client without the cookie sees a different (empty) cart.
    let (_, body) = read_json(TestRequest::new("GET", "/api/cart").send(&app).await).await;
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn adding_the_same_product_accumulates_quantity() {
    let app = test_app();

    let response = TestRequest::json(
        "POST",
        "/api/cart/add",
        &json!({"productId": 7, "quantity": 2}),
    )
    .send(&app)
    .await;
    let session_id = session_cookie_from(&response).expect("cookie issued");
    let cookie = format!("cart_session={session_id}");

    let (status, body) = read_json(
        TestRequest::json(
            "POST",
            "/api/cart/add",
            &json!({"productId": 7, "quantity": 3}),
        )
        .header("cookie", &cookie)
        .send(&app)
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item added to cart");
    // One row, quantity 5 - never two rows.
    assert_eq!(body["cart"], json!([{"productId": 7, "quantity": 5}]));
}

#[tokio::test]
async fn removing_an_item_updates_the_cart() {
    let app = test_app();

    let response = TestRequest::json(
        "POST",
        "/api/cart/add",
        &json!({"productId": 1, "quantity": 1}),
    )
    .send(&app)
    .await;
    let cookie = format!(
        "cart_session={}",
        session_cookie_from(&response).expect("cookie issued")
    );

    TestRequest::json(
        "POST",
        "/api/cart/add",
        &json!({"productId": 2, "quantity": 4}),
    )
    .header("cookie", &cookie)
    .send(&app)
    .await;

    let (status, body) = read_json(
        TestRequest::json("DELETE", "/api/cart/1", &json!({"productId": 1, "quantity": 1}))
            .header("cookie", &cookie)
            .send(&app)
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item removed from cart");
    assert_eq!(body["cart"], json!([{"productId": 2, "quantity": 4}]));
}

#[tokio::test]
async fn removing_an_absent_product_succeeds_and_changes_nothing() {
    let app = test_app();

    let response = TestRequest::json(
        "POST",
        "/api/cart/add",
        &json!({"productId": 1, "quantity": 1}),
    )
    .send(&app)
    .await;
    let cookie = format!(
        "cart_session={}",
        session_cookie_from(&response).expect("cookie issued")
    );

    let (status, body) = read_json(
        TestRequest::json(
            "DELETE",
            "/api/cart/99",
            &json!({"productId": 99, "quantity": 1}),
        )
        .header("cookie", &cookie)
        .send(&app)
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"], json!([{"productId": 1, "quantity": 1}]));
}

#[tokio::test]
async fn cart_add_validates_the_payload() {
    let app = test_app();

    // Zero quantity
    let (status, body) = read_json(
        TestRequest::json(
            "POST",
            "/api/cart/add",
            &json!({"productId": 1, "quantity": 0}),
        )
        .send(&app)
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid format");

    // Malformed body
    let (status, body) = read_json(
        TestRequest::json("POST", "/api/cart/add", &json!({"productId": "seven"}))
            .send(&app)
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid format");
}

#[tokio::test]
async fn authenticated_cart_is_scoped_to_the_token() {
    let app = test_app();
    let token = register_and_login(&app, "alice", "secret1").await;

    // Authenticated requests get no session cookie.
    let response = TestRequest::json(
        "POST",
        "/api/cart/add",
        &json!({"productId": 3, "quantity": 1}),
    )
    .bearer(&token)
    .send(&app)
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie_from(&response).is_none());

    let (_, body) = read_json(
        TestRequest::new("GET", "/api/cart")
            .bearer(&token)
            .send(&app)
            .await,
    )
    .await;
    assert_eq!(body["items"], json!([{"productId": 3, "quantity": 1}]));

    // An anonymous client does not see the authenticated cart.
    let (_, body) = read_json(TestRequest::new("GET", "/api/cart").send(&app).await).await;
    assert_eq!(body["items"], json!([]));

    // A second login is a different session and therefore a different cart.
    let (_, login) = read_json(
        TestRequest::json(
            "POST",
            "/api/auth/login",
            &json!({"username": "alice", "password": "secret1"}),
        )
        .send(&app)
        .await,
    )
    .await;
    let second_token = login["token"].as_str().expect("token issued");
    if second_token != token {
        let (_, body) = read_json(
            TestRequest::new("GET", "/api/cart")
                .bearer(second_token)
                .send(&app)
                .await,
        )
        .await;
        assert_eq!(body["items"], json!([]));
    }
}

#[tokio::test]
async fn invalid_bearer_degrades_to_an_anonymous_cart() {
    let app = test_app();

    let response = TestRequest::new("GET", "/api/cart")
        .bearer("not-a-real-token")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    // The request was served as anonymous: a fresh session cookie.
    assert!(session_cookie_from(&response).is_some());
}

#[tokio::test]
async fn revoked_token_no_longer_reaches_its_cart() {
    let app = test_app();
    let token = register_and_login(&app, "alice", "secret1").await;

    TestRequest::json(
        "POST",
        "/api/cart/add",
        &json!({"productId": 3, "quantity": 1}),
    )
    .bearer(&token)
    .send(&app)
    .await;

    let (status, _) = read_json(
        TestRequest::new("POST", "/api/auth/logout")
            .bearer(&token)
            .send(&app)
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The revoked token now resolves anonymously: empty cart, new cookie.
    let response = TestRequest::new("GET", "/api/cart")
        .bearer(&token)
        .send(&app)
        .await;
    assert!(session_cookie_from(&response).is_some());
    let (_, body) = read_json(response).await;
    assert_eq!(body["items"], json!([]));
}
