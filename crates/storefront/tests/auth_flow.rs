mod common;

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use common::{error_message, test_app, PASSWORD};
use serde_json::json;
use storefront::core::store::users;

#[tokio::test]
async fn register_login_and_me() {
    let app = test_app().await;

    let (status, body) = app.register("Maria@Example.com", "Maria Silva").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "maria@example.com");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["is_verified"], false);
    assert!(body.get("hashed_password").is_none());

    let (status, body) = app.login("MARIA@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, me) = app.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["full_name"], "Maria Silva");

    let user = users::find_by_email(app.state.store.pool(), "maria@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.last_login.is_some());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = test_app().await;
    assert_eq!(app.register("joao@example.com", "João Souza").await.0, StatusCode::CREATED);

    let (status, body) = app.register("JOAO@example.com", "Outro João").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "email already registered");
}

#[tokio::test]
async fn weak_password_is_unprocessable() {
    let app = test_app().await;
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({
                "email": "ana@example.com",
                "full_name": "Ana Lima",
                "password": "password",
                "password_confirm": "password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["details"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn bad_credentials_are_401() {
    let app = test_app().await;
    app.register("ana@example.com", "Ana Lima").await;

    let (status, _) = app.login("ana@example.com", "Wrong123!").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.login("nobody@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = test_app().await;

    let req = Request::builder()
        .method(Method::GET)
        .uri("/auth/me")
        .body(Body::empty())
        .unwrap();
    let resp_status = app.call(req).await.0;
    assert_eq!(resp_status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/cart", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The challenge header comes with every 401.
    let req = Request::builder()
        .method(Method::GET)
        .uri("/orders/my-orders")
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .unwrap();
    let resp = tower::ServiceExt::oneshot(app.router.clone(), req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[tokio::test]
async fn token_for_deleted_or_unknown_user_is_rejected() {
    let app = test_app().await;
    let token = app.state.auth.issue_token("ghost@example.com").unwrap();
    let (status, _) = app.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inactive_users_are_forbidden() {
    let app = test_app().await;
    let token = app.register_and_login("bia@example.com", "Bia Costa").await;
    let user = users::find_by_email(app.state.store.pool(), "bia@example.com")
        .await
        .unwrap()
        .unwrap();
    users::set_active(app.state.store.pool(), &user.id, false)
        .await
        .unwrap();

    let (status, _) = app.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.login("bia@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn update_profile_and_change_password() {
    let app = test_app().await;
    let token = app.register_and_login("caio@example.com", "Caio Reis").await;

    let (status, body) = app
        .put("/auth/me", Some(&token), json!({ "full_name": "Caio Reis Filho" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Caio Reis Filho");

    let (status, _) = app
        .post(
            "/auth/change-password",
            Some(&token),
            json!({ "current_password": "Wrong123!", "new_password": "NewPass456!" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/auth/change-password",
            Some(&token),
            json!({ "current_password": PASSWORD, "new_password": "weak" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .post(
            "/auth/change-password",
            Some(&token),
            json!({ "current_password": PASSWORD, "new_password": "NewPass456!" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "password changed");

    assert_eq!(app.login("caio@example.com", PASSWORD).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("caio@example.com", "NewPass456!").await.0, StatusCode::OK);
}

#[tokio::test]
async fn rejected_bodies_get_an_error_envelope() {
    let app = test_app().await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, bytes) = app.call(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(!error_message(&body).is_empty());

    let (status, body) = app
        .post("/auth/register", None, json!({ "email": "ana@example.com" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_message(&body), "request validation failed");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=ana@example.com"))
        .unwrap();
    let (status, bytes) = app.call(req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error_message(&body), "request validation failed");
}
