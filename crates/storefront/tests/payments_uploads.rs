mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{multipart_request, test_app, test_app_with};
use serde_json::{json, Value};
use storefront::shop::payments::DEMO_PIX_CODE;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-bytes";

#[tokio::test]
async fn demo_payments_succeed() {
    let app = test_app().await;

    let (status, body) = app
        .post(
            "/payments/card",
            None,
            json!({
                "card_number": "4111111111111111",
                "card_holder": "MARIA SILVA",
                "expiry_date": "12/30",
                "cvv": "123",
                "amount": 199.9,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["transaction_id"].as_str().unwrap().starts_with("demo-card-"));
    assert!(body.get("pix_code").is_none());

    let (status, body) = app.post("/payments/pix", None, json!({ "amount": 50 })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["transaction_id"].as_str().unwrap().starts_with("demo-pix-"));
    assert_eq!(body["pix_code"], DEMO_PIX_CODE);

    let (status, _) = app.post("/payments/pix", None, json!({ "amount": 0 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn real_payments_are_not_implemented() {
    let app = test_app_with(false).await;
    let (status, body) = app.post("/payments/pix", None, json!({ "amount": 10 })).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(
        body["error"]["message"],
        "real payment processing is not implemented"
    );
}

async fn fetch(app: &common::TestApp, uri: &str) -> (StatusCode, bytes::Bytes) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.call(req).await
}

#[tokio::test]
async fn single_upload_is_served_back() {
    let app = test_app().await;
    let req = multipart_request("/upload/single", None, &[("file", "foto.PNG", "image/png", PNG)]);
    let (status, body) = app.call(req).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/products/") && url.ends_with(".png"), "{url}");

    let (status, bytes) = fetch(&app, url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..], PNG);
}

#[tokio::test]
async fn uploads_are_validated() {
    let app = test_app().await;

    let req = multipart_request("/upload/single", None, &[("file", "notes.txt", "text/plain", &b"hi"[..])]);
    assert_eq!(app.call(req).await.0, StatusCode::BAD_REQUEST);

    let req = multipart_request("/upload/single", None, &[("file", "fake.png", "text/plain", PNG)]);
    assert_eq!(app.call(req).await.0, StatusCode::BAD_REQUEST);

    // MAX_UPLOAD_SIZE is 1024 in tests
    let big = vec![0u8; 2048];
    let req = multipart_request("/upload/single", None, &[("file", "big.jpg", "image/jpeg", big.as_slice())]);
    assert_eq!(app.call(req).await.0, StatusCode::BAD_REQUEST);

    let six: Vec<(&str, &str, &str, &[u8])> = (0..6).map(|_| ("files", "a.gif", "image/gif", PNG)).collect();
    let req = multipart_request("/upload/multiple", None, &six);
    assert_eq!(app.call(req).await.0, StatusCode::BAD_REQUEST);

    let two = [("files", "a.webp", "image/webp", PNG), ("files", "b.jpeg", "image/jpeg", PNG)];
    let (status, body) = app.call(multipart_request("/upload/multiple", None, &two)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["urls"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn product_images_are_attached_and_removed_with_the_product() {
    let app = test_app().await;
    let token = app.register_and_login("loja@example.com", "Loja Teste").await;
    let product = app.create_product(&token, "Vestido Renda", 250.0, 1).await;
    let id = product["id"].as_str().unwrap();
    let uri = format!("/products/{id}/images");

    let req = multipart_request(&uri, None, &[("files", "a.png", "image/png", PNG)]);
    assert_eq!(app.call(req).await.0, StatusCode::UNAUTHORIZED);

    let req = multipart_request(
        &uri,
        Some(&token),
        &[("files", "a.png", "image/png", PNG), ("files", "b.png", "image/png", PNG)],
    );
    let (status, body) = app.call(req).await;
    assert_eq!(status, StatusCode::OK);
    let updated: Value = serde_json::from_slice(&body).unwrap();
    let urls: Vec<String> = updated["image_urls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u.as_str().unwrap().to_string())
        .collect();
    assert_eq!(urls.len(), 2);
    assert_eq!(fetch(&app, &urls[0]).await.0, StatusCode::OK);

    // the first image is the cart thumbnail
    app.add_to_cart(&token, id, 1).await;
    let (_, cart) = app.get("/cart", Some(&token)).await;
    assert_eq!(cart["items"][0]["product_image"], urls[0].as_str());

    let (status, _) = app.delete(&format!("/products/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    for url in &urls {
        let name = url.trim_start_matches("/uploads/products/");
        assert!(!app.dir.path().join("uploads/products").join(name).exists());
        assert_eq!(fetch(&app, url).await.0, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn health_and_root() {
    let app = test_app().await;

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert!(body["timestamp"].is_string());

    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["endpoints"]["orders"], "/orders");
}
