//! Shared helpers for the HTTP tests.
//!
//! Each test gets its own SQLite file and upload directory under a temp dir
//! and drives the router in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use storefront::core::store::Store;
use storefront::core::{AppConfig, AppState};
use tempfile::TempDir;
use tower::ServiceExt; // oneshot

pub const PASSWORD: &str = "Password123!";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

pub async fn test_app() -> TestApp {
    test_app_with(true).await
}

pub async fn test_app_with(demo_mode: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("storefront.sqlite");
    let upload_dir = dir.path().join("uploads");

    let vars: HashMap<&str, String> = HashMap::from([
        ("SECRET_KEY", "test-secret".to_string()),
        ("BCRYPT_COST", "4".to_string()),
        ("DEMO_MODE", demo_mode.to_string()),
        ("ENVIRONMENT", "test".to_string()),
        ("DATABASE_URL", format!("sqlite://{}", db_path.display())),
        ("UPLOAD_DIR", upload_dir.display().to_string()),
        ("MAX_UPLOAD_SIZE", "1024".to_string()),
    ]);
    let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();

    let store = Store::connect(&config.database_url).await.unwrap();
    let state = AppState::new(config, store).await.unwrap();
    let router = storefront::app(state.clone());

    TestApp { router, state, dir }
}

impl TestApp {
    /// Send a request and return (status, body bytes).
    pub async fn call(&self, req: Request<Body>) -> (StatusCode, bytes::Bytes) {
        let resp = self.router.clone().oneshot(req).await.expect("oneshot failed");
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .expect("body collect failed")
            .to_bytes();
        (status, body)
    }

    /// JSON request helper; the body is parsed as JSON or `Null` when empty.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes) = self.call(req).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    pub async fn register(&self, email: &str, full_name: &str) -> (StatusCode, Value) {
        self.post(
            "/auth/register",
            None,
            json!({
                "email": email,
                "full_name": full_name,
                "password": PASSWORD,
                "password_confirm": PASSWORD,
            }),
        )
        .await
    }

    /// Form login; the values must not need percent-encoding.
    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={email}&password={password}")))
            .unwrap();
        let (status, bytes) = self.call(req).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Register a user and return a bearer token for them.
    pub async fn register_and_login(&self, email: &str, full_name: &str) -> String {
        let (status, _) = self.register(email, full_name).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn create_product(&self, token: &str, name: &str, price: f64, stock: i64) -> Value {
        let (status, body) = self
            .post(
                "/products",
                Some(token),
                json!({
                    "name": name,
                    "description": format!("{name} - descrição completa do produto"),
                    "price": price,
                    "stock": stock,
                    "category": "Vestidos",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    pub async fn add_to_cart(&self, token: &str, product_id: &str, quantity: i64) -> (StatusCode, Value) {
        self.post(
            "/cart/add",
            Some(token),
            json!({ "product_id": product_id, "quantity": quantity }),
        )
        .await
    }

    pub async fn checkout(&self, token: &str, state: &str) -> (StatusCode, Value) {
        self.post("/orders", Some(token), checkout_body(state)).await
    }
}

pub fn checkout_body(state: &str) -> Value {
    json!({
        "payment_method": "PIX",
        "shipping_address": {
            "street": "Rua das Flores",
            "number": "123",
            "complement": "Apto 45",
            "neighborhood": "Centro",
            "city": "São Paulo",
            "state": state,
            "zip_code": "01234567",
        }
    })
}

/// Build a multipart body with one part per `(field, filename, content_type, data)`.
pub fn multipart_body(boundary: &str, parts: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, token: Option<&str>, parts: &[(&str, &str, &str, &[u8])]) -> Request<Body> {
    let boundary = "storefront-test-boundary";
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(multipart_body(boundary, parts)))
        .unwrap()
}

/// Split a `PED-YYYYMMDD-NNNN` order number into its day and sequence. The
/// server stamped the day before the test read its own clock, so the day is
/// today or, across midnight, yesterday.
pub fn order_sequence(number: &Value) -> (String, u32) {
    let number = number.as_str().expect("order_number is a string");
    let parts: Vec<&str> = number.split('-').collect();
    assert_eq!(parts.len(), 3, "{number}");
    assert_eq!(parts[0], "PED", "{number}");
    assert_eq!(parts[2].len(), 4, "{number}");

    let day = NaiveDate::parse_from_str(parts[1], "%Y%m%d").expect("order day");
    let today = Utc::now().date_naive();
    assert!(day == today || Some(day) == today.pred_opt(), "{number}");

    (parts[1].to_string(), parts[2].parse().expect("order sequence"))
}

/// Assert the body is the JSON error envelope and return its message.
pub fn error_message(body: &Value) -> &str {
    body["error"]["message"]
        .as_str()
        .unwrap_or_else(|| panic!("not an error envelope: {body}"))
}
