#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use serde_json::Value;
use tempfile::TempDir;
use tinylink::{config::AppConfig, db, AppState};
use tower::ServiceExt;

pub const BASE_URL: &str = "http://sho.rt";

/// A server state backed by a fresh SQLite file. The directory is removed
/// when the value is dropped.
pub struct TestApp {
    pub state: Arc<AppState>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_max_attempts(10).await
    }

    pub async fn with_max_attempts(code_max_attempts: u32) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let database_url = format!("sqlite:{}", dir.path().join("links.db").display());
        let pool = db::connect(&database_url, 8)
            .await
            .expect("Failed to open test database");

        let config = AppConfig {
            database_url,
            host: "127.0.0.1".into(),
            port: 0,
            base_url: BASE_URL.into(),
            code_max_attempts,
            db_max_connections: 8,
        };

        Self {
            state: Arc::new(AppState::new(pool, config)),
            _dir: dir,
        }
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.state.db
    }

    pub async fn request(&self, req: Request<Body>) -> Response {
        tinylink::router(self.state.clone())
            .oneshot(req)
            .await
            .expect("Router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.request(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

impl TestApp {
    pub async fn post_form(&self, uri: &str, body: &str) -> Response {
        self.request(
            Request::post(uri)
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> Response {
        self.request(
            Request::get(uri)
                .header("cookie", cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// The `name=value` part of the first Set-Cookie header for `name`.
pub fn set_cookie_pair(resp: &Response, name: &str) -> Option<String> {
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{name}=")))
        .map(|v| v.split(';').next().unwrap_or_default().to_owned())
}

pub async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_text(resp).await).expect("Body is not JSON")
}

pub async fn expect_json(resp: Response, status: StatusCode) -> Value {
    assert_eq!(resp.status(), status);
    body_json(resp).await
}
