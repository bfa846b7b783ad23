//! Drives the full router against a fresh in-memory database.

#![allow(dead_code)]

use agora_authz::Role;
use agora_kernel::Settings;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

pub struct TestApp {
    router: Router,
    pub db: DatabaseConnection,
}

/// A registered account.
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = agora_db::connect_in_memory().await.unwrap();
        let (registry, state) = agora_app::bootstrap_with(db.clone(), Settings::default())
            .await
            .unwrap();
        let router = agora_http::build_router(&registry, state);
        Self { router, db }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Response { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Register through the API and return the new account's token.
    pub async fn register(&self, username: &str) -> TestUser {
        let response = self
            .post(
                "/api/accounts/register",
                None,
                json!({ "username": username, "password": "testpass123" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        TestUser {
            id: response.body["user"]["id"].as_i64().unwrap(),
            username: username.to_string(),
            token: response.body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn set_role(&self, username: &str, role: Role) {
        agora_authz::users::set_role(&self.db, username, role)
            .await
            .unwrap()
            .unwrap();
    }
}

impl Response {
    /// Field-keyed validation messages from the error envelope.
    pub fn field_errors(&self) -> &Value {
        &self.body["error"]["details"]
    }

    pub fn message(&self) -> &str {
        self.body["error"]["message"].as_str().unwrap_or_default()
    }
}
