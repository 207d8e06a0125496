#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Map, Value};

use infra_market_api::config::AppConfig;
use infra_market_api::{app, AppState, Stores};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Delay of the upstream `/sleep` route
pub const SLOW_UPSTREAM: Duration = Duration::from_secs(2);

/// In-process API server on memory stores, plus an upstream it can call
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub upstream: Upstream,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let config = Arc::new(AppConfig::development());
        let state = AppState::new(config, Stores::memory(), None)?;
        state
            .auth
            .create_user(ADMIN_USER, ADMIN_PASSWORD)
            .await
            .map_err(|e| anyhow::anyhow!("failed to create test user: {}", e))?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind api listener")?;
        let addr = listener.local_addr()?;
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            state,
            upstream: Upstream::spawn().await?,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self) -> Result<String> {
        let body: Value = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD }))
            .send()
            .await?
            .json()
            .await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .with_context(|| format!("login returned no token: {}", body))
    }

    /// Authenticated request returning (http status, envelope)
    pub async fn call(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> Result<(reqwest::StatusCode, Value)> {
        let mut request = self.client.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    /// Creates an interface and returns its id
    pub async fn create_interface(&self, token: &str, form: Value) -> Result<i64> {
        let (status, body) = self
            .call(reqwest::Method::POST, "/interface", token, Some(form))
            .await?;
        anyhow::ensure!(status.is_success(), "create failed: {}", body);
        body["data"]["id"].as_i64().context("created interface has no id")
    }

    /// Executes and returns the `data` of the envelope
    pub async fn execute(&self, token: &str, request: Value) -> Result<Value> {
        let (status, body) = self
            .call(reqwest::Method::POST, "/interface/execute", token, Some(request))
            .await?;
        anyhow::ensure!(status.is_success(), "execute failed: {}", body);
        Ok(body["data"].clone())
    }
}

/// Upstream stub: `/echo` reflects the request, `/data` returns a fixed
/// document, `/fail` answers 500 and `/sleep` answers after `SLOW_UPSTREAM`.
pub struct Upstream {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl Upstream {
    async fn spawn() -> Result<Self> {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/echo", any(echo))
            .route("/data", get(data))
            .route("/fail", any(fail))
            .route("/sleep", any(sleep))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind upstream listener")?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            hits,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn echo(
    State(hits): State<Arc<AtomicUsize>>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);

    let headers: Map<String, Value> = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned()),
            )
        })
        .collect();

    Json(json!({
        "method": method.as_str(),
        "query": query.unwrap_or_default(),
        "headers": headers,
        "body": body,
    }))
}

async fn data(State(hits): State<Arc<AtomicUsize>>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "a": { "b": 42 }, "items": [{ "id": 1 }, { "id": 2 }] }))
}

async fn fail(State(hits): State<Arc<AtomicUsize>>) -> impl IntoResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn sleep(State(hits): State<Arc<AtomicUsize>>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(SLOW_UPSTREAM).await;
    Json(json!({ "slept": true }))
}
