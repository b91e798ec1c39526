//! In-process stand-in for the Tradier market-data API and the automation webhooks.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct RecordedGet {
    pub path: &'static str,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub side: String,
    pub body: Value,
}

struct Inner {
    quote: Mutex<Value>,
    history: Mutex<Value>,
    tradier_status: Mutex<StatusCode>,
    webhook_status: Mutex<StatusCode>,
    tradier_hits: AtomicUsize,
    gets: Mutex<Vec<RecordedGet>>,
    posts: Mutex<Vec<RecordedPost>>,
}

#[derive(Clone)]
pub struct FakeApi {
    inner: Arc<Inner>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                quote: Mutex::new(quote_json(418.0, Some(424.0), 425.0)),
                history: Mutex::new(history_json(400.0, 200, 100.0, 50)),
                tradier_status: Mutex::new(StatusCode::OK),
                webhook_status: Mutex::new(StatusCode::OK),
                tradier_hits: AtomicUsize::new(0),
                gets: Mutex::new(Vec::new()),
                posts: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn set_quote(&self, v: Value) {
        *self.inner.quote.lock().unwrap() = v;
    }

    pub fn set_history(&self, v: Value) {
        *self.inner.history.lock().unwrap() = v;
    }

    pub fn set_tradier_status(&self, status: StatusCode) {
        *self.inner.tradier_status.lock().unwrap() = status;
    }

    pub fn set_webhook_status(&self, status: StatusCode) {
        *self.inner.webhook_status.lock().unwrap() = status;
    }

    pub fn tradier_hits(&self) -> usize {
        self.inner.tradier_hits.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> Vec<RecordedGet> {
        self.inner.gets.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.inner.posts.lock().unwrap().clone()
    }

    /// Bind to an ephemeral local port and serve in the background.
    pub async fn spawn(&self) -> SocketAddr {
        let app = Router::new()
            .route("/v1/markets/quotes", get(quotes))
            .route("/v1/markets/history", get(history))
            .route("/hook/{side}", post(webhook))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn record_get(&self, path: &'static str, headers: &HeaderMap, query: HashMap<String, String>) {
        self.inner.tradier_hits.fetch_add(1, Ordering::SeqCst);
        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.inner.gets.lock().unwrap().push(RecordedGet {
            path,
            query,
            authorization: header_str(header::AUTHORIZATION),
            accept: header_str(header::ACCEPT),
        });
    }

    fn tradier_reply(&self, body: &Mutex<Value>) -> Response {
        let status = *self.inner.tradier_status.lock().unwrap();
        if status != StatusCode::OK {
            return (status, "Invalid Access Token\n").into_response();
        }
        let v = body.lock().unwrap().clone();
        Json(v).into_response()
    }
}

async fn quotes(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    api.record_get("/markets/quotes", &headers, query);
    api.tradier_reply(&api.inner.quote)
}

async fn history(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    api.record_get("/markets/history", &headers, query);
    api.tradier_reply(&api.inner.history)
}

async fn webhook(
    State(api): State<FakeApi>,
    Path(side): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    api.inner.posts.lock().unwrap().push(RecordedPost { side, body });
    *api.inner.webhook_status.lock().unwrap()
}

pub fn quote_json(last: f64, open: Option<f64>, prevclose: f64) -> Value {
    json!({
        "quotes": {
            "quote": {
                "symbol": "QQQ",
                "description": "Invesco QQQ Trust",
                "type": "etf",
                "last": last,
                "open": open,
                "prevclose": prevclose
            }
        }
    })
}

/// `older_count` closes of `older` followed by `recent_count` closes of `recent`.
pub fn history_json(recent: f64, recent_count: usize, older: f64, older_count: usize) -> Value {
    let start = chrono::NaiveDate::from_ymd_opt(2025, 8, 25).unwrap();
    let days: Vec<Value> = (0..older_count + recent_count)
        .map(|i| {
            let date = start + chrono::Duration::days(i as i64);
            let close = if i < older_count { older } else { recent };
            json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "open": close,
                "high": close,
                "low": close,
                "close": close,
                "volume": 1_000_000
            })
        })
        .collect();
    json!({ "history": { "day": days } })
}
