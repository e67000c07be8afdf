//! In-memory reading-list server.
//!
//! Implements the articles, heartbeat and service-descriptor endpoints with
//! the same payload shapes as the real service, so the client can be
//! exercised end to end without network access.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const VERSION: &str = "1.2.0";
pub const DOCUMENTATION: &str = "https://readinglist.readthedocs.org/";
pub const RESPONSE_BEHAVIOR: &str = "response-behavior";

const REQUIRED_FIELDS: [&str; 3] = ["url", "title", "added_by"];
const READ_ONLY_FIELDS: [&str; 2] = ["id", "last_modified"];

pub type Record = Map<String, Value>;

#[derive(Debug, Default)]
pub struct Store {
    articles: Vec<Record>,
    clock: u64,
}

impl Store {
    /// Millisecond timestamp, strictly increasing across calls.
    fn tick(&mut self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.clock = now.max(self.clock + 1);
        self.clock
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.articles
            .iter()
            .position(|a| a.get("id").and_then(Value::as_str) == Some(id))
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error body in the server's `{code, errno, error, message}` shape.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub errno: u32,
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Hello {
    pub documentation: &'static str,
    pub hello: &'static str,
    pub url: String,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Heartbeat {
    pub database: bool,
}

/// What a delete reports for each removed article.
#[derive(Debug, Serialize, PartialEq)]
pub struct Deleted {
    pub id: Value,
    pub deleted: bool,
    pub last_modified: u64,
}

#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/", get(hello))
        .route("/__heartbeat__", get(heartbeat))
        .route(
            "/articles",
            get(list_articles).post(create_article).delete(delete_articles),
        )
        .route(
            "/articles/{id}",
            get(get_article).patch(update_article).delete(delete_article),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "reading-list mock server listening");
    }
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, errno: u32, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        code: status.as_u16(),
        errno,
        error: status.canonical_reason().unwrap_or("Error").to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    error(
        StatusCode::NOT_FOUND,
        110,
        "The resource you are looking for could not be found.",
    )
}

fn invalid(message: impl Into<String>) -> Response {
    error(StatusCode::BAD_REQUEST, 107, message)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn summary(id: Value, last_modified: u64) -> Deleted {
    Deleted {
        id,
        deleted: true,
        last_modified,
    }
}

async fn hello(headers: HeaderMap) -> Json<Hello> {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    Json(Hello {
        documentation: DOCUMENTATION,
        hello: "readinglist",
        url: format!("http://{host}"),
        version: VERSION,
    })
}

async fn heartbeat() -> Json<Heartbeat> {
    Json(Heartbeat { database: true })
}

async fn list_articles(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let limit = match params.get("_limit").map(|l| l.parse::<usize>()) {
        Some(Ok(limit)) => Some(limit),
        Some(Err(_)) => return invalid("_limit must be a positive integer"),
        None => None,
    };
    let filters: Vec<(&String, &String)> = params.iter().filter(|(k, _)| !k.starts_with('_')).collect();

    let store = db.read().await;
    let items: Vec<Value> = store
        .articles
        .iter()
        .filter(|article| {
            filters
                .iter()
                .all(|(key, expected)| article.get(key.as_str()).map(render).as_deref() == Some(expected.as_str()))
        })
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .map(Value::Object)
        .collect();
    Json(Items { items }).into_response()
}

async fn create_article(State(db): State<Db>, Json(input): Json<Value>) -> Response {
    let Value::Object(mut record) = input else {
        return invalid("body should be a JSON object");
    };
    for field in REQUIRED_FIELDS {
        match record.get(field).and_then(Value::as_str) {
            Some(value) if !value.is_empty() => {}
            _ => return invalid(format!("{field} is missing")),
        }
    }
    for field in READ_ONLY_FIELDS {
        record.remove(field);
    }

    let mut store = db.write().await;
    let now = store.tick();
    record.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
    record.insert("last_modified".to_string(), json!(now));
    record.insert("stored_on".to_string(), json!(now));
    for (field, default) in [
        ("added_on", json!(now)),
        ("unread", json!(true)),
        ("favorite", json!(false)),
        ("archived", json!(false)),
        ("read_position", json!(0)),
    ] {
        record.entry(field.to_string()).or_insert(default);
    }
    store.articles.push(record.clone());
    (StatusCode::CREATED, Json(Value::Object(record))).into_response()
}

async fn get_article(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    match store.position(&id) {
        Some(index) => Json(Value::Object(store.articles[index].clone())).into_response(),
        None => not_found(),
    }
}

async fn update_article(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    let Value::Object(mut changes) = input else {
        return invalid("body should be a JSON object");
    };
    for field in READ_ONLY_FIELDS {
        changes.remove(field);
    }
    for field in REQUIRED_FIELDS {
        if let Some(value) = changes.get(field) {
            if value.as_str().map_or(true, str::is_empty) {
                return invalid(format!("{field} should be a non-empty string"));
            }
        }
    }

    let mut store = db.write().await;
    let Some(index) = store.position(&id) else {
        return not_found();
    };
    let changed: Record = changes
        .into_iter()
        .filter(|(key, value)| store.articles[index].get(key) != Some(value))
        .collect();
    if !changed.is_empty() {
        let now = store.tick();
        let article = &mut store.articles[index];
        article.extend(changed.clone());
        article.insert("last_modified".to_string(), json!(now));
    }
    let article = &store.articles[index];

    let behavior = headers
        .get(RESPONSE_BEHAVIOR)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("full");
    let body = match behavior {
        "light" => {
            let mut light = changed;
            light.insert("id".to_string(), article["id"].clone());
            light.insert("last_modified".to_string(), article["last_modified"].clone());
            light
        }
        "diff" => changed,
        _ => article.clone(),
    };
    Json(Value::Object(body)).into_response()
}

async fn delete_article(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut store = db.write().await;
    let Some(index) = store.position(&id) else {
        return not_found();
    };
    let now = store.tick();
    let removed = store.articles.remove(index);
    Json(summary(removed["id"].clone(), now)).into_response()
}

async fn delete_articles(State(db): State<Db>) -> Json<Items<Deleted>> {
    let mut store = db.write().await;
    let now = store.tick();
    let items: Vec<Deleted> = store
        .articles
        .drain(..)
        .map(|article| summary(article["id"].clone(), now))
        .collect();
    Json(Items { items })
}
