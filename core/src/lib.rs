//! Async client for the reading-list articles API.
//!
//! # Overview
//! `ReadingListClient` exposes one method per server operation (list, get,
//! create, update and delete articles, plus heartbeat and the service
//! descriptor). Every method returns a [`Call`], which can be awaited or
//! handed a callback.
//!
//! # Design
//! - The client is glue: it builds `(method, endpoint, RequestArgs)` and the
//!   `Dispatcher` merges that with client defaults before issuing exactly
//!   one request through a `Transport`.
//! - Results are passed through as `serde_json::Value`. Non-2xx responses
//!   are not errors; callers that care can use `send` and
//!   `HttpResponse::error_for_status`.
//! - `ClientConfig` is immutable and shared behind an `Arc`; verbose
//!   diagnostics are a constructor-time switch.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod http;
pub mod types;

pub use client::ReadingListClient;
pub use config::{Auth, ClientConfig};
pub use dispatch::{Call, Dispatcher};
pub use error::{ApiError, Result};
pub use http::{
    Headers, HttpMethod, HttpResponse, Query, RequestArgs, RequestOptions, ReqwestTransport,
    Transport,
};
pub use types::{Article, ArticleList, DeletedArticle, NewArticle, ResponseBehavior, ServiceInfo};
