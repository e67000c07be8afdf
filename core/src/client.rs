//! Reading-list resource methods.
//!
//! # Design
//! `ReadingListClient` maps each server operation to a verb, an endpoint
//! and `RequestArgs`, then hands off to the [`Dispatcher`]. It holds no
//! mutable state; cloning is cheap and clones share the same configuration
//! and transport. Arguments are not validated locally: the server is the
//! authority on what a valid article looks like.

use std::sync::Arc;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::dispatch::{Call, Dispatcher};
use crate::http::{Headers, HttpMethod, HttpResponse, Query, ReqwestTransport, RequestArgs, Transport};

/// Async client for the reading-list articles API.
#[derive(Clone)]
pub struct ReadingListClient {
    dispatcher: Dispatcher,
}

impl ReadingListClient {
    /// Client using the default reqwest transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            dispatcher: Dispatcher::new(config, transport),
        }
    }

    /// Client configured from the environment, see [`ClientConfig::from_env`].
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        self.dispatcher.config()
    }

    /// `GET /articles`, with `filters` as the query string (e.g. `_limit`).
    pub fn list_articles(&self, filters: Option<Query>) -> Call {
        let args = RequestArgs {
            query: filters,
            ..RequestArgs::default()
        };
        self.execute(HttpMethod::Get, "/articles", Some(args))
    }

    /// `GET /articles/{id}`.
    pub fn get_article(&self, id: &str) -> Call {
        self.execute(HttpMethod::Get, &article_path(id), None)
    }

    /// `POST /articles`. The server requires `url`, `title` and `added_by`.
    pub fn create_article<T: Serialize + ?Sized>(&self, data: &T) -> Call {
        match serde_json::to_value(data) {
            Ok(body) => self.execute(HttpMethod::Post, "/articles", Some(RequestArgs::new().body(body))),
            Err(e) => Call::failed(e.into()),
        }
    }

    /// `PATCH /articles/{id}` with a partial field map. `headers`, when
    /// given, replaces the client's default headers for this call (see
    /// [`ResponseBehavior`](crate::types::ResponseBehavior)).
    pub fn update_article<T: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &T,
        headers: Option<Headers>,
    ) -> Call {
        match serde_json::to_value(data) {
            Ok(body) => {
                let args = RequestArgs {
                    body: Some(body),
                    headers,
                    ..RequestArgs::default()
                };
                self.execute(HttpMethod::Patch, &article_path(id), Some(args))
            }
            Err(e) => Call::failed(e.into()),
        }
    }

    /// `DELETE /articles/{id}`.
    pub fn delete_article(&self, id: &str) -> Call {
        self.execute(HttpMethod::Delete, &article_path(id), None)
    }

    /// `DELETE /articles`.
    pub fn delete_all_articles(&self) -> Call {
        self.execute(HttpMethod::Delete, "/articles", None)
    }

    /// `GET /__heartbeat__`: health of each server dependency.
    pub fn heartbeat(&self) -> Call {
        self.execute(HttpMethod::Get, "/__heartbeat__", None)
    }

    /// `GET /`: service metadata.
    pub fn describe_service(&self) -> Call {
        self.execute(HttpMethod::Get, "/", None)
    }

    /// Arbitrary call against `server + endpoint`, resolving with the body.
    pub fn execute(&self, method: HttpMethod, endpoint: &str, args: Option<RequestArgs>) -> Call {
        self.dispatcher.execute(method, endpoint, args)
    }

    /// Arbitrary call resolving with status, headers and body.
    pub fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        args: Option<RequestArgs>,
    ) -> Call<HttpResponse> {
        self.dispatcher.send(method, endpoint, args)
    }
}

fn article_path(id: &str) -> String {
    format!("/articles/{id}")
}
