//! HTTP request/response types and the transport seam.
//!
//! # Design
//! A call is described as plain data before it touches the network.
//! `RequestOptions::merge` layers client defaults, the computed method and
//! URI, and the caller's `RequestArgs` into one `RequestOptions` value; a
//! `Transport` executes it and hands back an `HttpResponse`. The default
//! transport is reqwest, but anything implementing `Transport` can stand in
//! (tests use an in-memory recorder).

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use serde::Serialize;
use serde_json::Value;

use crate::config::Auth;
use crate::error::{ApiError, Result};

/// Query string parameters.
pub type Query = BTreeMap<String, String>;

/// Header name/value pairs.
pub type Headers = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Per-call arguments supplied by the caller.
///
/// Each field that is set replaces the corresponding default wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestArgs {
    pub query: Option<Query>,
    pub body: Option<Value>,
    pub headers: Option<Headers>,
}

impl RequestArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query = Some(params.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds one header to the caller's header map, creating the map if needed.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Client-wide defaults, the lowest-priority merge layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefaults {
    pub json: bool,
    pub auth: Option<Auth>,
    pub headers: Headers,
}

/// The method and absolute URI computed for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Computed {
    pub method: HttpMethod,
    pub uri: String,
}

/// Fully merged options handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub uri: String,
    pub json: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    pub headers: Headers,
}

impl RequestOptions {
    /// Shallow merge in increasing priority: `defaults`, then `computed`,
    /// then `args`. A later layer replaces a same-named field outright; maps
    /// are never merged key by key.
    pub fn merge(defaults: &RequestDefaults, computed: Computed, args: RequestArgs) -> Self {
        let mut options = RequestOptions {
            method: computed.method,
            uri: computed.uri,
            json: defaults.json,
            auth: defaults.auth.clone(),
            query: None,
            body: None,
            headers: defaults.headers.clone(),
        };
        if let Some(query) = args.query {
            options.query = Some(query);
        }
        if let Some(body) = args.body {
            options.body = Some(body);
        }
        if let Some(headers) = args.headers {
            options.headers = headers;
        }
        options
    }
}

/// A response as seen by the caller. The status is informational only.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx response into `ApiError::Status`.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }

    pub(crate) fn headers_value(&self) -> Value {
        Value::Object(
            self.headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Executes one request. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, options: &RequestOptions) -> Result<HttpResponse>;
}

/// reqwest-backed transport. Timeouts, TLS and pooling belong to the
/// wrapped `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, options: &RequestOptions) -> Result<HttpResponse> {
        let mut request = self
            .client
            .request(options.method.into(), &options.uri)
            .headers(header_map(options)?);

        if let Some(auth) = &options.auth {
            request = match auth {
                Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
                Auth::Bearer { token } => request.bearer_auth(token),
            };
        }
        if let Some(query) = &options.query {
            request = request.query(query);
        }
        if let Some(body) = &options.body {
            request = if options.json {
                request.json(body)
            } else {
                request.body(match body {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
            };
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let bytes = response.bytes().await?;
        let body = if options.json {
            parse_body(&bytes)
        } else {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn header_map(options: &RequestOptions) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    if options.json {
        map.insert(ACCEPT, HeaderValue::from_static("application/json"));
    }
    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        match headers.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                headers.insert(name.as_str().to_string(), value.into_owned());
            }
        }
    }
    headers
}

/// Empty bodies become `null`; bodies that are not JSON come back as a
/// JSON string holding the raw text.
pub(crate) fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
