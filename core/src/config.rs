//! Client configuration.
//!
//! A `ClientConfig` is built once and then shared read-only by every call
//! the client makes. Environment variables are only consulted by
//! [`ClientConfig::from_env`], never while dispatching.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::http::Headers;

pub const DEFAULT_SERVER: &str = "https://readinglist.stage.mozaws.net/v1";

const REDACTED: &str = "[redacted]";

/// Credentials forwarded verbatim to the transport.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl Auth {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer {
            token: token.into(),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
            Auth::Bearer { .. } => f.debug_struct("Bearer").field("token", &REDACTED).finish(),
        }
    }
}

// Diagnostic dumps go through this impl, so secrets never reach the log.
impl Serialize for Auth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Auth::Basic { username, .. } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("user", username)?;
                map.serialize_entry("pass", REDACTED)?;
                map.end()
            }
            Auth::Bearer { .. } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("bearer", REDACTED)?;
                map.end()
            }
        }
    }
}

/// Immutable configuration for a `ReadingListClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    server: String,
    auth: Option<Auth>,
    verbose: bool,
    headers: Headers,
}

impl ClientConfig {
    /// Trailing slashes are stripped from `server` so endpoints can be
    /// appended directly.
    pub fn new(server: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            auth: None,
            verbose: false,
            headers: Headers::new(),
        }
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Adds a header sent on every call unless the caller supplies its own
    /// header map.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Reads `READINGLIST_SERVER`, `TOKEN`, `USER`, `PASS` and `VERBOSE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = lookup("READINGLIST_SERVER")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());
        let mut config = Self::new(&server).verbose(lookup("VERBOSE").as_deref() == Some("true"));

        if let Some(token) = lookup("TOKEN").filter(|t| !t.is_empty()) {
            config = config.auth(Auth::bearer(token));
        } else if let Some(user) = lookup("USER").filter(|u| !u.is_empty()) {
            config = config.auth(Auth::basic(user, lookup("PASS").unwrap_or_default()));
        }
        config
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn credentials(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:3000/v1/");
        assert_eq!(config.server(), "http://localhost:3000/v1");
    }

    #[test]
    fn from_lookup_defaults_to_stage_server() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config.server(), DEFAULT_SERVER);
        assert!(config.credentials().is_none());
        assert!(!config.is_verbose());
    }

    #[test]
    fn from_lookup_prefers_token_over_user() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TOKEN", "abc"),
            ("USER", "alice"),
            ("PASS", "secret"),
        ]));
        assert_eq!(config.credentials(), Some(&Auth::bearer("abc")));
    }

    #[test]
    fn from_lookup_builds_basic_auth_and_verbose() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("READINGLIST_SERVER", "http://127.0.0.1:9000/v1"),
            ("USER", "alice"),
            ("VERBOSE", "true"),
        ]));
        assert_eq!(config.server(), "http://127.0.0.1:9000/v1");
        assert_eq!(config.credentials(), Some(&Auth::basic("alice", "")));
        assert!(config.is_verbose());
    }

    #[test]
    fn verbose_requires_exact_true() {
        let config = ClientConfig::from_lookup(lookup(&[("VERBOSE", "1")]));
        assert!(!config.is_verbose());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let rendered = format!("{:?}", Auth::basic("alice", "hunter2"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
