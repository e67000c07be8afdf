//! Typed views of reading-list payloads.
//!
//! # Design
//! The client itself passes JSON through untouched. These types are an
//! optional convenience for callers that want to deserialize results with
//! [`Call::json`](crate::dispatch::Call::json). Server fields not modelled
//! here are kept in `extra`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::Headers;

/// A bookmarked reading-list item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub url: String,
    pub title: String,
    pub added_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_position: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for `create_article`. `url`, `title` and `added_by` are the
/// fields the server requires; anything else goes in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub added_by: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewArticle {
    pub fn new(url: impl Into<String>, title: impl Into<String>, added_by: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            added_by: added_by.into(),
            extra: Map::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.extra.insert(field.into(), value);
        self
    }
}

/// Result of `list_articles` and `delete_all_articles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleList<T = Article> {
    pub items: Vec<T>,
}

/// Result of `delete_article`, and each item of `delete_all_articles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedArticle {
    pub id: String,
    pub deleted: bool,
    pub last_modified: u64,
}

/// Result of `describe_service`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInfo {
    pub documentation: String,
    pub hello: String,
    pub url: String,
    pub version: String,
}

/// Result of `heartbeat`: dependency name to health.
pub type Heartbeat = BTreeMap<String, bool>;

/// How much of the record the server echoes back after a PATCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseBehavior {
    #[default]
    Full,
    Light,
    Diff,
}

impl ResponseBehavior {
    pub const HEADER: &'static str = "Response-Behavior";

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseBehavior::Full => "full",
            ResponseBehavior::Light => "light",
            ResponseBehavior::Diff => "diff",
        }
    }

    /// Header map to pass to `update_article`.
    pub fn headers(&self) -> Headers {
        Headers::from([(Self::HEADER.to_string(), self.as_str().to_string())])
    }
}

impl std::str::FromStr for ResponseBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(ResponseBehavior::Full),
            "light" => Ok(ResponseBehavior::Light),
            "diff" => Ok(ResponseBehavior::Diff),
            other => Err(format!("unknown response behavior: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn article_keeps_unknown_fields() {
        let article: Article = serde_json::from_value(json!({
            "id": "a1",
            "url": "http://localhost/1",
            "title": "Page",
            "added_by": "alice",
            "last_modified": 1430000000000u64,
            "unread": true,
            "word_count": 120
        }))
        .unwrap();
        assert_eq!(article.id, "a1");
        assert_eq!(article.unread, Some(true));
        assert_eq!(article.extra["word_count"], 120);
        assert!(article.favorite.is_none());
    }

    #[test]
    fn new_article_flattens_extra_fields() {
        let body = serde_json::to_value(
            NewArticle::new("http://localhost/1", "Page", "alice").with("unread", json!(false)),
        )
        .unwrap();
        assert_eq!(
            body,
            json!({"url": "http://localhost/1", "title": "Page", "added_by": "alice", "unread": false})
        );
    }

    #[test]
    fn response_behavior_header() {
        let headers = ResponseBehavior::Light.headers();
        assert_eq!(headers["Response-Behavior"], "light");
        assert_eq!("diff".parse::<ResponseBehavior>(), Ok(ResponseBehavior::Diff));
        assert!("partial".parse::<ResponseBehavior>().is_err());
    }
}
