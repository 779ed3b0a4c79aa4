//! Normalized response shapes.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Paging metadata taken from GitLab's `x-*` response headers.
///
/// A field is present only when the matching header was sent with an integer
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<u64>,
}

impl Pagination {
    /// Read paging headers. Returns `None` when none of them carried a value.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .and_then(|v| v.parse::<u64>().ok())
        };

        let pagination = Self {
            total: read("x-total"),
            total_pages: read("x-total-pages"),
            page: read("x-page"),
            per_page: read("x-per-page"),
            next_page: read("x-next-page"),
            prev_page: read("x-prev-page"),
        };

        (pagination != Self::default()).then_some(pagination)
    }
}

/// The uniform result of every API call.
#[derive(Debug, Clone, PartialEq)]
pub enum GitLabResponse {
    /// JSON object body, passed through.
    Object(Map<String, Value>),
    /// JSON array body with paging metadata.
    List {
        items: Vec<Value>,
        pagination: Option<Pagination>,
    },
    /// `text/plain` body, e.g. a job trace.
    Text(String),
    /// `204 No Content`.
    Deleted,
}

impl GitLabResponse {
    /// Wrap a parsed JSON body. Scalars land under a `value` key so the
    /// rendered result is always an object.
    #[must_use]
    pub fn from_json(value: Value, pagination: impl FnOnce() -> Option<Pagination>) -> Self {
        match value {
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::List {
                items,
                pagination: pagination(),
            },
            scalar => {
                let mut map = Map::new();
                map.insert("value".to_string(), scalar);
                Self::Object(map)
            }
        }
    }

    /// Render as the JSON object handed back to tool callers.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::Object(map) => Value::Object(map),
            Self::List { items, pagination } => {
                let mut map = Map::new();
                map.insert("items".to_string(), Value::Array(items));
                if let Some(pagination) = pagination {
                    map.insert("pagination".to_string(), json!(pagination));
                }
                Value::Object(map)
            }
            Self::Text(content) => json!({ "content": content }),
            Self::Deleted => json!({ "status": "deleted" }),
        }
    }
}

impl From<GitLabResponse> for Value {
    fn from(response: GitLabResponse) -> Self {
        response.into_json()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use reqwest::header::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_pagination_only_present_headers() {
        let p = Pagination::from_headers(&headers(&[
            ("x-total", "2"),
            ("x-page", "1"),
            ("x-per-page", "20"),
            ("x-next-page", ""),
        ]))
        .unwrap();
        assert_eq!(
            json!(p),
            json!({ "total": 2, "page": 1, "per_page": 20 })
        );
    }

    #[test]
    fn test_pagination_absent() {
        assert!(Pagination::from_headers(&headers(&[("content-type", "application/json")])).is_none());
        assert!(Pagination::from_headers(&headers(&[("x-total", "lots")])).is_none());
    }

    #[test]
    fn test_render_shapes() {
        assert_eq!(GitLabResponse::Deleted.into_json(), json!({"status": "deleted"}));
        assert_eq!(
            GitLabResponse::Text("ok".into()).into_json(),
            json!({"content": "ok"})
        );
        let list = GitLabResponse::from_json(json!([1, 2]), || None);
        assert_eq!(list.into_json(), json!({"items": [1, 2]}));
        let scalar = GitLabResponse::from_json(json!("pong"), || None);
        assert_eq!(scalar.into_json(), json!({"value": "pong"}));
    }
}
