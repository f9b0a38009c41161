//! Input sanitization.
//!
//! Neutralizes script-injection-capable substrings in the parsed JSON body
//! and in query-string values before they reach route handlers. Strings are
//! HTML-escaped in place; the sanitized body is re-serialized so downstream
//! body extractors observe the same bytes as the context value. Never fails
//! a request and may alter data silently.

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use url::form_urlencoded;

use crate::http::error::AppError;
use crate::middleware::body_parser::JsonBody;

/// Query-string parameters with sanitized names and values.
#[derive(Debug, Clone, Default)]
pub struct SanitizedQuery(pub HashMap<String, String>);

impl SanitizedQuery {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Escape the characters usable to break out into markup.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Recursively escape every string in a JSON value, object keys included.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::String(s) => {
            *s = escape_html(s);
        }
        Value::Array(items) => {
            for item in items {
                sanitize_value(item);
            }
        }
        Value::Object(map) => {
            let tainted: Vec<String> = map
                .keys()
                .filter(|k| k.contains(['&', '<', '>', '"', '\'']))
                .cloned()
                .collect();
            for key in tainted {
                if let Some(inner) = map.remove(&key) {
                    map.insert(escape_html(&key), inner);
                }
            }
            for inner in map.values_mut() {
                sanitize_value(inner);
            }
        }
        _ => {}
    }
}

/// Pipeline stage: sanitize the parsed body and the query string.
pub async fn sanitize_middleware(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let query: HashMap<String, String> = parts
        .uri
        .query()
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (escape_html(&k), escape_html(&v)))
                .collect()
        })
        .unwrap_or_default();
    parts.extensions.insert(SanitizedQuery(query));

    let body = if let Some(JsonBody(mut value)) = parts.extensions.remove::<JsonBody>() {
        sanitize_value(&mut value);

        let bytes = match serde_json::to_vec(&value) {
            Ok(bytes) => bytes,
            Err(_) => {
                return AppError::internal("Failed to re-encode sanitized body").into_response();
            }
        };

        parts
            .headers
            .insert(CONTENT_LENGTH, HeaderValue::from(bytes.len() as u64));
        parts.extensions.insert(JsonBody(value));
        Body::from(bytes)
    } else {
        body
    };

    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a & \"b\""), "a &amp; &quot;b&quot;");
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn sanitizes_nested_structures() {
        let mut value = json!({
            "name": "<b>bold</b>",
            "tags": ["<i>", "safe"],
            "nested": { "note": "5 > 3" },
            "count": 7,
            "ok": true,
        });

        sanitize_value(&mut value);

        assert_eq!(value["name"], "&lt;b&gt;bold&lt;/b&gt;");
        assert_eq!(value["tags"][0], "&lt;i&gt;");
        assert_eq!(value["tags"][1], "safe");
        assert_eq!(value["nested"]["note"], "5 &gt; 3");
        assert_eq!(value["count"], 7);
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn sanitizes_object_keys() {
        let mut value = json!({ "<img>": "x" });
        sanitize_value(&mut value);

        assert!(value.get("<img>").is_none());
        assert_eq!(value["&lt;img&gt;"], "x");
    }
}
