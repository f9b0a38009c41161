//! Cookie extraction.
//!
//! Parses the `Cookie` request headers into a name/value map attached to the
//! request context. Runs first in the pipeline and never fails the request;
//! requests without cookies carry an empty map.

use std::collections::HashMap;

use axum::extract::Request;
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

/// Parsed request cookies.
#[derive(Debug, Clone, Default)]
pub struct Cookies(pub HashMap<String, String>);

impl Cookies {
    /// Parse every `Cookie` header in the map.
    ///
    /// Pairs are `;`-separated `name=value` entries; pairs without an `=` or
    /// with an empty name are skipped. Later occurrences of a name win.
    pub fn parse(headers: &HeaderMap) -> Self {
        let mut cookies = HashMap::new();

        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else {
                continue;
            };

            for pair in raw.split(';') {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                cookies.insert(name.to_string(), value.trim().to_string());
            }
        }

        Self(cookies)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pipeline stage: attach the parsed cookie map to the request.
pub async fn cookie_parser_middleware(mut request: Request, next: Next) -> Response {
    let cookies = Cookies::parse(request.headers());
    request.extensions_mut().insert(cookies);

    next.run(request).await
}
