//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::HeaderMap;

use crate::method::Method;

/// An incoming HTTP request, with the body already collected.
///
/// Handlers receive this by value. The underlying transport (HTTP/1.1 or
/// HTTP/2) is invisible at this level — hyper has already done the framing.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        Self { method, path, headers, body, params }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Header lookup; `None` if absent or not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(params: HashMap<String, String>) -> Request {
        Request::new(Method::Get, "/users/42".into(), HeaderMap::new(), Bytes::new(), params)
    }

    #[test]
    fn params_resolve_by_name() {
        let mut params = HashMap::new();
        params.insert("id".to_owned(), "42".to_owned());
        let req = request_with(params);
        assert_eq!(req.param("id"), Some("42"));
        assert_eq!(req.param("missing"), None);
    }
}
