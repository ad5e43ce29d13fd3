//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. The
//! router also keeps its registrations as an ordered list, so a
//! sub-application can be merged under a prefix and the bootstrap can
//! replay route-added events in the order they happened.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::hooks::RouteInfo;
use crate::method::Method;

/// An application router, usable standalone as a sub-application for
/// [`Server::register`](crate::Server::register) or implicitly as the root
/// table behind [`Server::route`](crate::Server::route).
///
/// Path parameters use `{name}` syntax — `req.param("name")` retrieves them.
///
/// ```rust
/// use ashiba::{Method, Request, Response, Router};
///
/// async fn get_user(req: Request) -> Response {
///     let id = req.param("id").unwrap_or("unknown");
///     Response::text(format!("user {id}"))
/// }
///
/// let api = Router::new().on(Method::Get, "/users/{id}", get_user);
/// ```
///
/// # Panics
///
/// Registering a path that conflicts with an existing registration for the
/// same method panics. Re-registering an identical route is a conflict —
/// there is no silent last-one-wins.
pub struct Router {
    trees: HashMap<Method, MatchitRouter<BoxedHandler>>,
    entries: Vec<(RouteInfo, BoxedHandler)>,
}

impl Router {
    pub fn new() -> Self {
        Self { trees: HashMap::new(), entries: Vec::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for
    /// chaining.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.insert(method, path, handler.into_boxed_handler());
        self
    }

    pub(crate) fn insert(&mut self, method: Method, path: &str, handler: BoxedHandler) {
        self.trees
            .entry(method)
            .or_default()
            .insert(path, Arc::clone(&handler))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self.entries
            .push((RouteInfo { method, path: path.to_owned() }, handler));
    }

    /// Mounts every route of `sub` under `prefix`, returning the descriptors
    /// of the mounted routes in their original registration order.
    pub(crate) fn merge(&mut self, prefix: &str, sub: Router) -> Vec<RouteInfo> {
        let prefix = prefix.trim_end_matches('/');
        let mut mounted = Vec::with_capacity(sub.entries.len());
        for (info, handler) in sub.entries {
            let path = format!("{prefix}{}", info.path);
            self.insert(info.method, &path, handler);
            mounted.push(RouteInfo { method: info.method, path });
        }
        mounted
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.trees.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;

    async fn noop(_req: Request) -> Response {
        Response::text("ok")
    }

    #[test]
    fn lookup_matches_method_and_path() {
        let router = Router::new().on(Method::Get, "/hi", noop);
        assert!(router.lookup(Method::Get, "/hi").is_some());
        assert!(router.lookup(Method::Post, "/hi").is_none());
        assert!(router.lookup(Method::Get, "/nope").is_none());
    }

    #[test]
    fn lookup_extracts_params() {
        let router = Router::new().on(Method::Get, "/users/{id}", noop);
        let (_, params) = router.lookup(Method::Get, "/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn duplicate_registration_panics() {
        let _ = Router::new()
            .on(Method::Get, "/hi", noop)
            .on(Method::Get, "/hi", noop);
    }

    #[test]
    fn merge_prefixes_and_preserves_order() {
        let sub = Router::new()
            .on(Method::Get, "/hello", noop)
            .on(Method::Get, "/server", noop);
        let mut root = Router::new();
        let mounted = root.merge("/api", sub);

        let paths: Vec<_> = mounted.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["/api/hello", "/api/server"]);
        assert!(root.lookup(Method::Get, "/api/hello").is_some());
        assert!(root.lookup(Method::Get, "/hello").is_none());
    }
}
