//! The demo routes return exactly the documented payloads.

mod common;

use std::net::SocketAddr;

use http::StatusCode;
use serde::Serialize;

use ashiba::{Method, Request, Response, Server, ServerConfig, ServerHandle};

#[derive(Serialize)]
struct ServerInfo {
    #[serde(rename = "helloFrom")]
    hello_from: String,
}

/// Builds the demo application from the README: three routes, one of which
/// reads its own bound address through the injected cell.
async fn start_demo() -> ServerHandle {
    let mut app = Server::configure(ServerConfig::default());

    app.route(Method::Get, "/hi", |_req: Request| async { Response::text("hi there") });
    app.route(Method::Get, "/hello", |_req: Request| async { "hello" });

    let bound = app.bound_address();
    app.route(Method::Get, "/server", move |_req: Request| {
        let bound = bound.clone();
        async move {
            let hello_from = bound.get().map(|a| a.to_string()).unwrap_or_default();
            match serde_json::to_vec(&ServerInfo { hello_from }) {
                Ok(body) => Response::json(body),
                Err(_) => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
            }
        }
    });

    app.listen(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("listen failed")
}

#[tokio::test]
async fn hi_returns_literal_body() {
    let handle = start_demo().await;
    let reply = common::get(handle.local_addr(), "/hi").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, "hi there");
    handle.shutdown().await;
}

#[tokio::test]
async fn hello_returns_plain_payload() {
    let handle = start_demo().await;
    let reply = common::get(handle.local_addr(), "/hello").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, "hello");
    handle.shutdown().await;
}

#[tokio::test]
async fn server_route_reports_the_bound_address() {
    let handle = start_demo().await;
    let addr = handle.local_addr();

    let reply = common::get(addr, "/server").await;
    assert_eq!(reply.status, 200);

    let json: serde_json::Value = serde_json::from_str(&reply.body).expect("body is JSON");
    assert_eq!(json["helloFrom"], addr.to_string());

    handle.shutdown().await;
}

#[tokio::test]
async fn unmatched_path_is_404() {
    let handle = start_demo().await;
    let reply = common::get(handle.local_addr(), "/nope").await;
    assert_eq!(reply.status, 404);
    handle.shutdown().await;
}

#[tokio::test]
async fn unknown_method_is_405() {
    let handle = start_demo().await;
    let reply = common::request(handle.local_addr(), "BREW", "/hi").await;
    assert_eq!(reply.status, 405);
    handle.shutdown().await;
}
