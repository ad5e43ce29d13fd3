//! Demo bootstrap: lifecycle hooks that log each transition, three routes,
//! HTTP/2-capable transport on `0.0.0.0:3001`.
//!
//! Run with `cargo run`, then:
//!   curl http://localhost:3001/hi
//!   curl http://localhost:3001/hello
//!   curl http://localhost:3001/server

use std::net::SocketAddr;

use http::StatusCode;
use serde::Serialize;
use tracing::{debug, error, info};

use ashiba::{LogLevel, Method, Request, Response, Server, ServerConfig, TransportMode};

#[derive(Serialize)]
struct ServerInfo {
    #[serde(rename = "helloFrom")]
    hello_from: String,
}

#[tokio::main]
async fn main() {
    let config = ServerConfig {
        log_level: LogLevel::Debug,
        transport: TransportMode::Http2,
    };
    tracing_subscriber::fmt()
        .with_max_level(config.log_level.as_filter())
        .init();

    let mut app = Server::configure(config);

    // Lifecycle inspectors: one log line per transition.
    app.on_route(|route| async move {
        info!(method = %route.method, path = %route.path, "route added");
    });
    app.on_register(|reg| async move {
        info!(prefix = %reg.prefix, routes = reg.routes, "context registered");
    });
    app.on_ready(|| async {
        info!("ready");
    });
    app.on_close(|| async {
        info!("closing");
    });

    app.route(Method::Get, "/hi", hi);
    app.route(Method::Get, "/hello", hello);

    // The /server handler reports the server's own bound address. The cell
    // is cloned out before listen and captured explicitly — no ambient
    // server singleton for the handler to reach through.
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

    match app.listen(SocketAddr::from(([0, 0, 0, 0], 3001))).await {
        Ok(handle) => {
            info!(port = handle.local_addr().port(), "HTTP server port");
            debug!(?config, "listening with config");

            ashiba::shutdown_signal().await;
            handle.shutdown().await;
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

// GET /hi — explicit Response
async fn hi(_req: Request) -> Response {
    Response::text("hi there")
}

// GET /hello — plain payload return, wrapped by IntoResponse
async fn hello(_req: Request) -> &'static str {
    "hello"
}
