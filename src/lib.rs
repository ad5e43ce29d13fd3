//! # ashiba
//!
//! A minimal HTTP server bootstrap with lifecycle hooks. Nothing more.
//! Nothing less.
//!
//! ## The contract
//!
//! ashiba owns the startup and shutdown *sequencing* of a small HTTP
//! service; hyper owns the wire. You configure a server, attach hooks to
//! its lifecycle transitions, register routes, and listen. The framework
//! guarantees exactly one thing worth guaranteeing at this scale: ordering.
//!
//! - Hooks for one event fire strictly in registration order.
//! - No connection is accepted until every `ready` hook has settled.
//! - Shutdown does not complete until in-flight connections have drained
//!   and every `closing` hook has settled.
//!
//! What the ecosystem already owns — ashiba intentionally delegates:
//!
//! - **HTTP/1.1 and HTTP/2 framing** — `hyper` / `hyper-util`
//! - **Radix-tree route matching** — `matchit`
//! - **The event loop** — `tokio`
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ashiba::{LogLevel, Method, Request, Server, ServerConfig, TransportMode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig { log_level: LogLevel::Info, transport: TransportMode::Http2 };
//!     tracing_subscriber::fmt()
//!         .with_max_level(config.log_level.as_filter())
//!         .init();
//!
//!     let mut app = Server::configure(config);
//!     app.on_ready(|| async { tracing::info!("warm-up complete"); });
//!     app.route(Method::Get, "/hi", |_req: Request| async { "hi there" });
//!
//!     match app.listen(([0, 0, 0, 0], 3001).into()).await {
//!         Ok(handle) => {
//!             tracing::info!(port = handle.local_addr().port(), "up");
//!             ashiba::shutdown_signal().await;
//!             handle.shutdown().await;
//!         }
//!         Err(e) => {
//!             tracing::error!("{e}");
//!             std::process::exit(1);
//!         }
//!     }
//! }
//! ```

mod config;
mod error;
mod handler;
mod hooks;
mod method;
mod request;
mod response;
mod router;
mod server;

pub use config::{LogLevel, ServerConfig, TransportMode};
pub use error::Error;
pub use handler::Handler;
pub use hooks::{RegisterInfo, RouteInfo};
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::{shutdown_signal, BoundAddress, Server, ServerHandle};
