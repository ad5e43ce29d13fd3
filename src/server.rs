//! Server bootstrap, accept loop, and graceful shutdown.
//!
//! The lifecycle is a straight line:
//!
//! ```text
//! configure → hook registration → route registration → listen
//!   listen: bind → publish bound address → route-added / context-registered
//!           hooks → ready hooks → accept loop
//!   shutdown: stop accepting → drain in-flight connections → closing hooks
//! ```
//!
//! The listener is bound *before* the ready hooks run, so a connection that
//! arrives while a slow ready hook is still settling queues in the OS accept
//! backlog — it is delayed, never refused. Accepting only starts once every
//! ready hook has completed.
//!
//! The library never installs signal handlers on its own. Wire
//! [`shutdown_signal`] up in your `main` if you want SIGTERM / Ctrl-C to
//! trigger [`ServerHandle::shutdown`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::config::{ServerConfig, TransportMode};
use crate::error::Error;
use crate::handler::Handler;
use crate::hooks::{Hooks, RegisterInfo, RegistrationEvent, RouteInfo};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

// ── BoundAddress ──────────────────────────────────────────────────────────────

/// A cloneable cell holding the address the transport actually listens on.
///
/// Empty until [`Server::listen`] binds successfully; written exactly once.
/// Clone it out of the server *before* listening and capture it in any
/// handler that needs to know its own address — explicit dependency
/// injection instead of an ambient singleton.
#[derive(Clone, Default)]
pub struct BoundAddress(Arc<OnceLock<SocketAddr>>);

impl BoundAddress {
    /// The bound address, or `None` before a successful bind.
    pub fn get(&self) -> Option<SocketAddr> {
        self.0.get().copied()
    }

    fn set(&self, addr: SocketAddr) {
        // A second set is impossible by construction; ignore the result.
        let _ = self.0.set(addr);
    }
}

// ── Server ────────────────────────────────────────────────────────────────────

/// The server bootstrap.
///
/// Created by [`configure`](Server::configure), consumed by
/// [`listen`](Server::listen) — so every hook and route registration
/// necessarily happens before the socket is bound. There is no ambient
/// global; the value is threaded explicitly through startup and tests.
///
/// ```rust,no_run
/// use ashiba::{Method, Request, Response, Server, ServerConfig};
///
/// # async fn run() -> Result<(), ashiba::Error> {
/// let mut app = Server::configure(ServerConfig::default());
/// app.on_ready(|| async { tracing::info!("ready"); });
/// app.route(Method::Get, "/hi", |_req: Request| async { "hi there" });
///
/// let handle = app.listen(([0, 0, 0, 0], 3001).into()).await?;
/// tracing::info!(port = handle.local_addr().port(), "listening");
/// # Ok(())
/// # }
/// ```
pub struct Server {
    config: ServerConfig,
    router: Router,
    hooks: Hooks,
    events: Vec<RegistrationEvent>,
    bound: BoundAddress,
}

impl Server {
    /// Constructs a server with the given configuration. No I/O happens
    /// until [`listen`](Server::listen).
    pub fn configure(config: ServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            hooks: Hooks::default(),
            events: Vec::new(),
            bound: BoundAddress::default(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The cell that will hold the bound address once listening starts.
    pub fn bound_address(&self) -> BoundAddress {
        self.bound.clone()
    }

    // ── Hook registration ─────────────────────────────────────────────────

    /// Runs once per registered route, with the route's descriptor.
    pub fn on_route<F, Fut>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(RouteInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks.route_added.push(Box::new(move |info| Box::pin(hook(info))));
        self
    }

    /// Runs once per mounted sub-application, with its descriptor.
    pub fn on_register<F, Fut>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(RegisterInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks.context_registered.push(Box::new(move |info| Box::pin(hook(info))));
        self
    }

    /// Runs after the socket is bound and before the first connection is
    /// accepted. All ready hooks must settle before accepting starts.
    pub fn on_ready<F, Fut>(&mut self, hook: F) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks.ready.push(Box::new(move || Box::pin(hook())));
        self
    }

    /// Runs during [`ServerHandle::shutdown`], after in-flight connections
    /// have drained. Shutdown is not complete until every closing hook has.
    pub fn on_close<F, Fut>(&mut self, hook: F) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks.closing.push(Box::new(move || Box::pin(hook())));
        self
    }

    // ── Route registration ────────────────────────────────────────────────

    /// Registers a handler for a method + path pair.
    ///
    /// # Panics
    ///
    /// Panics if `path` conflicts with an existing registration for the
    /// same method (including an exact duplicate).
    pub fn route(&mut self, method: Method, path: &str, handler: impl Handler) -> &mut Self {
        self.router.insert(method, path, handler.into_boxed_handler());
        self.events.push(RegistrationEvent::RouteAdded(RouteInfo {
            method,
            path: path.to_owned(),
        }));
        self
    }

    /// Mounts a sub-application under `prefix`, firing one
    /// context-registered event for the mount and one route-added event per
    /// mounted route.
    pub fn register(&mut self, prefix: &str, sub: Router) -> &mut Self {
        self.events.push(RegistrationEvent::ContextRegistered(RegisterInfo {
            prefix: prefix.to_owned(),
            routes: sub.len(),
        }));
        for info in self.router.merge(prefix, sub) {
            self.events.push(RegistrationEvent::RouteAdded(info));
        }
        self
    }

    // ── Startup ───────────────────────────────────────────────────────────

    /// Binds `addr`, drives the pre-listen hook phases, starts the accept
    /// loop, and resolves with a handle to the running server.
    ///
    /// Port 0 requests an OS-assigned ephemeral port; the actual port is on
    /// the returned handle. A bind failure is the only error path — the
    /// caller decides whether that is fatal.
    pub async fn listen(self, addr: SocketAddr) -> Result<ServerHandle, Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| Error::Bind { addr, source })?;
        self.bound.set(local_addr);

        info!(addr = %local_addr, "bound, running startup hooks");

        self.hooks.fire_registration(&self.events).await;
        self.hooks.fire_ready().await;

        info!(addr = %local_addr, transport = %self.config.transport, "accepting connections");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(accept_loop(
            listener,
            Arc::new(self.router),
            self.config.transport,
            self.hooks.closing,
            shutdown_rx,
        ));

        Ok(ServerHandle { addr: local_addr, shutdown: shutdown_tx, task })
    }
}

// ── ServerHandle ──────────────────────────────────────────────────────────────

/// A handle to a running server: the bound address plus the shutdown lever.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections, drains in-flight ones, runs the closing
    /// hooks to completion, and returns once the server task has exited.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            error!("server task failed during shutdown: {e}");
        }
    }
}

// ── Accept loop ───────────────────────────────────────────────────────────────

async fn accept_loop(
    listener: TcpListener,
    router: Arc<Router>,
    transport: TransportMode,
    closing: Vec<crate::hooks::SignalHook>,
    mut shutdown: oneshot::Receiver<()>,
) {
    // JoinSet tracks every spawned connection task so shutdown can wait for
    // them all to finish before the closing hooks run.
    let mut tasks = tokio::task::JoinSet::new();

    loop {
        tokio::select! {
            // `biased` checks arms top-to-bottom, so a shutdown signal stops
            // accepting immediately even if more connections are queued.
            biased;

            _ = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown requested, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let router = Arc::clone(&router);
                let io = TokioIo::new(stream);

                tasks.spawn(async move {
                    // `service_fn` is called once per request on the
                    // connection, not once per connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { dispatch(router, req).await }
                    });

                    // The auto builder negotiates HTTP/1.1 or HTTP/2 per
                    // client; http1 mode pins the legacy framing only.
                    let builder = ConnBuilder::new(TokioExecutor::new());
                    let builder = match transport {
                        TransportMode::Http1 => builder.http1_only(),
                        TransportMode::Http2 => builder,
                    };
                    if let Err(e) = builder.serve_connection(io, svc).await {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished connection tasks so the JoinSet does not grow
            // without bound.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    // Drain before the closing hooks: "closing" means no request is in flight.
    while tasks.join_next().await.is_some() {}

    for hook in &closing {
        hook().await;
    }

    info!("server stopped");
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Core hot path: routes one request and produces one response.
///
/// The error type is [`Infallible`](std::convert::Infallible) — all failures
/// become HTTP responses (404, 405, 400) so hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        return Ok(Response::status(StatusCode::METHOD_NOT_ALLOWED).into_http());
    };
    let path = req.uri().path().to_owned();

    let Some((handler, params)) = router.lookup(method, &path) else {
        return Ok(Response::status(StatusCode::NOT_FOUND).into_http());
    };

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return Ok(Response::status(StatusCode::BAD_REQUEST).into_http()),
    };

    let request = Request::new(method, path, parts.headers, body, params);
    Ok(handler.call(request).await.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C). On
/// Windows only Ctrl-C is available.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }
}
