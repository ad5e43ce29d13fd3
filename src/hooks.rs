//! Lifecycle hooks.
//!
//! Four extension points, fired by the bootstrap at defined transitions:
//!
//! | Event | Fires | Context |
//! |---|---|---|
//! | route-added | once per registered route, before listen | [`RouteInfo`] |
//! | context-registered | once per mounted sub-application, before listen | [`RegisterInfo`] |
//! | ready | after bind, before the first connection is accepted | — |
//! | closing | after the accept loop drains, before shutdown returns | — |
//!
//! Every hook is a plain async callback — `Fn(..) -> Future<Output = ()>` —
//! and the bootstrap awaits each one to completion before moving on. Hooks
//! for one event run strictly in registration order; the next phase does not
//! begin until all hooks for the current one have settled. There is no
//! timeout: a hook that never resolves stalls startup.

use std::future::Future;
use std::pin::Pin;

use crate::method::Method;

/// Route descriptor handed to route-added hooks.
#[derive(Clone, Debug)]
pub struct RouteInfo {
    pub method: Method,
    pub path: String,
}

/// Sub-application descriptor handed to context-registered hooks.
#[derive(Clone, Debug)]
pub struct RegisterInfo {
    /// Path prefix the sub-application was mounted under.
    pub prefix: String,
    /// Number of routes the sub-application brought with it.
    pub routes: usize,
}

/// A heap-allocated, type-erased hook future.
pub(crate) type HookFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Hook with no context (ready, closing).
pub(crate) type SignalHook = Box<dyn Fn() -> HookFuture + Send + Sync + 'static>;
/// Hook receiving the route descriptor.
pub(crate) type RouteHook = Box<dyn Fn(RouteInfo) -> HookFuture + Send + Sync + 'static>;
/// Hook receiving the sub-application descriptor.
pub(crate) type RegisterHook = Box<dyn Fn(RegisterInfo) -> HookFuture + Send + Sync + 'static>;

/// A registration-time event, recorded when it happens and replayed through
/// the hooks once `listen` starts driving the async phases.
pub(crate) enum RegistrationEvent {
    RouteAdded(RouteInfo),
    ContextRegistered(RegisterInfo),
}

/// Ordered hook lists for every lifecycle event.
#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) route_added: Vec<RouteHook>,
    pub(crate) context_registered: Vec<RegisterHook>,
    pub(crate) ready: Vec<SignalHook>,
    pub(crate) closing: Vec<SignalHook>,
}

impl Hooks {
    /// Replays recorded registration events, each event's hooks in
    /// registration order, events in occurrence order.
    pub(crate) async fn fire_registration(&self, events: &[RegistrationEvent]) {
        for event in events {
            match event {
                RegistrationEvent::RouteAdded(info) => {
                    for hook in &self.route_added {
                        hook(info.clone()).await;
                    }
                }
                RegistrationEvent::ContextRegistered(info) => {
                    for hook in &self.context_registered {
                        hook(info.clone()).await;
                    }
                }
            }
        }
    }

    /// Runs every ready hook to completion, in registration order.
    pub(crate) async fn fire_ready(&self) {
        for hook in &self.ready {
            hook().await;
        }
    }

    /// Runs every closing hook to completion, in registration order.
    pub(crate) async fn fire_closing(&self) {
        for hook in &self.closing {
            hook().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> SignalHook) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_hooks = Arc::clone(&log);
        let make = move |label: &str| -> SignalHook {
            let log = Arc::clone(&log_for_hooks);
            let label = label.to_owned();
            Box::new(move || {
                let log = Arc::clone(&log);
                let label = label.clone();
                Box::pin(async move {
                    log.lock().unwrap().push(label);
                })
            })
        };
        (log, make)
    }

    #[tokio::test]
    async fn ready_hooks_run_in_registration_order() {
        let (log, make) = recorder();
        let mut hooks = Hooks::default();
        hooks.ready.push(make("first"));
        hooks.ready.push(make("second"));
        hooks.ready.push(make("third"));

        hooks.fire_ready().await;

        assert_eq!(*log.lock().unwrap(), ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn registration_events_replay_in_occurrence_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::default();

        let route_log = Arc::clone(&log);
        hooks.route_added.push(Box::new(move |info| {
            let log = Arc::clone(&route_log);
            Box::pin(async move {
                log.lock().unwrap().push(format!("route {} {}", info.method, info.path));
            })
        }));
        let register_log = Arc::clone(&log);
        hooks.context_registered.push(Box::new(move |info| {
            let log = Arc::clone(&register_log);
            Box::pin(async move {
                log.lock().unwrap().push(format!("register {}", info.prefix));
            })
        }));

        let events = vec![
            RegistrationEvent::RouteAdded(RouteInfo { method: Method::Get, path: "/hi".into() }),
            RegistrationEvent::ContextRegistered(RegisterInfo { prefix: "/api".into(), routes: 2 }),
            RegistrationEvent::RouteAdded(RouteInfo { method: Method::Get, path: "/hello".into() }),
        ];
        hooks.fire_registration(&events).await;

        assert_eq!(
            *log.lock().unwrap(),
            ["route GET /hi", "register /api", "route GET /hello"]
        );
    }
}
