//! A single backend target.

use axum::body::Body;
use axum::http::{Request, Response};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::health::{HealthMonitor, Probe};
use crate::observability::metrics;
use crate::proxy::forwarder::{ForwardError, Forwarder};

/// One backend endpoint capable of serving a request.
///
/// Couples the backend address, its health monitor, an in-flight request
/// counter and the forwarding capability.
pub struct Target {
    addr: SocketAddr,
    health: HealthMonitor,
    load: AtomicUsize,
    forwarder: Arc<dyn Forwarder>,
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("addr", &self.addr)
            .field("load", &self.load)
            .finish_non_exhaustive()
    }
}

impl Target {
    /// Create the target and start its health monitor. The monitor's seed
    /// probe runs before this returns, so availability is already set.
    pub async fn start(
        addr: SocketAddr,
        probe: Arc<dyn Probe>,
        period: Duration,
        forwarder: Arc<dyn Forwarder>,
    ) -> Arc<Self> {
        let health = HealthMonitor::start(addr, probe, period).await;
        Arc::new(Self {
            addr,
            health,
            load: AtomicUsize::new(0),
            forwarder,
        })
    }

    /// The backend address this target forwards to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Forward one request, counting it as in flight for the duration.
    ///
    /// The counter decrements on every exit path, forwarding failure and
    /// panic included, so it can never go negative or leak.
    pub async fn serve(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let _in_flight = LoadGuard::enter(self.addr, &self.load);
        self.forwarder.forward(self.addr, request).await
    }

    /// Whether the last health probe succeeded.
    pub fn is_available(&self) -> bool {
        self.health.is_available()
    }

    /// Number of requests currently in flight. Lock-free.
    pub fn current_load(&self) -> usize {
        self.load.load(Ordering::Relaxed)
    }

    /// Swap the health probe and poll period for this target.
    pub async fn reconfigure_health_check(&self, probe: Arc<dyn Probe>, period: Duration) {
        self.health.reconfigure(probe, period).await;
    }

    /// Stop the health monitor. Idempotent.
    pub async fn shutdown(&self) {
        self.health.stop().await;
    }
}

/// RAII in-flight counter increment. Publishes the post-change count to the
/// per-target in-flight gauge on both entry and exit.
struct LoadGuard<'a> {
    addr: SocketAddr,
    load: &'a AtomicUsize,
}

impl<'a> LoadGuard<'a> {
    fn enter(addr: SocketAddr, load: &'a AtomicUsize) -> Self {
        let now = load.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::record_target_inflight(addr, now);
        Self { addr, load }
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        let now = self.load.fetch_sub(1, Ordering::Relaxed) - 1;
        metrics::record_target_inflight(self.addr, now);
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use axum::http::StatusCode;
    use futures_util::future::BoxFuture;

    /// Forwarder returning an empty response with a fixed status after an
    /// optional delay.
    pub(crate) struct StaticForwarder {
        pub status: StatusCode,
        pub delay: Duration,
    }

    impl StaticForwarder {
        pub(crate) fn ok() -> Arc<dyn Forwarder> {
            Arc::new(Self {
                status: StatusCode::OK,
                delay: Duration::ZERO,
            })
        }
    }

    impl Forwarder for StaticForwarder {
        fn forward(
            &self,
            _addr: SocketAddr,
            _request: Request<Body>,
        ) -> BoxFuture<'static, Result<Response<Body>, ForwardError>> {
            let status = self.status;
            let delay = self.delay;
            Box::pin(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let mut response = Response::new(Body::empty());
                *response.status_mut() = status;
                Ok(response)
            })
        }
    }

    /// Forwarder that always fails, for exercising error exit paths.
    pub(crate) struct FailingForwarder;

    impl Forwarder for FailingForwarder {
        fn forward(
            &self,
            addr: SocketAddr,
            _request: Request<Body>,
        ) -> BoxFuture<'static, Result<Response<Body>, ForwardError>> {
            Box::pin(async move {
                // A scheme without an authority makes an invalid URI, which
                // yields a real ForwardError without touching the network.
                let mut parts = axum::http::Uri::default().into_parts();
                parts.scheme = Some(axum::http::uri::Scheme::HTTP);
                let source = axum::http::Uri::from_parts(parts).unwrap_err();
                Err(ForwardError::Rewrite { addr, source })
            })
        }
    }

    /// A started target with a fixed availability and a no-op forwarder.
    pub(crate) async fn test_target(addr: &str, up: bool) -> Arc<Target> {
        let addr: SocketAddr = addr.parse().unwrap();
        Target::start(
            addr,
            Arc::new(move |_addr: SocketAddr| async move { up }),
            Duration::from_secs(600),
            StaticForwarder::ok(),
        )
        .await
    }
}
