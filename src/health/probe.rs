//! Reachability probes.

use futures_util::future::BoxFuture;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;

/// Default probe connect timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// A reachability check for one target address.
///
/// Any `Fn(SocketAddr) -> impl Future<Output = bool>` closure is a probe,
/// so tests and callers can supply arbitrary check logic without a wrapper
/// type.
pub trait Probe: Send + Sync + 'static {
    /// Probe the address. `true` means the target is considered available.
    fn check(&self, addr: SocketAddr) -> BoxFuture<'static, bool>;
}

impl<F, Fut> Probe for F
where
    F: Fn(SocketAddr) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    fn check(&self, addr: SocketAddr) -> BoxFuture<'static, bool> {
        Box::pin(self(addr))
    }
}

/// The default probe: a bounded-timeout TCP connect.
///
/// Success means available; any connect error or timeout means unavailable.
#[derive(Debug, Clone, Copy)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl Probe for TcpProbe {
    fn check(&self, addr: SocketAddr) -> BoxFuture<'static, bool> {
        let timeout = self.timeout;
        Box::pin(async move {
            matches!(
                time::timeout(timeout, TcpStream::connect(addr)).await,
                Ok(Ok(_))
            )
        })
    }
}
