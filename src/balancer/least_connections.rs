//! Least-connections strategy.

use std::sync::Arc;

use crate::balancer::{first_available, Balancer, SelectError};
use crate::proxy::Target;

/// Picks the available target with the fewest in-flight requests.
///
/// Each call snapshots the pool and stable-sorts it by load, so equal-load
/// targets tie-break toward the earlier-declared one. Loads can change
/// between the snapshot and the serve call; the decision is best effort by
/// design.
pub struct LeastConnections {
    targets: Vec<Arc<Target>>,
}

impl LeastConnections {
    pub fn new(targets: Vec<Arc<Target>>) -> Self {
        Self { targets }
    }
}

impl Balancer for LeastConnections {
    fn next(&self) -> Result<Arc<Target>, SelectError> {
        if self.targets.is_empty() {
            return Err(SelectError::NoTargetsConfigured);
        }

        let mut snapshot = self.targets.clone();
        // Vec::sort_by_key is stable: pool order survives among ties.
        snapshot.sort_by_key(|target| target.current_load());
        first_available(&snapshot, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::target::testutil::{test_target, StaticForwarder};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::net::SocketAddr;
    use std::time::Duration;

    fn request() -> Request<Body> {
        Request::builder()
            .uri("http://localhost/")
            .body(Body::empty())
            .unwrap()
    }

    /// Target whose forwarder holds requests long enough for the test to
    /// observe a non-zero load.
    async fn slow_target(addr: &str) -> Arc<Target> {
        let addr: SocketAddr = addr.parse().unwrap();
        Target::start(
            addr,
            Arc::new(move |_addr: SocketAddr| async move { true }),
            Duration::from_secs(600),
            Arc::new(StaticForwarder {
                status: StatusCode::OK,
                delay: Duration::from_millis(200),
            }),
        )
        .await
    }

    #[tokio::test]
    async fn picks_the_least_loaded_target() {
        let a = slow_target("127.0.0.1:9400").await;
        let b = slow_target("127.0.0.1:9401").await;
        let balancer = LeastConnections::new(vec![a.clone(), b.clone()]);

        // Occupy A with one in-flight request.
        let busy = a.clone();
        let handle = tokio::spawn(async move { busy.serve(request()).await });
        while a.current_load() == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(balancer.next().unwrap().addr(), b.addr());
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn ties_break_toward_the_earlier_declared_target() {
        let a = test_target("127.0.0.1:9402", true).await;
        let b = test_target("127.0.0.1:9403", true).await;
        let balancer = LeastConnections::new(vec![a.clone(), b]);

        // Both idle: the earlier-declared target wins, repeatedly.
        for _ in 0..5 {
            assert_eq!(balancer.next().unwrap().addr(), a.addr());
        }
    }

    #[tokio::test]
    async fn unavailable_least_loaded_target_is_skipped() {
        let a = test_target("127.0.0.1:9404", false).await;
        let b = slow_target("127.0.0.1:9405").await;
        let balancer = LeastConnections::new(vec![a, b.clone()]);

        // A has the lower load but is down; B gets the pick.
        let busy = b.clone();
        let handle = tokio::spawn(async move { busy.serve(request()).await });
        while b.current_load() == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(balancer.next().unwrap().addr(), b.addr());
        handle.await.unwrap().unwrap();
    }
}
