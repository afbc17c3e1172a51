//! Target selection strategies.
//!
//! # Data Flow
//! ```text
//! request → Balancer::next()
//!     → strategy picks a start index
//!         - round_robin.rs (atomic rotation cursor)
//!         - weighted.rs (cursor + remaining-uses counter under one lock)
//!         - least_connections.rs (snapshot sorted by in-flight load)
//!         - random.rs (uniform start index)
//!     → shared failover scan walks the pool cyclically from that index
//!     → first available target, or AllTargetsUnavailable
//! ```
//!
//! # Design Decisions
//! - The failover scan is shared: every strategy only chooses where the
//!   scan starts, and the scan order follows pool declaration order
//! - Strategies never retry `next()` internally; selection failures go
//!   straight back to the dispatcher
//! - Rotation state is owned per strategy instance and mutated only by
//!   selection calls on that instance

pub mod least_connections;
pub mod pool;
pub mod random;
pub mod round_robin;
pub mod weighted;

use std::sync::Arc;
use thiserror::Error;

use crate::config::Strategy;
use crate::proxy::Target;

pub use least_connections::LeastConnections;
pub use pool::TargetPool;
pub use random::Random;
pub use round_robin::RoundRobin;
pub use weighted::{InvalidWeight, WeightedRoundRobin};

/// Why a selection produced no target.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    /// The pool was constructed empty. A configuration problem, not a
    /// transient condition.
    #[error("no targets configured")]
    NoTargetsConfigured,

    /// Every target failed its latest health probe. Recoverable once any
    /// target's health improves.
    #[error("all targets are unavailable")]
    AllTargetsUnavailable,
}

/// A strategy choosing which target serves the next request.
pub trait Balancer: Send + Sync {
    /// Pick the next target. Never performs I/O; never retries.
    fn next(&self) -> Result<Arc<Target>, SelectError>;
}

/// Shared failover scan.
///
/// Walks the pool cyclically from `start` and returns the first available
/// target. A full cycle with no available target fails.
fn first_available(targets: &[Arc<Target>], start: usize) -> Result<Arc<Target>, SelectError> {
    for i in 0..targets.len() {
        let target = &targets[(start + i) % targets.len()];
        if target.is_available() {
            return Ok(target.clone());
        }
    }
    Err(SelectError::AllTargetsUnavailable)
}

/// Build the configured strategy over a pool.
pub fn build_balancer(
    strategy: Strategy,
    pool: &TargetPool,
) -> Result<Box<dyn Balancer>, InvalidWeight> {
    let balancer: Box<dyn Balancer> = match strategy {
        Strategy::RoundRobin => Box::new(RoundRobin::new(pool.targets().to_vec())),
        Strategy::WeightedRoundRobin => Box::new(WeightedRoundRobin::new(pool.weighted())?),
        Strategy::LeastConnections => Box::new(LeastConnections::new(pool.targets().to_vec())),
        Strategy::Random => Box::new(Random::new(pool.targets().to_vec())),
    };
    Ok(balancer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::target::testutil::test_target;

    #[tokio::test]
    async fn scan_skips_unavailable_and_wraps() {
        let a = test_target("127.0.0.1:9100", true).await;
        let b = test_target("127.0.0.1:9101", false).await;
        let c = test_target("127.0.0.1:9102", false).await;
        let targets = vec![a.clone(), b, c];

        // Start on the unavailable B: the wrap skips C and lands on A
        // before ever returning to B.
        let picked = first_available(&targets, 1).unwrap();
        assert_eq!(picked.addr(), a.addr());
    }

    #[tokio::test]
    async fn scan_fails_when_nothing_is_available() {
        let a = test_target("127.0.0.1:9103", false).await;
        let b = test_target("127.0.0.1:9104", false).await;

        assert_eq!(
            first_available(&[a, b], 0).unwrap_err(),
            SelectError::AllTargetsUnavailable
        );
    }

    #[tokio::test]
    async fn every_strategy_finds_the_single_available_target() {
        let a = test_target("127.0.0.1:9105", false).await;
        let b = test_target("127.0.0.1:9106", true).await;
        let c = test_target("127.0.0.1:9107", false).await;
        let targets = vec![a, b.clone(), c];

        let strategies: Vec<Box<dyn Balancer>> = vec![
            Box::new(RoundRobin::new(targets.clone())),
            Box::new(
                WeightedRoundRobin::new(
                    targets.iter().map(|t| (t.clone(), 2)).collect(),
                )
                .unwrap(),
            ),
            Box::new(LeastConnections::new(targets.clone())),
            Box::new(Random::new(targets.clone())),
        ];

        for balancer in &strategies {
            for _ in 0..5 {
                assert_eq!(balancer.next().unwrap().addr(), b.addr());
            }
        }
    }

    #[test]
    fn empty_pool_fails_before_scanning() {
        let strategies: Vec<Box<dyn Balancer>> = vec![
            Box::new(RoundRobin::new(Vec::new())),
            Box::new(WeightedRoundRobin::new(Vec::new()).unwrap()),
            Box::new(LeastConnections::new(Vec::new())),
            Box::new(Random::new(Vec::new())),
        ];

        for balancer in &strategies {
            assert_eq!(
                balancer.next().unwrap_err(),
                SelectError::NoTargetsConfigured
            );
        }
    }
}
