//! The target pool.

use futures_util::future::join_all;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::{HealthCheckConfig, TargetConfig, ValidationError};
use crate::health::TcpProbe;
use crate::proxy::{Forwarder, Target};

/// The ordered, fixed collection of targets known to a balancer.
///
/// The pool is immutable after construction: its order defines both the
/// round-robin cycle and the failover scan order. Weights ride along for
/// the weighted strategy.
#[derive(Debug)]
pub struct TargetPool {
    targets: Vec<Arc<Target>>,
    weights: Vec<u32>,
}

impl TargetPool {
    /// Build the pool from configuration and start every target's health
    /// monitor. Seed probes for all targets run concurrently.
    pub async fn from_config(
        configs: &[TargetConfig],
        health: &HealthCheckConfig,
        forwarder: Arc<dyn Forwarder>,
    ) -> Result<Self, ValidationError> {
        let mut addrs = Vec::with_capacity(configs.len());
        let mut weights = Vec::with_capacity(configs.len());
        for config in configs {
            let addr: SocketAddr = config.address.parse().map_err(|_| {
                ValidationError::InvalidAddress {
                    address: config.address.clone(),
                }
            })?;
            addrs.push(addr);
            weights.push(config.weight);
        }

        let period = health.period();
        let timeout = health.timeout();
        let targets = join_all(addrs.into_iter().map(|addr| {
            let forwarder = forwarder.clone();
            async move {
                let probe = Arc::new(TcpProbe::new(timeout));
                Target::start(addr, probe, period, forwarder).await
            }
        }))
        .await;

        for target in &targets {
            info!(
                target = %target.addr(),
                available = target.is_available(),
                "target registered"
            );
        }

        Ok(Self { targets, weights })
    }

    /// Targets in declaration order.
    pub fn targets(&self) -> &[Arc<Target>] {
        &self.targets
    }

    /// Targets paired with their configured weights, in declaration order.
    pub fn weighted(&self) -> Vec<(Arc<Target>, u32)> {
        self.targets
            .iter()
            .cloned()
            .zip(self.weights.iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Stop every target's health monitor. Idempotent.
    pub async fn shutdown(&self) {
        for target in &self.targets {
            target.shutdown().await;
        }
        info!(targets = self.targets.len(), "target pool shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::target::testutil::StaticForwarder;
    use tokio::net::TcpListener;

    fn target_config(addr: SocketAddr, weight: u32) -> TargetConfig {
        TargetConfig {
            address: addr.to_string(),
            weight,
        }
    }

    #[tokio::test]
    async fn builds_targets_in_declaration_order_with_seeded_health() {
        let live = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let live_addr = live.local_addr().unwrap();
        let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = dead.local_addr().unwrap();
        drop(dead);

        let health = HealthCheckConfig {
            period_secs: 600,
            timeout_secs: 1,
        };
        let pool = TargetPool::from_config(
            &[
                target_config(live_addr, 2),
                target_config(dead_addr, 1),
            ],
            &health,
            StaticForwarder::ok(),
        )
        .await
        .unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.targets()[0].addr(), live_addr);
        assert!(pool.targets()[0].is_available());
        assert!(!pool.targets()[1].is_available());
        assert_eq!(pool.weighted()[0].1, 2);
        assert_eq!(pool.weighted()[1].1, 1);

        pool.shutdown().await;
    }

    #[tokio::test]
    async fn rejects_unparseable_addresses() {
        let err = TargetPool::from_config(
            &[TargetConfig {
                address: "nowhere".to_string(),
                weight: 1,
            }],
            &HealthCheckConfig::default(),
            StaticForwarder::ok(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ValidationError::InvalidAddress { .. }));
    }
}
