//! Random strategy.

use rand::Rng;
use std::sync::Arc;

use crate::balancer::{first_available, Balancer, SelectError};
use crate::proxy::Target;

/// Starts the failover scan at a uniformly random index.
///
/// Draws come from the thread-local generator, which is seeded once per
/// thread by the OS and safe under concurrent selection calls.
pub struct Random {
    targets: Vec<Arc<Target>>,
}

impl Random {
    pub fn new(targets: Vec<Arc<Target>>) -> Self {
        Self { targets }
    }
}

impl Balancer for Random {
    fn next(&self) -> Result<Arc<Target>, SelectError> {
        if self.targets.is_empty() {
            return Err(SelectError::NoTargetsConfigured);
        }

        let start = rand::thread_rng().gen_range(0..self.targets.len());
        first_available(&self.targets, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::target::testutil::test_target;
    use std::collections::HashMap;

    #[tokio::test]
    async fn selections_are_roughly_uniform() {
        let targets = vec![
            test_target("127.0.0.1:9500", true).await,
            test_target("127.0.0.1:9501", true).await,
            test_target("127.0.0.1:9502", true).await,
        ];
        let balancer = Random::new(targets.clone());

        let draws = 3_000;
        let mut counts: HashMap<_, usize> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(balancer.next().unwrap().addr()).or_default() += 1;
        }

        // Expect ~1000 per target; a ±25% band keeps the test stable while
        // still catching a skewed generator or scan bug.
        for target in &targets {
            let count = counts[&target.addr()];
            assert!(
                (750..=1250).contains(&count),
                "target {} picked {count} times out of {draws}",
                target.addr()
            );
        }
    }

    #[tokio::test]
    async fn unavailable_targets_are_never_returned() {
        let a = test_target("127.0.0.1:9503", true).await;
        let b = test_target("127.0.0.1:9504", false).await;
        let balancer = Random::new(vec![a.clone(), b]);

        for _ in 0..100 {
            assert_eq!(balancer.next().unwrap().addr(), a.addr());
        }
    }
}
