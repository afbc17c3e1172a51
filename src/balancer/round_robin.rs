//! Round-robin strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::balancer::{first_available, Balancer, SelectError};
use crate::proxy::Target;

/// Cycles through the pool in declaration order.
///
/// The rotation cursor is a monotonic ticket counter: each call takes one
/// ticket atomically, so concurrent calls each advance the rotation exactly
/// once, with no guarantee about which caller gets which ticket.
pub struct RoundRobin {
    targets: Vec<Arc<Target>>,
    ticket: AtomicUsize,
}

impl RoundRobin {
    pub fn new(targets: Vec<Arc<Target>>) -> Self {
        Self {
            targets,
            ticket: AtomicUsize::new(0),
        }
    }
}

impl Balancer for RoundRobin {
    fn next(&self) -> Result<Arc<Target>, SelectError> {
        if self.targets.is_empty() {
            return Err(SelectError::NoTargetsConfigured);
        }

        let start = self.ticket.fetch_add(1, Ordering::Relaxed) % self.targets.len();
        first_available(&self.targets, start)
    }
}
