//! Weighted round-robin strategy.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::balancer::{first_available, Balancer, SelectError};
use crate::proxy::Target;

/// A weight must be a positive number of consecutive selections.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("target {addr} has weight 0; weights must be positive")]
pub struct InvalidWeight {
    pub addr: SocketAddr,
}

/// Rotation cursor plus how many times the current target has been used.
///
/// The two values must change together, so they live under one mutex
/// rather than two independent atomics.
#[derive(Debug)]
struct Rotation {
    current: usize,
    uses: u32,
}

/// Round robin with per-target weights.
///
/// Target `k` is selected `weight[k]` consecutive times before the cursor
/// rotates: weights `[2, 1]` yield `A, A, B, A, A, B, …`.
#[derive(Debug)]
pub struct WeightedRoundRobin {
    targets: Vec<Arc<Target>>,
    weights: Vec<u32>,
    rotation: Mutex<Rotation>,
}

impl WeightedRoundRobin {
    /// Build from `(target, weight)` pairs in pool order. A zero weight is
    /// a configuration error.
    pub fn new(weighted: Vec<(Arc<Target>, u32)>) -> Result<Self, InvalidWeight> {
        let mut targets = Vec::with_capacity(weighted.len());
        let mut weights = Vec::with_capacity(weighted.len());
        for (target, weight) in weighted {
            if weight == 0 {
                return Err(InvalidWeight {
                    addr: target.addr(),
                });
            }
            targets.push(target);
            weights.push(weight);
        }

        Ok(Self {
            targets,
            weights,
            rotation: Mutex::new(Rotation {
                current: 0,
                uses: 0,
            }),
        })
    }
}

impl Balancer for WeightedRoundRobin {
    fn next(&self) -> Result<Arc<Target>, SelectError> {
        if self.targets.is_empty() {
            return Err(SelectError::NoTargetsConfigured);
        }

        let start = {
            let mut rotation = self
                .rotation
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if rotation.uses < self.weights[rotation.current] {
                rotation.uses += 1;
            } else {
                rotation.current = (rotation.current + 1) % self.targets.len();
                rotation.uses = 1;
            }
            rotation.current
        };

        first_available(&self.targets, start)
    }
}
