//! Health monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! HealthMonitor::start
//!     → one synchronous probe seeds the initial availability
//!     → background poll task probes every period
//!     → last result stored behind a read/write lock
//!
//! Balancing strategies call is_available() on every selection;
//! the read never blocks on network I/O.
//! ```
//!
//! # Design Decisions
//! - One poll task per monitor; replacing the probe joins the old task
//!   before the new one starts, so no stale writer survives a reconfigure
//! - A probe failure flips availability to false; it is never surfaced as
//!   an error to callers
//! - The probe itself runs outside the availability lock; only the result
//!   store takes the write lock

pub mod monitor;
pub mod probe;

pub use monitor::HealthMonitor;
pub use probe::{Probe, TcpProbe};
