//! Backend targets and request forwarding.
//!
//! # Responsibilities
//! - Represent a single backend target (address, health, in-flight load)
//! - Count in-flight requests around forwarding (for least-connections)
//! - Forward requests to the resolved backend over HTTP
//!
//! # Design Decisions
//! - Health and load are independent concerns: the monitor owns
//!   availability, the target owns the load counter, and they communicate
//!   only through read-only accessors
//! - The load counter is atomic; concurrent requests never serialize on it
//! - Forwarding is a capability (`Forwarder`) so the balancing core can be
//!   tested without a network

pub mod forwarder;
pub mod target;

pub use forwarder::{ForwardError, Forwarder, HttpForwarder};
pub use target::Target;
