//! HTTP serving surface.
//!
//! # Data Flow
//! ```text
//! request → request.rs (x-request-id)
//!     → server.rs dispatch handler
//!     → Balancer::next()
//!         - NoTargetsConfigured → 502
//!         - AllTargetsUnavailable → 503
//!     → Target::serve(request)
//!         - forwarding failure → 502
//!     → backend response streamed back unchanged
//! ```

pub mod request;
pub mod server;

pub use server::HttpServer;
