//! HTTP load-balancing reverse proxy library.
//!
//! Distributes incoming requests across a pool of backend targets. A
//! pluggable balancing strategy picks a target per request, while a
//! per-target health monitor keeps availability up to date in the
//! background so unreachable backends are skipped.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │                 LOAD BALANCER                  │
//!    Client Request    │  ┌────────┐    ┌──────────┐    ┌────────────┐  │
//!    ──────────────────┼─▶│  http  │───▶│ balancer │───▶│   target   │──┼──▶ Backend
//!                      │  │ server │    │ strategy │    │   .serve   │  │    Server
//!                      │  └────────┘    └──────────┘    └─────┬──────┘  │
//!                      │                      ▲                │        │
//!                      │              is_available()       forwarder   │
//!                      │                      │                         │
//!                      │                ┌───────────┐                   │
//!                      │                │  health   │  one background   │
//!                      │                │  monitor  │  poll task per    │
//!                      │                └───────────┘  target           │
//!                      │                                                │
//!                      │  ┌──────────────────────────────────────────┐  │
//!                      │  │          Cross-Cutting Concerns          │  │
//!                      │  │    config · observability · lifecycle    │  │
//!                      │  └──────────────────────────────────────────┘  │
//!                      └────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod balancer;
pub mod health;
pub mod proxy;

// Serving surface
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use balancer::{Balancer, SelectError, TargetPool};
pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::Target;
