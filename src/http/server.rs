//! HTTP server and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (timeout, request ID,
//!   tracing)
//! - Dispatch each request: ask the balancer for a target, forward to it
//! - Map selection failures to gateway error responses
//! - Stop the target pool's health monitors once serving ends

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{debug, error, warn};

use crate::balancer::{build_balancer, Balancer, SelectError, TargetPool};
use crate::config::{ProxyConfig, ValidationError};
use crate::http::request::{RequestIdLayer, REQUEST_ID_HEADER};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::proxy::HttpForwarder;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    balancer: Arc<dyn Balancer>,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    pool: Arc<TargetPool>,
}

impl HttpServer {
    /// Build the target pool (seed probes run here) and the configured
    /// balancing strategy.
    pub async fn new(config: ProxyConfig) -> Result<Self, ValidationError> {
        let forwarder = Arc::new(HttpForwarder::new());
        let pool = Arc::new(
            TargetPool::from_config(&config.targets, &config.health_check, forwarder).await?,
        );

        let balancer = build_balancer(config.strategy, &pool).map_err(|e| {
            ValidationError::InvalidWeight {
                address: e.addr.to_string(),
                weight: 0,
            }
        })?;

        let state = AppState {
            balancer: Arc::from(balancer),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, pool })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// The pool backing this server.
    pub fn pool(&self) -> Arc<TargetPool> {
        self.pool.clone()
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        tokio::spawn(async move {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
            tracing::info!("shutdown signal received");
            shutdown.trigger();
        });
        self.run_until(listener, rx).await
    }

    /// Run the server until the shutdown signal fires, then stop the
    /// health monitors.
    pub async fn run_until(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, targets = self.pool.len(), "HTTP server starting");

        let app = self.router.into_make_service();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        self.pool.shutdown().await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main dispatch handler.
///
/// One selection, one forward; selection failures are never retried here.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let target = match state.balancer.next() {
        Ok(target) => target,
        Err(e) => {
            let status = match e {
                SelectError::NoTargetsConfigured => StatusCode::BAD_GATEWAY,
                SelectError::AllTargetsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            };
            warn!(request_id = %request_id, path = %path, error = %e, "no target for request");
            metrics::record_request(&method, status.as_u16(), "none", start);
            return (status, e.to_string()).into_response();
        }
    };

    debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        target = %target.addr(),
        load = target.current_load(),
        "dispatching request"
    );

    match target.serve(request).await {
        Ok(response) => {
            metrics::record_request(
                &method,
                response.status().as_u16(),
                &target.addr().to_string(),
                start,
            );
            response.into_response()
        }
        Err(e) => {
            error!(request_id = %request_id, target = %target.addr(), error = %e, "forwarding failed");
            metrics::record_request(&method, 502, &target.addr().to_string(), start);
            (StatusCode::BAD_GATEWAY, "upstream request failed").into_response()
        }
    }
}
