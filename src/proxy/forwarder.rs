//! Request forwarding to backend targets.

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{Request, Response, Uri};
use futures_util::future::BoxFuture;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

/// Forwarding failure taxonomy.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The backend could not be connected at all.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The connection succeeded but the exchange failed.
    #[error("upstream {addr} request failed: {source}")]
    Upstream {
        addr: SocketAddr,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The request URI could not be rewritten for the backend.
    #[error("could not rewrite request uri for {addr}: {source}")]
    Rewrite {
        addr: SocketAddr,
        #[source]
        source: axum::http::uri::InvalidUriParts,
    },
}

/// The transport capability a target forwards through.
pub trait Forwarder: Send + Sync + 'static {
    /// Forward the request to the backend at `addr` and return its
    /// response unchanged.
    fn forward(
        &self,
        addr: SocketAddr,
        request: Request<Body>,
    ) -> BoxFuture<'static, Result<Response<Body>, ForwardError>>;
}

/// HTTP forwarder over a shared hyper client.
///
/// Rewrites the request URI's scheme and authority to point at the backend
/// and streams the response body back without buffering.
#[derive(Clone)]
pub struct HttpForwarder {
    client: Client<HttpConnector, Body>,
}

impl HttpForwarder {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HttpForwarder {
    fn default() -> Self {
        Self::new()
    }
}

impl Forwarder for HttpForwarder {
    fn forward(
        &self,
        addr: SocketAddr,
        request: Request<Body>,
    ) -> BoxFuture<'static, Result<Response<Body>, ForwardError>> {
        let client = self.client.clone();
        Box::pin(async move {
            let (mut parts, body) = request.into_parts();

            let mut uri_parts = parts.uri.into_parts();
            uri_parts.scheme = Some(Scheme::HTTP);
            uri_parts.authority = Authority::from_str(&addr.to_string()).ok();
            parts.uri = Uri::from_parts(uri_parts)
                .map_err(|source| ForwardError::Rewrite { addr, source })?;

            let request = Request::from_parts(parts, body);
            match client.request(request).await {
                Ok(response) => {
                    let (parts, body) = response.into_parts();
                    Ok(Response::from_parts(parts, Body::new(body)))
                }
                Err(source) if source.is_connect() => {
                    Err(ForwardError::Connect { addr, source })
                }
                Err(source) => Err(ForwardError::Upstream { addr, source }),
            }
        })
    }
}
