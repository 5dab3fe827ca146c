//! Edge proxy in front of the generation backend.
//!
//! Every request under `/api` is replayed against `BACKEND_ORIGIN` with the
//! same method, path, query, headers and body, minus `Host`. Responses are
//! relayed as they arrive so the generation stream is not buffered.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Connection-scoped headers that must not cross the proxy.
static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Clone)]
pub struct ProxyState {
    http: reqwest::Client,
    backend_origin: Option<Arc<str>>,
}

impl ProxyState {
    pub fn new(backend_origin: Option<&str>) -> Self {
        let backend_origin = backend_origin
            .map(|origin| origin.trim().trim_end_matches('/'))
            .filter(|origin| !origin.is_empty())
            .map(Arc::from);
        Self {
            http: reqwest::Client::new(),
            backend_origin,
        }
    }

    pub fn backend_origin(&self) -> Option<&str> {
        self.backend_origin.as_deref()
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api", any(forward))
        .route("/api/*path", any(forward))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, state: ProxyState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("proxy listener has no address")?;
    match state.backend_origin() {
        Some(origin) => tracing::info!(%addr, backend = origin, "edge proxy listening"),
        None => tracing::warn!(%addr, "edge proxy listening without BACKEND_ORIGIN; every request gets 502"),
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("edge proxy stopped")
}

pub async fn serve(addr: SocketAddr, backend_origin: Option<&str>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind proxy on {addr}"))?;
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("edge proxy shutting down");
    };
    run(listener, ProxyState::new(backend_origin), shutdown).await
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

async fn forward(State(state): State<ProxyState>, request: Request) -> Response {
    let Some(origin) = state.backend_origin.as_deref() else {
        return (StatusCode::BAD_GATEWAY, "BACKEND_ORIGIN not configured").into_response();
    };

    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{origin}{path_and_query}");

    let body = match to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
        Ok(body) => body,
        Err(error) => {
            tracing::warn!(%error, url = %target, "could not read request body");
            return (StatusCode::BAD_REQUEST, format!("unreadable request body: {error}"))
                .into_response();
        }
    };

    let mut headers = parts.headers;
    headers.remove(header::HOST);
    strip_hop_by_hop(&mut headers);

    tracing::debug!(method = %parts.method, url = %target, "forwarding");
    let upstream = state
        .http
        .request(parts.method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await;

    match upstream {
        Ok(response) => relay(response),
        Err(error) => {
            tracing::warn!(%error, url = %target, "backend unreachable");
            (StatusCode::BAD_GATEWAY, format!("backend request failed: {error}")).into_response()
        }
    }
}

fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_normalised() {
        assert_eq!(
            ProxyState::new(Some(" https://backend.internal/ ")).backend_origin(),
            Some("https://backend.internal")
        );
        assert_eq!(ProxyState::new(Some("  ")).backend_origin(), None);
        assert_eq!(ProxyState::new(None).backend_origin(), None);
    }

    #[test]
    fn hop_by_hop_headers_are_removed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        headers.insert("keep-alive", "timeout=5".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "text/event-stream".parse().unwrap());

        strip_hop_by_hop(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }
}
