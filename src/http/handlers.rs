//! Response generators.
//!
//! # Responsibilities
//! - Run the shared pipeline for delay-aware endpoints:
//!   parse directives → suspend → produce body
//! - Produce the three response bodies: synthetic payload, request echo,
//!   fixed health reply
//!
//! # Design Decisions
//! - One pipeline function plus per-route producers instead of a handler
//!   hierarchy; the router picks the producer
//! - The suspension point is a plain timer await: the task yields, the worker
//!   keeps serving other requests, and a closed connection simply drops the
//!   pending future
//! - `/health` bypasses the pipeline so liveness probes always answer
//!   instantly

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use futures_util::stream;

use crate::directives::{self, ControlDirectives, DATA_LENGTH_HEADER, DELAY_HEADER};
use crate::pool::ContentPool;

/// State owned by one worker instance. The pool is immutable and shared
/// read-only by every request that worker serves.
#[derive(Clone)]
pub struct WorkerState {
    pub worker: usize,
    pub pool: Arc<ContentPool>,
}

impl WorkerState {
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            pool: Arc::new(ContentPool::generate()),
        }
    }
}

/// Shared pipeline stage for delay-aware endpoints.
///
/// The inbound body is not polled while the timer runs, so a delayed upload
/// is not buffered during the wait.
async fn parse_and_suspend(headers: &HeaderMap) -> ControlDirectives {
    let directives = ControlDirectives::from_headers(headers);
    if directives.delay_millis > 0 {
        tokio::time::sleep(Duration::from_millis(directives.delay_millis)).await;
    }
    directives
}

/// Resolved-delay header plus `response-*` pass-throughs, common to `/ping`
/// and `/data`.
fn apply_directive_headers(headers: &mut HeaderMap, directives: &ControlDirectives) {
    headers.insert(DELAY_HEADER, HeaderValue::from(directives.delay_millis));
    for (name, value) in &directives.response_headers {
        headers.insert(name.clone(), value.clone());
    }
}

/// GET `/health`: fixed liveness reply, no directive processing.
pub async fn health() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "OK")
}

/// POST `/ping`: echo the request body after the resolved delay.
///
/// The body is piped through as a chunked stream, so arbitrarily large
/// uploads are never buffered whole.
pub async fn ping(request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let directives = parse_and_suspend(&parts.headers).await;

    let mut response = Response::new(Body::from_stream(body.into_data_stream()));
    if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type.clone());
    }
    apply_directive_headers(response.headers_mut(), &directives);
    response
}

/// GET/POST `/data`: synthetic payload of the directed length.
///
/// Lengths up to the pool size are a single bounded write with an exact
/// `content-length`; anything larger switches to chunked transfer and replays
/// the pool until the requested total is written.
pub async fn data(State(state): State<WorkerState>, request: Request) -> Response {
    let directives = parse_and_suspend(request.headers()).await;
    let length = directives::resolve_data_length(request.headers(), state.pool.len());

    let body = if length <= state.pool.len() {
        Body::from(state.pool.slice(0, length))
    } else {
        let pool = state.pool.clone();
        Body::from_stream(stream::unfold(length, move |remaining| {
            let pool = pool.clone();
            async move {
                if remaining == 0 {
                    return None;
                }
                let chunk = remaining.min(pool.len());
                Some((Ok::<Bytes, Infallible>(pool.slice(0, chunk)), remaining - chunk))
            }
        }))
    };

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    headers.insert(DATA_LENGTH_HEADER, HeaderValue::from(length));
    apply_directive_headers(headers, &directives);
    response
}
