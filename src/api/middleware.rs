//! Response timing middleware
//!
//! Stamps every response with `X-Response-Time: <ms>ms`, measured around
//! the whole inner service.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

pub const RESPONSE_TIME_HEADER: HeaderName = HeaderName::from_static("x-response-time");

pub async fn response_time(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut response = next.run(request).await;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if let Ok(value) = HeaderValue::from_str(&format!("{:.2}ms", elapsed_ms)) {
        response.headers_mut().insert(RESPONSE_TIME_HEADER, value);
    }

    response
}
