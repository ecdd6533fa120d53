//! HTTP Middleware
//!
//! 请求日志中间件：记录耗时、状态码与缓存命中情况

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use super::handlers::X_CACHE;

/// 请求日志中间件
///
/// 4xx 记 warn，5xx 记 error，其余记 debug
/// 业务错误的详细信息在 ApiError::into_response() 中记录
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;
    let cache = response
        .headers()
        .get(X_CACHE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            latency_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            latency_ms,
            "HTTP client error"
        );
    } else {
        tracing::debug!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            latency_ms,
            cache,
            "HTTP request served"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    async fn cached_handler() -> ([(&'static str, &'static str); 1], &'static str) {
        ([(X_CACHE, "hit")], "audio")
    }

    async fn bad_request_handler() -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    async fn gateway_handler() -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    fn router() -> Router {
        Router::new()
            .route("/cached", get(cached_handler))
            .route("/bad", get(bad_request_handler))
            .route("/gateway", get(gateway_handler))
            .layer(axum::middleware::from_fn(request_logging_middleware))
    }

    async fn call(uri: &str) -> Response {
        router()
            .oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_response_headers_pass_through() {
        let response = call("/cached").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(X_CACHE).unwrap(), "hit");
    }

    #[tokio::test]
    async fn test_error_statuses_unchanged() {
        assert_eq!(call("/bad").await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(call("/gateway").await.status(), StatusCode::BAD_GATEWAY);
    }
}
