//! Placeholder HTTP backend.
//!
//! Records never leave the device; the backend only answers a health check
//! so deployments can confirm it is up.

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::error::{Error, Result};

/// Body of the health check response.
pub const HEALTH_MESSAGE: &str = "Backend is running";

/// Build the backend routes.
pub fn router() -> Router {
    Router::new().route("/", get(health))
}

async fn health() -> &'static str {
    HEALTH_MESSAGE
}

/// Serve the backend on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::server(format!("failed to bind {addr}: {e}")))?;

    info!("Backend server running on {}", addr);

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::server(e.to_string()))?;

    info!("Backend server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // An error here means no handler could be installed; run until killed.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], HEALTH_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/notes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_reports_bind_failure() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let err = serve(addr).await.unwrap_err();
        assert!(matches!(err, Error::Server(_)));
    }
}
