//! HTTP and WebSocket server
//!
//! Built with Axum.
//!
//! # Endpoints
//!
//! ## WebSocket
//! - `GET /` - Panel event stream (the webapp connects here)
//! - `GET /ws` - Same stream
//!
//! ## Panel
//! - `GET /api/v1/state` - Current panel state
//! - `POST /api/v1/led` - Set the LED
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use portal_bridge::api::{serve, AppState};
//! use portal_bridge::bridge::Bridge;
//! use portal_bridge::config::Config;
//! use portal_bridge::hardware::simulated;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let (hardware, _handle) = simulated(&config);
//!     let bridge = Bridge::start(hardware, &config).await;
//!
//!     serve(AppState::new(&bridge), &config.server).await?;
//!     bridge.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::websocket::websocket_handler;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/state", get(routes::panel::get_state))
        .route("/led", post(routes::panel::set_led));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(websocket_handler))
        .route("/ws", get(websocket_handler))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the server and run until SIGINT/SIGTERM
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("WebSocket server listening on ws://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Bridge;
    use crate::config::Config;
    use crate::hardware::{simulated, Hardware, SimHandle};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    async fn create_test_app() -> (Router, Bridge, SimHandle) {
        let config = Config::default();
        let (hardware, handle) = simulated(&config);
        let bridge = Bridge::start(hardware, &config).await;
        let router = build_router(AppState::new(&bridge));
        (router, bridge, handle)
    }

    async fn create_app_from(hardware: Hardware) -> (Router, Bridge) {
        let bridge = Bridge::start(hardware, &Config::default()).await;
        let router = build_router(AppState::new(&bridge));
        (router, bridge)
    }

    fn empty_hardware() -> Hardware {
        Hardware {
            backend: "simulated",
            inputs: Vec::new(),
            led: None,
            adc: None,
        }
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, bridge, _handle) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_health_ready() {
        let (app, bridge, _handle) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, bridge, _handle) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["hardware"]["backend"], "simulated");
        assert_eq!(body["connections"], 0);
        assert_eq!(body["state"]["map_toggle"], "OFF");
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_state_endpoint() {
        let (app, bridge, _handle) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/state")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["zoom"], 0.0);
        assert_eq!(body["led_brightness"], 0.0);
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_set_led() {
        let (app, bridge, handle) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/led")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"value": "ON"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["brightness"], 1.0);
        assert_eq!(handle.led_brightness(), 1.0);
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_set_led_invalid_value() {
        let (app, bridge, handle) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/led")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"value": 3.0}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(handle.led_brightness(), 0.0);
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_missing_led_degrades_health() {
        let (mut hardware, _handle) = simulated(&Config::default());
        hardware.led = None;
        let (app, bridge) = create_app_from(hardware).await;

        let response = app.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["hardware"]["led"], false);

        let response = app.oneshot(get_request("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_set_led_without_led() {
        let (mut hardware, _handle) = simulated(&Config::default());
        hardware.led = None;
        let (app, bridge) = create_app_from(hardware).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/led")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"value": "ON"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
        assert!(body["error"]["message"].is_string());
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_no_hardware_is_not_ready() {
        let (app, bridge) = create_app_from(empty_hardware()).await;

        let response = app.clone().oneshot(get_request("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app.clone().oneshot(get_request("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(app.oneshot(get_request("/health")).await.unwrap()).await;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["hardware"]["inputs"], serde_json::json!([]));
        bridge.shutdown().await;
    }
}
