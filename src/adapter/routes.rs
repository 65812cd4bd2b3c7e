//! Routes the adapter serves on its own: health and the degraded stub.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::models::{DegradedHealth, HealthReport, Unavailable};

/// Add the health-check route to a registered application.
pub fn with_health(router: Router, health_path: &str, platform: &str) -> Router {
    let platform: Arc<str> = Arc::from(platform);
    router.route(
        health_path,
        get(move || {
            let platform = Arc::clone(&platform);
            async move { Json(HealthReport::ok(&platform)) }
        }),
    )
}

/// Route table used when registration failed.
///
/// `GET` on the health path reports the degradation with 200; every other
/// method and path answers 503.
pub fn degraded(health_path: &str, message: &str) -> Router {
    let message: Arc<str> = Arc::from(message);

    let health = {
        let message = Arc::clone(&message);
        move || {
            let message = Arc::clone(&message);
            async move { Json(DegradedHealth::new(&message)) }
        }
    };
    let unavailable = move || {
        let message = Arc::clone(&message);
        async move {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Unavailable::new(&message)),
            )
        }
    };

    Router::new()
        .route(health_path, get(health).fallback(unavailable.clone()))
        .fallback(unavailable)
}
