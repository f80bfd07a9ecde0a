/*!
 * Scrape-serving layer.
 *
 * Routes:
 * - `GET /metrics`, `GET /` and any other path run one scrape and return
 *   the text exposition
 * - `GET /status` liveness check with uptime and last scrape figures
 */

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use crate::exposition::CONTENT_TYPE;
use crate::health::ExporterHealth;
use crate::registry::ScrapeRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ScrapeRegistry>,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(metrics))
        .route("/metrics", get(metrics))
        .route("/status", get(status))
        .fallback(metrics)
        .with_state(app_state)
        .layer(middleware::from_fn(log_requests))
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(req).await;
    debug!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "served request"
    );
    response
}

// GET /metrics
async fn metrics(State(app): State<AppState>) -> Response {
    match app.registry.render().await {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}

// GET /status
async fn status(State(app): State<AppState>) -> Json<ExporterHealth> {
    Json(app.registry.health().get_health())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::Collector;
    use crate::metric::{MetricFamily, MetricKind};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use tower::ServiceExt;

    struct Empty;

    #[async_trait]
    impl Collector for Empty {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn collect(&self) -> Vec<MetricFamily> {
            vec![MetricFamily::new("storj_total_bandwidth", "Storj total bandwidth metrics", MetricKind::Gauge, &["type"])]
        }
    }

    fn router() -> Router {
        build_router(AppState {
            registry: Arc::new(ScrapeRegistry::new(vec![Box::new(Empty)])),
        })
    }

    async fn send(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        for uri in ["/metrics", "/"] {
            let (status, content_type, body) = send(router(), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(content_type.as_deref(), Some(CONTENT_TYPE));
            assert!(body.contains("# TYPE storj_total_bandwidth gauge"));
        }
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let router = router();
        send(router.clone(), "/metrics").await;
        let (status, _, body) = send(router, "/status").await;
        assert_eq!(status, StatusCode::OK);
        let health: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["status"], "alive");
        assert_eq!(health["scrapes_total"], 1);
    }

    #[tokio::test]
    async fn test_other_paths_serve_metrics() {
        for uri in ["/nope", "/scrape/node-1"] {
            let (status, content_type, body) = send(router(), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(content_type.as_deref(), Some(CONTENT_TYPE));
            assert!(body.contains("# TYPE storj_total_bandwidth gauge"));
        }
    }
}
