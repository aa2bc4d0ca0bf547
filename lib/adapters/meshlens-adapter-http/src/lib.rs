//! HTTP surface for the service read API.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, warn};

use meshlens_application::{ApiResponse, QueryParams, RequestContext, ServicesApi, project};
use meshlens_domain::ServiceError;

#[derive(Clone)]
struct AppState {
    api: Arc<ServicesApi>,
}

pub fn router(api: ServicesApi) -> Router {
    let state = AppState { api: Arc::new(api) };
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/namespaces/:namespace/services", get(service_list))
        .route("/api/namespaces/:namespace/services/:service", get(service_details))
        .route(
            "/api/namespaces/:namespace/services/:service/metrics",
            get(service_metrics),
        )
        .route(
            "/api/namespaces/:namespace/services/:service/dashboard",
            get(service_dashboard),
        )
        .fallback(not_found)
        .with_state(state)
}

/// Serves `api` on `listener` until ctrl-c.
pub async fn serve(listener: TcpListener, api: ServicesApi) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "service API listening");
    }
    axum::serve(listener, router(api))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

pub fn parse_query(raw: Option<&str>) -> QueryParams {
    QueryParams::from_pairs(url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> Response {
    into_response(ApiResponse {
        status: 404,
        body: json!({ "error": "route not found" }),
    })
}

async fn service_list(State(state): State<AppState>, Path(namespace): Path<String>) -> Response {
    let outcome = state.api.service_list(&namespace).await;
    respond("service_list", &namespace, None, outcome)
}

async fn service_details(
    State(state): State<AppState>,
    Path((namespace, service)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = parse_query(query.as_deref());
    let ctx = RequestContext::from_query(namespace, service, &params, state.api.now());
    let outcome = state.api.service_details(&ctx).await;
    respond("service_details", &ctx.namespace, Some(&ctx.service), outcome)
}

async fn service_metrics(
    State(state): State<AppState>,
    Path((namespace, service)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = parse_query(query.as_deref());
    let outcome = state
        .api
        .service_metrics(&namespace, &service, &params, state.api.now())
        .await;
    respond("service_metrics", &namespace, Some(&service), outcome)
}

async fn service_dashboard(
    State(state): State<AppState>,
    Path((namespace, service)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = parse_query(query.as_deref());
    let outcome = state
        .api
        .service_dashboard(&namespace, &service, &params, state.api.now())
        .await;
    respond("service_dashboard", &namespace, Some(&service), outcome)
}

fn respond<T: Serialize>(
    operation: &'static str,
    namespace: &str,
    service: Option<&str>,
    outcome: Result<T, ServiceError>,
) -> Response {
    let kind = match &outcome {
        Ok(_) => "encode",
        Err(err) => err.kind().as_str(),
    };
    let response = project(outcome);
    if !response.is_success() {
        warn!(
            operation,
            namespace,
            service = service.unwrap_or("-"),
            status = response.status,
            kind,
            error = response.body["error"].as_str().unwrap_or_default(),
            "request failed"
        );
    }
    into_response(response)
}

fn into_response(response: ApiResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}
