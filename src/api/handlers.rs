//! HTTP API handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::Value;
use utoipa::{OpenApi, ToSchema};

use crate::config::PlatformKey;
use crate::error::{ApiError, ErrorBody};
use crate::format;
use crate::host::{HostInfo, HostSnapshot, InterfaceAddress};
use crate::status::{classify, ForcedCode, ForcedStatus, ForcedStatusBody};

use super::docs::ApiDoc;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of host metadata.
    pub host: Arc<dyn HostInfo>,
    /// Spelling of the platform key in `/details`.
    pub platform_key: PlatformKey,
    /// Prometheus render handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(host: Arc<dyn HostInfo>) -> Self {
        Self {
            host,
            platform_key: PlatformKey::default(),
            metrics: None,
        }
    }

    /// Use the given platform key spelling.
    pub fn with_platform_key(mut self, platform_key: PlatformKey) -> Self {
        self.platform_key = platform_key;
        self
    }

    /// Serve metrics from this handle.
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

/// Root response.
#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    /// Host name of the serving machine.
    pub host: String,
    /// Time of the response, RFC 1123.
    pub at: String,
}

/// Host details response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DetailsResponse {
    /// Host name.
    pub hostname: String,
    /// CPU architecture.
    pub arch: String,
    /// Platform under its historical, misspelled key.
    #[serde(rename = "platfoirm", skip_serializing_if = "Option::is_none")]
    pub legacy_platform: Option<String>,
    /// Platform under the corrected key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Logical CPU count.
    pub cpus: usize,
    /// Total memory, human readable.
    pub totalmem: String,
    /// Interface name to address records.
    #[serde(rename = "networkInterfaces")]
    pub network_interfaces: BTreeMap<String, Vec<InterfaceAddress>>,
}

impl DetailsResponse {
    /// Render a snapshot with the chosen platform key.
    pub fn new(snapshot: HostSnapshot, platform_key: PlatformKey) -> Self {
        let (legacy_platform, platform) = match platform_key {
            PlatformKey::Legacy => (Some(snapshot.platform), None),
            PlatformKey::Corrected => (None, Some(snapshot.platform)),
        };

        Self {
            hostname: snapshot.hostname,
            arch: snapshot.arch,
            legacy_platform,
            platform,
            cpus: snapshot.cpus,
            totalmem: format::file_size(snapshot.total_memory),
            network_interfaces: snapshot.network_interfaces,
        }
    }
}

/// Status response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Basic default route that returns a JSON object.
#[utoipa::path(
    get,
    path = "/",
    tag = "diagnostics",
    responses((status = 200, description = "Serving host and time", body = RootResponse))
)]
pub async fn root(State(state): State<AppState>) -> Result<Json<RootResponse>, ApiError> {
    let host = state.host.hostname()?;
    let at = format::rfc1123(state.host.now())
        .map_err(|e| ApiError::Internal(format!("failed to format timestamp: {e}")))?;

    Ok(Json(RootResponse { host, at }))
}

/// Details route that returns details of the host.
#[utoipa::path(
    get,
    path = "/details",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Host metadata", body = DetailsResponse),
        (status = 500, description = "Introspection failed", body = ErrorBody)
    )
)]
pub async fn details(State(state): State<AppState>) -> Result<Json<DetailsResponse>, ApiError> {
    let host = Arc::clone(&state.host);
    let snapshot = tokio::task::spawn_blocking(move || host.snapshot()).await??;

    Ok(Json(DetailsResponse::new(snapshot, state.platform_key)))
}

/// Route which echoes back the status code.
#[utoipa::path(
    get,
    path = "/status/{code}",
    tag = "diagnostics",
    params(("code" = u16, Path, description = "Known HTTP status code to answer with")),
    responses(
        (status = 200, description = "Success-shaped body for codes below 400", body = ForcedStatusBody),
        (status = 400, description = "Invalid code, or a forced 400", body = ErrorBody)
    )
)]
pub async fn forced_status(ForcedCode(code): ForcedCode) -> ForcedStatus {
    classify(code)
}

/// Simple status route that returns a 200 (OK).
#[utoipa::path(
    get,
    path = "/status",
    tag = "diagnostics",
    responses((status = 200, description = "Service is up", body = StatusResponse))
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

/// Echo route that returns the posted JSON payload.
#[utoipa::path(
    post,
    path = "/echo",
    tag = "diagnostics",
    responses(
        (status = 200, description = "The request payload, unchanged"),
        (status = 400, description = "Body is not JSON", body = ErrorBody)
    )
)]
pub async fn echo(payload: Result<Json<Value>, JsonRejection>) -> Result<Json<Value>, ApiError> {
    let Json(value) = payload.map_err(|e| ApiError::InvalidPayload(e.body_text()))?;
    Ok(Json(value))
}

/// Echo route for PUT; same contract as [`echo`].
#[utoipa::path(
    put,
    path = "/echo",
    tag = "diagnostics",
    responses(
        (status = 200, description = "The request payload, unchanged"),
        (status = 400, description = "Body is not JSON", body = ErrorBody)
    )
)]
pub async fn echo_put(payload: Result<Json<Value>, JsonRejection>) -> Result<Json<Value>, ApiError> {
    echo(payload).await
}

/// Prometheus text exposition.
pub async fn metrics_text(State(state): State<AppState>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(ApiError::NotFound)
}

/// OpenAPI document for this service.
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FixedHost;
    use pretty_assertions::assert_eq;

    #[test]
    fn details_uses_legacy_key_by_default() {
        let snapshot = FixedHost::sample().snapshot;
        let json = serde_json::to_value(DetailsResponse::new(snapshot, PlatformKey::Legacy)).unwrap();

        assert_eq!(json["platfoirm"], "linux");
        assert!(json.get("platform").is_none());
        assert_eq!(json["totalmem"], "8.00 GB");
        assert_eq!(json["networkInterfaces"]["lo"][0]["cidr"], "127.0.0.1/8");
    }

    #[test]
    fn details_uses_corrected_key_when_asked() {
        let snapshot = FixedHost::sample().snapshot;
        let json =
            serde_json::to_value(DetailsResponse::new(snapshot, PlatformKey::Corrected)).unwrap();

        assert_eq!(json["platform"], "linux");
        assert!(json.get("platfoirm").is_none());
    }

    #[tokio::test]
    async fn metrics_text_is_not_found_without_handle() {
        let state = AppState::new(Arc::new(FixedHost::sample()));
        let result = metrics_text(State(state)).await;
        assert!(matches!(result, Err(ApiError::NotFound)));
    }
}
