//! Driver and paired-device API endpoints
//!
//! Exposes the orchestration surface to remote apps:
//! - GET /api/drivers - list installed drivers
//! - GET /api/drivers/{driver_id}/devices - list a driver's devices
//! - POST /api/drivers/{driver_id}/devices/{device_id}/pairing - start pairing
//! - POST /api/drivers/{driver_id}/devices/{device_id}/pairing/{request_id} - finalize pairing
//! - GET /api/devices - list paired devices
//! - GET/DELETE /api/devices/{pairing_id} - inspect / unpair
//! - GET /api/devices/{pairing_id}/commands - list commands
//! - PUT /api/devices/{pairing_id}/commands/{command_id} - execute a command
//! - GET /api/devices/{pairing_id}/layout - remote layout
//! - GET /api/devices/{pairing_id}/ready - readiness probe

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::db::PairedDevice;
use crate::drivers::{DeviceCommand, PairingStart};
use crate::Error;

/// Build the drivers router
pub fn drivers_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(list_drivers))
        .route("/{driver_id}/devices", get(list_devices))
        .route(
            "/{driver_id}/devices/{device_id}/pairing",
            post(start_pairing),
        )
        .route(
            "/{driver_id}/devices/{device_id}/pairing/{pairing_request_id}",
            post(finalize_pairing),
        )
        .with_state(state)
}

/// Build the paired-devices router
pub fn devices_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(list_paired_devices))
        .route("/{pairing_id}", get(get_paired_device))
        .route("/{pairing_id}", delete(unpair_device))
        .route("/{pairing_id}/commands", get(list_commands))
        .route("/{pairing_id}/commands/{command_id}", put(execute_command))
        .route("/{pairing_id}/layout", get(remote_layout))
        .route("/{pairing_id}/ready", get(is_ready))
        .with_state(state)
}

// === Request/Response types ===

/// Request body for starting a pairing
#[derive(Debug, Deserialize)]
pub struct StartPairingBody {
    /// Human-readable name of the requesting remote
    pub remote_name: String,
}

/// Request body for finalizing a pairing
#[derive(Debug, Deserialize)]
pub struct FinalizePairingBody {
    /// PIN or equivalent token, format driver-defined
    pub credentials: String,

    /// Flag returned by the start call, echoed back unchanged
    pub device_provides_pin: bool,
}

/// Response for a finalized pairing
#[derive(Debug, Serialize)]
pub struct FinalizePairingResponse {
    /// Whether the device accepted the pairing
    pub paired: bool,

    /// Pairing ID of the persisted record, when paired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing_id: Option<String>,
}

/// Paired device info for API responses
#[derive(Debug, Serialize)]
pub struct PairedDeviceInfo {
    pub pairing_id: String,
    pub driver_id: String,
    pub device_id: String,
    pub device_name: String,
    /// RFC 3339 timestamp of when the pairing completed
    pub paired_at: String,
}

impl PairedDeviceInfo {
    fn from_record(record: PairedDevice) -> crate::Result<Self> {
        Ok(Self {
            pairing_id: record.pairing_id()?,
            driver_id: record.driver_id,
            device_id: record.device_id,
            device_name: record.device_name,
            paired_at: record.paired_at.to_rfc3339(),
        })
    }
}

/// Device command with the icon payload encoded for JSON transport
#[derive(Debug, Serialize)]
pub struct DeviceCommandInfo {
    pub id: i64,
    pub title: String,
    /// Icon image bytes, base64 encoded
    pub icon: String,
}

impl From<DeviceCommand> for DeviceCommandInfo {
    fn from(c: DeviceCommand) -> Self {
        Self {
            id: c.id,
            title: c.title,
            icon: BASE64.encode(c.icon),
        }
    }
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
}

/// Map a hub error to an HTTP response
fn error_response(err: &Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        Error::DriverNotFound { .. } | Error::DeviceNotFound { .. } => StatusCode::NOT_FOUND,
        Error::PairingFailed { .. } | Error::InvalidPairingKey => StatusCode::BAD_REQUEST,
        Error::InstanceUnavailable { .. } | Error::Driver(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

// === Handlers ===

/// List installed drivers
async fn list_drivers(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.hub.list_drivers())
}

/// List the devices a driver exposes
async fn list_devices(
    State(state): State<ApiState>,
    Path(driver_id): Path<String>,
) -> impl IntoResponse {
    match state.hub.list_devices(&driver_id).await {
        Ok(devices) => Json(devices).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// Start pairing a device
async fn start_pairing(
    State(state): State<ApiState>,
    Path((driver_id, device_id)): Path<(String, String)>,
    Json(body): Json<StartPairingBody>,
) -> impl IntoResponse {
    match state
        .hub
        .start_pairing(&driver_id, &device_id, &body.remote_name)
        .await
    {
        Ok(start) => (StatusCode::CREATED, Json::<PairingStart>(start)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// Finalize a pairing
async fn finalize_pairing(
    State(state): State<ApiState>,
    Path((driver_id, device_id, pairing_request_id)): Path<(String, String, String)>,
    Json(body): Json<FinalizePairingBody>,
) -> impl IntoResponse {
    let result = state
        .hub
        .finalize_pairing(
            &driver_id,
            &device_id,
            &pairing_request_id,
            &body.credentials,
            body.device_provides_pin,
        )
        .await;

    match result {
        Ok(true) => Json(FinalizePairingResponse {
            paired: true,
            pairing_id: Some(format!("{driver_id}.{device_id}")),
        })
        .into_response(),
        Ok(false) => Json(FinalizePairingResponse {
            paired: false,
            pairing_id: None,
        })
        .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// List all paired devices
async fn list_paired_devices(State(state): State<ApiState>) -> impl IntoResponse {
    let records = match state.hub.list_paired_devices() {
        Ok(records) => records,
        Err(e) => return error_response(&e).into_response(),
    };

    let mut infos = Vec::with_capacity(records.len());
    for record in records {
        match PairedDeviceInfo::from_record(record) {
            Ok(info) => infos.push(info),
            Err(e) => return error_response(&e).into_response(),
        }
    }
    Json(infos).into_response()
}

/// Get one paired device
async fn get_paired_device(
    State(state): State<ApiState>,
    Path(pairing_id): Path<String>,
) -> impl IntoResponse {
    match state
        .hub
        .get_paired_device(&pairing_id)
        .and_then(PairedDeviceInfo::from_record)
    {
        Ok(info) => Json(info).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// Unpair a device
async fn unpair_device(
    State(state): State<ApiState>,
    Path(pairing_id): Path<String>,
) -> impl IntoResponse {
    match state.hub.unpair(&pairing_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// List the commands a paired device supports
async fn list_commands(
    State(state): State<ApiState>,
    Path(pairing_id): Path<String>,
) -> impl IntoResponse {
    match state.hub.list_commands(&pairing_id).await {
        Ok(commands) => {
            let infos: Vec<DeviceCommandInfo> = commands.into_iter().map(Into::into).collect();
            Json(infos).into_response()
        }
        Err(e) => error_response(&e).into_response(),
    }
}

/// Execute a command on a paired device
async fn execute_command(
    State(state): State<ApiState>,
    Path((pairing_id, command_id)): Path<(String, i64)>,
) -> impl IntoResponse {
    match state.hub.execute_command(&pairing_id, command_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// Get the remote layout of a paired device
async fn remote_layout(
    State(state): State<ApiState>,
    Path(pairing_id): Path<String>,
) -> impl IntoResponse {
    match state.hub.remote_layout(&pairing_id).await {
        Ok(layout) => Json(layout).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// Check whether a paired device is ready
async fn is_ready(
    State(state): State<ApiState>,
    Path(pairing_id): Path<String>,
) -> impl IntoResponse {
    match state.hub.is_ready(&pairing_id).await {
        Ok(ready) => Json(ReadyResponse { ready }).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
