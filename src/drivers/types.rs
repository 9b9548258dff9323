//! Data model shared between the hub and device drivers

use serde::{Deserialize, Serialize};

/// Sentinel command ID marking an empty cell in a remote layout
pub const EMPTY_CELL: i64 = -1;

/// How a driver authenticates during pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationMethod {
    /// Pairing completes without a credential exchange
    #[default]
    None,

    /// Pairing requires a PIN challenge
    Pin,

    /// Driver-specific authentication scheme
    Other,
}

/// Describes one installed device driver
///
/// Immutable for the process lifetime; enumerated fresh on every
/// registry query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverDescriptor {
    /// Stable, unique driver identifier
    pub driver_id: String,

    /// Human-readable name
    pub display_name: String,

    /// Short description of the driven appliance family
    pub description: String,

    /// Authentication scheme used during pairing
    pub authentication_method: AuthenticationMethod,
}

/// Metadata for one controllable device exposed by a driver
///
/// Opaque to the hub beyond identity; the driver owns its meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device identifier, unique within the owning driver
    pub device_id: String,

    /// Human-readable device name
    pub name: String,
}

/// One invocable action on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCommand {
    /// Driver-scoped command identifier
    pub id: i64,

    /// Human-readable title
    pub title: String,

    /// Binary icon payload (image bytes)
    pub icon: Vec<u8>,
}

/// Grid describing where commands sit on a rendered remote surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLayout {
    /// Number of columns
    pub width: u32,

    /// Number of rows
    pub height: u32,

    /// Row-major matrix of command IDs; [`EMPTY_CELL`] marks an empty cell
    pub buttons: Vec<Vec<i64>>,
}

/// Outcome of a driver's pairing initiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingStart {
    /// Driver-chosen identifier correlating start and finalize calls
    pub pairing_request_id: String,

    /// Whether the device displays the PIN (true) or the caller must
    /// supply one out-of-band (false); governs the client's UI flow
    pub device_provides_pin: bool,
}
