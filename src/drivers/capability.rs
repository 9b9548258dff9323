//! Capability contracts a device driver must satisfy
//!
//! Drivers own all device-specific protocol logic (network handshakes,
//! IR blasting, session bookkeeping). The hub only calls through these
//! traits and never inspects driver internals.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{DeviceCommand, DeviceInfo, DriverDescriptor, PairingStart, RemoteLayout};

/// Opaque driver-internal protocol error
///
/// Wrapped into `PairingFailed` during pairing finalization; surfaced
/// unchanged everywhere else.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DriverError {
    message: String,
}

impl DriverError {
    /// Create a driver error with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Driver-side result type
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// One family of remote-controllable appliances
///
/// Driver calls are potentially long-running I/O (pairing handshakes,
/// device round-trips) and must not assume exclusive access: the hub
/// issues them concurrently for independent devices.
#[async_trait]
pub trait DeviceDriver: Send + Sync + std::fmt::Debug {
    /// Descriptor identifying this driver
    fn descriptor(&self) -> DriverDescriptor;

    /// Enumerate the devices this driver can currently control
    async fn devices(&self) -> DriverResult<Vec<DeviceInfo>>;

    /// Begin pairing with a device
    ///
    /// `remote_name` is the human-readable name of the requesting
    /// remote, shown on devices that display a confirmation prompt. The
    /// returned request ID correlates the later finalize call; its
    /// lifetime is bounded by the driver's own session bookkeeping.
    async fn start_pairing(
        &self,
        device: &DeviceInfo,
        remote_name: &str,
    ) -> DriverResult<PairingStart>;

    /// Complete a pairing started earlier
    ///
    /// Returns `Ok(false)` when the device rejected the credentials;
    /// the caller may start a fresh pairing attempt.
    async fn finalize_pairing(
        &self,
        pairing_request_id: &str,
        credentials: &str,
        device_provides_pin: bool,
    ) -> DriverResult<bool>;

    /// Allocate a live handle for a (previously paired) device
    async fn create_instance(&self, device_id: &str) -> DriverResult<Arc<dyn DeviceInstance>>;
}

/// A live handle bound to one paired device
///
/// Never persisted; the hub reconstructs instances on demand and keeps
/// them only as long as the instance cache does.
#[async_trait]
pub trait DeviceInstance: Send + Sync + std::fmt::Debug {
    /// Enumerate the commands the device supports
    async fn commands(&self) -> DriverResult<Vec<DeviceCommand>>;

    /// Look up a single command by ID
    async fn command(&self, command_id: i64) -> DriverResult<Option<DeviceCommand>>;

    /// Describe how commands are laid out on a rendered remote
    async fn remote_layout(&self) -> DriverResult<RemoteLayout>;

    /// Execute a command on the device
    async fn execute(&self, command: &DeviceCommand) -> DriverResult<()>;

    /// Whether the device is currently reachable and ready for commands
    async fn is_ready(&self) -> DriverResult<bool>;
}
