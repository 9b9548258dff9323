//! Built-in demo driver
//!
//! A virtual TV remote that pairs with a fixed PIN and accepts every
//! command. Gives a fresh install something to pair against and serves
//! as the driver fixture for the hub tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use super::capability::{DeviceDriver, DeviceInstance, DriverError, DriverResult};
use super::types::{
    AuthenticationMethod, DeviceCommand, DeviceInfo, DriverDescriptor, PairingStart,
    RemoteLayout,
};

/// PIN the virtual devices display during pairing
pub const DEMO_PIN: &str = "1234";

/// In-memory demo driver
#[derive(Debug)]
pub struct DemoDriver {
    devices: Vec<DeviceInfo>,
    /// Pairing request IDs issued by `start_pairing` and not yet consumed
    sessions: Mutex<HashSet<String>>,
    /// Commands executed across all instances, for test inspection
    executed: Arc<Mutex<Vec<(String, i64)>>>,
    fail_instantiation: AtomicBool,
}

impl DemoDriver {
    /// Driver ID under which the demo driver registers
    pub const DRIVER_ID: &'static str = "ember-demo";

    /// Create the driver with its default device set
    #[must_use]
    pub fn new() -> Self {
        Self::with_devices(vec![DeviceInfo {
            device_id: "virtual-tv".to_string(),
            name: "Virtual TV".to_string(),
        }])
    }

    /// Create the driver exposing the given devices
    #[must_use]
    pub fn with_devices(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            sessions: Mutex::new(HashSet::new()),
            executed: Arc::new(Mutex::new(Vec::new())),
            fail_instantiation: AtomicBool::new(false),
        }
    }

    /// Make `create_instance` fail until reset (test hook)
    pub fn set_fail_instantiation(&self, fail: bool) {
        self.fail_instantiation.store(fail, Ordering::SeqCst);
    }

    /// Commands executed so far, as (device ID, command ID) pairs
    #[must_use]
    pub fn executed(&self) -> Vec<(String, i64)> {
        self.executed.lock().expect("executed log poisoned").clone()
    }
}

impl Default for DemoDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceDriver for DemoDriver {
    fn descriptor(&self) -> DriverDescriptor {
        DriverDescriptor {
            driver_id: Self::DRIVER_ID.to_string(),
            display_name: "Ember Demo".to_string(),
            description: "Virtual remote-controllable TV for demos and tests".to_string(),
            authentication_method: AuthenticationMethod::Pin,
        }
    }

    async fn devices(&self) -> DriverResult<Vec<DeviceInfo>> {
        Ok(self.devices.clone())
    }

    async fn start_pairing(
        &self,
        device: &DeviceInfo,
        remote_name: &str,
    ) -> DriverResult<PairingStart> {
        let request_id = format!("demo-{}", Uuid::new_v4());
        self.sessions
            .lock()
            .expect("session set poisoned")
            .insert(request_id.clone());

        tracing::info!(
            device_id = %device.device_id,
            remote_name,
            pin = DEMO_PIN,
            "virtual device is displaying its PIN"
        );

        Ok(PairingStart {
            pairing_request_id: request_id,
            device_provides_pin: true,
        })
    }

    async fn finalize_pairing(
        &self,
        pairing_request_id: &str,
        credentials: &str,
        _device_provides_pin: bool,
    ) -> DriverResult<bool> {
        let known = self
            .sessions
            .lock()
            .expect("session set poisoned")
            .remove(pairing_request_id);
        if !known {
            return Err(DriverError::new(format!(
                "unknown pairing request '{pairing_request_id}'"
            )));
        }
        Ok(credentials == DEMO_PIN)
    }

    async fn create_instance(&self, device_id: &str) -> DriverResult<Arc<dyn DeviceInstance>> {
        if self.fail_instantiation.load(Ordering::SeqCst) {
            return Err(DriverError::new("virtual device is offline"));
        }
        Ok(Arc::new(DemoInstance {
            device_id: device_id.to_string(),
            executed: Arc::clone(&self.executed),
        }))
    }
}

/// Live handle to one virtual TV
#[derive(Debug)]
struct DemoInstance {
    device_id: String,
    executed: Arc<Mutex<Vec<(String, i64)>>>,
}

fn command_set() -> Vec<DeviceCommand> {
    [
        (1, "Power"),
        (2, "Volume Up"),
        (3, "Volume Down"),
        (4, "Mute"),
        (5, "Channel Up"),
        (6, "Channel Down"),
    ]
    .into_iter()
    .map(|(id, title)| DeviceCommand {
        id,
        title: title.to_string(),
        // No artwork bundled with the virtual remote
        icon: Vec::new(),
    })
    .collect()
}

#[async_trait]
impl DeviceInstance for DemoInstance {
    async fn commands(&self) -> DriverResult<Vec<DeviceCommand>> {
        Ok(command_set())
    }

    async fn command(&self, command_id: i64) -> DriverResult<Option<DeviceCommand>> {
        Ok(command_set().into_iter().find(|c| c.id == command_id))
    }

    async fn remote_layout(&self) -> DriverResult<RemoteLayout> {
        Ok(RemoteLayout {
            width: 3,
            height: 2,
            buttons: vec![vec![1, 2, 5], vec![4, 3, 6]],
        })
    }

    async fn execute(&self, command: &DeviceCommand) -> DriverResult<()> {
        tracing::debug!(device_id = %self.device_id, command_id = command.id, title = %command.title, "executing command");
        self.executed
            .lock()
            .expect("executed log poisoned")
            .push((self.device_id.clone(), command.id));
        Ok(())
    }

    async fn is_ready(&self) -> DriverResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::types::EMPTY_CELL;

    #[tokio::test]
    async fn pairing_round_trip() {
        let driver = DemoDriver::new();
        let devices = driver.devices().await.unwrap();
        let start = driver
            .start_pairing(&devices[0], "Test Remote")
            .await
            .unwrap();
        assert!(start.device_provides_pin);

        let paired = driver
            .finalize_pairing(&start.pairing_request_id, DEMO_PIN, true)
            .await
            .unwrap();
        assert!(paired);
    }

    #[tokio::test]
    async fn wrong_pin_rejected() {
        let driver = DemoDriver::new();
        let devices = driver.devices().await.unwrap();
        let start = driver
            .start_pairing(&devices[0], "Test Remote")
            .await
            .unwrap();

        let paired = driver
            .finalize_pairing(&start.pairing_request_id, "0000", true)
            .await
            .unwrap();
        assert!(!paired);
    }

    #[tokio::test]
    async fn finalize_without_session_is_protocol_error() {
        let driver = DemoDriver::new();
        let result = driver.finalize_pairing("never-issued", DEMO_PIN, true).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn layout_references_known_commands() {
        let driver = DemoDriver::new();
        let instance = driver.create_instance("virtual-tv").await.unwrap();
        let commands = instance.commands().await.unwrap();
        let layout = instance.remote_layout().await.unwrap();

        assert_eq!(layout.buttons.len(), layout.height as usize);
        for row in &layout.buttons {
            assert_eq!(row.len(), layout.width as usize);
            for &id in row {
                assert!(id == EMPTY_CELL || commands.iter().any(|c| c.id == id));
            }
        }
    }

    #[tokio::test]
    async fn execute_records_command() {
        let driver = DemoDriver::new();
        let instance = driver.create_instance("virtual-tv").await.unwrap();
        let command = instance.command(1).await.unwrap().unwrap();
        instance.execute(&command).await.unwrap();
        assert_eq!(driver.executed(), vec![("virtual-tv".to_string(), 1)]);
    }
}
