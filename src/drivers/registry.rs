//! Driver registry - the table of installed device drivers
//!
//! Drivers are registered once at startup (no runtime plugin host);
//! every query enumerates the table fresh so the registry itself never
//! holds stale metadata. Device-listing memoization is the hub
//! manager's job, not the registry's.

use std::collections::HashMap;
use std::sync::Arc;

use super::capability::DeviceDriver;
use super::types::{DeviceInfo, DriverDescriptor};
use crate::{Error, Result};

/// Registry of installed device drivers, keyed by driver ID
#[derive(Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn DeviceDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Register a driver, replacing any previous driver with the same ID
    pub fn register(&mut self, driver: Arc<dyn DeviceDriver>) {
        let descriptor = driver.descriptor();
        tracing::info!(
            driver_id = %descriptor.driver_id,
            name = %descriptor.display_name,
            "registered driver"
        );
        self.drivers.insert(descriptor.driver_id, driver);
    }

    /// Enumerate descriptors of all installed drivers
    ///
    /// Never fails for an empty registry; returns an empty sequence.
    #[must_use]
    pub fn list_drivers(&self) -> Vec<DriverDescriptor> {
        self.drivers.values().map(|d| d.descriptor()).collect()
    }

    /// Resolve a driver by exact ID
    ///
    /// # Errors
    ///
    /// Returns `DriverNotFound` if no installed driver has that ID
    pub fn get(&self, driver_id: &str) -> Result<Arc<dyn DeviceDriver>> {
        self.drivers
            .get(driver_id)
            .cloned()
            .ok_or_else(|| Error::DriverNotFound {
                driver_id: driver_id.to_string(),
            })
    }

    /// Enumerate the devices exposed by one driver
    ///
    /// # Errors
    ///
    /// Returns `DriverNotFound` if the driver is missing; driver
    /// enumeration failures are fatal to the call.
    pub async fn list_devices(&self, driver_id: &str) -> Result<Vec<DeviceInfo>> {
        let driver = self.get(driver_id)?;
        Ok(driver.devices().await?)
    }

    /// Resolve a (driver, device) pair to the driver and device metadata
    ///
    /// # Errors
    ///
    /// Returns `DriverNotFound` if the driver is missing (checked
    /// first), `DeviceNotFound` if the driver exposes no device with
    /// that ID.
    pub async fn resolve(
        &self,
        driver_id: &str,
        device_id: &str,
    ) -> Result<(Arc<dyn DeviceDriver>, DeviceInfo)> {
        let driver = self.get(driver_id)?;
        let device = driver
            .devices()
            .await?
            .into_iter()
            .find(|d| d.device_id == device_id)
            .ok_or_else(|| Error::device_not_found(driver_id, device_id))?;
        Ok((driver, device))
    }

    /// Number of installed drivers
    #[must_use]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Whether no drivers are installed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::demo::DemoDriver;

    fn registry() -> DriverRegistry {
        let mut registry = DriverRegistry::new();
        registry.register(Arc::new(DemoDriver::with_devices(vec![
            DeviceInfo {
                device_id: "livingroom".to_string(),
                name: "Living Room TV".to_string(),
            },
            DeviceInfo {
                device_id: "bedroom".to_string(),
                name: "Bedroom TV".to_string(),
            },
        ])));
        registry
    }

    #[test]
    fn list_matches_get() {
        let registry = registry();
        for descriptor in registry.list_drivers() {
            assert!(registry.get(&descriptor.driver_id).is_ok());
        }
        assert!(matches!(
            registry.get("no-such-driver"),
            Err(Error::DriverNotFound { .. })
        ));
    }

    #[test]
    fn empty_registry_lists_nothing() {
        let registry = DriverRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.list_drivers().is_empty());
    }

    #[tokio::test]
    async fn list_devices_unknown_driver() {
        let registry = registry();
        let err = registry.list_devices("missing").await.unwrap_err();
        assert!(matches!(err, Error::DriverNotFound { driver_id } if driver_id == "missing"));
    }

    #[tokio::test]
    async fn resolve_finds_device() {
        let registry = registry();
        let (_, device) = registry
            .resolve(DemoDriver::DRIVER_ID, "bedroom")
            .await
            .unwrap();
        assert_eq!(device.name, "Bedroom TV");
    }

    #[tokio::test]
    async fn resolve_unknown_device() {
        let registry = registry();
        let err = registry
            .resolve(DemoDriver::DRIVER_ID, "garage")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DeviceNotFound {
                driver_id: Some(_),
                device_id: Some(_),
                pairing_id: None,
            }
        ));
    }

    #[test]
    fn reregister_replaces() {
        let mut registry = registry();
        let before = registry.len();
        registry.register(Arc::new(DemoDriver::with_devices(Vec::new())));
        assert_eq!(registry.len(), before);
    }
}
