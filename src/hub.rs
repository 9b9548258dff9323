//! Hub manager - pairing lifecycle and command orchestration
//!
//! Composes the driver registry, the instance cache, and the
//! paired-device store. Per pairing ID the manager drives a small
//! protocol: `start_pairing` opens a driver-owned session,
//! `finalize_pairing` consumes it and persists the pairing on success,
//! and every command-oriented call re-resolves the pairing ID to a live
//! driver instance, recreating it if it has expired from cache. The
//! store is always written before a successful finalize response is
//! observable, so a subsequent `list_paired_devices` is guaranteed to
//! see the new record.
//!
//! There is no persisted state between the two pairing calls: an
//! in-flight session lives only in the driver's own bookkeeping, and
//! recovery after a crash is simply starting a fresh pairing.

use std::sync::Arc;

use crate::cache::InstanceCache;
use crate::db::{PairedDevice, PairedDeviceStore};
use crate::drivers::{
    DeviceCommand, DeviceDriver, DeviceInfo, DeviceInstance, DriverDescriptor, DriverError,
    DriverRegistry, PairingStart, RemoteLayout,
};
use crate::{Error, Result};

/// Orchestrates drivers, pairings, and live device instances
pub struct HubManager {
    registry: Arc<DriverRegistry>,
    cache: InstanceCache,
    store: PairedDeviceStore,
}

impl HubManager {
    /// Create a manager over explicitly constructed collaborators
    #[must_use]
    pub const fn new(
        registry: Arc<DriverRegistry>,
        cache: InstanceCache,
        store: PairedDeviceStore,
    ) -> Self {
        Self {
            registry,
            cache,
            store,
        }
    }

    /// Enumerate installed drivers
    #[must_use]
    pub fn list_drivers(&self) -> Vec<DriverDescriptor> {
        self.registry.list_drivers()
    }

    /// Enumerate the devices exposed by one driver, memoized per driver
    ///
    /// # Errors
    ///
    /// Returns `DriverNotFound` if the driver is missing; driver
    /// enumeration failures are fatal to the call.
    pub async fn list_devices(&self, driver_id: &str) -> Result<Vec<DeviceInfo>> {
        if let Some(devices) = self.cache.get_listing(driver_id) {
            return Ok(devices.as_ref().clone());
        }

        let devices = self.registry.list_devices(driver_id).await?;
        self.cache.put_listing(driver_id, devices.clone());
        Ok(devices)
    }

    /// Resolve a driver and one of its devices, using the memoized listing
    async fn resolve_device(
        &self,
        driver_id: &str,
        device_id: &str,
    ) -> Result<(Arc<dyn DeviceDriver>, DeviceInfo)> {
        // DriverNotFound fires before DeviceNotFound
        let driver = self.registry.get(driver_id)?;
        let device = self
            .list_devices(driver_id)
            .await?
            .into_iter()
            .find(|d| d.device_id == device_id)
            .ok_or_else(|| Error::device_not_found(driver_id, device_id))?;
        Ok((driver, device))
    }

    /// Begin pairing a device
    ///
    /// `remote_name` is shown on devices that display a confirmation
    /// prompt. The returned `device_provides_pin` flag only selects the
    /// client's UI flow; the hub does not interpret it further.
    ///
    /// # Errors
    ///
    /// Propagates `DriverNotFound`/`DeviceNotFound` from resolution;
    /// driver protocol errors are fatal to the call.
    pub async fn start_pairing(
        &self,
        driver_id: &str,
        device_id: &str,
        remote_name: &str,
    ) -> Result<PairingStart> {
        let (driver, device) = self.resolve_device(driver_id, device_id).await?;
        let start = driver.start_pairing(&device, remote_name).await?;
        tracing::info!(
            driver_id,
            device_id,
            pairing_request_id = %start.pairing_request_id,
            device_provides_pin = start.device_provides_pin,
            "pairing started"
        );
        Ok(start)
    }

    /// Complete a pairing started earlier
    ///
    /// On driver-reported success the pairing record is written to the
    /// store before this returns. On driver-reported rejection returns
    /// `Ok(false)` and writes nothing; retrying with a fresh
    /// `start_pairing` is the expected recovery path.
    ///
    /// # Errors
    ///
    /// Propagates `DriverNotFound`/`DeviceNotFound` from re-resolution
    /// (the device may have vanished between the two calls). Driver
    /// protocol errors and invalid key construction surface as
    /// `PairingFailed`; no partial store state is left behind.
    pub async fn finalize_pairing(
        &self,
        driver_id: &str,
        device_id: &str,
        pairing_request_id: &str,
        credentials: &str,
        device_provides_pin: bool,
    ) -> Result<bool> {
        let result = self
            .try_finalize(
                driver_id,
                device_id,
                pairing_request_id,
                credentials,
                device_provides_pin,
            )
            .await;

        match result {
            Err(Error::Driver(_) | Error::InvalidPairingKey) => Err(Error::PairingFailed {
                driver_id: driver_id.to_string(),
                device_id: device_id.to_string(),
                pairing_request_id: pairing_request_id.to_string(),
            }),
            other => other,
        }
    }

    async fn try_finalize(
        &self,
        driver_id: &str,
        device_id: &str,
        pairing_request_id: &str,
        credentials: &str,
        device_provides_pin: bool,
    ) -> Result<bool> {
        let (driver, device) = self.resolve_device(driver_id, device_id).await?;
        let paired = driver
            .finalize_pairing(pairing_request_id, credentials, device_provides_pin)
            .await?;

        if paired {
            let record = PairedDevice {
                driver_id: driver_id.to_string(),
                device_id: device_id.to_string(),
                device_name: device.name,
                paired_at: chrono::Utc::now(),
            };
            self.store.save(&record)?;
            tracing::info!(
                pairing_id = %record.pairing_id()?,
                "pairing finalized"
            );
        } else {
            tracing::info!(driver_id, device_id, pairing_request_id, "pairing rejected");
        }

        Ok(paired)
    }

    /// All paired devices
    ///
    /// # Errors
    ///
    /// Returns a database error; an empty store yields an empty vector
    pub fn list_paired_devices(&self) -> Result<Vec<PairedDevice>> {
        self.store.load_all()
    }

    /// Load one pairing record
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` (by pairing ID) if absent
    pub fn get_paired_device(&self, pairing_id: &str) -> Result<PairedDevice> {
        self.store.load(pairing_id)
    }

    /// Delete a pairing and drop any cached live instance for it
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` (by pairing ID) if absent
    pub fn unpair(&self, pairing_id: &str) -> Result<()> {
        self.store.delete(pairing_id)?;
        self.cache.invalidate_instance(pairing_id);
        Ok(())
    }

    /// Resolve a pairing ID to a live device instance
    ///
    /// Cache hit returns the memoized handle; on a miss the pairing
    /// record is loaded from the store, the driver and device are
    /// re-resolved, and a fresh instance is created and cached. The
    /// store lookup is the only place an unknown pairing ID is
    /// detected for the command-oriented operations.
    ///
    /// # Errors
    ///
    /// `DeviceNotFound` (by pairing ID) if never paired;
    /// `InstanceUnavailable` if the driver fails to instantiate
    pub async fn resolve_instance(&self, pairing_id: &str) -> Result<Arc<dyn DeviceInstance>> {
        if let Some(instance) = self.cache.get_instance(pairing_id) {
            return Ok(instance);
        }

        let record = self.store.load(pairing_id)?;
        let (driver, device) = self
            .resolve_device(&record.driver_id, &record.device_id)
            .await?;
        let instance = driver
            .create_instance(&device.device_id)
            .await
            .map_err(|e| {
                tracing::warn!(pairing_id, error = %e, "driver failed to instantiate device");
                Error::InstanceUnavailable {
                    pairing_id: pairing_id.to_string(),
                }
            })?;

        self.cache.put_instance(pairing_id, Arc::clone(&instance));
        Ok(instance)
    }

    /// Commands supported by a paired device
    ///
    /// # Errors
    ///
    /// Propagates instance resolution failures and driver errors
    pub async fn list_commands(&self, pairing_id: &str) -> Result<Vec<DeviceCommand>> {
        let instance = self.resolve_instance(pairing_id).await?;
        Ok(instance.commands().await?)
    }

    /// Remote layout for a paired device
    ///
    /// # Errors
    ///
    /// Propagates instance resolution failures and driver errors
    pub async fn remote_layout(&self, pairing_id: &str) -> Result<RemoteLayout> {
        let instance = self.resolve_instance(pairing_id).await?;
        Ok(instance.remote_layout().await?)
    }

    /// Execute one command on a paired device
    ///
    /// Fire-and-forget from the hub's perspective: driver-side outcomes
    /// are not interpreted beyond propagating failure.
    ///
    /// # Errors
    ///
    /// Propagates instance resolution failures and driver errors; an
    /// unknown command ID is a driver error
    pub async fn execute_command(&self, pairing_id: &str, command_id: i64) -> Result<()> {
        let instance = self.resolve_instance(pairing_id).await?;
        let command = instance
            .command(command_id)
            .await?
            .ok_or_else(|| DriverError::new(format!("device has no command with ID {command_id}")))?;
        instance.execute(&command).await?;
        Ok(())
    }

    /// Whether a paired device is ready to execute commands
    ///
    /// # Errors
    ///
    /// Propagates instance resolution failures and driver errors
    pub async fn is_ready(&self, pairing_id: &str) -> Result<bool> {
        let instance = self.resolve_instance(pairing_id).await?;
        Ok(instance.is_ready().await?)
    }
}
