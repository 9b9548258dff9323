//! Paired device records and their durable store
//!
//! The store is the source of truth for pairing existence; the instance
//! cache is only ever an optimization on top of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kv::{EntityKey, KvStore};
use crate::{Error, Result};

/// Entity kind under which paired devices are stored
const ENTITY_KIND: &str = "paired_device";

/// Durable record of a successful pairing
///
/// Never mutated in place: unpair + re-pair creates a fresh record
/// under the same pairing ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedDevice {
    /// Driver that paired the device
    pub driver_id: String,

    /// Device ID within the driver
    pub device_id: String,

    /// Display name captured at pairing time
    pub device_name: String,

    /// When the pairing completed
    pub paired_at: DateTime<Utc>,
}

impl PairedDevice {
    /// Derived pairing ID: `"{driver_id}.{device_id}"`
    ///
    /// Opaque, URL-safe text to collaborators; deterministic composite
    /// of the two identifiers by construction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPairingKey` if either component is empty
    pub fn pairing_id(&self) -> Result<String> {
        if self.driver_id.is_empty() || self.device_id.is_empty() {
            return Err(Error::InvalidPairingKey);
        }
        Ok(format!("{}.{}", self.driver_id, self.device_id))
    }

    fn key(&self) -> Result<EntityKey> {
        Ok(key_for(&self.pairing_id()?))
    }
}

fn key_for(pairing_id: &str) -> EntityKey {
    EntityKey::new(ENTITY_KIND, pairing_id)
}

/// Paired-device adapter over the generic KV store
#[derive(Clone)]
pub struct PairedDeviceStore {
    kv: KvStore,
}

impl PairedDeviceStore {
    /// Create a new store adapter
    #[must_use]
    pub const fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Persist a pairing record, overwriting any record with the same ID
    ///
    /// # Errors
    ///
    /// Returns `InvalidPairingKey` if the record has an empty key
    /// component, or a database error
    pub fn save(&self, device: &PairedDevice) -> Result<()> {
        let key = device.key()?;
        let value = serde_json::to_string(device)?;
        self.kv.put(&key, &value)?;
        tracing::info!(pairing_id = %key.id, name = %device.device_name, "paired device saved");
        Ok(())
    }

    /// Load the record for a pairing ID
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` (by pairing ID) if absent
    pub fn load(&self, pairing_id: &str) -> Result<PairedDevice> {
        let value = self
            .kv
            .get(&key_for(pairing_id))?
            .ok_or_else(|| Error::unknown_pairing(pairing_id))?;
        Ok(serde_json::from_str(&value)?)
    }

    /// Delete the record for a pairing ID
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` (by pairing ID) if absent
    pub fn delete(&self, pairing_id: &str) -> Result<()> {
        if !self.kv.delete(&key_for(pairing_id))? {
            return Err(Error::unknown_pairing(pairing_id));
        }
        tracing::info!(pairing_id, "paired device removed");
        Ok(())
    }

    /// Load every pairing record
    ///
    /// Full key scan filtered to this entity kind; returns an empty
    /// vector on an empty store.
    ///
    /// # Errors
    ///
    /// Returns a database or deserialization error
    pub fn load_all(&self) -> Result<Vec<PairedDevice>> {
        let mut devices = Vec::new();
        for key in self.kv.list_keys()? {
            if key.kind != ENTITY_KIND {
                continue;
            }
            if let Some(value) = self.kv.get(&key)? {
                devices.push(serde_json::from_str(&value)?);
            }
        }
        Ok(devices)
    }
}
