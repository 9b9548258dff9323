//! Instance cache - TTL-bounded memoization of driver lookups
//!
//! One cache serves two key namespaces: per-driver device listings and
//! per-pairing-ID live device instances. The key is a sum type so the
//! namespaces cannot collide. Entries expire on a fixed TTL and the
//! cache is capacity-bounded; a miss of either kind is a normal
//! control-flow branch that triggers recomputation from the
//! authoritative source, never an error. Concurrent misses for the same
//! key may both recompute; the last writer overwrites with an
//! equivalent value.

use std::sync::Arc;
use std::time::Duration;

use mini_moka::sync::Cache;

use crate::drivers::{DeviceInfo, DeviceInstance};

/// Default maximum number of cached entries
pub const DEFAULT_MAX_ENTRIES: u64 = 64;

/// Default per-entry time to live
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Cache key, split by namespace
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    /// Device listing for one driver ID
    Listing(String),

    /// Live instance for one pairing ID
    Instance(String),
}

/// Cached value, matching the key namespace
#[derive(Clone)]
enum CacheEntry {
    Listing(Arc<Vec<DeviceInfo>>),
    Instance(Arc<dyn DeviceInstance>),
}

/// TTL + capacity bounded cache for listings and live instances
#[derive(Clone)]
pub struct InstanceCache {
    entries: Cache<CacheKey, CacheEntry>,
}

impl InstanceCache {
    /// Create a cache with the given capacity and TTL
    #[must_use]
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Look up a cached device listing for a driver
    #[must_use]
    pub fn get_listing(&self, driver_id: &str) -> Option<Arc<Vec<DeviceInfo>>> {
        match self.entries.get(&CacheKey::Listing(driver_id.to_string())) {
            Some(CacheEntry::Listing(devices)) => Some(devices),
            _ => None,
        }
    }

    /// Memoize a device listing for a driver
    pub fn put_listing(&self, driver_id: &str, devices: Vec<DeviceInfo>) {
        self.entries.insert(
            CacheKey::Listing(driver_id.to_string()),
            CacheEntry::Listing(Arc::new(devices)),
        );
    }

    /// Look up a cached live instance for a pairing ID
    #[must_use]
    pub fn get_instance(&self, pairing_id: &str) -> Option<Arc<dyn DeviceInstance>> {
        match self.entries.get(&CacheKey::Instance(pairing_id.to_string())) {
            Some(CacheEntry::Instance(instance)) => Some(instance),
            _ => None,
        }
    }

    /// Memoize a live instance for a pairing ID
    pub fn put_instance(&self, pairing_id: &str, instance: Arc<dyn DeviceInstance>) {
        self.entries.insert(
            CacheKey::Instance(pairing_id.to_string()),
            CacheEntry::Instance(instance),
        );
    }

    /// Drop the instance entry for a pairing ID, if present
    ///
    /// Called on unpair so a stale handle is never reused for a device
    /// that is no longer paired.
    pub fn invalidate_instance(&self, pairing_id: &str) {
        self.entries
            .invalidate(&CacheKey::Instance(pairing_id.to_string()));
    }
}

impl Default for InstanceCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, Duration::from_secs(DEFAULT_TTL_SECS))
    }
}
