//! Shared test utilities

use std::sync::Arc;
use std::time::Duration;

use ember_hub::db::{self, KvStore, PairedDeviceStore};
use ember_hub::drivers::demo::DEMO_PIN;
use ember_hub::{DemoDriver, DeviceDriver, DriverRegistry, HubManager, InstanceCache};

/// Build a hub manager over an in-memory store and the demo driver
///
/// Returns the driver alongside the manager so tests can inspect
/// executed commands and toggle failure modes.
#[must_use]
pub fn setup_hub() -> (Arc<DemoDriver>, HubManager) {
    setup_hub_with_ttl(Duration::from_secs(300))
}

/// Same as [`setup_hub`] but with a custom cache TTL
#[must_use]
pub fn setup_hub_with_ttl(ttl: Duration) -> (Arc<DemoDriver>, HubManager) {
    let driver = Arc::new(DemoDriver::new());
    let mut registry = DriverRegistry::new();
    registry.register(Arc::clone(&driver) as Arc<dyn DeviceDriver>);

    let pool = db::init_memory().expect("failed to init test db");
    let store = PairedDeviceStore::new(KvStore::new(pool));
    let manager = HubManager::new(Arc::new(registry), InstanceCache::new(16, ttl), store);
    (driver, manager)
}

/// Run the full pairing protocol against the demo driver
///
/// Returns the resulting pairing ID.
pub async fn pair_demo_device(manager: &HubManager) -> String {
    let start = manager
        .start_pairing(DemoDriver::DRIVER_ID, "virtual-tv", "Test Remote")
        .await
        .expect("start_pairing failed");
    assert!(start.device_provides_pin);

    let paired = manager
        .finalize_pairing(
            DemoDriver::DRIVER_ID,
            "virtual-tv",
            &start.pairing_request_id,
            DEMO_PIN,
            start.device_provides_pin,
        )
        .await
        .expect("finalize_pairing failed");
    assert!(paired);

    format!("{}.virtual-tv", DemoDriver::DRIVER_ID)
}
