//! Ember Hub - home hub for pluggable remote-control device drivers
//!
//! This library provides the core functionality for the Ember hub:
//! - Driver registry over a fixed capability contract
//! - Pairing lifecycle management with durable pairing records
//! - TTL-cached resolution of pairing IDs to live device instances
//! - HTTP API and mDNS advertisement for remote apps
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Remote apps                         │
//! │        HTTP API  │  mDNS discovery                   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Hub Manager                         │
//! │   Pairing  │  Instance Cache  │  Paired-Device Store│
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Driver Registry                         │
//! │   one driver per appliance family (capability trait)│
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod discovery;
pub mod drivers;
pub mod error;
pub mod hub;

pub use cache::InstanceCache;
pub use config::Config;
pub use db::{DbConn, DbPool, EntityKey, KvStore, PairedDevice, PairedDeviceStore};
pub use discovery::MdnsAdvertiser;
pub use drivers::{
    AuthenticationMethod, DemoDriver, DeviceCommand, DeviceDriver, DeviceInfo, DeviceInstance,
    DriverDescriptor, DriverError, DriverRegistry, PairingStart, RemoteLayout,
};
pub use error::{Error, Result};
pub use hub::HubManager;
