//! Device driver contract and registry
//!
//! Each driver covers one family of remote-controllable appliances and
//! implements the [`DeviceDriver`] capability set. Drivers register
//! with the [`DriverRegistry`] at startup; the hub manager never talks
//! to a driver except through the registry.

pub mod capability;
pub mod demo;
pub mod registry;
pub mod types;

pub use capability::{DeviceDriver, DeviceInstance, DriverError, DriverResult};
pub use demo::DemoDriver;
pub use registry::DriverRegistry;
pub use types::{
    AuthenticationMethod, DeviceCommand, DeviceInfo, DriverDescriptor, EMPTY_CELL, PairingStart,
    RemoteLayout,
};
