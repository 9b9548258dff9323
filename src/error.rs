//! Error types for the Ember hub

use thiserror::Error;

use crate::drivers::DriverError;

/// Result type alias for hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Ember hub
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No installed driver has the given ID
    #[error("driver '{driver_id}' is not installed")]
    DriverNotFound {
        /// The driver ID that failed to resolve
        driver_id: String,
    },

    /// Device lookup failure
    ///
    /// Different call sites populate different fields: driver + device
    /// during registry resolution, pairing ID during store lookup and
    /// unpair.
    #[error("{}", device_not_found_message(.driver_id, .device_id, .pairing_id))]
    DeviceNotFound {
        /// Driver the device was looked up under, if known
        driver_id: Option<String>,
        /// Device ID within the driver, if known
        device_id: Option<String>,
        /// Pairing ID the lookup went through, if any
        pairing_id: Option<String>,
    },

    /// Pairing finalization failed
    ///
    /// Wraps driver protocol errors and invalid-key errors raised while
    /// completing a pairing; no store record is left behind.
    #[error(
        "pairing failed for request '{pairing_request_id}' (driver '{driver_id}', device '{device_id}')"
    )]
    PairingFailed {
        /// Driver the pairing ran against
        driver_id: String,
        /// Device that was being paired
        device_id: String,
        /// The driver-issued pairing request ID
        pairing_request_id: String,
    },

    /// A paired device exists but the driver could not produce a live instance
    #[error("driver could not instantiate device for pairing ID '{pairing_id}'")]
    InstanceUnavailable {
        /// Pairing ID whose instance could not be created
        pairing_id: String,
    },

    /// A pairing ID was constructed from a record with an empty component
    #[error("pairing key has an empty driver or device component")]
    InvalidPairingKey,

    /// Driver-internal protocol error (opaque)
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Device-not-found scoped to a driver/device pair (registry resolution)
    #[must_use]
    pub fn device_not_found(driver_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            driver_id: Some(driver_id.into()),
            device_id: Some(device_id.into()),
            pairing_id: None,
        }
    }

    /// Device-not-found scoped to a pairing ID (store lookup, unpair)
    #[must_use]
    pub fn unknown_pairing(pairing_id: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            driver_id: None,
            device_id: None,
            pairing_id: Some(pairing_id.into()),
        }
    }
}

fn device_not_found_message(
    driver_id: &Option<String>,
    device_id: &Option<String>,
    pairing_id: &Option<String>,
) -> String {
    pairing_id.as_ref().map_or_else(
        || {
            format!(
                "driver '{}' has no device with ID '{}'",
                driver_id.as_deref().unwrap_or("?"),
                device_id.as_deref().unwrap_or("?"),
            )
        },
        |pid| format!("no paired device with pairing ID '{pid}'"),
    )
}
