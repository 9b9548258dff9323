//! mDNS service advertisement
//!
//! Advertises the hub using mDNS (multicast DNS) so that remote apps on
//! the local network can discover it automatically
//!
//! Service type: `_ember-hub._tcp.local.`
//! Instance name: the configured hub instance name
//!
//! TXT records:
//! - `version`: Hub version
//! - `url`: Base URL of the HTTP API

use std::collections::HashMap;
use std::sync::Arc;

use mdns_sd::{ServiceDaemon, ServiceInfo};
use tokio::sync::RwLock;

use crate::Result;

/// mDNS service type for the Ember hub
pub const SERVICE_TYPE: &str = "_ember-hub._tcp.local.";

/// mDNS advertiser for hub discovery
pub struct MdnsAdvertiser {
    /// mDNS daemon
    daemon: ServiceDaemon,

    /// Currently registered service (if any)
    registered_service: Arc<RwLock<Option<String>>>,
}

impl MdnsAdvertiser {
    /// Create a new mDNS advertiser
    ///
    /// # Errors
    ///
    /// Returns error if mDNS daemon cannot be created
    pub fn new() -> Result<Self> {
        let daemon = ServiceDaemon::new()
            .map_err(|e| crate::Error::Config(format!("failed to create mDNS daemon: {e}")))?;

        Ok(Self {
            daemon,
            registered_service: Arc::new(RwLock::new(None)),
        })
    }

    /// Start advertising the hub
    ///
    /// # Errors
    ///
    /// Returns error if the service cannot be registered
    pub async fn start(&self, instance_name: &str, port: u16) -> Result<()> {
        let hostname = hostname::get()
            .map_or_else(|_| "ember".to_string(), |h| h.to_string_lossy().to_string());

        let mut properties = HashMap::new();
        properties.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());
        properties.insert("url".to_string(), format!("http://{hostname}.local:{port}"));

        let service = ServiceInfo::new(
            SERVICE_TYPE,
            instance_name,
            &format!("{hostname}.local."),
            "",
            port,
            properties,
        )
        .map_err(|e| crate::Error::Config(format!("failed to create service info: {e}")))?;

        let fullname = service.get_fullname().to_string();

        self.daemon
            .register(service)
            .map_err(|e| crate::Error::Config(format!("failed to register mDNS service: {e}")))?;

        {
            let mut registered = self.registered_service.write().await;
            *registered = Some(fullname);
        }

        tracing::info!(
            service_type = SERVICE_TYPE,
            instance = instance_name,
            port,
            "mDNS service registered"
        );

        Ok(())
    }

    /// Stop advertising and shut the daemon down
    pub async fn stop(&self) {
        let registered = {
            let mut guard = self.registered_service.write().await;
            guard.take()
        };

        if let Some(fullname) = registered {
            if let Err(e) = self.daemon.unregister(&fullname) {
                tracing::warn!(error = %e, "failed to unregister mDNS service");
            }
        }

        if let Err(e) = self.daemon.shutdown() {
            tracing::debug!(error = %e, "mDNS daemon shutdown");
        }
    }
}
