//! Transport factory registry
//!
//! Maps a protocol name to the one [`TransportFactory`] serving it, routes
//! URL lookups by their protocol component, and fans discovery queries out
//! to every registered transport.
//!
//! A single mutex guards the map. It is held only for bookkeeping: lookups
//! and fan-out copy what they need, release the lock, and then call into the
//! factories, so a slow native stack never blocks registration and a factory
//! may safely call back into the registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use btm_core::{
    Adapter, BluetoothError, BluetoothResult, BluetoothUrl, Characteristic, Device,
    DiscoveredAdapter, DiscoveredDevice, TransportFactory,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::invalidation::DescendantInvalidator;

/// Registry of transport factories keyed by protocol name
pub struct FactoryRegistry {
    /// Registered factories by protocol
    factories: Mutex<HashMap<String, Arc<dyn TransportFactory>>>,
    /// Notified after a protocol has been removed
    invalidator: Arc<dyn DescendantInvalidator>,
}

impl FactoryRegistry {
    /// Create an empty registry that reports removals to `invalidator`
    pub fn new(invalidator: Arc<dyn DescendantInvalidator>) -> Self {
        Self {
            factories: Mutex::new(HashMap::new()),
            invalidator,
        }
    }

    /// Register a factory under its protocol name.
    ///
    /// A factory already registered under the same protocol is replaced
    /// (last registration wins) and returned.
    pub fn register(&self, factory: Arc<dyn TransportFactory>) -> Option<Arc<dyn TransportFactory>> {
        let protocol = factory.protocol_name().to_string();
        let replaced = self.factories.lock().insert(protocol.clone(), factory);

        if replaced.is_some() {
            warn!(protocol = %protocol, "Replacing previously registered transport factory");
        } else {
            info!(protocol = %protocol, "Registered transport factory");
        }
        replaced
    }

    /// Unregister a factory by its protocol name.
    ///
    /// See [`unregister_protocol`](Self::unregister_protocol).
    pub fn unregister(&self, factory: &dyn TransportFactory) -> Option<Arc<dyn TransportFactory>> {
        self.unregister_protocol(factory.protocol_name())
    }

    /// Remove the factory serving `protocol`, then invalidate everything
    /// addressed under the protocol's root URL.
    ///
    /// Unknown protocols are not an error: nothing is removed, and the
    /// invalidation is still issued.
    pub fn unregister_protocol(&self, protocol: &str) -> Option<Arc<dyn TransportFactory>> {
        let removed = self.factories.lock().remove(protocol);

        if removed.is_some() {
            info!(protocol = %protocol, "Unregistered transport factory");
        } else {
            debug!(protocol = %protocol, "Unregister of unknown transport factory");
        }

        // The lock is released at this point; the invalidator may re-enter.
        self.invalidator
            .invalidate_descendants(&BluetoothUrl::with_protocol_only(protocol));
        removed
    }

    /// Get the factory registered under `protocol`
    pub fn resolve(&self, protocol: &str) -> BluetoothResult<Arc<dyn TransportFactory>> {
        self.factories
            .lock()
            .get(protocol)
            .cloned()
            .ok_or_else(|| BluetoothError::NotRegistered(protocol.to_string()))
    }

    /// Get the factory serving the URL's protocol component
    pub fn resolve_url(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn TransportFactory>> {
        let protocol = url.protocol().ok_or_else(|| {
            BluetoothError::InvalidAddress(format!("URL has no protocol: {}", url))
        })?;
        self.resolve(protocol)
    }

    /// Resolve an adapter through the transport named by the URL
    pub fn get_adapter(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Adapter>> {
        let factory = self.resolve_url(url)?;
        debug!(url = %url, "Resolving adapter");
        factory.get_adapter(url)
    }

    /// Resolve a device through the transport named by the URL
    pub fn get_device(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Device>> {
        let factory = self.resolve_url(url)?;
        debug!(url = %url, "Resolving device");
        factory.get_device(url)
    }

    /// Resolve a characteristic through the transport named by the URL
    pub fn get_characteristic(
        &self,
        url: &BluetoothUrl,
    ) -> BluetoothResult<Arc<dyn Characteristic>> {
        let factory = self.resolve_url(url)?;
        debug!(url = %url, "Resolving characteristic");
        factory.get_characteristic(url)
    }

    /// Registered factories ordered by protocol name, copied under the lock
    fn snapshot(&self) -> Vec<Arc<dyn TransportFactory>> {
        let factories = self.factories.lock();
        let mut entries: Vec<_> = factories.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .into_iter()
            .map(|(_, factory)| factory.clone())
            .collect()
    }

    /// Adapters discovered by every registered transport.
    ///
    /// Transports are visited in protocol name order and each keeps its own
    /// item order. No deduplication is performed.
    pub fn all_discovered_adapters(&self) -> Vec<DiscoveredAdapter> {
        self.snapshot()
            .iter()
            .flat_map(|factory| factory.discovered_adapters())
            .collect()
    }

    /// Devices discovered by every registered transport
    pub fn all_discovered_devices(&self) -> Vec<DiscoveredDevice> {
        self.snapshot()
            .iter()
            .flat_map(|factory| factory.discovered_devices())
            .collect()
    }

    /// Registered protocol names, sorted
    pub fn protocols(&self) -> Vec<String> {
        let mut protocols: Vec<String> = self.factories.lock().keys().cloned().collect();
        protocols.sort();
        protocols
    }

    pub fn is_registered(&self, protocol: &str) -> bool {
        self.factories.lock().contains_key(protocol)
    }

    pub fn len(&self) -> usize {
        self.factories.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.lock().is_empty()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("protocols", &self.protocols())
            .finish()
    }
}
