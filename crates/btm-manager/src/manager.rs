//! Bluetooth manager - uniform object model over all registered transports
//!
//! The manager owns its own [`FactoryRegistry`] (there is no process-wide
//! registry, so independent managers can coexist), caches resolved handles
//! by URL, and evicts cached handles when their transport is unregistered.
//!
//! URLs addressed to the combined adapter (`://COMBINED/<device>/...`) are
//! resolved by finding the transport and physical adapter that currently
//! report the device.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use btm_core::{
    is_combined_adapter, Adapter, BluetoothError, BluetoothResult, BluetoothUrl, Characteristic,
    Device, DiscoveredAdapter, DiscoveredDevice, TransportFactory,
};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ManagerConfig;
use crate::invalidation::{InvalidationEvent, InvalidationQueue};
use crate::registry::FactoryRegistry;

/// A resolved handle held in the manager cache
#[derive(Clone)]
pub enum CachedObject {
    Adapter(Arc<dyn Adapter>),
    Device(Arc<dyn Device>),
    Characteristic(Arc<dyn Characteristic>),
}

impl CachedObject {
    fn kind(&self) -> ObjectKind {
        match self {
            CachedObject::Adapter(_) => ObjectKind::Adapter,
            CachedObject::Device(_) => ObjectKind::Device,
            CachedObject::Characteristic(_) => ObjectKind::Characteristic,
        }
    }
}

/// Kind of handle a cache entry holds; part of the cache key so that an
/// adapter and a device looked up through the same URL do not collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ObjectKind {
    Adapter,
    Device,
    Characteristic,
}

struct CacheEntry {
    /// Physical URL the handle was resolved through (differs from the cache
    /// key for combined-adapter lookups)
    resolved: BluetoothUrl,
    object: CachedObject,
}

/// Entry point for adapter/device/characteristic lookups
pub struct BluetoothManager {
    config: ManagerConfig,
    registry: Arc<FactoryRegistry>,
    /// Resolved handles by kind and requested URL
    cache: RwLock<HashMap<(ObjectKind, BluetoothUrl), CacheEntry>>,
    /// Bumped on every eviction pass; a handle resolved before a bump is
    /// not cached
    generation: AtomicU64,
    /// Pending invalidations; taken by the worker once spawned
    invalidations: Mutex<Option<mpsc::UnboundedReceiver<InvalidationEvent>>>,
}

impl BluetoothManager {
    /// Create a manager with an empty registry
    pub fn new(config: ManagerConfig) -> Self {
        let (queue, rx) = InvalidationQueue::channel();
        Self {
            config,
            registry: Arc::new(FactoryRegistry::new(Arc::new(queue))),
            cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            invalidations: Mutex::new(Some(rx)),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The registry owned by this manager
    pub fn registry(&self) -> &Arc<FactoryRegistry> {
        &self.registry
    }

    pub fn register_factory(&self, factory: Arc<dyn TransportFactory>) {
        self.registry.register(factory);
    }

    /// Unregister a transport. Its cached handles are evicted once the
    /// resulting invalidation event is processed.
    pub fn unregister_factory(&self, factory: &dyn TransportFactory) {
        self.registry.unregister(factory);
    }

    pub fn discovered_adapters(&self) -> Vec<DiscoveredAdapter> {
        self.registry.all_discovered_adapters()
    }

    pub fn discovered_devices(&self) -> Vec<DiscoveredDevice> {
        self.registry.all_discovered_devices()
    }

    /// Devices of every transport re-addressed under the combined adapter.
    ///
    /// A device seen through several adapters appears once; the first
    /// observation wins.
    pub fn combined_discovered_devices(&self) -> Vec<DiscoveredDevice> {
        let mut seen = HashSet::new();
        self.registry
            .all_discovered_devices()
            .iter()
            .map(DiscoveredDevice::to_combined)
            .filter(|device| seen.insert(device.url.clone()))
            .collect()
    }

    pub fn get_adapter(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Adapter>> {
        if is_combined_adapter(url) {
            return Err(BluetoothError::NotSupported(format!(
                "combined adapter has no native handle: {}",
                url
            )));
        }
        if let Some(CachedObject::Adapter(adapter)) = self.cached(ObjectKind::Adapter, url) {
            return Ok(adapter);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let adapter = self.registry.get_adapter(url)?;
        self.store(url, url, generation, CachedObject::Adapter(adapter.clone()));
        Ok(adapter)
    }

    pub fn get_device(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Device>> {
        if let Some(CachedObject::Device(device)) = self.cached(ObjectKind::Device, url) {
            return Ok(device);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let resolved = self.physical_url(url)?;
        let device = self.registry.get_device(&resolved)?;
        self.store(url, &resolved, generation, CachedObject::Device(device.clone()));
        Ok(device)
    }

    pub fn get_characteristic(
        &self,
        url: &BluetoothUrl,
    ) -> BluetoothResult<Arc<dyn Characteristic>> {
        if let Some(CachedObject::Characteristic(characteristic)) =
            self.cached(ObjectKind::Characteristic, url)
        {
            return Ok(characteristic);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let resolved = self.physical_url(url)?;
        let characteristic = self.registry.get_characteristic(&resolved)?;
        self.store(
            url,
            &resolved,
            generation,
            CachedObject::Characteristic(characteristic.clone()),
        );
        Ok(characteristic)
    }

    /// Map a combined-adapter URL to the physical URL of a transport that
    /// currently reports the device. Other URLs are returned unchanged.
    pub fn physical_url(&self, url: &BluetoothUrl) -> BluetoothResult<BluetoothUrl> {
        if !is_combined_adapter(url) {
            return Ok(url.clone());
        }
        if !self.config.combined_adapters {
            return Err(BluetoothError::NotSupported(format!(
                "combined adapters are disabled: {}",
                url
            )));
        }

        let device_address = url.device_address().ok_or_else(|| {
            BluetoothError::InvalidAddress(format!("combined URL has no device: {}", url))
        })?;

        let physical = self
            .registry
            .all_discovered_devices()
            .into_iter()
            .find(|device| device.url.device_address() == Some(device_address))
            .ok_or_else(|| BluetoothError::NotFound(url.to_string()))?;

        let resolved = match url.characteristic_id() {
            Some(characteristic) => physical.url.copy_with_characteristic(characteristic),
            None => physical.url,
        };
        debug!(url = %url, resolved = %resolved, "Resolved combined adapter URL");
        Ok(resolved)
    }

    fn cached(&self, kind: ObjectKind, url: &BluetoothUrl) -> Option<CachedObject> {
        self.cache
            .read()
            .get(&(kind, url.clone()))
            .map(|entry| entry.object.clone())
    }

    /// Cache a handle resolved at `generation`.
    ///
    /// The handle is dropped instead if an eviction pass ran since, or if its
    /// transport is no longer registered (its invalidation may still be
    /// queued).
    fn store(
        &self,
        url: &BluetoothUrl,
        resolved: &BluetoothUrl,
        generation: u64,
        object: CachedObject,
    ) {
        if !self.config.cache_handles {
            return;
        }

        let mut cache = self.cache.write();
        let transport_alive = resolved
            .protocol()
            .is_some_and(|protocol| self.registry.is_registered(protocol));
        if !transport_alive || self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                url = %url,
                resolved = %resolved,
                "Not caching handle resolved before invalidation"
            );
            return;
        }
        cache.insert(
            (object.kind(), url.clone()),
            CacheEntry {
                resolved: resolved.clone(),
                object,
            },
        );
    }

    /// URLs of all cached handles, sorted and deduplicated
    pub fn cached_urls(&self) -> Vec<BluetoothUrl> {
        let mut urls: Vec<_> = self
            .cache
            .read()
            .keys()
            .map(|(_, url)| url.clone())
            .collect();
        urls.sort();
        urls.dedup();
        urls
    }

    /// Evict every cached handle addressed at or below `root`, either by its
    /// requested URL or by the physical URL it was resolved through.
    ///
    /// Returns the number of evicted handles.
    pub fn invalidate_descendants(&self, root: &BluetoothUrl) -> usize {
        let under_root = |url: &BluetoothUrl| url == root || url.is_descendant_of(root);

        let mut cache = self.cache.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        let before = cache.len();
        cache.retain(|(_, url), entry| !(under_root(url) || under_root(&entry.resolved)));
        let evicted = before - cache.len();

        if evicted > 0 {
            info!(root = %root, evicted, "Evicted stale Bluetooth objects");
        } else {
            debug!(root = %root, "No cached objects to evict");
        }
        evicted
    }

    /// Apply all queued invalidations on the calling thread.
    ///
    /// Returns the number of events processed; always 0 once the background
    /// worker owns the queue.
    pub fn process_pending_invalidations(&self) -> usize {
        let mut guard = self.invalidations.lock();
        let Some(rx) = guard.as_mut() else {
            return 0;
        };

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        drop(guard);

        for event in &events {
            self.invalidate_descendants(&event.root);
        }
        events.len()
    }

    /// Spawn a task applying invalidations as they arrive.
    ///
    /// Returns `None` if a worker was already spawned. The task ends when the
    /// manager is dropped.
    pub fn spawn_invalidation_worker(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut rx = self.invalidations.lock().take()?;
        let manager: Weak<Self> = Arc::downgrade(self);

        Some(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                manager.invalidate_descendants(&event.root);
            }
            debug!("Invalidation worker stopped");
        }))
    }
}

impl Default for BluetoothManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}
