//! btm-manager - Transport registry and Bluetooth manager
//!
//! This crate routes Bluetooth object lookups to the transport that serves
//! them and keeps the manager's view consistent as transports come and go.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       BluetoothManager                           │
//! │  - Caches resolved handles by URL                                │
//! │  - Resolves combined-adapter URLs                                │
//! │  - Evicts handles of unregistered transports                     │
//! │                                                                  │
//! │  ┌───────────────────────────┐      ┌─────────────────────────┐  │
//! │  │      FactoryRegistry      │─────▶│   InvalidationQueue     │  │
//! │  │  protocol → factory       │ root │  (drained by manager)   │  │
//! │  └─────────────┬─────────────┘      └─────────────────────────┘  │
//! │                │                                                 │
//! │        ┌───────┼───────────────┐                                 │
//! │        ▼       ▼               ▼                                 │
//! │   ┌─────────┐ ┌─────────┐ ┌─────────┐                            │
//! │   │  tinyb  │ │  dbus   │ │ bluegiga│   TransportFactory impls   │
//! │   └─────────┘ └─────────┘ └─────────┘                            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use btm_manager::{BluetoothManager, ManagerConfig};
//!
//! let manager = Arc::new(BluetoothManager::new(ManagerConfig::default()));
//! manager.spawn_invalidation_worker();
//!
//! manager.register_factory(Arc::new(tinyb_transport));
//! let device = manager.get_device(&"tinyb://hci0/AA:BB:CC:DD:EE:FF".parse()?)?;
//! ```

pub mod config;
pub mod invalidation;
pub mod manager;
pub mod registry;

pub use config::ManagerConfig;
pub use invalidation::{DescendantInvalidator, InvalidationEvent, InvalidationQueue};
pub use manager::{BluetoothManager, CachedObject};
pub use registry::FactoryRegistry;

// Re-export core types for convenience
pub use btm_core::{BluetoothError, BluetoothResult, BluetoothUrl, TransportFactory};
