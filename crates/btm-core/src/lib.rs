//! btm-core - Core traits and types for the Bluetooth manager
//!
//! This crate provides the addressing scheme, discovery snapshots, error
//! taxonomy and the transport abstraction that allow different native
//! Bluetooth stacks to sit behind one object model
//! (adapter → device → characteristic).

pub mod combined;
pub mod discovered;
pub mod error;
pub mod transport;
pub mod url;

pub use combined::{is_combined_adapter, COMBINED_ADAPTER_ADDRESS};
pub use discovered::{DiscoveredAdapter, DiscoveredDevice, DiscoveredObject, UNKNOWN_DISPLAY_NAME};
pub use error::{BluetoothError, BluetoothResult, ErrorKind};
pub use transport::{Adapter, Characteristic, CharacteristicAccess, Device, TransportFactory};
pub use url::BluetoothUrl;
