//! TransportFactory trait - the core abstraction for Bluetooth transports
//!
//! Each native Bluetooth stack binding (user-space BLE stack, system bus,
//! USB dongle, ...) implements [`TransportFactory`] and is registered under
//! its protocol name. The manager routes every lookup to the factory whose
//! protocol matches the URL, and hands back the object handles defined here.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::discovered::{DiscoveredAdapter, DiscoveredDevice};
use crate::error::{BluetoothError, BluetoothResult};
use crate::url::BluetoothUrl;

/// A backend binding to one native Bluetooth stack.
///
/// Lookups take a URL scoped to the requested level; the protocol component
/// may be absent since the registry has already selected the factory.
/// Implementations may block on their native stack: callers never invoke
/// them while holding registry locks.
pub trait TransportFactory: Send + Sync {
    /// Stable protocol identifier (e.g. `tinyb`, `dbus`)
    fn protocol_name(&self) -> &str;

    /// Resolve an adapter; fails with `NotFound` if the transport has none
    fn get_adapter(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Adapter>>;

    /// Resolve a device
    fn get_device(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Device>>;

    /// Resolve a characteristic
    fn get_characteristic(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Characteristic>>;

    /// Adapters currently known to the transport
    fn discovered_adapters(&self) -> Vec<DiscoveredAdapter>;

    /// Devices currently known to the transport
    fn discovered_devices(&self) -> Vec<DiscoveredDevice>;
}

/// Handle to a Bluetooth adapter
#[async_trait]
pub trait Adapter: Send + Sync {
    fn url(&self) -> &BluetoothUrl;

    fn name(&self) -> Option<String>;

    fn alias(&self) -> Option<String> {
        None
    }

    fn is_powered(&self) -> bool;

    async fn set_powered(&self, powered: bool) -> BluetoothResult<()> {
        let _ = powered;
        Err(BluetoothError::NotSupported("set_powered".to_string()))
    }

    fn is_discovering(&self) -> bool {
        false
    }

    async fn start_discovery(&self) -> BluetoothResult<()> {
        Err(BluetoothError::NotSupported("start_discovery".to_string()))
    }

    async fn stop_discovery(&self) -> BluetoothResult<()> {
        Err(BluetoothError::NotSupported("stop_discovery".to_string()))
    }
}

/// Handle to a remote Bluetooth device
#[async_trait]
pub trait Device: Send + Sync {
    fn url(&self) -> &BluetoothUrl;

    fn name(&self) -> Option<String>;

    fn alias(&self) -> Option<String> {
        None
    }

    fn is_connected(&self) -> bool;

    async fn connect(&self) -> BluetoothResult<()>;

    async fn disconnect(&self) -> BluetoothResult<()>;
}

/// GATT characteristic access flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicAccess {
    Read,
    Write,
    WriteWithoutResponse,
    Notify,
    Indicate,
}

/// Handle to a GATT characteristic
#[async_trait]
pub trait Characteristic: Send + Sync {
    fn url(&self) -> &BluetoothUrl;

    fn flags(&self) -> Vec<CharacteristicAccess>;

    async fn read_value(&self) -> BluetoothResult<Vec<u8>> {
        Err(BluetoothError::NotSupported("read_value".to_string()))
    }

    async fn write_value(&self, data: &[u8]) -> BluetoothResult<()> {
        let _ = data;
        Err(BluetoothError::NotSupported("write_value".to_string()))
    }
}
