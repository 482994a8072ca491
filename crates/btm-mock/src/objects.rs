//! In-memory adapter, device and characteristic handles

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use btm_core::{
    Adapter, BluetoothError, BluetoothResult, BluetoothUrl, Characteristic, CharacteristicAccess,
    Device,
};
use parking_lot::RwLock;
use tracing::debug;

/// Mock adapter
pub struct MockAdapter {
    url: BluetoothUrl,
    name: Option<String>,
    alias: RwLock<Option<String>>,
    powered: AtomicBool,
    discovering: AtomicBool,
}

impl MockAdapter {
    pub fn new(url: BluetoothUrl, name: Option<String>) -> Self {
        Self {
            url,
            name,
            alias: RwLock::new(None),
            powered: AtomicBool::new(true),
            discovering: AtomicBool::new(false),
        }
    }

    pub fn set_alias(&self, alias: Option<String>) {
        *self.alias.write() = alias;
    }

    /// Set power state (simulates the radio being switched externally)
    pub fn set_powered_state(&self, powered: bool) {
        self.powered.store(powered, Ordering::SeqCst);
        if !powered {
            self.discovering.store(false, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    fn url(&self) -> &BluetoothUrl {
        &self.url
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn alias(&self) -> Option<String> {
        self.alias.read().clone()
    }

    fn is_powered(&self) -> bool {
        self.powered.load(Ordering::SeqCst)
    }

    async fn set_powered(&self, powered: bool) -> BluetoothResult<()> {
        self.set_powered_state(powered);
        Ok(())
    }

    fn is_discovering(&self) -> bool {
        self.discovering.load(Ordering::SeqCst)
    }

    async fn start_discovery(&self) -> BluetoothResult<()> {
        if !self.is_powered() {
            return Err(BluetoothError::Transport(format!(
                "adapter is powered off: {}",
                self.url
            )));
        }
        self.discovering.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_discovery(&self) -> BluetoothResult<()> {
        self.discovering.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock remote device
pub struct MockDevice {
    url: BluetoothUrl,
    name: Option<String>,
    alias: RwLock<Option<String>>,
    bluetooth_class: Option<u32>,
    ble_enabled: bool,
    connected: AtomicBool,
}

impl MockDevice {
    pub fn new(url: BluetoothUrl, name: Option<String>) -> Self {
        Self {
            url,
            name,
            alias: RwLock::new(None),
            bluetooth_class: None,
            ble_enabled: true,
            connected: AtomicBool::new(false),
        }
    }

    pub fn with_bluetooth_class(mut self, bluetooth_class: Option<u32>) -> Self {
        self.bluetooth_class = bluetooth_class;
        self
    }

    pub fn with_ble_enabled(mut self, ble_enabled: bool) -> Self {
        self.ble_enabled = ble_enabled;
        self
    }

    pub fn set_alias(&self, alias: Option<String>) {
        *self.alias.write() = alias;
    }

    pub fn bluetooth_class(&self) -> Option<u32> {
        self.bluetooth_class
    }

    pub fn ble_enabled(&self) -> bool {
        self.ble_enabled
    }
}

#[async_trait]
impl Device for MockDevice {
    fn url(&self) -> &BluetoothUrl {
        &self.url
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn alias(&self) -> Option<String> {
        self.alias.read().clone()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> BluetoothResult<()> {
        debug!(url = %self.url, "Mock device connected");
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> BluetoothResult<()> {
        debug!(url = %self.url, "Mock device disconnected");
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock GATT characteristic holding its value in memory
pub struct MockCharacteristic {
    url: BluetoothUrl,
    flags: Vec<CharacteristicAccess>,
    value: RwLock<Vec<u8>>,
}

impl MockCharacteristic {
    pub fn new(url: BluetoothUrl, flags: Vec<CharacteristicAccess>, value: Vec<u8>) -> Self {
        Self {
            url,
            flags,
            value: RwLock::new(value),
        }
    }

    fn allows(&self, access: CharacteristicAccess) -> bool {
        self.flags.contains(&access)
    }
}

#[async_trait]
impl Characteristic for MockCharacteristic {
    fn url(&self) -> &BluetoothUrl {
        &self.url
    }

    fn flags(&self) -> Vec<CharacteristicAccess> {
        self.flags.clone()
    }

    async fn read_value(&self) -> BluetoothResult<Vec<u8>> {
        if !self.allows(CharacteristicAccess::Read) {
            return Err(BluetoothError::NotSupported(format!("read {}", self.url)));
        }
        Ok(self.value.read().clone())
    }

    async fn write_value(&self, data: &[u8]) -> BluetoothResult<()> {
        if !self.allows(CharacteristicAccess::Write)
            && !self.allows(CharacteristicAccess::WriteWithoutResponse)
        {
            return Err(BluetoothError::NotSupported(format!("write {}", self.url)));
        }
        *self.value.write() = data.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn characteristic(flags: Vec<CharacteristicAccess>) -> MockCharacteristic {
        MockCharacteristic::new(
            BluetoothUrl::new("mock", "hci0", "AA:BB", "battery"),
            flags,
            vec![0x64],
        )
    }

    #[tokio::test]
    async fn test_read_write_value() {
        let c = characteristic(vec![CharacteristicAccess::Read, CharacteristicAccess::Write]);
        assert_eq!(c.read_value().await.unwrap(), vec![0x64]);
        c.write_value(&[0x10, 0x20]).await.unwrap();
        assert_eq!(c.read_value().await.unwrap(), vec![0x10, 0x20]);
    }

    #[tokio::test]
    async fn test_access_flags_are_enforced() {
        let notify_only = characteristic(vec![CharacteristicAccess::Notify]);
        assert!(matches!(
            notify_only.read_value().await,
            Err(BluetoothError::NotSupported(_))
        ));
        assert!(matches!(
            notify_only.write_value(&[1]).await,
            Err(BluetoothError::NotSupported(_))
        ));
    }

    #[tokio::test]
    async fn test_device_connection_state() {
        let device = MockDevice::new(BluetoothUrl::new("mock", "hci0", "AA:BB", ""), None);
        assert!(!device.is_connected());
        device.connect().await.unwrap();
        assert!(device.is_connected());
        device.disconnect().await.unwrap();
        assert!(!device.is_connected());
    }

    #[tokio::test]
    async fn test_discovery_requires_power() {
        let adapter = MockAdapter::new(BluetoothUrl::new("mock", "hci0", "", ""), None);
        adapter.start_discovery().await.unwrap();
        assert!(adapter.is_discovering());

        adapter.set_powered(false).await.unwrap();
        assert!(!adapter.is_discovering());
        assert!(matches!(
            adapter.start_discovery().await,
            Err(BluetoothError::Transport(_))
        ));
    }
}
