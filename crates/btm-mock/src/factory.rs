//! Mock transport factory for testing

use std::sync::Arc;

use btm_core::{
    Adapter, BluetoothError, BluetoothResult, BluetoothUrl, Characteristic, CharacteristicAccess,
    Device, DiscoveredAdapter, DiscoveredDevice, TransportFactory,
};
use parking_lot::RwLock;
use tracing::debug;

use crate::config::MockTransportConfig;
use crate::objects::{MockAdapter, MockCharacteristic, MockDevice};

#[derive(Default)]
struct MockState {
    adapters: Vec<Arc<MockAdapter>>,
    devices: Vec<Arc<MockDevice>>,
    characteristics: Vec<Arc<MockCharacteristic>>,
}

/// In-memory transport.
///
/// Objects are matched by their path (adapter, device, characteristic)
/// regardless of the protocol component of the requested URL.
pub struct MockTransportFactory {
    protocol: String,
    state: RwLock<MockState>,
}

impl MockTransportFactory {
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            state: RwLock::new(MockState::default()),
        }
    }

    /// Build a transport populated from configuration.
    ///
    /// Fails with [`BluetoothError::InvalidAddress`] if a configured protocol
    /// or address cannot be expressed as a URL.
    pub fn from_config(config: &MockTransportConfig) -> BluetoothResult<Self> {
        let factory = Self::new(config.protocol.clone());
        for adapter_cfg in &config.adapters {
            let url = BluetoothUrl::try_new(
                config.protocol.as_str(),
                adapter_cfg.address.as_str(),
                "",
                "",
            )?;
            let adapter = MockAdapter::new(url, adapter_cfg.name.clone());
            adapter.set_alias(adapter_cfg.alias.clone());
            adapter.set_powered_state(adapter_cfg.powered);
            factory.state.write().adapters.push(Arc::new(adapter));

            for device_cfg in &adapter_cfg.devices {
                let url = BluetoothUrl::try_new(
                    config.protocol.as_str(),
                    adapter_cfg.address.as_str(),
                    device_cfg.address.as_str(),
                    "",
                )?;
                let device = MockDevice::new(url.clone(), device_cfg.name.clone())
                    .with_bluetooth_class(device_cfg.bluetooth_class)
                    .with_ble_enabled(device_cfg.ble_enabled);
                device.set_alias(device_cfg.alias.clone());
                factory.state.write().devices.push(Arc::new(device));

                for characteristic_cfg in &device_cfg.characteristics {
                    factory.insert_characteristic(
                        url.copy_with_characteristic(characteristic_cfg.id.as_str()),
                        characteristic_cfg.flags.clone(),
                        characteristic_cfg.value.clone(),
                    );
                }
            }
        }
        {
            let state = factory.state.read();
            debug!(
                protocol = %factory.protocol,
                adapters = state.adapters.len(),
                devices = state.devices.len(),
                "Mock transport created from config"
            );
        }
        Ok(factory)
    }

    fn url(&self, adapter: &str, device: &str, characteristic: &str) -> BluetoothUrl {
        BluetoothUrl::new(self.protocol.as_str(), adapter, device, characteristic)
    }

    pub fn add_adapter(&self, address: &str, name: Option<&str>) -> Arc<MockAdapter> {
        let adapter = Arc::new(MockAdapter::new(
            self.url(address, "", ""),
            name.map(str::to_string),
        ));
        self.state.write().adapters.push(adapter.clone());
        adapter
    }

    pub fn add_device(&self, adapter: &str, address: &str, name: Option<&str>) -> Arc<MockDevice> {
        let device = Arc::new(MockDevice::new(
            self.url(adapter, address, ""),
            name.map(str::to_string),
        ));
        self.state.write().devices.push(device.clone());
        device
    }

    /// Add a readable and writable characteristic
    pub fn add_characteristic(
        &self,
        adapter: &str,
        device: &str,
        id: &str,
        value: Vec<u8>,
    ) -> Arc<MockCharacteristic> {
        self.insert_characteristic(
            self.url(adapter, device, id),
            vec![CharacteristicAccess::Read, CharacteristicAccess::Write],
            value,
        )
    }

    fn insert_characteristic(
        &self,
        url: BluetoothUrl,
        flags: Vec<CharacteristicAccess>,
        value: Vec<u8>,
    ) -> Arc<MockCharacteristic> {
        let characteristic = Arc::new(MockCharacteristic::new(url, flags, value));
        self.state
            .write()
            .characteristics
            .push(characteristic.clone());
        characteristic
    }

    /// Forget a device and its characteristics (simulates the device going
    /// out of range). Returns whether the device was known.
    pub fn remove_device(&self, adapter: &str, address: &str) -> bool {
        let target = self.url(adapter, address, "");
        let mut state = self.state.write();
        let before = state.devices.len();
        state.devices.retain(|device| device.url() != &target);
        state
            .characteristics
            .retain(|characteristic| !characteristic.url().is_descendant_of(&target));
        state.devices.len() != before
    }
}

/// Compare the path components of two URLs, ignoring the protocol
fn same_path(a: &BluetoothUrl, b: &BluetoothUrl) -> bool {
    a.copy_without_protocol() == b.copy_without_protocol()
}

impl TransportFactory for MockTransportFactory {
    fn protocol_name(&self) -> &str {
        &self.protocol
    }

    fn get_adapter(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Adapter>> {
        let target = url.adapter_url();
        self.state
            .read()
            .adapters
            .iter()
            .find(|adapter| same_path(adapter.url(), &target))
            .map(|adapter| adapter.clone() as Arc<dyn Adapter>)
            .ok_or_else(|| BluetoothError::NotFound(url.to_string()))
    }

    fn get_device(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Device>> {
        let target = url.device_url();
        self.state
            .read()
            .devices
            .iter()
            .find(|device| same_path(device.url(), &target))
            .map(|device| device.clone() as Arc<dyn Device>)
            .ok_or_else(|| BluetoothError::NotFound(url.to_string()))
    }

    fn get_characteristic(&self, url: &BluetoothUrl) -> BluetoothResult<Arc<dyn Characteristic>> {
        self.state
            .read()
            .characteristics
            .iter()
            .find(|characteristic| same_path(characteristic.url(), url))
            .map(|characteristic| characteristic.clone() as Arc<dyn Characteristic>)
            .ok_or_else(|| BluetoothError::NotFound(url.to_string()))
    }

    fn discovered_adapters(&self) -> Vec<DiscoveredAdapter> {
        self.state
            .read()
            .adapters
            .iter()
            .map(|adapter| {
                DiscoveredAdapter::new(adapter.url().clone(), adapter.name(), adapter.alias())
            })
            .collect()
    }

    fn discovered_devices(&self) -> Vec<DiscoveredDevice> {
        self.state
            .read()
            .devices
            .iter()
            .map(|device| {
                let discovered =
                    DiscoveredDevice::new(device.url().clone(), device.name(), device.alias())
                        .with_ble_enabled(device.ble_enabled());
                match device.bluetooth_class() {
                    Some(class) => discovered.with_bluetooth_class(class),
                    None => discovered,
                }
            })
            .collect()
    }
}
