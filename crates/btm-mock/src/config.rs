//! Mock transport configuration
//!
//! Describes the adapters, devices and characteristics an in-memory
//! transport reports, so demo setups and tests can be written as TOML.

use btm_core::CharacteristicAccess;
use serde::{Deserialize, Serialize};

/// Configuration for a mock transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockTransportConfig {
    /// Protocol name the transport registers under
    pub protocol: String,
    /// Adapters reported by the transport
    #[serde(default)]
    pub adapters: Vec<MockAdapterConfig>,
}

/// A mock adapter and the devices visible through it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockAdapterConfig {
    /// Adapter address (e.g. "hci0" or a MAC address)
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default = "default_powered")]
    pub powered: bool,
    #[serde(default)]
    pub devices: Vec<MockDeviceConfig>,
}

fn default_powered() -> bool {
    true
}

/// A mock remote device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockDeviceConfig {
    /// Device MAC address
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bluetooth_class: Option<u32>,
    #[serde(default = "default_ble_enabled")]
    pub ble_enabled: bool,
    #[serde(default)]
    pub characteristics: Vec<MockCharacteristicConfig>,
}

fn default_ble_enabled() -> bool {
    true
}

/// A mock GATT characteristic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockCharacteristicConfig {
    /// Characteristic identifier (UUID or "service/characteristic")
    pub id: String,
    #[serde(default = "default_flags")]
    pub flags: Vec<CharacteristicAccess>,
    /// Initial value
    #[serde(default)]
    pub value: Vec<u8>,
}

fn default_flags() -> Vec<CharacteristicAccess> {
    vec![CharacteristicAccess::Read, CharacteristicAccess::Write]
}
