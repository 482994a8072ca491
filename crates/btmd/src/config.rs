//! Daemon configuration file handling

use std::path::Path;

use anyhow::{Context, Result};
use btm_manager::ManagerConfig;
use btm_mock::{MockAdapterConfig, MockCharacteristicConfig, MockDeviceConfig, MockTransportConfig};
use serde::{Deserialize, Serialize};

/// Configuration for btmd
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Manager settings
    #[serde(default)]
    pub manager: ManagerConfig,
    /// Transports registered at startup
    #[serde(default)]
    pub transports: Vec<MockTransportConfig>,
}

impl DaemonConfig {
    /// Load configuration from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Built-in setup used when no config file is given: two transports that
    /// both see one shared device, so the combined adapter has work to do.
    pub fn demo() -> Self {
        let thermometer = |name: &str| MockDeviceConfig {
            address: "C4:7C:8D:6A:3E:21".to_string(),
            name: Some(name.to_string()),
            alias: None,
            bluetooth_class: None,
            ble_enabled: true,
            characteristics: vec![MockCharacteristicConfig {
                id: "0000180f-0000-1000-8000-00805f9b34fb/00002a19-0000-1000-8000-00805f9b34fb"
                    .to_string(),
                flags: vec![btm_core::CharacteristicAccess::Read],
                value: vec![87],
            }],
        };

        Self {
            manager: ManagerConfig::default(),
            transports: vec![
                MockTransportConfig {
                    protocol: "tinyb".to_string(),
                    adapters: vec![MockAdapterConfig {
                        address: "00:1A:7D:DA:71:13".to_string(),
                        name: Some("hci0".to_string()),
                        alias: Some("Built-in".to_string()),
                        powered: true,
                        devices: vec![thermometer("Flower care")],
                    }],
                },
                MockTransportConfig {
                    protocol: "dbus".to_string(),
                    adapters: vec![MockAdapterConfig {
                        address: "5C:F3:70:7B:8A:02".to_string(),
                        name: Some("hci1".to_string()),
                        alias: None,
                        powered: true,
                        devices: vec![
                            thermometer("Flower care"),
                            MockDeviceConfig {
                                address: "F0:98:9D:1C:4B:0E".to_string(),
                                name: None,
                                alias: Some("Door sensor".to_string()),
                                bluetooth_class: Some(0x1F00),
                                ble_enabled: true,
                                characteristics: Vec::new(),
                            },
                        ],
                    }],
                },
            ],
        }
    }
}
