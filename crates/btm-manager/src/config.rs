//! Manager configuration

use serde::{Deserialize, Serialize};

/// Configuration for a [`BluetoothManager`](crate::BluetoothManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Resolve URLs addressed to the combined adapter across transports
    #[serde(default = "default_true")]
    pub combined_adapters: bool,
    /// Keep resolved handles in the manager cache
    #[serde(default = "default_true")]
    pub cache_handles: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            combined_adapters: true,
            cache_handles: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_table() {
        let config: ManagerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[test]
    fn test_parse_overrides() {
        let config: ManagerConfig = toml::from_str("combined_adapters = false").unwrap();
        assert!(!config.combined_adapters);
        assert!(config.cache_handles);
    }
}
