//! Discovery snapshots.
//!
//! Transports produce one snapshot per discovery event. Snapshots are
//! immutable and their identity is their URL: a re-discovered object with a
//! new name or alias replaces the stale snapshot in any URL-keyed container
//! instead of duplicating it.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::combined::is_combined_adapter;
use crate::url::BluetoothUrl;

/// Display name used when a transport reported neither a name nor an alias
pub const UNKNOWN_DISPLAY_NAME: &str = "<unknown>";

/// Common view of discovered adapters and devices
pub trait DiscoveredObject {
    fn url(&self) -> &BluetoothUrl;

    fn name(&self) -> Option<&str>;

    fn alias(&self) -> Option<&str>;

    /// Whether the object is the virtual combined adapter (or lives under it)
    fn is_combined(&self) -> bool {
        false
    }

    /// Alias if set, otherwise name, otherwise [`UNKNOWN_DISPLAY_NAME`]
    fn display_name(&self) -> &str {
        self.alias()
            .filter(|alias| !alias.is_empty())
            .or_else(|| self.name().filter(|name| !name.is_empty()))
            .unwrap_or(UNKNOWN_DISPLAY_NAME)
    }
}

/// Snapshot of a discovered adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredAdapter {
    pub url: BluetoothUrl,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl DiscoveredAdapter {
    pub fn new(url: BluetoothUrl, name: Option<String>, alias: Option<String>) -> Self {
        Self { url, name, alias }
    }
}

impl DiscoveredObject for DiscoveredAdapter {
    fn url(&self) -> &BluetoothUrl {
        &self.url
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn is_combined(&self) -> bool {
        is_combined_adapter(&self.url)
    }
}

impl PartialEq for DiscoveredAdapter {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for DiscoveredAdapter {}

impl Hash for DiscoveredAdapter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for DiscoveredAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Adapter] {} [{}]", self.url, self.display_name())
    }
}

/// Snapshot of a discovered device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub url: BluetoothUrl,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Bluetooth class of device, when the stack reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bluetooth_class: Option<u32>,
    /// Device advertises over Bluetooth Low Energy
    #[serde(default)]
    pub ble_enabled: bool,
}

impl DiscoveredDevice {
    pub fn new(url: BluetoothUrl, name: Option<String>, alias: Option<String>) -> Self {
        Self {
            url,
            name,
            alias,
            bluetooth_class: None,
            ble_enabled: false,
        }
    }

    pub fn with_bluetooth_class(mut self, bluetooth_class: u32) -> Self {
        self.bluetooth_class = Some(bluetooth_class);
        self
    }

    pub fn with_ble_enabled(mut self, ble_enabled: bool) -> Self {
        self.ble_enabled = ble_enabled;
        self
    }

    /// Copy of this snapshot re-addressed under the combined adapter
    pub fn to_combined(&self) -> Self {
        Self {
            url: self.url.to_combined(),
            ..self.clone()
        }
    }
}

impl DiscoveredObject for DiscoveredDevice {
    fn url(&self) -> &BluetoothUrl {
        &self.url
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// A device reports combined when it is addressed under the combined
    /// adapter, as produced by [`DiscoveredDevice::to_combined`].
    fn is_combined(&self) -> bool {
        is_combined_adapter(&self.url)
    }
}

impl PartialEq for DiscoveredDevice {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for DiscoveredDevice {}

impl Hash for DiscoveredDevice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for DiscoveredDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Device] {} [{}]", self.url, self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn adapter_url() -> BluetoothUrl {
        BluetoothUrl::new("tinyb", "11:22:33:44:55:66", "", "")
    }

    #[test]
    fn test_adapter_identity_is_url() {
        let first = DiscoveredAdapter::new(adapter_url(), Some("hci0".into()), None);
        let second =
            DiscoveredAdapter::new(adapter_url(), Some("renamed".into()), Some("Kitchen".into()));

        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));
        assert_eq!(hash_of(&first), hash_of(&adapter_url()));
    }

    #[test]
    fn test_rediscovered_snapshot_replaces_stale_one() {
        let mut seen = HashSet::new();
        seen.insert(DiscoveredAdapter::new(adapter_url(), Some("old".into()), None));
        let fresh = DiscoveredAdapter::new(adapter_url(), Some("new".into()), None);
        seen.replace(fresh);

        assert_eq!(seen.len(), 1);
        assert_eq!(seen.iter().next().unwrap().name(), Some("new"));
    }

    #[test]
    fn test_display_name_preference() {
        let url = adapter_url();
        let both = DiscoveredAdapter::new(url.clone(), Some("name".into()), Some("alias".into()));
        let name_only = DiscoveredAdapter::new(url.clone(), Some("name".into()), None);
        let empty_alias = DiscoveredAdapter::new(url.clone(), Some("name".into()), Some("".into()));
        let neither = DiscoveredAdapter::new(url, None, None);

        assert_eq!(both.display_name(), "alias");
        assert_eq!(name_only.display_name(), "name");
        assert_eq!(empty_alias.display_name(), "name");
        assert_eq!(neither.display_name(), UNKNOWN_DISPLAY_NAME);
    }

    #[test]
    fn test_combined_adapter_flag() {
        let physical = DiscoveredAdapter::new(adapter_url(), None, None);
        let combined = DiscoveredAdapter::new(BluetoothUrl::new("", "combined", "", ""), None, None);
        assert!(!physical.is_combined());
        assert!(combined.is_combined());
    }

    #[test]
    fn test_device_under_combined_adapter_is_combined() {
        let url = BluetoothUrl::new("tinyb", "hci0", "AA:BB", "");
        let physical = DiscoveredDevice::new(url, None, None);
        let combined = physical.to_combined();
        assert!(!physical.is_combined());
        assert!(combined.is_combined());
        assert_eq!(combined.url.to_string(), "://COMBINED/AA:BB");
    }

    #[test]
    fn test_device_identity_ignores_metadata() {
        let url = BluetoothUrl::new("tinyb", "hci0", "AA:BB", "");
        let first = DiscoveredDevice::new(url.clone(), Some("Sensor".into()), None)
            .with_bluetooth_class(0x1F00);
        let second = DiscoveredDevice::new(url, None, Some("Porch".into())).with_ble_enabled(true);

        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));
        assert_eq!(second.display_name(), "Porch");
    }

    #[test]
    fn test_display() {
        let device = DiscoveredDevice::new(
            BluetoothUrl::new("tinyb", "hci0", "AA:BB", ""),
            Some("Sensor".into()),
            None,
        );
        assert_eq!(device.to_string(), "[Device] tinyb://hci0/AA:BB [Sensor]");
        assert_eq!(
            device.to_combined().to_string(),
            "[Device] ://COMBINED/AA:BB [Sensor]"
        );
    }
}
