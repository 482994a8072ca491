//! Hierarchical Bluetooth object addressing.
//!
//! Every Bluetooth object managed by the manager is addressed by a URL with
//! up to four ordered components:
//!
//! ```text
//! <protocol>://<adapter address>/<device address>/<characteristic id>
//! ```
//!
//! Lower components are meaningless without the ones above them, but partial
//! URLs are legal and act as scoping prefixes (e.g. `tinyb://` covers every
//! object served by the `tinyb` transport).
//!
//! Protocol, adapter and device components must not contain `/`; the
//! characteristic id is the remainder of the path and may. [`BluetoothUrl::try_new`]
//! enforces this for components that come from outside the program.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{BluetoothError, BluetoothResult};

/// Separator between the protocol and the path
pub const PROTOCOL_SEPARATOR: &str = "://";

/// Separator between path components
pub const PATH_SEPARATOR: char = '/';

/// Address of an adapter, device or characteristic.
///
/// Empty components are normalised to "absent", so `tinyb://hci0/` and
/// `tinyb://hci0` are the same URL. Equality and hashing cover all four
/// components and are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BluetoothUrl {
    protocol: Option<String>,
    adapter_address: Option<String>,
    device_address: Option<String>,
    characteristic_id: Option<String>,
}

fn component(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl BluetoothUrl {
    /// Build a URL from its four components. Empty strings mean "absent".
    ///
    /// ```
    /// # use btm_core::BluetoothUrl;
    /// let url = BluetoothUrl::new("tinyb", "11:22:33:44:55:66", "", "");
    /// assert_eq!(url.to_string(), "tinyb://11:22:33:44:55:66");
    /// ```
    pub fn new(
        protocol: impl Into<String>,
        adapter_address: impl Into<String>,
        device_address: impl Into<String>,
        characteristic_id: impl Into<String>,
    ) -> Self {
        Self {
            protocol: component(protocol),
            adapter_address: component(adapter_address),
            device_address: component(device_address),
            characteristic_id: component(characteristic_id),
        }
    }

    /// Build a URL from untrusted components.
    ///
    /// Fails with [`BluetoothError::InvalidAddress`] if the protocol, adapter
    /// or device component contains a path separator, since such a URL would
    /// not parse back to the same components.
    ///
    /// ```
    /// # use btm_core::BluetoothUrl;
    /// assert!(BluetoothUrl::try_new("tinyb", "hci0", "AA:BB", "180f/2a19").is_ok());
    /// assert!(BluetoothUrl::try_new("tinyb", "hci0/x", "AA:BB", "").is_err());
    /// ```
    pub fn try_new(
        protocol: impl Into<String>,
        adapter_address: impl Into<String>,
        device_address: impl Into<String>,
        characteristic_id: impl Into<String>,
    ) -> BluetoothResult<Self> {
        let url = Self::new(protocol, adapter_address, device_address, characteristic_id);
        let segments = [
            ("protocol", url.protocol()),
            ("adapter address", url.adapter_address()),
            ("device address", url.device_address()),
        ];
        for (label, value) in segments {
            if let Some(value) = value.filter(|value| value.contains(PATH_SEPARATOR)) {
                return Err(BluetoothError::InvalidAddress(format!(
                    "{} '{}' must not contain '{}'",
                    label, value, PATH_SEPARATOR
                )));
            }
        }
        Ok(url)
    }

    /// Root URL of a transport: only the protocol component is set.
    ///
    /// Used as the scoping key when every object of a transport has to be
    /// invalidated.
    ///
    /// ```
    /// # use btm_core::BluetoothUrl;
    /// assert_eq!(BluetoothUrl::with_protocol_only("tinyb").to_string(), "tinyb://");
    /// ```
    pub fn with_protocol_only(protocol: impl Into<String>) -> Self {
        Self {
            protocol: component(protocol),
            ..Self::default()
        }
    }

    /// Parse a URL from its textual form.
    ///
    /// Fails with [`BluetoothError::InvalidAddress`] if the protocol
    /// separator is missing. Missing trailing components are left absent.
    ///
    /// ```
    /// # use btm_core::BluetoothUrl;
    /// let url = BluetoothUrl::parse("dbus://hci0/AA:BB:CC:DD:EE:FF").unwrap();
    /// assert_eq!(url.protocol(), Some("dbus"));
    /// assert_eq!(url.adapter_address(), Some("hci0"));
    /// assert_eq!(url.device_address(), Some("AA:BB:CC:DD:EE:FF"));
    /// assert_eq!(url.characteristic_id(), None);
    /// assert!(BluetoothUrl::parse("hci0/AA:BB").is_err());
    /// ```
    pub fn parse(text: &str) -> BluetoothResult<Self> {
        let (protocol, path) = text.split_once(PROTOCOL_SEPARATOR).ok_or_else(|| {
            BluetoothError::InvalidAddress(format!(
                "missing protocol separator '{}' in '{}'",
                PROTOCOL_SEPARATOR, text
            ))
        })?;

        let mut parts = path.splitn(3, PATH_SEPARATOR);
        let adapter = parts.next().unwrap_or_default();
        let device = parts.next().unwrap_or_default();
        let characteristic = parts.next().unwrap_or_default();

        Ok(Self::new(protocol, adapter, device, characteristic))
    }

    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    pub fn adapter_address(&self) -> Option<&str> {
        self.adapter_address.as_deref()
    }

    pub fn device_address(&self) -> Option<&str> {
        self.device_address.as_deref()
    }

    pub fn characteristic_id(&self) -> Option<&str> {
        self.characteristic_id.as_deref()
    }

    /// Number of leading levels up to the deepest populated component
    /// (0 for an empty URL, 4 for a characteristic URL).
    pub fn depth(&self) -> usize {
        self.components()
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |idx| idx + 1)
    }

    fn components(&self) -> [Option<&str>; 4] {
        [
            self.protocol(),
            self.adapter_address(),
            self.device_address(),
            self.characteristic_id(),
        ]
    }

    /// Only the protocol is set
    pub fn is_root(&self) -> bool {
        self.protocol.is_some() && self.depth() == 1
    }

    /// Adapter is the deepest populated level
    pub fn is_adapter(&self) -> bool {
        self.adapter_address.is_some() && self.depth() == 2
    }

    /// Device is the deepest populated level
    pub fn is_device(&self) -> bool {
        self.device_address.is_some() && self.depth() == 3
    }

    pub fn is_characteristic(&self) -> bool {
        self.characteristic_id.is_some()
    }

    /// Projection to the adapter level (protocol + adapter)
    pub fn adapter_url(&self) -> Self {
        Self {
            protocol: self.protocol.clone(),
            adapter_address: self.adapter_address.clone(),
            ..Self::default()
        }
    }

    /// Projection to the device level (protocol + adapter + device)
    pub fn device_url(&self) -> Self {
        Self {
            characteristic_id: None,
            ..self.clone()
        }
    }

    pub fn copy_with_protocol(&self, protocol: impl Into<String>) -> Self {
        Self {
            protocol: component(protocol),
            ..self.clone()
        }
    }

    pub fn copy_without_protocol(&self) -> Self {
        Self {
            protocol: None,
            ..self.clone()
        }
    }

    pub fn copy_with_adapter(&self, adapter_address: impl Into<String>) -> Self {
        Self {
            adapter_address: component(adapter_address),
            ..self.clone()
        }
    }

    pub fn copy_with_device(&self, device_address: impl Into<String>) -> Self {
        Self {
            device_address: component(device_address),
            ..self.clone()
        }
    }

    pub fn copy_with_characteristic(&self, characteristic_id: impl Into<String>) -> Self {
        Self {
            characteristic_id: component(characteristic_id),
            ..self.clone()
        }
    }

    /// Whether `self` lives strictly below `root`.
    ///
    /// Every component populated in `root` must match the same component of
    /// `self`; components absent in `root` match anything.
    ///
    /// ```
    /// # use btm_core::BluetoothUrl;
    /// let root = BluetoothUrl::with_protocol_only("tinyb");
    /// let device = BluetoothUrl::new("tinyb", "hci0", "AA:BB", "");
    /// assert!(device.is_descendant_of(&root));
    /// assert!(!root.is_descendant_of(&root));
    /// assert!(!device.copy_with_protocol("dbus").is_descendant_of(&root));
    /// ```
    pub fn is_descendant_of(&self, root: &BluetoothUrl) -> bool {
        if self.depth() <= root.depth() {
            return false;
        }
        root.components()
            .iter()
            .zip(self.components().iter())
            .all(|(scope, own)| scope.is_none() || scope == own)
    }
}

impl fmt::Display for BluetoothUrl {
    /// Emits every level up to the deepest populated one, so that parsing the
    /// output yields an equal URL.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.protocol().unwrap_or_default(), PROTOCOL_SEPARATOR)?;
        let path = &self.components()[1..];
        let depth = self.depth().saturating_sub(1);
        for (idx, part) in path.iter().take(depth).enumerate() {
            if idx > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            f.write_str(part.unwrap_or_default())?;
        }
        Ok(())
    }
}

impl FromStr for BluetoothUrl {
    type Err = BluetoothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BluetoothUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BluetoothUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
