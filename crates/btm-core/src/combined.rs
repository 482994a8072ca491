//! The virtual combined adapter.
//!
//! A combined adapter aggregates devices observed through several physical
//! adapters (possibly of different transports) under one logical identity.
//! It is addressed by a reserved adapter address, compared
//! case-insensitively, and carries no protocol.

use crate::url::BluetoothUrl;

/// Reserved adapter address denoting the combined adapter
pub const COMBINED_ADAPTER_ADDRESS: &str = "COMBINED";

/// Whether the URL's adapter component is the combined-adapter sentinel.
///
/// Pure predicate; never consults the transport registry.
///
/// ```
/// # use btm_core::{is_combined_adapter, BluetoothUrl};
/// assert!(is_combined_adapter(&BluetoothUrl::new("", "combined", "AA:BB", "")));
/// assert!(!is_combined_adapter(&BluetoothUrl::new("tinyb", "hci0", "", "")));
/// ```
pub fn is_combined_adapter(url: &BluetoothUrl) -> bool {
    url.adapter_address()
        .is_some_and(|address| address.eq_ignore_ascii_case(COMBINED_ADAPTER_ADDRESS))
}

impl BluetoothUrl {
    /// URL of the combined adapter itself (`://COMBINED`)
    pub fn combined_adapter() -> Self {
        BluetoothUrl::new("", COMBINED_ADAPTER_ADDRESS, "", "")
    }

    /// Re-address this URL under the combined adapter, dropping the protocol
    /// and physical adapter but keeping device and characteristic.
    pub fn to_combined(&self) -> Self {
        self.copy_without_protocol()
            .copy_with_adapter(COMBINED_ADAPTER_ADDRESS)
    }

    pub fn is_combined(&self) -> bool {
        is_combined_adapter(self)
    }
}
