//! btm-mock - In-memory Bluetooth transport
//!
//! Provides a [`TransportFactory`](btm_core::TransportFactory) whose
//! adapters, devices and characteristics live in memory. Used by tests and by
//! `btmd` when no native stack is configured.
//!
//! # Example
//!
//! ```
//! use btm_core::{BluetoothUrl, TransportFactory};
//! use btm_mock::MockTransportFactory;
//!
//! let transport = MockTransportFactory::new("mock");
//! transport.add_adapter("hci0", Some("Built-in"));
//! transport.add_device("hci0", "AA:BB:CC:DD:EE:FF", Some("Thermometer"));
//!
//! let url = BluetoothUrl::parse("mock://hci0/AA:BB:CC:DD:EE:FF").unwrap();
//! assert!(transport.get_device(&url).is_ok());
//! assert_eq!(transport.discovered_devices().len(), 1);
//! ```

pub mod config;
pub mod factory;
pub mod objects;

pub use config::{MockAdapterConfig, MockCharacteristicConfig, MockDeviceConfig, MockTransportConfig};
pub use factory::MockTransportFactory;
pub use objects::{MockAdapter, MockCharacteristic, MockDevice};
