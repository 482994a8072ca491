//! Registry scenarios with in-memory transports
//!
//! Run with: cargo test -p btm-tests --test registry_scenarios

use std::sync::Arc;

use btm_core::{BluetoothError, BluetoothUrl, ErrorKind, TransportFactory};
use btm_manager::{BluetoothManager, DescendantInvalidator, FactoryRegistry};
use btm_mock::MockTransportFactory;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

/// Invalidator that records every root it is notified about
#[derive(Default)]
struct RecordingInvalidator {
    roots: Mutex<Vec<String>>,
}

impl DescendantInvalidator for RecordingInvalidator {
    fn invalidate_descendants(&self, root: &BluetoothUrl) {
        self.roots.lock().push(root.to_string());
    }
}

/// Transport with `adapters` adapters and `devices` devices spread over them
fn transport(protocol: &str, adapters: usize, devices: usize) -> Arc<MockTransportFactory> {
    let factory = Arc::new(MockTransportFactory::new(protocol));
    for a in 0..adapters {
        factory.add_adapter(&format!("hci{}", a), None);
    }
    for d in 0..devices {
        let adapter = format!("hci{}", d % adapters.max(1));
        factory.add_device(&adapter, &format!("{}:{:02X}", protocol, d), None);
    }
    factory
}

fn registry() -> (FactoryRegistry, Arc<RecordingInvalidator>) {
    let invalidator = Arc::new(RecordingInvalidator::default());
    (FactoryRegistry::new(invalidator.clone()), invalidator)
}

#[test]
fn test_fan_out_across_tinyb_and_dbus() {
    let (registry, _) = registry();
    registry.register(transport("tinyb", 2, 3));
    registry.register(transport("dbus", 1, 0));

    assert_eq!(registry.all_discovered_adapters().len(), 3);
    assert_eq!(registry.all_discovered_devices().len(), 3);
    assert_eq!(registry.protocols(), vec!["dbus".to_string(), "tinyb".to_string()]);
}

#[test]
fn test_unregister_tinyb_cascades_once() {
    let (registry, invalidator) = registry();
    let tinyb = transport("tinyb", 2, 3);
    registry.register(tinyb.clone());
    registry.register(transport("dbus", 1, 0));

    registry.unregister(tinyb.as_ref());

    let err = registry.resolve("tinyb").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::NotRegistered);
    assert_eq!(*invalidator.roots.lock(), vec!["tinyb://".to_string()]);
    assert_eq!(registry.all_discovered_adapters().len(), 1);
    assert!(registry.all_discovered_devices().is_empty());
}

#[test]
fn test_unregister_never_registered_transport() {
    let (registry, invalidator) = registry();
    registry.unregister(&MockTransportFactory::new("bluegiga"));

    assert!(registry.is_empty());
    assert_eq!(*invalidator.roots.lock(), vec!["bluegiga://".to_string()]);
}

#[test]
fn test_every_transport_contributes_its_devices() {
    let (registry, _) = registry();
    let transports = [transport("tinyb", 1, 2), transport("dbus", 2, 4), transport("usb", 1, 1)];
    for t in &transports {
        registry.register(t.clone());
    }

    let all = registry.all_discovered_devices();
    assert_eq!(all.len(), 7);
    for t in &transports {
        for device in t.discovered_devices() {
            assert!(all.contains(&device), "missing {}", device.url);
        }
    }
}

#[test]
fn test_routing_by_url_text() {
    let (registry, _) = registry();
    registry.register(transport("tinyb", 1, 1));
    registry.register(transport("dbus", 1, 1));

    let url: BluetoothUrl = "dbus://hci0/dbus:00".parse().unwrap();
    let device = registry.get_device(&url).unwrap();
    assert_eq!(device.url(), &url);

    let err = "hci0/dbus:00".parse::<BluetoothUrl>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAddress);

    let unknown: BluetoothUrl = "usb://hci0".parse().unwrap();
    assert!(matches!(
        registry.get_adapter(&unknown),
        Err(BluetoothError::NotRegistered(p)) if p == "usb"
    ));
}

#[test]
fn test_manager_drops_handles_of_removed_transport() {
    let manager = BluetoothManager::default();
    let tinyb = transport("tinyb", 1, 2);
    manager.register_factory(tinyb.clone());
    manager.register_factory(transport("dbus", 1, 1));

    let device = manager
        .get_device(&"tinyb://hci0/tinyb:00".parse().unwrap())
        .unwrap();
    tokio_test::block_on(device.connect()).unwrap();
    assert!(device.is_connected());
    manager
        .get_device(&"dbus://hci0/dbus:00".parse().unwrap())
        .unwrap();

    manager.unregister_factory(tinyb.as_ref());
    manager.process_pending_invalidations();

    let cached: Vec<String> = manager.cached_urls().iter().map(|u| u.to_string()).collect();
    assert_eq!(cached, vec!["dbus://hci0/dbus:00".to_string()]);
}
