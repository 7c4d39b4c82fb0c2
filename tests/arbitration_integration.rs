//! Integration tests for device selection and battery reading.
//!
//! These drive the public API end to end: `DeviceManager` over real
//! `EndgameDevice`s, talking to a scripted HID backend through the same
//! traits the hidapi backend implements.

use std::sync::Arc;

use endgame_battery::catalog;
use endgame_battery::protocol::{REPORT_ID, REPORT_SIZE, USAGE, USAGE_PAGE, VENDOR_ID};
use endgame_battery::{BatteryStatus, ConnectionMode, DeviceManager, DeviceModel, ProtocolTiming};
use endgame_transport::mock::{descriptor, MockHidBackend};

fn model(kind: &str, priority: i32, wireless: &[u16], wired: &[u16]) -> DeviceModel {
    DeviceModel {
        name: format!("Endgame Gear {kind}"),
        kind: kind.to_string(),
        priority,
        wireless_pids: wireless.to_vec(),
        wired_pids: wired.to_vec(),
    }
}

fn manager(backend: &MockHidBackend, models: Vec<DeviceModel>) -> DeviceManager {
    DeviceManager::from_models(models, Arc::new(backend.clone()), ProtocolTiming::instant())
}

fn plug(backend: &MockHidBackend, pid: u16, path: &str) {
    backend.add_device(descriptor(VENDOR_ID, pid, USAGE_PAGE, USAGE, path));
}

fn reply(status: u8, level: u8) -> Vec<u8> {
    let mut buf = vec![0u8; REPORT_SIZE];
    buf[0] = REPORT_ID;
    buf[1] = status;
    buf[16] = level;
    buf
}

// ── Discovery ──

#[test]
fn open_failures_everywhere_leave_no_active_device() {
    let backend = MockHidBackend::new();
    let models = catalog::builtin_models();
    let mut n = 0;
    for m in &models {
        for pid in m.supported_pids() {
            let path = format!("/dev/hidraw{n}");
            plug(&backend, pid, &path);
            backend.set_open_fails(&path, true);
            n += 1;
        }
    }
    let mut mgr = manager(&backend, models);

    assert!(!mgr.find_and_connect());
    assert!(!mgr.is_connected());
    assert!(mgr.active_device().is_none());
    assert_eq!(mgr.device_name(), "Unknown");
    assert_eq!(mgr.read_battery(), BatteryStatus::UNKNOWN);
}

#[test]
fn catalog_order_is_by_priority_regardless_of_input_order() {
    let backend = MockHidBackend::new();
    let mgr = manager(
        &backend,
        vec![
            model("C", 5, &[0x03], &[]),
            model("A", -1, &[0x01], &[]),
            model("D", 5, &[0x04], &[]),
            model("B", 2, &[0x02], &[]),
        ],
    );
    let priorities: Vec<i32> = mgr.devices().map(|d| d.priority()).collect();
    assert!(priorities.windows(2).all(|w| w[0] <= w[1]));
    let kinds: Vec<&str> = mgr.devices().map(|d| d.kind()).collect();
    assert_eq!(kinds, vec!["A", "B", "C", "D"]);
}

#[test]
fn builtin_mouse_preferred_over_dongle() {
    let backend = MockHidBackend::new();
    plug(&backend, catalog::DONGLE_WIRELESS_PIDS[0], "/dev/hidraw1");
    plug(&backend, catalog::XM2W_V2_WIRED_PIDS[0], "/dev/hidraw2");
    let mut mgr = manager(&backend, catalog::builtin_models());

    assert!(mgr.find_and_connect());
    assert_eq!(mgr.device_name(), "Endgame Gear XM2w 4K v2");
    assert_eq!(mgr.connection_mode(), ConnectionMode::Wired);
    assert_eq!(backend.open_handles("/dev/hidraw1"), 0);
}

// ── Hand-off ──

#[test]
fn higher_priority_device_takes_over_when_it_appears() {
    let backend = MockHidBackend::new();
    plug(&backend, 0x0002, "/dev/hidraw2");
    backend.set_default_reply("/dev/hidraw2", reply(0x01, 30));
    let mut mgr = manager(
        &backend,
        vec![model("One", 1, &[0x0001], &[]), model("Two", 2, &[0x0002], &[])],
    );

    assert!(mgr.find_and_connect());
    assert_eq!(mgr.device_name(), "Endgame Gear Two");
    assert_eq!(mgr.read_battery().percentage, 30);

    // Nothing better around yet
    assert!(!mgr.should_switch_device());
    assert_eq!(mgr.device_name(), "Endgame Gear Two");

    plug(&backend, 0x0001, "/dev/hidraw1");
    backend.set_default_reply("/dev/hidraw1", reply(0x08, 95));

    assert!(mgr.should_switch_device());
    assert_eq!(mgr.device_name(), "Endgame Gear One");
    assert_eq!(backend.open_handles("/dev/hidraw1"), 1);
    assert_eq!(backend.open_handles("/dev/hidraw2"), 0);
    assert_eq!(mgr.read_battery().percentage, 95);

    // And it stays there, even though Two is still plugged in
    assert!(!mgr.should_switch_device());
    assert_eq!(mgr.device_name(), "Endgame Gear One");
}

#[test]
fn lower_priority_device_never_preempts() {
    let backend = MockHidBackend::new();
    plug(&backend, 0x0001, "/dev/hidraw1");
    let mut mgr = manager(
        &backend,
        vec![model("One", 1, &[0x0001], &[]), model("Two", 2, &[0x0002], &[])],
    );
    assert!(mgr.find_and_connect());

    plug(&backend, 0x0002, "/dev/hidraw2");
    assert!(!mgr.should_switch_device());
    assert_eq!(mgr.device_name(), "Endgame Gear One");
    assert_eq!(backend.open_handles("/dev/hidraw2"), 0);
}

#[test]
fn failed_candidate_leaves_active_device_untouched() {
    let backend = MockHidBackend::new();
    plug(&backend, 0x0002, "/dev/hidraw2");
    plug(&backend, 0x0001, "/dev/hidraw1");
    backend.set_open_fails("/dev/hidraw1", true);
    let mut mgr = manager(
        &backend,
        vec![model("One", 1, &[0x0001], &[]), model("Two", 2, &[0x0002], &[])],
    );
    assert!(mgr.find_and_connect());
    assert_eq!(mgr.device_name(), "Endgame Gear Two");

    assert!(!mgr.should_switch_device());
    assert_eq!(mgr.device_name(), "Endgame Gear Two");
    assert_eq!(backend.open_handles("/dev/hidraw2"), 1);
}

// ── Reading ──

#[test]
fn wired_reading_reports_charging() {
    let backend = MockHidBackend::new();
    plug(&backend, catalog::OP1W_WIRED_PIDS[0], "/dev/hidraw0");
    backend.queue_reply("/dev/hidraw0", reply(0x00, 0));
    backend.queue_reply("/dev/hidraw0", reply(0x01, 77));
    let mut mgr = manager(&backend, catalog::builtin_models());

    assert!(mgr.find_and_connect());
    assert_eq!(mgr.connection_mode().to_string(), "Wired (Charging)");
    let status = mgr.read_battery();
    assert_eq!(
        status,
        BatteryStatus {
            percentage: 77,
            is_charging: true,
            is_wireless: false,
        }
    );
    assert_eq!(backend.sent_reports("/dev/hidraw0").len(), 2);
}

#[test]
fn invalid_status_byte_ignores_battery_byte() {
    let backend = MockHidBackend::new();
    plug(&backend, catalog::OP1W_WIRELESS_PIDS[0], "/dev/hidraw0");
    backend.set_default_reply("/dev/hidraw0", reply(0x04, 60));
    let mut mgr = manager(&backend, catalog::builtin_models());

    assert!(mgr.find_and_connect());
    assert_eq!(mgr.connection_mode().to_string(), "Wireless");
    assert_eq!(mgr.read_battery(), BatteryStatus::UNKNOWN);
    assert!(mgr.active_device().unwrap().last_status().is_none());
}

#[test]
fn over_range_battery_byte_is_clamped() {
    let backend = MockHidBackend::new();
    plug(&backend, catalog::DONGLE_WIRELESS_PIDS[0], "/dev/hidraw0");
    backend.set_default_reply("/dev/hidraw0", reply(0x01, 0xFF));
    let mut mgr = manager(&backend, catalog::builtin_models());

    assert!(mgr.find_and_connect());
    let status = mgr.read_battery();
    assert_eq!(status.percentage, 100);
    assert!(status.is_wireless);
}

#[test]
fn disconnect_releases_everything() {
    let backend = MockHidBackend::new();
    plug(&backend, catalog::OP1W_WIRELESS_PIDS[0], "/dev/hidraw0");
    let mut mgr = manager(&backend, catalog::builtin_models());
    assert!(mgr.find_and_connect());

    mgr.disconnect();
    assert!(!mgr.is_connected());
    assert_eq!(mgr.connection_mode(), ConnectionMode::Unknown);
    assert_eq!(backend.open_handles("/dev/hidraw0"), 0);

    let io_before = backend.total_io();
    assert_eq!(mgr.read_battery(), BatteryStatus::UNKNOWN);
    assert_eq!(backend.total_io(), io_before);
}
