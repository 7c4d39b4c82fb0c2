//! Polling loop.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use endgame_battery::config::poll_interval_from_secs;
use endgame_battery::{BatteryStatus, Config, DeviceManager, StatusExporter};
use tracing::{info, warn};

use super::{build_manager, open_backend, setup_interrupt_handler, CommandResult};

/// Granularity at which the loop notices Ctrl-C while waiting
const WAKE_STEP: Duration = Duration::from_millis(200);

/// One poll: make sure the best reachable device is active, then read it
///
/// A failed reading drops the active device so the next cycle rediscovers
/// from scratch; an unplugged device keeps its handle open otherwise.
pub fn poll_cycle(manager: &mut DeviceManager, switch_check: bool) -> BatteryStatus {
    if !manager.is_connected() {
        if !manager.find_and_connect() {
            return BatteryStatus::UNKNOWN;
        }
    } else if switch_check {
        manager.should_switch_device();
    }

    let status = manager.read_battery();
    if !status.is_known() {
        warn!("{}: battery read failed, will reconnect", manager.device_name());
        manager.disconnect();
    }
    status
}

pub fn watch(config: &Config, interval: Option<u64>, status_dir: Option<PathBuf>) -> CommandResult {
    let interval = interval
        .map(poll_interval_from_secs)
        .unwrap_or_else(|| config.poll_interval());
    let status_dir = status_dir.or_else(|| config.status_dir.clone());

    let backend = open_backend()?;
    let mut manager = build_manager(config, backend);
    let exporter = status_dir.map(StatusExporter::new).transpose()?;
    if let Some(exporter) = &exporter {
        info!("Exporting status to {}", exporter.path().display());
    }

    let running = setup_interrupt_handler();
    info!("Polling every {}s (Ctrl+C to stop)", interval.as_secs());

    while running.load(Ordering::SeqCst) {
        let started = Instant::now();
        let status = poll_cycle(&mut manager, config.switch_check);

        if status.is_known() {
            println!(
                "{}: {} [{}]",
                manager.device_name(),
                status,
                manager.connection_mode()
            );
        } else {
            println!("No battery data");
        }

        if let Some(exporter) = &exporter {
            let result = if status.is_known() {
                exporter.update(&status, manager.device_name(), manager.connection_mode())
            } else {
                exporter.clear()
            };
            if let Err(e) = result {
                warn!("Failed to write status files: {}", e);
            }
        }

        wait(&running, interval.saturating_sub(started.elapsed()));
    }

    manager.disconnect();
    info!("Stopped");
    Ok(())
}

fn wait(running: &AtomicBool, total: Duration) {
    // No deadline when the clock cannot represent it; wait for Ctrl-C only
    let deadline = Instant::now().checked_add(total);
    while running.load(Ordering::SeqCst) {
        let step = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                WAKE_STEP.min(deadline - now)
            }
            None => WAKE_STEP,
        };
        std::thread::sleep(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use endgame_battery::protocol::{REPORT_SIZE, USAGE, USAGE_PAGE, VENDOR_ID};
    use endgame_battery::{DeviceModel, ProtocolTiming};
    use endgame_transport::mock::{descriptor, MockHidBackend};

    fn model(kind: &str, priority: i32, pid: u16) -> DeviceModel {
        DeviceModel {
            name: kind.to_string(),
            kind: kind.to_string(),
            priority,
            wireless_pids: vec![pid],
            wired_pids: Vec::new(),
        }
    }

    fn reply(level: u8) -> Vec<u8> {
        let mut buf = vec![0u8; REPORT_SIZE];
        buf[1] = 0x01;
        buf[16] = level;
        buf
    }

    fn setup() -> (MockHidBackend, DeviceManager) {
        let backend = MockHidBackend::new();
        let manager = DeviceManager::from_models(
            vec![model("mouse", 1, 0x0001), model("dongle", 2, 0x0002)],
            Arc::new(backend.clone()),
            ProtocolTiming::instant(),
        );
        (backend, manager)
    }

    #[test]
    fn test_poll_connects_then_reads() {
        let (backend, mut manager) = setup();
        assert_eq!(poll_cycle(&mut manager, true), BatteryStatus::UNKNOWN);

        backend.add_device(descriptor(VENDOR_ID, 0x0002, USAGE_PAGE, USAGE, "/dev/hidraw2"));
        backend.set_default_reply("/dev/hidraw2", reply(55));
        assert_eq!(poll_cycle(&mut manager, true).percentage, 55);
        assert_eq!(manager.device_name(), "dongle");
    }

    #[test]
    fn test_poll_hands_off_when_enabled() {
        let (backend, mut manager) = setup();
        backend.add_device(descriptor(VENDOR_ID, 0x0002, USAGE_PAGE, USAGE, "/dev/hidraw2"));
        backend.set_default_reply("/dev/hidraw2", reply(55));
        poll_cycle(&mut manager, true);

        backend.add_device(descriptor(VENDOR_ID, 0x0001, USAGE_PAGE, USAGE, "/dev/hidraw1"));
        backend.set_default_reply("/dev/hidraw1", reply(90));

        assert_eq!(poll_cycle(&mut manager, false).percentage, 55);
        assert_eq!(manager.device_name(), "dongle");

        assert_eq!(poll_cycle(&mut manager, true).percentage, 90);
        assert_eq!(manager.device_name(), "mouse");
        assert_eq!(backend.open_handles("/dev/hidraw2"), 0);
    }

    #[test]
    fn test_wait_with_unrepresentable_deadline_returns_on_stop() {
        let stopped = AtomicBool::new(false);
        wait(&stopped, Duration::from_secs(u64::MAX));
        wait(&stopped, Duration::MAX);
    }

    #[test]
    fn test_wait_elapses() {
        let running = AtomicBool::new(true);
        let started = Instant::now();
        wait(&running, Duration::from_millis(20));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_failed_read_drops_device() {
        let (backend, mut manager) = setup();
        backend.add_device(descriptor(VENDOR_ID, 0x0001, USAGE_PAGE, USAGE, "/dev/hidraw1"));
        backend.set_default_reply("/dev/hidraw1", reply(40));
        assert!(poll_cycle(&mut manager, true).is_known());

        backend.remove_device("/dev/hidraw1");
        assert_eq!(poll_cycle(&mut manager, true), BatteryStatus::UNKNOWN);
        assert!(!manager.is_connected());
        assert_eq!(backend.open_handles("/dev/hidraw1"), 0);
    }
}
