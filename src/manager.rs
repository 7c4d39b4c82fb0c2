//! Device arbitration - selects the single active device by priority
//!
//! The manager holds every known device sorted by priority and keeps at most
//! one of them connected. Selection is first-match in priority order. While a
//! device is active, [`DeviceManager::should_switch_device`] lets a newly
//! reachable device with a strictly better priority take over; a device is
//! never dropped for one of equal or worse priority.

use std::sync::Arc;

use endgame_transport::HidBackend;
use tracing::{debug, info};

use crate::battery::{BatteryStatus, ProtocolTiming};
use crate::device::{BatteryDevice, ConnectionMode, DeviceModel, EndgameDevice};

/// Name reported when no device is active
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown";

pub struct DeviceManager {
    /// Sorted ascending by priority, fixed after construction
    devices: Vec<Box<dyn BatteryDevice>>,
    /// Index into `devices`
    active: Option<usize>,
}

impl DeviceManager {
    /// Build a manager over `devices`; ties keep their given order
    pub fn new(mut devices: Vec<Box<dyn BatteryDevice>>) -> Self {
        devices.sort_by_key(|d| d.priority());
        debug!(
            "Device catalog: {}",
            devices
                .iter()
                .map(|d| format!("{}({})", d.kind(), d.priority()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Self {
            devices,
            active: None,
        }
    }

    /// Build a manager with one [`EndgameDevice`] per model
    pub fn from_models(
        models: impl IntoIterator<Item = DeviceModel>,
        backend: Arc<dyn HidBackend>,
        timing: ProtocolTiming,
    ) -> Self {
        let devices = models
            .into_iter()
            .map(|model| {
                Box::new(EndgameDevice::with_timing(model, Arc::clone(&backend), timing))
                    as Box<dyn BatteryDevice>
            })
            .collect();
        Self::new(devices)
    }

    /// Connect to the first reachable device in priority order
    ///
    /// Any currently active device is released first.
    pub fn find_and_connect(&mut self) -> bool {
        self.disconnect();

        for (index, device) in self.devices.iter_mut().enumerate() {
            if device.find_and_connect() {
                info!("Active device: {}", device.kind());
                self.active = Some(index);
                return true;
            }
        }
        debug!("No supported device found");
        false
    }

    pub fn disconnect(&mut self) {
        if let Some(index) = self.active.take() {
            self.devices[index].disconnect();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.active_device().is_some_and(|d| d.is_connected())
    }

    pub fn read_battery(&mut self) -> BatteryStatus {
        match self.active {
            Some(index) => self.devices[index].read_battery(),
            None => BatteryStatus::UNKNOWN,
        }
    }

    pub fn device_name(&self) -> &str {
        self.active_device()
            .map_or(UNKNOWN_DEVICE_NAME, |d| d.name())
    }

    pub fn connection_mode(&self) -> ConnectionMode {
        self.active_device()
            .map_or(ConnectionMode::Unknown, |d| d.connection_mode())
    }

    /// Hand off to a better-priority device if one has become reachable
    ///
    /// Returns `true` when a switch happened. Does nothing while no device is
    /// active.
    pub fn should_switch_device(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let current_priority = self.devices[active].priority();

        for index in 0..self.devices.len() {
            if index == active || self.devices[index].priority() >= current_priority {
                continue;
            }

            if self.devices[index].find_and_connect() {
                info!(
                    "Switching to higher priority device: {}",
                    self.devices[index].kind()
                );
                self.devices[active].disconnect();
                self.active = Some(index);
                return true;
            }
        }
        false
    }

    pub fn active_device(&self) -> Option<&dyn BatteryDevice> {
        self.active.map(|index| self.devices[index].as_ref())
    }

    /// Product id of the active connection
    pub fn active_pid(&self) -> Option<u16> {
        self.active_device().and_then(|d| d.current_pid())
    }

    /// All devices in priority order
    pub fn devices(&self) -> impl Iterator<Item = &dyn BatteryDevice> + '_ {
        self.devices.iter().map(|d| d.as_ref())
    }
}
