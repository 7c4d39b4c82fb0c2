//! Supported devices and their connection state
//!
//! Every supported mouse or dongle speaks the same battery protocol; they only
//! differ in identity data ([`DeviceModel`]). [`EndgameDevice`] is the one
//! implementation of [`BatteryDevice`], parameterized by a model.

use std::fmt;
use std::sync::Arc;

use endgame_transport::{BoxedFeatureDevice, HidBackend};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::battery::{self, BatteryStatus, ProtocolTiming};
use crate::protocol::{USAGE, USAGE_PAGE, VENDOR_ID};

/// Static identity of a supported device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceModel {
    /// Human-readable product name
    pub name: String,
    /// Short type label used in logs
    pub kind: String,
    /// Lower value wins when several devices are reachable
    pub priority: i32,
    /// Product ids the device enumerates under when running on its radio link
    #[serde(default)]
    pub wireless_pids: Vec<u16>,
    /// Product ids the device enumerates under when cabled
    #[serde(default)]
    pub wired_pids: Vec<u16>,
}

impl DeviceModel {
    /// Every product id to probe, wireless first
    pub fn supported_pids(&self) -> impl Iterator<Item = u16> + '_ {
        self.wireless_pids
            .iter()
            .chain(self.wired_pids.iter())
            .copied()
    }

    pub fn supports_pid(&self, pid: u16) -> bool {
        self.supported_pids().any(|p| p == pid)
    }

    #[inline]
    pub fn is_wired_pid(&self, pid: u16) -> bool {
        self.wired_pids.contains(&pid)
    }

    /// Connection mode implied by a matched product id
    pub fn connection_mode(&self, pid: Option<u16>) -> ConnectionMode {
        match pid {
            None => ConnectionMode::Unknown,
            Some(pid) if self.is_wired_pid(pid) => ConnectionMode::Wired,
            Some(_) => ConnectionMode::Wireless,
        }
    }
}

/// How the active device is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionMode {
    Unknown,
    /// On the cable, which also means charging
    Wired,
    Wireless,
}

impl ConnectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Wired => "Wired (Charging)",
            Self::Wireless => "Wireless",
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device the manager can select and read
///
/// Implementations are driven from one thread at a time.
pub trait BatteryDevice: Send {
    /// Probe every supported product id and open the first matching interface
    ///
    /// Returns `false` when the device is not present; that is not an error.
    fn find_and_connect(&mut self) -> bool;

    /// Release the handle, if any
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Take a battery reading, [`BatteryStatus::UNKNOWN`] on any failure
    fn read_battery(&mut self) -> BatteryStatus;

    /// Human-readable product name
    fn name(&self) -> &str;

    /// Short type label
    fn kind(&self) -> &str;

    fn priority(&self) -> i32;

    fn connection_mode(&self) -> ConnectionMode;

    /// Product id the open handle was matched through
    fn current_pid(&self) -> Option<u16>;

    /// Most recent successful reading
    fn last_status(&self) -> Option<BatteryStatus> {
        None
    }
}

/// An open handle together with the product id it was found under
struct Connection {
    handle: BoxedFeatureDevice,
    pid: u16,
}

/// Endgame Gear mouse or dongle
pub struct EndgameDevice {
    model: DeviceModel,
    backend: Arc<dyn HidBackend>,
    timing: ProtocolTiming,
    connection: Option<Connection>,
    last_status: Option<BatteryStatus>,
}

impl EndgameDevice {
    pub fn new(model: DeviceModel, backend: Arc<dyn HidBackend>) -> Self {
        Self::with_timing(model, backend, ProtocolTiming::default())
    }

    pub fn with_timing(
        model: DeviceModel,
        backend: Arc<dyn HidBackend>,
        timing: ProtocolTiming,
    ) -> Self {
        Self {
            model,
            backend,
            timing,
            connection: None,
            last_status: None,
        }
    }

    fn connect_with_pid(&mut self, pid: u16) -> bool {
        let descriptors = match self.backend.enumerate(VENDOR_ID, pid) {
            Ok(descriptors) => descriptors,
            Err(e) => {
                warn!("{}: enumeration of PID 0x{:04X} failed: {}", self.model.kind, pid, e);
                return false;
            }
        };

        for desc in descriptors
            .iter()
            .filter(|d| d.matches_usage(USAGE_PAGE, USAGE))
        {
            match self.backend.open(desc) {
                Ok(handle) => {
                    self.connection = Some(Connection { handle, pid });
                    info!("{} connected (PID: 0x{:04X})", self.model.kind, pid);
                    return true;
                }
                Err(e) if e.is_permission_denied() => {
                    warn!("{}: cannot open {}: {}", self.model.kind, desc.path, e);
                }
                Err(e) => {
                    debug!("{}: failed to open {}: {}", self.model.kind, desc.path, e);
                }
            }
        }
        false
    }
}

impl BatteryDevice for EndgameDevice {
    fn find_and_connect(&mut self) -> bool {
        if self.connection.take().is_some() {
            debug!("{}: released previous handle before reconnecting", self.model.kind);
        }

        let pids: Vec<u16> = self.model.supported_pids().collect();
        for pid in pids {
            if self.connect_with_pid(pid) {
                return true;
            }
        }
        debug!("{}: not present", self.model.kind);
        false
    }

    fn disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            info!("{} disconnected (PID: 0x{:04X})", self.model.kind, conn.pid);
        }
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn read_battery(&mut self) -> BatteryStatus {
        let Some(conn) = &self.connection else {
            debug!("{}: Device not connected", self.model.kind);
            return BatteryStatus::UNKNOWN;
        };

        let wired = self.model.is_wired_pid(conn.pid);
        let status = battery::read_battery(
            conn.handle.as_ref(),
            wired,
            &self.timing,
            &self.model.kind,
        );
        if status.is_known() {
            self.last_status = Some(status);
        }
        status
    }

    fn name(&self) -> &str {
        &self.model.name
    }

    fn kind(&self) -> &str {
        &self.model.kind
    }

    fn priority(&self) -> i32 {
        self.model.priority
    }

    fn connection_mode(&self) -> ConnectionMode {
        self.model.connection_mode(self.current_pid())
    }

    fn current_pid(&self) -> Option<u16> {
        self.connection.as_ref().map(|c| c.pid)
    }

    fn last_status(&self) -> Option<BatteryStatus> {
        self.last_status
    }
}
