//! Status file export
//!
//! Mirrors the battery reading into small files laid out like a sysfs
//! `power_supply` node, so shell scripts and status bars can read it without
//! talking to the device:
//!
//! ```text
//! <dir>/type        Battery
//! <dir>/present     1
//! <dir>/capacity    87
//! <dir>/status      Discharging
//! <dir>/model_name  Endgame Gear OP1w 4K
//! <dir>/mode        Wireless
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::battery::BatteryStatus;
use crate::device::ConnectionMode;

const TYPE_FILE: &str = "type";
const PRESENT_FILE: &str = "present";
const CAPACITY_FILE: &str = "capacity";
const STATUS_FILE: &str = "status";
const MODEL_FILE: &str = "model_name";
const MODE_FILE: &str = "mode";

/// Power supply status values (matching kernel power_supply.h)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSupplyStatus {
    Unknown,
    Charging,
    Discharging,
    Full,
}

impl PowerSupplyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Charging => "Charging",
            Self::Discharging => "Discharging",
            Self::Full => "Full",
        }
    }
}

impl From<&BatteryStatus> for PowerSupplyStatus {
    fn from(status: &BatteryStatus) -> Self {
        if !status.is_known() {
            Self::Unknown
        } else if status.is_charging && status.percentage >= 100 {
            Self::Full
        } else if status.is_charging {
            Self::Charging
        } else {
            Self::Discharging
        }
    }
}

/// Writes status files into one directory, removing them on drop
pub struct StatusExporter {
    base_path: PathBuf,
}

impl StatusExporter {
    /// Create the directory and write an initial "nothing connected" state
    pub fn new(base_path: impl Into<PathBuf>) -> io::Result<Self> {
        let exporter = Self {
            base_path: base_path.into(),
        };
        fs::create_dir_all(&exporter.base_path)?;
        exporter.write_file(TYPE_FILE, "Battery")?;
        exporter.clear()?;
        Ok(exporter)
    }

    /// Record a reading from the active device
    pub fn update(
        &self,
        status: &BatteryStatus,
        model_name: &str,
        mode: ConnectionMode,
    ) -> io::Result<()> {
        let present = status.is_known();
        self.write_file(PRESENT_FILE, if present { "1" } else { "0" })?;
        let capacity = if present { status.percentage } else { 0 };
        self.write_file(CAPACITY_FILE, &capacity.to_string())?;
        self.write_file(STATUS_FILE, PowerSupplyStatus::from(status).as_str())?;
        self.write_file(MODEL_FILE, model_name)?;
        self.write_file(MODE_FILE, mode.as_str())?;
        debug!("Exported status to {}", self.base_path.display());
        Ok(())
    }

    /// Mark nothing as connected
    pub fn clear(&self) -> io::Result<()> {
        self.update(&BatteryStatus::UNKNOWN, "", ConnectionMode::Unknown)
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    fn write_file(&self, name: &str, value: &str) -> io::Result<()> {
        let path = self.base_path.join(name);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        writeln!(file, "{}", value)?;
        Ok(())
    }
}

impl Drop for StatusExporter {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.base_path);
    }
}
