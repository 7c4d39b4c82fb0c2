// Endgame Gear battery reader - Shared Library
// Battery protocol, device catalog and active-device selection

pub mod battery;
pub mod catalog;
pub mod config;
pub mod device;
pub mod manager;
pub mod protocol;
pub mod status_file;

pub use battery::{BatteryStatus, ProtocolTiming};
pub use config::{Config, TimingConfig};
pub use device::{BatteryDevice, ConnectionMode, DeviceModel, EndgameDevice};
pub use manager::DeviceManager;
pub use status_file::{PowerSupplyStatus, StatusExporter};
