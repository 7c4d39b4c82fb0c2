//! Protocol constants and helpers for the Endgame Gear vendor interface

/// Endgame Gear USB vendor ID
pub const VENDOR_ID: u16 = 0x3367;

/// Vendor-defined HID usage page of the configuration interface
pub const USAGE_PAGE: u16 = 0xFF01;

/// HID usage of the configuration interface within [`USAGE_PAGE`]
pub const USAGE: u16 = 0x0002;

/// Feature report ID used for battery queries
pub const REPORT_ID: u8 = 0xA1;

/// Feature report size including the report ID byte
pub const REPORT_SIZE: usize = 64;

/// Vendor commands
pub mod cmd {
    /// Query battery level
    pub const GET_BATTERY: u8 = 0xB4;
}

/// Reply layout of the battery query (offsets include the report ID byte)
pub mod reply {
    /// Status byte echoed by the device
    pub const STATUS_OFFSET: usize = 1;
    /// Raw battery level
    pub const BATTERY_OFFSET: usize = 16;
    /// Status values that mark a usable reply
    pub const VALID_STATUS: [u8; 2] = [0x01, 0x08];
}

/// Upper bound of a reported percentage
pub const MAX_PERCENTAGE: u8 = 100;

/// Battery exchange timing
pub mod timing {
    /// Wait between sending the query and reading the reply (ms)
    pub const SETTLE_MS: u64 = 350;
    /// Wait after the priming pass before the authoritative pass (ms)
    pub const PRIME_GAP_MS: u64 = 100;
}

/// Build the battery query feature report: `[REPORT_ID, GET_BATTERY, 0...]`
pub fn build_battery_query() -> [u8; REPORT_SIZE] {
    let mut buf = [0u8; REPORT_SIZE];
    buf[0] = REPORT_ID;
    buf[1] = cmd::GET_BATTERY;
    buf
}

/// Check the status byte of a battery reply
#[inline]
pub fn is_valid_status(status: u8) -> bool {
    reply::VALID_STATUS.contains(&status)
}

/// Format the bytes worth looking at when debugging a reply
pub fn describe_reply(buf: &[u8; REPORT_SIZE]) -> String {
    format!(
        "bytes[0..4]={:02x?} byte[16]={:02x}",
        &buf[..4],
        buf[reply::BATTERY_OFFSET]
    )
}
