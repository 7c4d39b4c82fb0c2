//! Common types for transport layer

use std::fmt;

/// One HID interface reported by enumeration
///
/// Descriptors are only used to pick an interface to open; nothing keeps them
/// around once a handle exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Platform device path (e.g. `/dev/hidraw3`), opaque to callers
    pub path: String,
    /// USB Vendor ID
    pub vendor_id: u16,
    /// USB Product ID
    pub product_id: u16,
    /// HID usage page of this interface
    pub usage_page: u16,
    /// HID usage within the page
    pub usage: u16,
    /// Product name if available
    pub product_name: Option<String>,
    /// USB interface number, -1 when the platform does not report one
    pub interface_number: i32,
}

impl DeviceDescriptor {
    /// Check whether this interface carries the given usage page/usage pair
    pub fn matches_usage(&self, usage_page: u16, usage: u16) -> bool {
        self.usage_page == usage_page && self.usage == usage
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X}:{:04X} page=0x{:04X} usage=0x{:04X} if={} {}",
            self.vendor_id,
            self.product_id,
            self.usage_page,
            self.usage,
            self.interface_number,
            self.path
        )
    }
}
