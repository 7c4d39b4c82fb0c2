//! Transport abstraction for Endgame Gear mouse communication
//!
//! The battery reader only ever needs three things from the HID layer:
//!
//! - enumerate the interfaces exposed under a vendor/product id pair
//! - open one of them by path
//! - exchange feature reports with the opened handle
//!
//! [`HidBackend`] and [`FeatureDevice`] capture exactly that. Closing a device
//! is dropping its handle.

pub mod error;
pub mod types;

mod hid;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::TransportError;
pub use hid::{HidApiBackend, HidFeatureDevice};
pub use types::DeviceDescriptor;

/// Device enumeration and opening
pub trait HidBackend: Send + Sync {
    /// List the HID interfaces present for one vendor/product id pair
    ///
    /// An empty list means the device is simply not plugged in.
    fn enumerate(
        &self,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Open the interface described by `descriptor`
    fn open(&self, descriptor: &DeviceDescriptor) -> Result<BoxedFeatureDevice, TransportError>;
}

/// An open HID handle capable of feature-report I/O
///
/// The handle is released when the value is dropped.
pub trait FeatureDevice: Send {
    /// Send a feature report; `data[0]` is the report ID
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Read a feature report with the given report ID into `buf`
    ///
    /// `buf[0]` is overwritten with `report_id` before the request is issued.
    /// Returns the number of bytes the device delivered.
    fn get_feature_report(&self, report_id: u8, buf: &mut [u8]) -> Result<usize, TransportError>;
}

/// Type alias for a boxed feature device handle
pub type BoxedFeatureDevice = Box<dyn FeatureDevice>;
