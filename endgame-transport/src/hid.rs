//! `hidapi` backed implementation of the transport traits

use std::ffi::CString;

use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::types::DeviceDescriptor;
use crate::{BoxedFeatureDevice, FeatureDevice, HidBackend};

/// HID backend over the system `hidapi` library
///
/// The device list is refreshed before every enumeration so that devices
/// plugged in after startup are picked up by later polls.
pub struct HidApiBackend {
    api: Mutex<HidApi>,
}

impl HidApiBackend {
    /// Initialize the HID library
    pub fn new() -> Result<Self, TransportError> {
        let api = HidApi::new()?;
        Ok(Self {
            api: Mutex::new(api),
        })
    }
}

impl HidBackend for HidApiBackend {
    fn enumerate(
        &self,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let mut api = self.api.lock();
        if let Err(e) = api.refresh_devices() {
            // hidapi keeps whatever it managed to enumerate, so carry on with that
            warn!("Failed to refresh HID device list: {}", e);
        }

        let found: Vec<DeviceDescriptor> = api
            .device_list()
            .filter(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
            .map(|d| DeviceDescriptor {
                path: d.path().to_string_lossy().into_owned(),
                vendor_id: d.vendor_id(),
                product_id: d.product_id(),
                usage_page: d.usage_page(),
                usage: d.usage(),
                product_name: d.product_string().map(|s| s.to_string()),
                interface_number: d.interface_number(),
            })
            .collect();

        debug!(
            "Enumerated {:04X}:{:04X}: {} interface(s)",
            vendor_id,
            product_id,
            found.len()
        );
        Ok(found)
    }

    fn open(&self, descriptor: &DeviceDescriptor) -> Result<BoxedFeatureDevice, TransportError> {
        let path = CString::new(descriptor.path.as_str())
            .map_err(|_| TransportError::InvalidPath(descriptor.path.clone()))?;

        let device = self.api.lock().open_path(&path)?;
        debug!("Opened {}", descriptor);
        Ok(Box::new(HidFeatureDevice::new(device, descriptor.path.clone())))
    }
}

/// Open `hidapi` handle
pub struct HidFeatureDevice {
    device: HidDevice,
    path: String,
}

impl HidFeatureDevice {
    pub fn new(device: HidDevice, path: String) -> Self {
        Self { device, path }
    }
}

impl FeatureDevice for HidFeatureDevice {
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        self.device.send_feature_report(data)?;
        Ok(())
    }

    fn get_feature_report(&self, report_id: u8, buf: &mut [u8]) -> Result<usize, TransportError> {
        if buf.is_empty() {
            return Err(TransportError::Internal(
                "feature report buffer is empty".into(),
            ));
        }
        buf[0] = report_id;
        Ok(self.device.get_feature_report(buf)?)
    }
}

impl Drop for HidFeatureDevice {
    fn drop(&mut self) {
        debug!("Closing HID handle {}", self.path);
    }
}
