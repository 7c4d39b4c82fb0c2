//! Scripted in-memory backend for tests
//!
//! `MockHidBackend` is cheap to clone; all clones share one device table, so a
//! test can keep a handle to the backend after giving it to the code under
//! test and plug, unplug or break devices between calls.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::types::DeviceDescriptor;
use crate::{BoxedFeatureDevice, FeatureDevice, HidBackend};

#[derive(Debug, Default)]
struct MockInterface {
    descriptor: Option<DeviceDescriptor>,
    plugged: bool,
    open_fails: bool,
    send_fails: bool,
    read_fails: bool,
    panic_on_read: bool,
    replies: VecDeque<Vec<u8>>,
    default_reply: Option<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    reads: usize,
    open_handles: usize,
}

#[derive(Debug, Default)]
struct MockState {
    interfaces: Vec<MockInterface>,
    enumerate_calls: usize,
}

impl MockState {
    fn find(&self, path: &str) -> Option<&MockInterface> {
        self.interfaces
            .iter()
            .find(|i| i.descriptor.as_ref().is_some_and(|d| d.path == path))
    }

    fn find_mut(&mut self, path: &str) -> Option<&mut MockInterface> {
        self.interfaces
            .iter_mut()
            .find(|i| i.descriptor.as_ref().is_some_and(|d| d.path == path))
    }
}

/// Build a descriptor with a synthetic hidraw path
pub fn descriptor(
    vendor_id: u16,
    product_id: u16,
    usage_page: u16,
    usage: u16,
    path: &str,
) -> DeviceDescriptor {
    DeviceDescriptor {
        path: path.to_string(),
        vendor_id,
        product_id,
        usage_page,
        usage,
        product_name: Some(format!("Mock {vendor_id:04X}:{product_id:04X}")),
        interface_number: 1,
    }
}

/// Scripted HID backend
#[derive(Debug, Clone, Default)]
pub struct MockHidBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockHidBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug in an interface. Re-adding a known path plugs it back in.
    pub fn add_device(&self, descriptor: DeviceDescriptor) {
        let mut state = self.state.lock();
        if let Some(existing) = state.find_mut(&descriptor.path) {
            existing.plugged = true;
            existing.descriptor = Some(descriptor);
            return;
        }
        state.interfaces.push(MockInterface {
            descriptor: Some(descriptor),
            plugged: true,
            ..Default::default()
        });
    }

    /// Unplug an interface. Handles that are still open start failing.
    pub fn remove_device(&self, path: &str) {
        if let Some(iface) = self.state.lock().find_mut(path) {
            iface.plugged = false;
        }
    }

    pub fn set_open_fails(&self, path: &str, fails: bool) {
        self.with_interface(path, |i| i.open_fails = fails);
    }

    pub fn set_send_fails(&self, path: &str, fails: bool) {
        self.with_interface(path, |i| i.send_fails = fails);
    }

    pub fn set_read_fails(&self, path: &str, fails: bool) {
        self.with_interface(path, |i| i.read_fails = fails);
    }

    pub fn set_panic_on_read(&self, path: &str, panics: bool) {
        self.with_interface(path, |i| i.panic_on_read = panics);
    }

    /// Queue one reply; queued replies are consumed before the default reply
    pub fn queue_reply(&self, path: &str, report: Vec<u8>) {
        self.with_interface(path, |i| i.replies.push_back(report));
    }

    /// Reply returned whenever the queue is empty
    pub fn set_default_reply(&self, path: &str, report: Vec<u8>) {
        self.with_interface(path, |i| i.default_reply = Some(report));
    }

    /// Every feature report sent to `path`, oldest first
    pub fn sent_reports(&self, path: &str) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .find(path)
            .map(|i| i.sent.clone())
            .unwrap_or_default()
    }

    /// Number of feature report reads issued against `path`
    pub fn read_count(&self, path: &str) -> usize {
        self.state.lock().find(path).map_or(0, |i| i.reads)
    }

    /// Handles to `path` that are currently alive
    pub fn open_handles(&self, path: &str) -> usize {
        self.state.lock().find(path).map_or(0, |i| i.open_handles)
    }

    /// Sends plus reads across every interface
    pub fn total_io(&self) -> usize {
        self.state
            .lock()
            .interfaces
            .iter()
            .map(|i| i.sent.len() + i.reads)
            .sum()
    }

    pub fn enumerate_calls(&self) -> usize {
        self.state.lock().enumerate_calls
    }

    fn with_interface(&self, path: &str, f: impl FnOnce(&mut MockInterface)) {
        let mut state = self.state.lock();
        match state.find_mut(path) {
            Some(iface) => f(iface),
            None => panic!("mock interface {path} was never added"),
        }
    }
}

impl HidBackend for MockHidBackend {
    fn enumerate(
        &self,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let mut state = self.state.lock();
        state.enumerate_calls += 1;
        Ok(state
            .interfaces
            .iter()
            .filter(|i| i.plugged)
            .filter_map(|i| i.descriptor.clone())
            .filter(|d| d.vendor_id == vendor_id && d.product_id == product_id)
            .collect())
    }

    fn open(&self, descriptor: &DeviceDescriptor) -> Result<BoxedFeatureDevice, TransportError> {
        let mut state = self.state.lock();
        let iface = state
            .find_mut(&descriptor.path)
            .filter(|i| i.plugged)
            .ok_or_else(|| TransportError::DeviceNotFound(descriptor.path.clone()))?;
        if iface.open_fails {
            return Err(TransportError::HidError(format!(
                "failed to open {}",
                descriptor.path
            )));
        }
        iface.open_handles += 1;
        Ok(Box::new(MockHandle {
            path: descriptor.path.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockHandle {
    path: String,
    state: Arc<Mutex<MockState>>,
}

impl FeatureDevice for MockHandle {
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        let iface = state
            .find_mut(&self.path)
            .filter(|i| i.plugged)
            .ok_or(TransportError::Disconnected)?;
        iface.sent.push(data.to_vec());
        if iface.send_fails {
            return Err(TransportError::HidError("mock send failure".into()));
        }
        Ok(())
    }

    fn get_feature_report(&self, report_id: u8, buf: &mut [u8]) -> Result<usize, TransportError> {
        let reply = {
            let mut state = self.state.lock();
            let iface = state
                .find_mut(&self.path)
                .filter(|i| i.plugged)
                .ok_or(TransportError::Disconnected)?;
            iface.reads += 1;
            if iface.panic_on_read {
                None
            } else if iface.read_fails {
                return Err(TransportError::HidError("mock read failure".into()));
            } else {
                Some(
                    iface
                        .replies
                        .pop_front()
                        .or_else(|| iface.default_reply.clone())
                        .ok_or_else(|| TransportError::Internal("no reply scripted".into()))?,
                )
            }
        };

        let Some(reply) = reply else {
            panic!("mock device {} panicked during read", self.path);
        };

        if let Some(first) = buf.first_mut() {
            *first = report_id;
        }
        let n = reply.len().min(buf.len());
        buf[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        if let Some(iface) = self.state.lock().find_mut(&self.path) {
            iface.open_handles = iface.open_handles.saturating_sub(1);
        }
    }
}
