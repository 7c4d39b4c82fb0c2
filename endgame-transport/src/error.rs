//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Invalid device path: {0}")]
    InvalidPath(String),

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransportError {
    /// Whether the error means the device node exists but we lack access to it
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, TransportError::HidPermissionDenied(_))
    }
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") || msg.contains("EACCES") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_mapping() {
        let err: TransportError = hidapi::HidError::HidApiError {
            message: "Permission denied".into(),
        }
        .into();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_generic_hid_error_mapping() {
        let err: TransportError = hidapi::HidError::HidApiError {
            message: "Broken pipe".into(),
        }
        .into();
        assert!(!err.is_permission_denied());
        assert!(err.to_string().contains("Broken pipe"));
    }
}
