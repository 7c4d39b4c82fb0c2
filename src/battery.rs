//! Battery status and the feature-report exchange that produces it
//!
//! A reading takes two identical query passes. The reply to the first pass is
//! thrown away: the firmware only fills in the battery byte once it has been
//! asked at least once, so the first pass primes it and the second pass is the
//! one that gets validated. There is no retry beyond those two passes; any
//! failing step ends the call with [`BatteryStatus::UNKNOWN`] and the caller
//! polls again later.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use endgame_transport::{FeatureDevice, TransportError};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::protocol::{self, reply, timing, MAX_PERCENTAGE, REPORT_ID, REPORT_SIZE};

/// Normalized battery reading
///
/// Either a full reading or [`BatteryStatus::UNKNOWN`]; never a mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    /// 0-100, or -1 when unknown
    pub percentage: i32,
    /// Device is on the cable and charging
    pub is_charging: bool,
    /// Device is running on its radio link
    pub is_wireless: bool,
}

impl BatteryStatus {
    /// Returned whenever no trustworthy reading could be taken
    pub const UNKNOWN: Self = Self {
        percentage: -1,
        is_charging: false,
        is_wireless: false,
    };

    /// Normalize a raw battery byte
    ///
    /// A wired connection implies charging; wireless and charging are
    /// mutually exclusive.
    pub fn from_raw(raw: u8, wired: bool) -> Self {
        Self {
            percentage: i32::from(raw.min(MAX_PERCENTAGE)),
            is_charging: wired,
            is_wireless: !wired,
        }
    }

    /// Whether this is a real reading rather than the failure sentinel
    pub fn is_known(&self) -> bool {
        self.percentage >= 0
    }
}

impl Default for BatteryStatus {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_known() {
            return write!(f, "Unknown");
        }
        write!(f, "{}%", self.percentage)?;
        if self.is_charging {
            write!(f, " (charging)")
        } else if self.is_wireless {
            write!(f, " (wireless)")
        } else {
            Ok(())
        }
    }
}

/// Waits used by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolTiming {
    /// Between sending a query and reading its reply
    pub settle: Duration,
    /// Between the priming pass and the authoritative pass
    pub prime_gap: Duration,
}

impl ProtocolTiming {
    pub fn from_millis(settle_ms: u64, prime_gap_ms: u64) -> Self {
        Self {
            settle: Duration::from_millis(settle_ms),
            prime_gap: Duration::from_millis(prime_gap_ms),
        }
    }

    /// No waiting at all, for scripted backends
    pub fn instant() -> Self {
        Self::from_millis(0, 0)
    }

    /// Time a full reading spends sleeping
    pub fn total(&self) -> Duration {
        self.settle * 2 + self.prime_gap
    }
}

impl Default for ProtocolTiming {
    fn default() -> Self {
        Self::from_millis(timing::SETTLE_MS, timing::PRIME_GAP_MS)
    }
}

#[derive(Error, Debug)]
enum ExchangeError {
    #[error("failed to send battery query: {0}")]
    Send(#[source] TransportError),

    #[error("failed to get feature report: {0}")]
    Read(#[source] TransportError),

    #[error("invalid response: unexpected status byte 0x{0:02X}")]
    InvalidStatus(u8),
}

impl ExchangeError {
    /// The handle itself failed, as opposed to the device declining to answer
    fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Send(_) | Self::Read(_))
    }
}

/// Run the two-pass exchange on an open handle and normalize the result
///
/// `wired` tells whether the handle was matched through a wired product id.
/// Every failure, including a panic inside the transport, is logged and
/// turned into [`BatteryStatus::UNKNOWN`].
pub fn read_battery(
    device: &dyn FeatureDevice,
    wired: bool,
    timing: &ProtocolTiming,
    label: &str,
) -> BatteryStatus {
    match catch_unwind(AssertUnwindSafe(|| exchange(device, timing, label))) {
        Ok(Ok(raw)) => {
            let status = BatteryStatus::from_raw(raw, wired);
            debug!("{}: Success - Battery {}%", label, status.percentage);
            status
        }
        Ok(Err(e)) => {
            if e.is_transport_failure() {
                warn!("{}: {}", label, e);
            } else {
                debug!("{}: {}", label, e);
            }
            BatteryStatus::UNKNOWN
        }
        Err(payload) => {
            error!(
                "{}: fault during battery exchange: {}",
                label,
                panic_message(payload.as_ref())
            );
            BatteryStatus::UNKNOWN
        }
    }
}

fn exchange(
    device: &dyn FeatureDevice,
    timing: &ProtocolTiming,
    label: &str,
) -> Result<u8, ExchangeError> {
    debug!("{}: Pass 1/2 (priming)", label);
    let primed = query_once(device, timing)?;
    debug!("{}: Priming reply {}", label, protocol::describe_reply(&primed));
    pause(timing.prime_gap);

    debug!("{}: Pass 2/2", label);
    let buf = query_once(device, timing)?;
    debug!("{}: Reply {}", label, protocol::describe_reply(&buf));

    let status = buf[reply::STATUS_OFFSET];
    if !protocol::is_valid_status(status) {
        return Err(ExchangeError::InvalidStatus(status));
    }
    Ok(buf[reply::BATTERY_OFFSET])
}

fn query_once(
    device: &dyn FeatureDevice,
    timing: &ProtocolTiming,
) -> Result<[u8; REPORT_SIZE], ExchangeError> {
    let query = protocol::build_battery_query();
    device
        .send_feature_report(&query)
        .map_err(ExchangeError::Send)?;

    pause(timing.settle);

    let mut buf = [0u8; REPORT_SIZE];
    device
        .get_feature_report(REPORT_ID, &mut buf)
        .map_err(ExchangeError::Read)?;
    Ok(buf)
}

fn pause(d: Duration) {
    if !d.is_zero() {
        std::thread::sleep(d);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
