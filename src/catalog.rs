//! Built-in device catalog - product id tables and priorities
//!
//! Mice are preferred over the standalone dongle: when a mouse answers on its
//! own interface the reading is attributed to the right product.

use crate::device::DeviceModel;

/// OP1w 4K product ids on the 4K receiver
pub const OP1W_WIRELESS_PIDS: &[u16] = &[
    0x1971, // OP1w 4K via 4K dongle
];

/// OP1w 4K product ids when cabled
pub const OP1W_WIRED_PIDS: &[u16] = &[
    0x1970, // OP1w 4K USB-C
];

/// XM2w 4K v2 product ids on the 4K receiver
pub const XM2W_V2_WIRELESS_PIDS: &[u16] = &[
    0x1981, // XM2w 4K v2 via 4K dongle
];

/// XM2w 4K v2 product ids when cabled
pub const XM2W_V2_WIRED_PIDS: &[u16] = &[
    0x1980, // XM2w 4K v2 USB-C
];

/// Standalone 4K receiver, reports the battery of whichever mouse is paired
pub const DONGLE_WIRELESS_PIDS: &[u16] = &[
    0x1990, // 4K wireless dongle
];

pub const PRIORITY_OP1W: i32 = 1;
pub const PRIORITY_XM2W_V2: i32 = 2;
pub const PRIORITY_DONGLE: i32 = 3;

fn model(name: &str, kind: &str, priority: i32, wireless: &[u16], wired: &[u16]) -> DeviceModel {
    DeviceModel {
        name: name.to_string(),
        kind: kind.to_string(),
        priority,
        wireless_pids: wireless.to_vec(),
        wired_pids: wired.to_vec(),
    }
}

pub fn op1w() -> DeviceModel {
    model(
        "Endgame Gear OP1w 4K",
        "OP1W",
        PRIORITY_OP1W,
        OP1W_WIRELESS_PIDS,
        OP1W_WIRED_PIDS,
    )
}

pub fn xm2w_v2() -> DeviceModel {
    model(
        "Endgame Gear XM2w 4K v2",
        "XM2Wv2",
        PRIORITY_XM2W_V2,
        XM2W_V2_WIRELESS_PIDS,
        XM2W_V2_WIRED_PIDS,
    )
}

pub fn wireless_dongle() -> DeviceModel {
    model(
        "Endgame Gear 4K Wireless Dongle",
        "Dongle",
        PRIORITY_DONGLE,
        DONGLE_WIRELESS_PIDS,
        &[],
    )
}

/// Built-in models in declaration order (not sorted by priority)
pub fn builtin_models() -> Vec<DeviceModel> {
    vec![op1w(), xm2w_v2(), wireless_dongle()]
}

/// Find the model that lists `pid`
pub fn model_for_pid(models: &[DeviceModel], pid: u16) -> Option<&DeviceModel> {
    models.iter().find(|m| m.supports_pid(pid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_priorities_distinct() {
        let models = builtin_models();
        let mut priorities: Vec<i32> = models.iter().map(|m| m.priority).collect();
        priorities.sort();
        priorities.dedup();
        assert_eq!(priorities.len(), models.len());
    }

    #[test]
    fn test_pids_not_shared_between_models() {
        let models = builtin_models();
        for (i, a) in models.iter().enumerate() {
            for b in models.iter().skip(i + 1) {
                assert!(
                    a.supported_pids().all(|pid| !b.supports_pid(pid)),
                    "{} and {} share a PID",
                    a.kind,
                    b.kind
                );
            }
        }
    }

    #[test]
    fn test_dongle_has_no_wired_pids() {
        assert!(wireless_dongle().wired_pids.is_empty());
    }

    #[test]
    fn test_model_for_pid() {
        let models = builtin_models();
        assert_eq!(model_for_pid(&models, 0x1970).map(|m| m.kind.as_str()), Some("OP1W"));
        assert_eq!(model_for_pid(&models, 0x1981).map(|m| m.kind.as_str()), Some("XM2Wv2"));
        assert_eq!(model_for_pid(&models, 0x1990).map(|m| m.kind.as_str()), Some("Dongle"));
        assert!(model_for_pid(&models, 0x0000).is_none());
    }
}
