//! One-shot command handlers.

use super::{build_manager, open_backend, CommandResult};
use endgame_battery::protocol::{USAGE, USAGE_PAGE, VENDOR_ID};
use endgame_battery::Config;

/// Connect to the best device and print one reading
pub fn battery(config: &Config, quiet: bool) -> CommandResult {
    let backend = open_backend()?;
    let mut manager = build_manager(config, backend);

    if !manager.find_and_connect() {
        if quiet {
            eprintln!("No device found");
            std::process::exit(1);
        }
        println!("No supported Endgame Gear device found");
        return Ok(());
    }

    let status = manager.read_battery();
    if quiet {
        if !status.is_known() {
            eprintln!("No battery data");
            std::process::exit(1);
        }
        println!("{}", status.percentage);
        return Ok(());
    }

    println!("Battery Status");
    println!("--------------");
    println!("  Device:   {}", manager.device_name());
    if let Some(pid) = manager.active_pid() {
        println!("  PID:      {:04X}:{:04X}", VENDOR_ID, pid);
    }
    println!("  Mode:     {}", manager.connection_mode());
    if status.is_known() {
        println!("  Level:    {}%", status.percentage);
        println!("  Charging: {}", if status.is_charging { "Yes" } else { "No" });
    } else {
        println!("  Level:    Unknown (device did not answer the battery query)");
    }
    manager.disconnect();
    Ok(())
}

/// Print the device catalog in priority order
pub fn devices(config: &Config) -> CommandResult {
    let mut models = config.models();
    models.sort_by_key(|m| m.priority);

    println!("Supported devices (lower priority value wins):");
    for model in &models {
        let fmt_pids = |pids: &[u16]| {
            if pids.is_empty() {
                "-".to_string()
            } else {
                pids.iter()
                    .map(|p| format!("{p:04X}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        println!(
            "  [{}] {} ({})  wireless: {}  wired: {}",
            model.priority,
            model.name,
            model.kind,
            fmt_pids(&model.wireless_pids),
            fmt_pids(&model.wired_pids)
        );
    }
    Ok(())
}

/// List every HID interface present under a supported product id
pub fn list(config: &Config) -> CommandResult {
    let backend = open_backend()?;
    let mut models = config.models();
    models.sort_by_key(|m| m.priority);

    let mut found = 0;
    for model in &models {
        for pid in model.supported_pids() {
            let descriptors = backend.enumerate(VENDOR_ID, pid)?;
            for desc in descriptors {
                found += 1;
                let marker = if desc.matches_usage(USAGE_PAGE, USAGE) {
                    "*"
                } else {
                    " "
                };
                let mode = model.connection_mode(Some(pid));
                println!("{marker} {} [{}] {}", model.kind, mode, desc);
            }
        }
    }

    if found == 0 {
        println!("No supported Endgame Gear device found");
    } else {
        println!();
        println!("* = battery query interface (usage page 0x{USAGE_PAGE:04X}, usage 0x{USAGE:04X})");
    }
    Ok(())
}
