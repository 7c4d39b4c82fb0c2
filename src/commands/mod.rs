//! Command handlers for the CLI application.
//!
//! - `query`: one-shot commands (battery, devices, list)
//! - `watch`: the polling loop

pub mod query;
pub mod watch;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use endgame_battery::{Config, DeviceManager};
use endgame_transport::{HidApiBackend, HidBackend};

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Initialize the system HID backend
pub fn open_backend() -> anyhow::Result<Arc<dyn HidBackend>> {
    let backend = HidApiBackend::new()?;
    Ok(Arc::new(backend))
}

/// Build a manager over every model the config enables
pub fn build_manager(config: &Config, backend: Arc<dyn HidBackend>) -> DeviceManager {
    DeviceManager::from_models(config.models(), backend, config.protocol_timing())
}

/// Set up a Ctrl-C handler that sets the given flag to false when triggered.
/// Returns the Arc<AtomicBool> for use in the main loop.
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}
