//! Daemon side of the wrapper.
//!
//! Builds the `spd` command line from settings and starts the process. The
//! spawned daemon is the caller's to manage.

pub mod launcher;
pub mod settings;

pub use launcher::{launch, DaemonProcess, LOG_FILE_NAME};
pub use settings::{FlagValue, ProcessSettings, SettingKey};
