//! siaprime - a lightweight wrapper for starting, and communicating with, a
//! SiaPrime daemon (`spd`).
//!
//! ```no_run
//! # async fn demo() -> siaprime::Result<()> {
//! use siaprime::{connect, launch, ProcessSettings};
//!
//! let mut spd = launch("spd", &ProcessSettings::new().authenticate_api(false))?;
//! let conn = connect("localhost:4280").await?;
//! let consensus = conn.call("/consensus").await?;
//! println!("height: {}", consensus["height"]);
//! let _ = spd.stop();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod daemon;
pub mod error;
pub mod protocol;
pub mod telemetry;
pub mod units;

pub use client::{call, connect, is_running, Connection};
pub use config::Config;
pub use daemon::{launch, DaemonProcess, FlagValue, ProcessSettings, SettingKey};
pub use error::{Error, Result};
pub use protocol::{build_request, RequestDescriptor, RequestOptions};
pub use units::{to_main_unit, to_subunits, Amount};
