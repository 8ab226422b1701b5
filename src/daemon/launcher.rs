//! Spawning the daemon executable.
//!
//! The launcher starts `spd` with flags rendered from [`ProcessSettings`]
//! and sends its stdout and stderr into one log file. It does not wait for
//! the API to come up; use [`crate::client::is_running`] for that.

use crate::daemon::settings::ProcessSettings;
use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::{debug, info};

/// File name of the daemon output log.
pub const LOG_FILE_NAME: &str = "spd-output.log";

/// A running daemon process.
///
/// The caller owns the process. Dropping the handle leaves the daemon running;
/// call [`DaemonProcess::stop`] to end it.
#[derive(Debug)]
pub struct DaemonProcess {
    child: Child,
    flags: Vec<String>,
    log_path: PathBuf,
}

impl DaemonProcess {
    /// OS process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Flags the daemon was started with.
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Where stdout and stderr are written.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Exit status if the daemon has exited, without blocking.
    pub fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Block until the daemon exits.
    pub fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait()
    }

    /// Kill the daemon and reap it.
    pub fn stop(&mut self) -> std::io::Result<ExitStatus> {
        if let Some(status) = self.child.try_wait()? {
            return Ok(status);
        }
        info!(pid = self.child.id(), "Stopping daemon");
        self.child.kill()?;
        self.child.wait()
    }

    /// Give up the wrapper and take the raw child handle.
    pub fn into_child(self) -> Child {
        self.child
    }
}

/// Path of the output log: inside `siaprime-directory` when set, otherwise
/// relative to the current directory.
pub fn log_path(settings: &ProcessSettings) -> PathBuf {
    match settings.directory() {
        Some(dir) => dir.join(LOG_FILE_NAME),
        None => PathBuf::from(LOG_FILE_NAME),
    }
}

/// Launch the daemon at `path` with `settings`.
///
/// Fails immediately if the log cannot be opened or the executable cannot
/// be spawned. The daemon's lifecycle is then the caller's.
pub fn launch(path: impl AsRef<Path>, settings: &ProcessSettings) -> Result<DaemonProcess> {
    let path = path.as_ref();
    let flags = settings.flags();
    let log_path = log_path(settings);

    let log_file = File::create(&log_path).map_err(|source| Error::LogFile {
        path: log_path.clone(),
        source,
    })?;
    let stderr_log = log_file.try_clone().map_err(|source| Error::LogFile {
        path: log_path.clone(),
        source,
    })?;

    let mut command = Command::new(path);
    command
        .args(&flags)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(stderr_log));

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // SAFETY: geteuid has no preconditions and cannot fail.
        let euid = unsafe { libc::geteuid() };
        command.uid(euid);
    }

    debug!(flags = ?flags, "Daemon command line");

    let child = command.spawn().map_err(|source| Error::Spawn {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        exe = %path.display(),
        pid = child.id(),
        flags = flags.len(),
        log = %log_path.display(),
        "Launched daemon"
    );

    Ok(DaemonProcess {
        child,
        flags,
        log_path,
    })
}
