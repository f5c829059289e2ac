//! Portable OS abstraction layer: virtual memory, files, directories,
//! processes with captured pipes, threads, time, environment, TTY, errors.
//!
//! Each primitive has identical semantics on every supported OS; the
//! platform-specific bodies live in [`posix`] / [`windows`] behind this
//! single public surface, per the "target-selected backend module" guidance.

pub mod files;
pub mod process;
pub mod threads;
pub mod time;
pub mod vm;

#[cfg(unix)]
pub(crate) mod posix;
#[cfg(windows)]
pub(crate) mod windows;

use std::fmt;

/// Raw platform error code, as returned by `last_error()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsError(pub i64);

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl OsError {
    /// Formats the platform message for this error code into a caller-owned
    /// string. Callers that need a fixed buffer can reserve
    /// [`OS_ERROR_BUFFER_MAX`] bytes for the equivalent C-style call.
    #[must_use]
    pub fn message(&self) -> String {
        #[cfg(unix)]
        {
            posix::strerror(self.0 as i32)
        }
        #[cfg(windows)]
        {
            windows::format_message(self.0 as u32)
        }
    }
}

/// Buffer size guaranteed to hold any formatted OS error message.
pub const OS_ERROR_BUFFER_MAX: usize = 4096;

/// Raw platform error code of the last failed OS call on this thread.
#[must_use]
pub fn last_error() -> OsError {
    #[cfg(unix)]
    {
        OsError(i64::from(std::io::Error::last_os_error().raw_os_error().unwrap_or(0)))
    }
    #[cfg(windows)]
    {
        OsError(i64::from(windows::get_last_error()))
    }
}

/// Reads an environment variable using the platform's native string width,
/// so the result composes cleanly with argv handling.
#[must_use]
pub fn get_environment_variable(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// True if `fd` (0=stdin, 1=stdout, 2=stderr) is attached to a terminal.
#[must_use]
pub fn is_tty(fd: files::StdStream) -> bool {
    #[cfg(unix)]
    {
        posix::is_tty(fd)
    }
    #[cfg(windows)]
    {
        windows::is_tty(fd)
    }
}

/// One-shot, cached probe for an attached debugger, used by the test/assert
/// harness's `fail()` to trap instead of exiting.
#[must_use]
pub fn is_debugger_present() -> bool {
    #[cfg(unix)]
    {
        posix::is_debugger_present()
    }
    #[cfg(windows)]
    {
        windows::is_debugger_present()
    }
}

/// Terminates the process immediately. Never returns.
pub fn exit(code: i32) -> ! {
    std::process::exit(code)
}
