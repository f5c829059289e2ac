//! POSIX-specific backends for the small surface that isn't already covered
//! uniformly by `std` (strerror formatting, TTY probe, debugger probe).

use super::files::StdStream;
use std::ffi::CStr;

pub(super) fn strerror(code: i32) -> String {
    unsafe {
        let ptr = libc::strerror(code);
        if ptr.is_null() {
            return format!("unknown error {code}");
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

pub(super) fn is_tty(fd: StdStream) -> bool {
    let raw_fd = match fd {
        StdStream::Stdin => libc::STDIN_FILENO,
        StdStream::Stdout => libc::STDOUT_FILENO,
        StdStream::Stderr => libc::STDERR_FILENO,
    };
    unsafe { libc::isatty(raw_fd) != 0 }
}

/// Linux-only best-effort probe via `/proc/self/status`'s `TracerPid` field;
/// always `false` on other POSIX platforms where there's no equivalently
/// cheap mechanism without linking a debug API.
#[cfg(target_os = "linux")]
pub(super) fn is_debugger_present() -> bool {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return false;
    };
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|value| value.trim().parse::<u32>().ok())
        .is_some_and(|pid| pid != 0)
}

#[cfg(not(target_os = "linux"))]
pub(super) fn is_debugger_present() -> bool {
    false
}
