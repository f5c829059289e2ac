//! Per-thread io-uring submission queue, behind the `io-uring` feature.
//! Does not change the build driver's control flow (§5); it only gives
//! per-thread IO ring initialization something real to call on Linux.

#[cfg(target_os = "linux")]
use io_uring::IoUring;

/// A thread-owned io-uring instance. Never shared across threads, matching
/// the "per-thread IO ring" shared-resource policy.
#[cfg(target_os = "linux")]
pub struct IoRing {
    ring: IoUring,
}

#[cfg(target_os = "linux")]
impl IoRing {
    /// Creates a ring with `entries` submission-queue slots.
    pub fn create(entries: u32) -> std::io::Result<IoRing> {
        Ok(IoRing {
            ring: IoUring::new(entries)?,
        })
    }

    /// Submits queued entries and waits for at least one completion.
    pub fn submit_and_wait(&mut self, want: usize) -> std::io::Result<usize> {
        self.ring.submit_and_wait(want)
    }
}

#[cfg(not(target_os = "linux"))]
pub struct IoRing;

#[cfg(not(target_os = "linux"))]
impl IoRing {
    pub fn create(_entries: u32) -> std::io::Result<IoRing> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "io-uring is only available on Linux",
        ))
    }
}

/// Initializes a per-thread ring if the feature is enabled and the
/// platform supports it; returns `None` otherwise rather than failing the
/// thread's startup (matching "optionally initializes a per-thread IO
/// ring" — optional, never required).
#[must_use]
pub fn init_for_thread() -> Option<IoRing> {
    IoRing::create(256).ok()
}
