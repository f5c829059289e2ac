//! Worker threads. Each thread owns a private arena, created by the thin
//! stub this module wraps around the caller's entry point; joining returns
//! the thread's `ProcessResult` cast to `u32` (§5 worker-pool feature).

use crate::arena::Arena;
use crate::os::process::ProcessResult;
use std::thread::JoinHandle;

thread_local! {
    /// Per-thread arena, created lazily by [`spawn`]'s stub before the
    /// user entry point runs. Mirrors the source's `thread_local` pointer.
    static THREAD_ARENA: std::cell::RefCell<Option<Arena>> = const { std::cell::RefCell::new(None) };

    #[cfg(feature = "io-uring")]
    /// Per-thread IO ring, initialized lazily and only ever touched by its
    /// owning thread — never shared, matching the shared-resource policy.
    static THREAD_IO_RING: std::cell::RefCell<Option<crate::io_ring::IoRing>> =
        const { std::cell::RefCell::new(None) };
}

/// Runs `f` with access to this thread's private arena, creating it on
/// first use. Returns `None` if the private arena could not be created
/// (OS reservation failure) rather than `f`'s result.
pub fn with_thread_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> Option<R> {
    THREAD_ARENA.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Arena::create_default().ok();
        }
        slot.as_mut().map(f)
    })
}

/// Spawns an OS thread running the stub: create a private arena, optionally
/// initialize a per-thread IO ring (`io-uring` feature), call `entry_point`,
/// return its `ProcessResult` as the thread's exit value. If the private
/// arena fails to create, the thread exits `Unknown` without running
/// `entry_point`.
pub fn spawn(entry_point: impl FnOnce() -> ProcessResult + Send + 'static) -> JoinHandle<u32> {
    std::thread::spawn(move || match with_thread_arena(|_arena| ()) {
        Some(()) => {
            #[cfg(feature = "io-uring")]
            THREAD_IO_RING.with(|cell| {
                *cell.borrow_mut() = crate::io_ring::init_for_thread();
            });
            entry_point() as u32
        }
        None => ProcessResult::Unknown as u32,
    })
}

/// Blocks until the thread terminates, returning its exit code.
pub fn join(handle: JoinHandle<u32>) -> u32 {
    match handle.join() {
        Ok(code) => code,
        Err(_) => ProcessResult::Unknown as u32,
    }
}
