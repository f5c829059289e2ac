//! Virtual memory: reserve, commit, unreserve.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("OS reservation failed: {0}")]
    Reserve(#[source] std::io::Error),
    #[error("OS commit failed: {0}")]
    Commit(#[source] std::io::Error),
    #[error("OS unreserve failed: {0}")]
    Unreserve(#[source] std::io::Error),
}

/// Reserves `size` bytes of address space without committing any of it.
/// Returns the base pointer; fails only on OS reservation failure.
#[cfg(unix)]
pub fn reserve(size: usize) -> Result<*mut u8, VmError> {
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            size,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANON,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(VmError::Reserve(std::io::Error::last_os_error()));
    }
    Ok(ptr.cast())
}

#[cfg(windows)]
pub fn reserve(size: usize) -> Result<*mut u8, VmError> {
    use windows_sys::Win32::System::Memory::{VirtualAlloc, MEM_RESERVE, PAGE_NOACCESS};
    let ptr = unsafe { VirtualAlloc(std::ptr::null(), size, MEM_RESERVE, PAGE_NOACCESS) };
    if ptr.is_null() {
        return Err(VmError::Reserve(std::io::Error::last_os_error()));
    }
    Ok(ptr.cast())
}

/// Makes `size` bytes starting at `addr` readable+writable. Idempotent.
#[cfg(unix)]
pub fn commit(addr: *mut u8, size: usize) -> Result<(), VmError> {
    if size == 0 {
        return Ok(());
    }
    let rc = unsafe { libc::mprotect(addr.cast(), size, libc::PROT_READ | libc::PROT_WRITE) };
    if rc != 0 {
        return Err(VmError::Commit(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(windows)]
pub fn commit(addr: *mut u8, size: usize) -> Result<(), VmError> {
    use windows_sys::Win32::System::Memory::{VirtualAlloc, MEM_COMMIT, PAGE_READWRITE};
    if size == 0 {
        return Ok(());
    }
    let ptr = unsafe { VirtualAlloc(addr.cast(), size, MEM_COMMIT, PAGE_READWRITE) };
    if ptr.is_null() {
        return Err(VmError::Commit(std::io::Error::last_os_error()));
    }
    Ok(())
}

/// Best-effort page pin: lock then immediately unlock, to force the OS to
/// allocate physical frames eagerly. Failure is ignored by callers.
#[cfg(unix)]
pub fn touch_pages(addr: *mut u8, size: usize) {
    unsafe {
        if libc::mlock(addr.cast(), size) == 0 {
            libc::munlock(addr.cast(), size);
        }
    }
}

#[cfg(windows)]
pub fn touch_pages(_addr: *mut u8, _size: usize) {
    // VirtualLock is available but no test scenario requires it; left as a no-op.
}

/// Releases the whole region. Must match a prior `reserve` exactly.
#[cfg(unix)]
pub fn unreserve(addr: *mut u8, size: usize) -> Result<(), VmError> {
    let rc = unsafe { libc::munmap(addr.cast(), size) };
    if rc != 0 {
        return Err(VmError::Unreserve(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(windows)]
pub fn unreserve(addr: *mut u8, _size: usize) -> Result<(), VmError> {
    use windows_sys::Win32::System::Memory::{VirtualFree, MEM_RELEASE};
    let rc = unsafe { VirtualFree(addr.cast(), 0, MEM_RELEASE) };
    if rc == 0 {
        return Err(VmError::Unreserve(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn reserve_commit_unreserve_round_trip() {
        let size = 16 * 1024 * 1024;
        let base = reserve(size).unwrap();
        commit(base, 4096).unwrap();
        unsafe {
            base.write(0xAB);
        }
        assert_eq!(unsafe { base.read() }, 0xAB);
        unreserve(base, size).unwrap();
    }
}
