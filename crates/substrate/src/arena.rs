//! Reserve-on-create / commit-on-grow bump allocator with scoped reset.

use crate::bytes::align_forward;
use crate::os::vm;
use std::marker::PhantomData;
use thiserror::Error;

/// Default virtual reservation size (4 GiB) and commit granularity (2 MiB),
/// matching the contract in the data model.
pub const DEFAULT_RESERVED_SIZE: usize = 4 * 1024 * 1024 * 1024;
pub const DEFAULT_GRANULARITY: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("failed to reserve {size} bytes of virtual address space: {source}")]
    Reserve {
        size: usize,
        #[source]
        source: vm::VmError,
    },
    #[error("out of virtual address space: position {position} exceeds reserved size {reserved_size}")]
    OutOfVirtualAddressSpace { position: usize, reserved_size: usize },
}

struct ArenaHeader {
    reserved_size: usize,
    granularity: usize,
}

/// A contiguous virtual reservation with a bump pointer. Allocations are
/// scoped: [`Arena::position`] can be snapshotted and later restored with
/// [`Arena::set_position`] to free everything above it in bulk.
///
/// Not `Send`/`Sync`: each arena has exactly one owning thread (§5).
pub struct Arena {
    base: *mut u8,
    header: ArenaHeader,
    position: usize,
    os_position: usize,
    _not_send_sync: PhantomData<*const ()>,
}

impl Arena {
    /// Reserves `reserved_size` bytes and commits `initial_size` up front.
    pub fn create(reserved_size: usize, initial_size: usize, granularity: usize) -> Result<Arena, ArenaError> {
        let base = vm::reserve(reserved_size).map_err(|source| ArenaError::Reserve {
            size: reserved_size,
            source,
        })?;
        let header_size = std::mem::size_of::<usize>() * 2;
        let initial_commit = align_forward(initial_size.max(header_size), granularity).min(reserved_size);
        vm::commit(base, initial_commit).map_err(|source| ArenaError::Reserve {
            size: initial_commit,
            source,
        })?;

        Ok(Arena {
            base,
            header: ArenaHeader {
                reserved_size,
                granularity,
            },
            position: header_size,
            os_position: initial_commit,
            _not_send_sync: PhantomData,
        })
    }

    /// Creates an arena with the spec's documented defaults.
    pub fn create_default() -> Result<Arena, ArenaError> {
        Self::create(DEFAULT_RESERVED_SIZE, DEFAULT_GRANULARITY, DEFAULT_GRANULARITY)
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn os_position(&self) -> usize {
        self.os_position
    }

    #[must_use]
    pub fn reserved_size(&self) -> usize {
        self.header.reserved_size
    }

    /// Aligns `position` up, commits more memory if needed, advances
    /// `position`, and returns the aligned pointer.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<*mut u8, ArenaError> {
        let aligned = align_forward(self.position, align);
        let end = aligned
            .checked_add(size)
            .ok_or(ArenaError::OutOfVirtualAddressSpace {
                position: aligned,
                reserved_size: self.header.reserved_size,
            })?;

        if end > self.header.reserved_size {
            return Err(ArenaError::OutOfVirtualAddressSpace {
                position: end,
                reserved_size: self.header.reserved_size,
            });
        }

        if end > self.os_position {
            let new_os_position = align_forward(end, self.header.granularity).min(self.header.reserved_size);
            let grow_by = new_os_position - self.os_position;
            vm::commit(unsafe { self.base.add(self.os_position) }, grow_by).map_err(|source| {
                ArenaError::Reserve {
                    size: grow_by,
                    source,
                }
            })?;
            self.os_position = new_os_position;
        }

        self.position = end;
        Ok(unsafe { self.base.add(aligned) })
    }

    /// Allocates `size` zeroed bytes as a byte slice.
    pub fn allocate_slice(&mut self, size: usize, align: usize) -> Result<&mut [u8], ArenaError> {
        let ptr = self.allocate(size, align)?;
        let slice = unsafe { std::slice::from_raw_parts_mut(ptr, size) };
        slice.fill(0);
        Ok(slice)
    }

    /// Returns the aligned current pointer without advancing `position`.
    #[must_use]
    pub fn current_pointer(&self, align: usize) -> *mut u8 {
        let aligned = align_forward(self.position, align);
        unsafe { self.base.add(aligned) }
    }

    /// Sets `position` directly. Must be within `[header_size, os_position]`.
    ///
    /// # Panics
    /// Panics if `position` is out of range — this is a programmer error
    /// (restoring a snapshot from a different arena, or past the high-water
    /// mark), not a runtime condition callers should recover from.
    pub fn set_position(&mut self, position: usize) {
        assert!(position <= self.os_position, "set_position beyond os_position");
        self.position = position;
    }

    /// Resets to the empty state, keeping committed pages (arenas never
    /// shrink their physical commit).
    pub fn reset(&mut self) {
        let header_size = std::mem::size_of::<usize>() * 2;
        self.set_position(header_size);
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        let _ = vm::unreserve(self.base, self.header.reserved_size);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn position_increases_monotonically() {
        let mut arena = Arena::create(64 * 1024 * 1024, 4096, 4096).unwrap();
        let mut last = arena.position();
        for size in [1usize, 7, 64, 4096, 1] {
            arena.allocate(size, 1).unwrap();
            assert!(arena.position() >= last);
            assert_eq!(arena.os_position() % arena.header.granularity, 0);
            assert!(arena.os_position() >= arena.position());
            last = arena.position();
        }
    }

    #[test]
    fn scoped_reset_replays_identically() {
        let mut arena = Arena::create(64 * 1024 * 1024, 4096, 4096).unwrap();
        let snapshot = arena.position();

        for _ in 0..32 {
            arena.allocate(256, 8).unwrap();
        }
        let before_ptr = arena.current_pointer(1);

        arena.set_position(snapshot);
        arena.allocate(100 * 1024, 8).unwrap();
        arena.set_position(snapshot);

        let after_ptr = arena.current_pointer(1);
        assert_eq!(before_ptr, after_ptr);
    }

    #[test]
    fn allocate_past_reserved_size_fails() {
        let mut arena = Arena::create(64 * 1024, 4096, 4096).unwrap();
        let result = arena.allocate(10 * 1024 * 1024, 1);
        assert!(matches!(result, Err(ArenaError::OutOfVirtualAddressSpace { .. })));
    }
}
