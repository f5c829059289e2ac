//! Monotonic timestamps.

use std::time::Instant;

/// Opaque monotonic timestamp.
#[derive(Debug, Clone, Copy)]
pub struct TimeValue(Instant);

/// Captures monotonic clock frequency once. On every platform this crate
/// targets, [`std::time::Instant`] is already backed by a monotonic clock
/// with no explicit initialization step, so this always succeeds; it exists
/// to keep the call site identical to the spec's contract.
#[must_use]
pub fn initialize_time() -> bool {
    true
}

#[must_use]
pub fn timestamp_take() -> TimeValue {
    TimeValue(Instant::now())
}

#[must_use]
pub fn ns_between(start: TimeValue, end: TimeValue) -> u64 {
    end.0.saturating_duration_since(start.0).as_nanos() as u64
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn ns_between_is_non_negative_and_monotonic() {
        let start = timestamp_take();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let end = timestamp_take();
        assert!(ns_between(start, end) > 0);
    }
}
