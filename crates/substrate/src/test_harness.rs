//! Unit test & assertion harness: `check()`/`assert_failed()`/`fail()` for
//! invariant checks, `test()` for recording pass/fail into a running result,
//! and `TestArguments` snapshot/reset so suites stay allocation-transparent.

use crate::arena::Arena;

/// Traps into an attached debugger, or exits with code 1. Never returns.
pub fn fail() -> ! {
    if crate::os::is_debugger_present() {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            std::arch::asm!("int3");
        }
        #[cfg(target_arch = "aarch64")]
        unsafe {
            std::arch::asm!("brk #0");
        }
    }
    crate::os::exit(1)
}

/// Prints a fixed-format diagnostic naming the failed call site, then
/// [`fail`]s. Never returns.
pub fn assert_failed(line: u32, function: &str, file: &str) -> ! {
    eprintln!("assertion failed at {file}:{line} in {function}");
    fail()
}

/// If `cond` is false, reports the call site and [`fail`]s. Prefer the
/// [`check!`] macro so `line`/`function`/`file` are captured automatically.
pub fn check(cond: bool, line: u32, function: &str, file: &str) {
    if !cond {
        assert_failed(line, function, file);
    }
}

/// Calls [`check`] with the current call site captured via `line!()`,
/// `module_path!()`, and `file!()`.
#[macro_export]
macro_rules! check {
    ($cond:expr) => {
        $crate::test_harness::check($cond, line!(), module_path!(), file!())
    };
}

/// Records `cond` into `result` (latched false once any check fails) and, on
/// failure, prints a diagnostic naming `description` and traps under a
/// debugger without terminating the process — a single test suite run keeps
/// going to report every failure, not just the first.
pub fn test(result: &mut bool, cond: bool, description: &str) {
    if !cond {
        *result = false;
        eprintln!("test failed: {description}");
        if crate::os::is_debugger_present() {
            #[cfg(target_arch = "x86_64")]
            unsafe {
                std::arch::asm!("int3");
            }
        }
    }
}

/// Arena and verbosity handed to a `*_tests(TestArguments)` entry point.
pub struct TestArguments<'a> {
    pub arena: &'a mut Arena,
    pub show: bool,
}

/// Snapshots `arena`'s position, runs `suite`, then resets the arena back to
/// that snapshot so the suite's allocations never leak into the caller.
pub fn run_test_suite(
    arena: &mut Arena,
    show: bool,
    suite: impl FnOnce(&mut TestArguments<'_>) -> bool,
) -> bool {
    let snapshot = arena.position();
    let mut args = TestArguments { arena, show };
    let passed = suite(&mut args);
    args.arena.set_position(snapshot);
    passed
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn run_test_suite_resets_arena_position_after_running() {
        let mut arena = Arena::create(1024 * 1024, 4096, 4096).unwrap();
        let before = arena.position();

        let passed = run_test_suite(&mut arena, false, |args| {
            let _ = args.arena.allocate(64, 8).unwrap();
            assert!(args.arena.position() > before);
            true
        });

        assert!(passed);
        assert_eq!(arena.position(), before);
    }

    #[test]
    fn test_fn_latches_result_false_without_aborting() {
        let mut result = true;
        test(&mut result, true, "always true");
        assert!(result);
        test(&mut result, false, "deliberately false");
        assert!(!result);
    }
}
