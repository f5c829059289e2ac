//! Two-phase scheduler: compile phase fully spawns and waits before the
//! link phase begins, all-or-nothing per phase, spawn order == wait order
//! (`substrate::os::process::wait_all`'s FIFO join matches spawn order).
//! The builder's own link unit is always skipped in the link fan-out; its
//! tests run in-process instead of via a spawned child.

use crate::build_plan::{BuildPlan, CompilationUnit, LinkUnitPlan};
use crate::compile_args::{build_arguments, CompileLinkOptions};
use std::path::Path;
use substrate::os::process::{self, CaptureOptions, ProcessResult, WaitOutcome};
use substrate::Target;

#[derive(Debug)]
pub enum PhaseFailure {
    Compile(Vec<WaitOutcome>),
    Link(Vec<WaitOutcome>),
    Run(Vec<WaitOutcome>),
    Spawn(std::io::Error),
}

/// Everything the scheduler needs to turn a plan into clang/lld invocations,
/// beyond what varies per compilation/link unit.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions<'a> {
    pub clang_path: &'a str,
    pub target: &'a Target,
    pub include_tests: bool,
    pub force_color: bool,
    pub xc_sdk_path: Option<&'a str>,
}

fn spawn_one(argv: &[String]) -> std::io::Result<process::Spawn> {
    let Some((program, rest)) = argv.split_first() else {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"));
    };
    process::spawn(Path::new(program), rest, &[], CaptureOptions::default())
}

fn compile_argv(unit: &CompilationUnit, options: &SchedulerOptions<'_>) -> Vec<String> {
    let source = unit.source_path.to_string_lossy().into_owned();
    build_arguments(&CompileLinkOptions {
        clang_path: options.clang_path,
        destination_path: &unit.object_path.to_string_lossy(),
        source_paths: &[source],
        target: options.target,
        optimize: unit.optimize,
        fuzz: unit.fuzz,
        has_debug_information: unit.has_debug_information,
        sanitize: false,
        unity_build: false,
        use_io_ring: unit.use_io_ring,
        include_tests: options.include_tests,
        just_preprocessor: false,
        compile: true,
        link: false,
        force_color: options.force_color,
        xc_sdk_path: options.xc_sdk_path,
    })
}

fn link_argv(unit: &LinkUnitPlan, options: &SchedulerOptions<'_>) -> Vec<String> {
    let sources: Vec<String> = unit.object_paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
    build_arguments(&CompileLinkOptions {
        clang_path: options.clang_path,
        destination_path: &unit.artifact_path.to_string_lossy(),
        source_paths: &sources,
        target: options.target,
        optimize: unit.optimize,
        fuzz: unit.fuzz,
        has_debug_information: unit.has_debug_information,
        sanitize: unit.sanitize,
        unity_build: false,
        use_io_ring: unit.use_io_ring,
        include_tests: options.include_tests,
        just_preprocessor: false,
        compile: false,
        link: true,
        force_color: options.force_color,
        xc_sdk_path: options.xc_sdk_path,
    })
}

/// Spawns every compilation unit's `clang -c` invocation, then waits on all
/// of them. Fails the whole phase if any single compile fails.
pub fn run_compile_phase(plan: &BuildPlan, options: &SchedulerOptions<'_>) -> Result<(), PhaseFailure> {
    let mut spawns = Vec::with_capacity(plan.compilation_units.len());
    for unit in &plan.compilation_units {
        let argv = compile_argv(unit, options);
        spawns.push(spawn_one(&argv).map_err(PhaseFailure::Spawn)?);
    }

    let outcomes = process::wait_all(spawns).map_err(PhaseFailure::Spawn)?;
    if process::all_succeeded(&outcomes) {
        Ok(())
    } else {
        Err(PhaseFailure::Compile(outcomes))
    }
}

/// Spawns every non-builder link unit's `clang -o <artifact>` invocation,
/// then waits on all of them. The builder's own artifact is already on disk
/// from a previous run driving this process; it is never relinked here.
pub fn run_link_phase(plan: &BuildPlan, options: &SchedulerOptions<'_>) -> Result<(), PhaseFailure> {
    let mut spawns = Vec::new();
    for unit in &plan.link_units {
        if unit.is_builder {
            continue;
        }
        let argv = link_argv(unit, options);
        spawns.push(spawn_one(&argv).map_err(PhaseFailure::Spawn)?);
    }

    let outcomes = process::wait_all(spawns).map_err(PhaseFailure::Spawn)?;
    if process::all_succeeded(&outcomes) {
        Ok(())
    } else {
        Err(PhaseFailure::Link(outcomes))
    }
}

/// RUN-phase argv for one non-builder link unit under `test`/`test_all`:
/// `fuzz_duration > 0` selects the libFuzzer-style flags, otherwise a bare
/// `test` argument is passed to the unit's own test entry point.
#[must_use]
pub fn run_argv(fuzz_duration: u64) -> Vec<String> {
    if fuzz_duration > 0 {
        vec!["-max_len=4096".to_string(), format!("-max_total_time={fuzz_duration}")]
    } else {
        vec!["test".to_string()]
    }
}

/// Spawns every non-builder link unit's artifact with [`run_argv`], then
/// waits on all of them. The builder's own tests are run in-process by the
/// caller (`builder_tests()`) before this is called, not spawned here.
pub fn run_test_phase(plan: &BuildPlan, fuzz_duration: u64) -> Result<(), PhaseFailure> {
    let argv = run_argv(fuzz_duration);
    let mut spawns = Vec::new();
    for unit in &plan.link_units {
        if unit.is_builder {
            continue;
        }
        let spawn = process::spawn(&unit.artifact_path, &argv, &[], CaptureOptions::default()).map_err(PhaseFailure::Spawn)?;
        spawns.push(spawn);
    }

    let outcomes = process::wait_all(spawns).map_err(PhaseFailure::Spawn)?;
    if process::all_succeeded(&outcomes) {
        Ok(())
    } else {
        Err(PhaseFailure::Run(outcomes))
    }
}

/// Maps a phase outcome to the CLI exit code in §6.
#[must_use]
pub fn exit_code(result: &Result<(), PhaseFailure>) -> i32 {
    match result {
        Ok(()) => ProcessResult::Success as i32,
        Err(PhaseFailure::Spawn(_)) => ProcessResult::NotExistent as i32,
        Err(PhaseFailure::Compile(outcomes) | PhaseFailure::Link(outcomes) | PhaseFailure::Run(outcomes)) => {
            let kinds = process::failure_kinds(outcomes);
            if kinds.contains(&ProcessResult::Crash) {
                ProcessResult::Crash as i32
            } else if kinds.contains(&ProcessResult::FailedTryAgain) {
                ProcessResult::FailedTryAgain as i32
            } else if kinds.contains(&ProcessResult::Unknown) {
                ProcessResult::Unknown as i32
            } else {
                ProcessResult::Failed as i32
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn run_argv_selects_fuzzer_flags_when_duration_is_set() {
        let argv = run_argv(30);
        assert_eq!(argv, vec!["-max_len=4096".to_string(), "-max_total_time=30".to_string()]);
    }

    #[test]
    fn run_argv_defaults_to_bare_test_token() {
        let argv = run_argv(0);
        assert_eq!(argv, vec!["test".to_string()]);
    }

    #[test]
    fn exit_code_maps_success_to_zero() {
        assert_eq!(exit_code(&Ok(())), 0);
    }
}
