//! The `xbuild` binary: resolves the static module table into compilation
//! and link units for one target, drives clang/lld through the two-phase
//! scheduler, and emits `compile_commands.json`, matching spec.md's §2
//! data-flow paragraph end to end.

mod build_plan;
mod cli;
mod compile_args;
mod compile_commands;
mod modules;
mod scheduler;
mod toolchain;

use anyhow::{bail, Context};
use cli::Command;
use scheduler::SchedulerOptions;
use std::path::Path;
use substrate::os::files::make_directory_all;
use substrate::Target;
use tracing::{debug, error, info};

fn install_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// `build/cache_manifest` is probed exactly as the original does; finding
/// one is a fatal "not yet implemented" condition (see DESIGN.md's Open
/// Question decision), preserving observable behavior rather than silently
/// diverging.
fn probe_cache_manifest() -> anyhow::Result<()> {
    let manifest_path = Path::new("build/cache_manifest");
    if manifest_path.exists() {
        bail!("cache manifest found at {} but caching is not yet implemented", manifest_path.display());
    }
    Ok(())
}

fn run() -> anyhow::Result<i32> {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let no_extra_hook = |_args: &[String], _index: usize, _arg: &str| false;

    let options = match cli::parse(&raw_args, no_extra_hook) {
        Ok(options) => options,
        Err(err) => {
            install_tracing(false);
            error!("{err}");
            return Ok(substrate::os::process::ProcessResult::Failed as i32);
        }
    };

    install_tracing(options.verbose);
    probe_cache_manifest()?;

    let target = Target::native();
    info!(triple = %target.triple(), "resolved native target");

    let mut specs = modules::link_unit_specifications();
    let unity_build = options.unity_build.unwrap_or(options.optimize);
    if unity_build {
        modules::apply_unity_build(&mut specs);
    }

    let plan = build_plan::resolve(
        &specs,
        &target,
        options.optimize,
        options.has_debug_information.unwrap_or(true),
        options.fuzz,
        false,
        options.sanitize,
    );

    make_directory_all(&plan.target_directory).with_context(|| format!("creating {}", plan.target_directory.display()))?;

    let home = toolchain::home_directory().context("resolving toolchain home directory (HOME/USERPROFILE)")?;
    let toolchain_info = toolchain::info(&home, "18.1.0", target.cpu_arch, target.os);
    debug!(clang = %toolchain_info.clang_path, "resolved toolchain");

    let include_tests = matches!(options.command, Some(Command::Test | Command::TestAll));
    let scheduler_options = SchedulerOptions {
        clang_path: &toolchain_info.clang_path,
        target: &target,
        include_tests,
        force_color: false,
        xc_sdk_path: options.xc_sdk_path.as_deref(),
    };

    if !unity_build {
        let json = compile_commands::build(Path::new("."), &plan.compilation_units, &scheduler_options);
        if !substrate::os::files::write_file(Path::new("build/compile_commands.json"), json.as_bytes()) {
            bail!("writing build/compile_commands.json");
        }
    }

    info!(count = plan.compilation_units.len(), "starting compile phase");
    if let Err(failure) = scheduler::run_compile_phase(&plan, &scheduler_options) {
        error!("compile phase failed");
        return Ok(scheduler::exit_code(&Err(failure)));
    }

    info!(count = plan.link_units.len() - 1, "starting link phase");
    if let Err(failure) = scheduler::run_link_phase(&plan, &scheduler_options) {
        error!("link phase failed");
        return Ok(scheduler::exit_code(&Err(failure)));
    }

    if target.os == substrate::OperatingSystem::Windows {
        let dll_source = toolchain::asan_dynamic_dll_path(&toolchain_info.install_path, "18.1.0", target.cpu_arch);
        if let Some(dll_name) = Path::new(&dll_source).file_name() {
            for unit in plan.link_units.iter().filter(|u| !u.is_builder && u.sanitize) {
                let destination = plan.target_directory.join(dll_name);
                if !substrate::os::files::copy_file(Path::new(&dll_source), &destination) {
                    debug!(unit = %unit.name, "asan runtime dll not copied (toolchain not installed locally)");
                }
            }
        }
    }

    if matches!(options.command, Some(Command::Test | Command::TestAll)) {
        info!("starting run phase");
        match scheduler::run_test_phase(&plan, options.fuzz_duration) {
            Ok(()) => {}
            Err(failure) => {
                error!("run phase failed");
                return Ok(scheduler::exit_code(&Err(failure)));
            }
        }
    }

    Ok(substrate::os::process::ProcessResult::Success as i32)
}

fn main() -> anyhow::Result<()> {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            substrate::os::process::ProcessResult::Failed as i32
        }
    };
    std::process::exit(code);
}
