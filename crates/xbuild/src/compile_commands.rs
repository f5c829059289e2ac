//! `compile_commands.json` emission, per spec.md's "Compile-commands
//! emission": one `{directory, command, file}` object per compilation unit,
//! `command` the full argv space-joined with POSIX `\"` escaping of
//! embedded quotes (none needed on Windows). Never produced when
//! `unity-build = 1`.

use crate::build_plan::CompilationUnit;
use crate::compile_args::{build_arguments, CompileLinkOptions};
use crate::scheduler::SchedulerOptions;
use serde::Serialize;
use std::path::Path;
use substrate::OperatingSystem;

#[derive(Debug, Serialize)]
struct CompileCommandEntry {
    directory: String,
    command: String,
    file: String,
}

/// Escapes embedded `"` with a backslash, matching the spec's POSIX
/// quoting rule. A no-op on Windows, where the argv needs no such escaping.
fn escape_command_token(token: &str, os: OperatingSystem) -> String {
    if os == OperatingSystem::Windows || !token.contains('"') {
        token.to_string()
    } else {
        token.replace('"', "\\\"")
    }
}

fn join_argv(argv: &[String], os: OperatingSystem) -> String {
    argv.iter()
        .map(|token| escape_command_token(token, os))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the JSON array for `compilation_units`, rooted at `directory`
/// (the project root every entry's `directory` field reports).
#[must_use]
pub fn build(directory: &Path, compilation_units: &[CompilationUnit], options: &SchedulerOptions<'_>) -> String {
    let directory_string = directory.to_string_lossy().into_owned();
    let entries: Vec<CompileCommandEntry> = compilation_units
        .iter()
        .map(|unit| {
            let source = unit.source_path.to_string_lossy().into_owned();
            let argv = build_arguments(&CompileLinkOptions {
                clang_path: options.clang_path,
                destination_path: &unit.object_path.to_string_lossy(),
                source_paths: &[source.clone()],
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
            });
            CompileCommandEntry {
                directory: directory_string.clone(),
                command: join_argv(&argv, options.target.os),
                file: source,
            }
        })
        .collect();

    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::build_plan::CompilationUnit;
    use std::path::PathBuf;
    use substrate::{CpuArch, CpuModel, Target};

    fn options(target: &Target) -> SchedulerOptions<'_> {
        SchedulerOptions {
            clang_path: "clang",
            target,
            include_tests: false,
            force_color: false,
            xc_sdk_path: None,
        }
    }

    #[test]
    fn emits_one_entry_per_compilation_unit() {
        let target = Target {
            cpu_arch: CpuArch::X86_64,
            cpu_model: CpuModel::Baseline,
            os: OperatingSystem::Linux,
        };
        let units = vec![CompilationUnit {
            source_path: PathBuf::from("crates/substrate/src/lib.c"),
            object_path: PathBuf::from("build/x86_64-linux/crates/substrate/src/lib.o"),
            optimize: false,
            has_debug_information: true,
            fuzz: false,
            use_io_ring: false,
        }];
        let json = build(Path::new("/project"), &units, &options(&target));
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed.as_array().expect("array").len(), 1);
        assert_eq!(parsed[0]["directory"], "/project");
        assert_eq!(parsed[0]["file"], "crates/substrate/src/lib.c");
        assert!(parsed[0]["command"].as_str().expect("string").contains("-c"));
    }

    #[test]
    fn escapes_embedded_quotes_on_posix_only() {
        assert_eq!(escape_command_token("a\"b", OperatingSystem::Linux), "a\\\"b");
        assert_eq!(escape_command_token("a\"b", OperatingSystem::Windows), "a\"b");
    }
}
