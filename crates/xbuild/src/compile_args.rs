//! Shared compile/link argument synthesis, grounded verbatim in the
//! original's `build_compile_link_arguments` (`build_common.c`): the same
//! warning-flag arrays, f-flags, sanitizer block, `-D` defines, and
//! march/mcpu string, producing the argv for one clang/lld invocation.

use substrate::{CpuArch, OperatingSystem, Target};

const ENABLE_WARNING_FLAGS: &[&str] = &[
    "-Wall",
    "-Wextra",
    "-Wpedantic",
    "-pedantic",
    "-Wconversion",
    "-Wstrict-overflow=5",
    "-Woverflow",
    "-Wshift-overflow",
    "-Walloca",
    "-Warray-bounds-pointer-arithmetic",
    "-Wassign-enum",
    "-Wbool-conversion",
    "-Wbool-operation",
    "-Wcomma",
    "-Wconditional-uninitialized",
    "-Wdangling",
    "-Wdouble-promotion",
    "-Wenum-compare-conditional",
    "-Wenum-too-large",
    "-Wexperimental-lifetime-safety",
    "-Wfixed-point-overflow",
    "-Wflag-enum",
    "-Wformat",
    "-Wfortify-source",
    "-Wfour-char-constants",
    "-Whigher-precision-for-complex-division",
    "-Wimplicit",
    "-Wimplicit-fallthrough",
    "-Wimplicit-fallthrough-per-function",
    "-Wimplicit-float-conversion",
    "-Wimplicit-int-conversion",
    "-Wimplicit-void-ptr-cast",
    "-Winfinite-recursion",
    "-Winvalid-utf8",
    "-Wlarge-by-value-copy",
    "-Wlinker-warnings",
    "-Wloop-analysis",
    "-Wmain",
    "-Wmisleading-indentation",
    "-Wmissing-braces",
    "-Wmissing-noreturn",
    "-Wnon-power-of-two-alignment",
    "-Woption-ignored",
    "-Woverlength-strings",
    "-Wpacked",
    "-Wpadded",
    "-Wparentheses",
    "-Wpedantic-macros",
    "-Wpointer-arith",
    "-Wpragma-pack",
    "-Wpragma-pack-suspicious-include",
    "-Wpragmas",
    "-Wread-only-types",
    "-Wredundant-parens",
    "-Wreserved-identifier",
    "-Wreserved-macro-identifier",
    "-Wreserved-module-identifier",
    "-Wself-assign",
    "-Wself-assign-field",
    "-Wshadow",
    "-Wshadow-all",
    "-Wshadow-field",
    "-Wshift-bool",
    "-Wshift-sign-overflow",
    "-Wsigned-enum-bitfield",
    "-Wtautological-compare",
    "-Wtype-limits",
    "-Wtautological-constant-in-range-compare",
    "-Wthread-safety",
    "-Wuninitialized",
    "-Wunaligned-access",
    "-Wunique-object-duplication",
    "-Wunreachable-code",
    "-Wunreachable-code-return",
    "-Wvector-conversion",
];

const DISABLE_WARNING_FLAGS: &[&str] = &[
    "-Wno-language-extension-token",
    "-Wno-gnu-auto-type",
    "-Wno-gnu-empty-struct",
    "-Wno-bitwise-instead-of-logical",
    "-Wno-unused-function",
    "-Wno-gnu-flexible-array-initializer",
    "-Wno-missing-field-initializers",
    "-Wno-pragma-once-outside-header",
    "-Wno-zero-length-array",
    "-Wno-gnu-zero-variadic-macro-arguments",
    "-Wno-gnu-statement-expression-from-macro-expansion",
];

const F_FLAGS: &[&str] = &["-fwrapv", "-fno-strict-aliasing", "-funsigned-char", "-fno-exceptions", "-fno-rtti"];

const INCLUDE_FLAGS: &[&str] = &["-Isrc", "-I."];
const STD_FLAGS: &[&str] = &["-std=gnu2x"];

/// Inputs to [`build_arguments`], one clang/lld invocation's worth.
#[derive(Debug, Clone)]
pub struct CompileLinkOptions<'a> {
    pub clang_path: &'a str,
    pub destination_path: &'a str,
    pub source_paths: &'a [String],
    pub target: &'a Target,
    pub optimize: bool,
    pub fuzz: bool,
    pub has_debug_information: bool,
    pub sanitize: bool,
    pub unity_build: bool,
    pub use_io_ring: bool,
    pub include_tests: bool,
    pub just_preprocessor: bool,
    pub compile: bool,
    pub link: bool,
    pub force_color: bool,
    pub xc_sdk_path: Option<&'a str>,
}

fn boolean_define(flag: bool, name: &str) -> String {
    format!("-D{name}={}", u8::from(flag))
}

/// Builds the argv for a single clang/lld invocation per `options`.
#[must_use]
pub fn build_arguments(options: &CompileLinkOptions<'_>) -> Vec<String> {
    let mut argv = vec![options.clang_path.to_string(), "-ferror-limit=1".to_string()];

    if options.just_preprocessor {
        argv.push("-E".to_string());
    }

    argv.push(if options.force_color {
        "-fdiagnostics-color=always".to_string()
    } else {
        "-fdiagnostics-color=auto".to_string()
    });

    argv.push("-o".to_string());
    argv.push(options.destination_path.to_string());
    argv.extend(options.source_paths.iter().cloned());

    if options.sanitize {
        let address_disabled = options.target.cpu_arch == CpuArch::Aarch64 && options.target.os == OperatingSystem::Windows;
        if !address_disabled {
            argv.push("-fsanitize=address".to_string());
        }
        argv.push("-fsanitize=undefined".to_string());
        argv.push("-fsanitize=bounds".to_string());
        argv.push("-fsanitize-recover=all".to_string());
    }

    if options.fuzz {
        argv.push("-fsanitize=fuzzer".to_string());
    }

    if options.has_debug_information {
        argv.push("-g".to_string());
    }

    if let Some(sdk) = options.xc_sdk_path {
        argv.push("-isysroot".to_string());
        argv.push(sdk.to_string());
    }

    if options.compile {
        if !options.link || options.just_preprocessor {
            argv.push("-c".to_string());
        }

        argv.extend(INCLUDE_FLAGS.iter().map(|s| s.to_string()));
        argv.extend(STD_FLAGS.iter().map(|s| s.to_string()));

        if !options.just_preprocessor {
            argv.push("-Werror".to_string());
        }

        argv.extend(ENABLE_WARNING_FLAGS.iter().map(|s| s.to_string()));
        argv.extend(DISABLE_WARNING_FLAGS.iter().map(|s| s.to_string()));
        argv.extend(F_FLAGS.iter().map(|s| s.to_string()));

        argv.push(boolean_define(options.unity_build, "BUSTER_UNITY_BUILD"));
        argv.push(boolean_define(options.fuzz, "BUSTER_FUZZING"));
        argv.push(boolean_define(options.use_io_ring, "BUSTER_USE_IO_RING"));
        argv.push(boolean_define(options.include_tests, "BUSTER_INCLUDE_TESTS"));

        argv.push(options.target.march_string());

        argv.push(if options.optimize { "-O2".to_string() } else { "-O0".to_string() });
    }

    if !options.just_preprocessor && options.link {
        argv.push("-fuse-ld=lld".to_string());
        if options.use_io_ring {
            argv.push("-luring".to_string());
        }
        if options.target.os == OperatingSystem::Windows {
            argv.push("-lws2_32".to_string());
        }
    }

    argv
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use substrate::{CpuModel, Target};

    fn native_target() -> Target {
        Target {
            cpu_arch: CpuArch::X86_64,
            cpu_model: CpuModel::Baseline,
            os: OperatingSystem::Linux,
        }
    }

    #[test]
    fn compile_only_includes_warning_and_std_flags() {
        let target = native_target();
        let options = CompileLinkOptions {
            clang_path: "clang",
            destination_path: "build/x/main.o",
            source_paths: &["main.c".to_string()],
            target: &target,
            optimize: false,
            fuzz: false,
            has_debug_information: true,
            sanitize: false,
            unity_build: false,
            use_io_ring: false,
            include_tests: false,
            just_preprocessor: false,
            compile: true,
            link: false,
            force_color: false,
            xc_sdk_path: None,
        };
        let argv = build_arguments(&options);
        assert!(argv.contains(&"-Wall".to_string()));
        assert!(argv.contains(&"-std=gnu2x".to_string()));
        assert!(argv.contains(&"-c".to_string()));
        assert!(argv.contains(&"-g".to_string()));
        assert!(argv.contains(&"-O0".to_string()));
        assert!(!argv.iter().any(|a| a == "-fuse-ld=lld"));
    }

    #[test]
    fn link_only_skips_compile_flags_and_adds_linker_flags() {
        let target = native_target();
        let options = CompileLinkOptions {
            clang_path: "clang",
            destination_path: "build/x/cc",
            source_paths: &["main.o".to_string()],
            target: &target,
            optimize: true,
            fuzz: false,
            has_debug_information: false,
            sanitize: false,
            unity_build: false,
            use_io_ring: true,
            include_tests: false,
            just_preprocessor: false,
            compile: false,
            link: true,
            force_color: false,
            xc_sdk_path: None,
        };
        let argv = build_arguments(&options);
        assert!(argv.contains(&"-fuse-ld=lld".to_string()));
        assert!(argv.contains(&"-luring".to_string()));
        assert!(!argv.iter().any(|a| a == "-Wall"));
    }

    #[test]
    fn sanitize_disables_address_sanitizer_on_aarch64_windows() {
        let target = Target {
            cpu_arch: CpuArch::Aarch64,
            cpu_model: CpuModel::Baseline,
            os: OperatingSystem::Windows,
        };
        let options = CompileLinkOptions {
            clang_path: "clang",
            destination_path: "build/x/cc.exe",
            source_paths: &["main.o".to_string()],
            target: &target,
            optimize: false,
            fuzz: false,
            has_debug_information: false,
            sanitize: true,
            unity_build: false,
            use_io_ring: false,
            include_tests: false,
            just_preprocessor: false,
            compile: false,
            link: true,
            force_color: false,
            xc_sdk_path: None,
        };
        let argv = build_arguments(&options);
        assert!(!argv.iter().any(|a| a == "-fsanitize=address"));
        assert!(argv.contains(&"-fsanitize=undefined".to_string()));
        assert!(argv.contains(&"-lws2_32".to_string()));
    }
}
