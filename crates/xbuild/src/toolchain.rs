//! Toolchain discovery, grounded on `toolchain_get_information`
//! (`build_common.c`): joins `<home>/dev/toolchain/install`, the versioned
//! LLVM basename, and the GitHub release URL template. Not invoked by the
//! scheduler; exposed for a downstream fetch step.

use substrate::{CpuArch, OperatingSystem};

#[derive(Debug, Clone)]
pub struct ToolchainInfo {
    pub install_path: String,
    pub clang_path: String,
    pub url: String,
}

/// `home` is `$HOME` on POSIX / `%USERPROFILE%` on Windows, `version` a
/// release tag like `"18.1.0"`.
#[must_use]
pub fn info(home: &str, version: &str, arch: CpuArch, os: OperatingSystem) -> ToolchainInfo {
    let install_root = format!("{home}/dev/toolchain/install");
    let llvm_basename = format!("llvm_{version}_{}-{}-Release", arch.as_str(), os.as_str());
    let install_path = format!("{install_root}/{llvm_basename}");
    let exe_suffix = if os == OperatingSystem::Windows { ".exe" } else { "" };
    let clang_path = format!("{install_path}/bin/clang{exe_suffix}");
    let url = format!("https://github.com/buster14a/toolchain/releases/download/v{version}/{llvm_basename}.7z");

    ToolchainInfo {
        install_path,
        clang_path,
        url,
    }
}

/// `<install_path>/lib/clang/<major>/lib/windows/clang_rt.asan_dynamic-<arch>.dll`,
/// the ASan runtime copied next to sanitizer-built Windows artifacts (see
/// `thread_entry_point`'s Windows branch in `build.c`).
#[must_use]
pub fn asan_dynamic_dll_path(install_path: &str, version: &str, arch: CpuArch) -> String {
    let major = version.split('.').next().unwrap_or(version);
    format!("{install_path}/lib/clang/{major}/lib/windows/clang_rt.asan_dynamic-{}.dll", arch.as_str())
}

/// Reads the platform home-directory environment variable toolchain paths
/// are computed from (`HOME` on POSIX, `USERPROFILE` on Windows).
#[must_use]
pub fn home_directory() -> Option<String> {
    #[cfg(windows)]
    {
        substrate::os::get_environment_variable("USERPROFILE")
    }
    #[cfg(not(windows))]
    {
        substrate::os::get_environment_variable("HOME")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn info_joins_home_version_and_target_into_expected_paths() {
        let toolchain = info("/home/dev", "18.1.0", CpuArch::X86_64, OperatingSystem::Linux);
        assert_eq!(
            toolchain.install_path,
            "/home/dev/dev/toolchain/install/llvm_18.1.0_x86_64-linux-Release"
        );
        assert_eq!(
            toolchain.clang_path,
            "/home/dev/dev/toolchain/install/llvm_18.1.0_x86_64-linux-Release/bin/clang"
        );
        assert!(toolchain.url.ends_with("llvm_18.1.0_x86_64-linux-Release.7z"));
    }

    #[test]
    fn windows_clang_path_has_exe_suffix() {
        let toolchain = info("C:/Users/dev", "18.1.0", CpuArch::X86_64, OperatingSystem::Windows);
        assert!(toolchain.clang_path.ends_with("clang.exe"));
    }

    #[test]
    fn asan_dll_path_uses_major_version_only() {
        let path = asan_dynamic_dll_path("C:/llvm", "18.1.0", CpuArch::X86_64);
        assert_eq!(path, "C:/llvm/lib/clang/18/lib/windows/clang_rt.asan_dynamic-x86_64.dll");
    }
}
