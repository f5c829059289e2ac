//! Target triples: CPU architecture, CPU model, and operating system.

/// CPU instruction-set architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuArch {
    X86_64,
    Aarch64,
}

impl CpuArch {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CpuArch::X86_64 => "x86_64",
            CpuArch::Aarch64 => "aarch64",
        }
    }
}

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Linux,
    MacOs,
    Windows,
    Uefi,
    Android,
    Ios,
    Freestanding,
}

impl OperatingSystem {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OperatingSystem::Linux => "linux",
            OperatingSystem::MacOs => "macos",
            OperatingSystem::Windows => "windows",
            OperatingSystem::Uefi => "uefi",
            OperatingSystem::Android => "android",
            OperatingSystem::Ios => "ios",
            OperatingSystem::Freestanding => "freestanding",
        }
    }
}

/// A closed enumeration of known CPU models, covering AMD/Intel x86-64 codenames
/// and ARM/Apple aarch64 codenames. Mirrors clang's `-march=`/`-mcpu=` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum CpuModel {
    Error,
    Baseline,
    Native,
    // AMD x86-64
    AmdI486,
    AmdPentium,
    AmdK6,
    AmdK6_2,
    AmdK6_3,
    AmdGeode,
    AmdAthlon,
    AmdAthlonXp,
    AmdK8,
    AmdK8Sse3,
    AmdFamily10,
    AmdBtver1,
    AmdBtver2,
    AmdBdver1,
    AmdBdver2,
    AmdBdver3,
    AmdBdver4,
    AmdZnver1,
    AmdZnver2,
    AmdZnver3,
    AmdZnver4,
    AmdZnver5,
    // Intel x86-64
    IntelCore2,
    IntelPenryn,
    IntelNehalem,
    IntelWestmere,
    IntelSandyBridge,
    IntelIvyBridge,
    IntelHaswell,
    IntelBroadwell,
    IntelSkylake,
    IntelSkylakeAvx512,
    IntelRocketlake,
    IntelCooperlake,
    IntelCascadelake,
    IntelCannonlake,
    IntelIcelakeClient,
    IntelTigerlake,
    IntelAlderlake,
    IntelRaptorlake,
    IntelMeteorlake,
    IntelGracemont,
    IntelArrowlake,
    IntelArrowlakeS,
    IntelLunarlake,
    IntelPantherlake,
    IntelIcelakeServer,
    IntelEmeraldRapids,
    IntelSapphireRapids,
    IntelGraniteRapids,
    IntelGraniteRapidsD,
    IntelBonnell,
    IntelSilvermont,
    IntelGoldmont,
    IntelGoldmontPlus,
    IntelTremont,
    IntelSierraforest,
    IntelGrandridge,
    IntelClearwaterforest,
    IntelKnl,
    IntelKnm,
    IntelDiamondRapids,
    // ARM/aarch64
    A64Generic,
    A64Arm926ejS,
    A64ArmMpcore,
    A64Arm1136jS,
    A64Arm1156t2S,
    A64Arm1176jzS,
    A64CortexA5,
    A64CortexA7,
    A64CortexA8,
    A64CortexA9,
    A64CortexA15,
    A64CortexA17,
    A64CortexM0,
    A64CortexM3,
    A64CortexM4,
    A64CortexM7,
    A64CortexM23,
    A64CortexM33,
    A64CortexM52,
    A64CortexM55,
    A64CortexM85,
    A64CortexR8,
    A64CortexR52,
    A64CortexR52Plus,
    A64CortexR82,
    A64CortexR82Ae,
    A64CortexA34,
    A64CortexA35,
    A64CortexA320,
    A64CortexA53,
    A64CortexA55,
    A64CortexA510,
    A64CortexA520,
    A64CortexA520Ae,
    A64CortexA57,
    A64CortexA65,
    A64CortexA65Ae,
    A64CortexA72,
    A64CortexA73,
    A64CortexA75,
    A64CortexA76,
    A64CortexA76Ae,
    A64CortexA77,
    A64CortexA78,
    A64CortexA78Ae,
    A64CortexA78C,
    A64CortexA710,
    A64CortexA715,
    A64CortexA720,
    A64CortexA720Ae,
    A64CortexA725,
    A64CortexX1,
    A64CortexX1C,
    A64CortexX2,
    A64CortexX3,
    A64CortexX4,
    A64CortexX925,
    A64NeoverseE1,
    A64NeoverseN1,
    A64NeoverseN2,
    A64NeoverseN3,
    A64NeoverseV1,
    A64NeoverseV2,
    A64NeoverseV3,
    A64NeoverseV3Ae,
    A64Arm920T,
    A64XScale,
    A64Swift,
    // Apple
    A64AppleA7,
    A64AppleA8,
    A64AppleA9,
    A64AppleA10,
    A64AppleA11,
    A64AppleA12,
    A64AppleA13,
    A64AppleM1,
    A64AppleM2,
    A64AppleA17,
    A64AppleM3,
    A64AppleM4,
}

impl CpuModel {
    /// Total mapping to the clang `-march=`/`-mcpu=` string for this model.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        use CpuModel::*;
        match self {
            Error => "error",
            Baseline => "baseline",
            Native => "native",
            AmdI486 => "i486",
            AmdPentium => "pentium",
            AmdK6 => "k6",
            AmdK6_2 => "k6-2",
            AmdK6_3 => "k6-3",
            AmdGeode => "geode",
            AmdAthlon => "athlon",
            AmdAthlonXp => "athlon-xp",
            AmdK8 => "k8",
            AmdK8Sse3 => "k8-sse3",
            AmdFamily10 => "amdfam10",
            AmdBtver1 => "btver1",
            AmdBtver2 => "btver2",
            AmdBdver1 => "bdver1",
            AmdBdver2 => "bdver2",
            AmdBdver3 => "bdver3",
            AmdBdver4 => "bdver4",
            AmdZnver1 => "znver1",
            AmdZnver2 => "znver2",
            AmdZnver3 => "znver3",
            AmdZnver4 => "znver4",
            AmdZnver5 => "znver5",
            IntelCore2 => "core2",
            IntelPenryn => "penryn",
            IntelNehalem => "nehalem",
            IntelWestmere => "westmere",
            IntelSandyBridge => "sandybridge",
            IntelIvyBridge => "ivybridge",
            IntelHaswell => "haswell",
            IntelBroadwell => "broadwell",
            IntelSkylake => "skylake",
            IntelSkylakeAvx512 => "skylake-avx512",
            IntelRocketlake => "rocketlake",
            IntelCooperlake => "cooperlake",
            IntelCascadelake => "cascadelake",
            IntelCannonlake => "cannonlake",
            IntelIcelakeClient => "icelake-client",
            IntelTigerlake => "tigerlake",
            IntelAlderlake => "alderlake",
            IntelRaptorlake => "raptorlake",
            IntelMeteorlake => "meteorlake",
            IntelGracemont => "gracemont",
            IntelArrowlake => "arrowlake",
            IntelArrowlakeS => "arrowlake-s",
            IntelLunarlake => "lunarlake",
            IntelPantherlake => "pantherlake",
            IntelIcelakeServer => "icelake-server",
            IntelEmeraldRapids => "emeraldrapids",
            IntelSapphireRapids => "sapphirerapids",
            IntelGraniteRapids => "graniterapids",
            IntelGraniteRapidsD => "graniterapids-d",
            IntelBonnell => "bonnell",
            IntelSilvermont => "silvermont",
            IntelGoldmont => "goldmont",
            IntelGoldmontPlus => "goldmont-plus",
            IntelTremont => "tremont",
            IntelSierraforest => "sierraforest",
            IntelGrandridge => "grandridge",
            IntelClearwaterforest => "clearwaterforest",
            IntelKnl => "knl",
            IntelKnm => "knm",
            IntelDiamondRapids => "diamondrapids",
            A64Generic => "generic",
            A64Arm926ejS => "arm926ej-s",
            A64ArmMpcore => "mpcore",
            A64Arm1136jS => "arm1136j-s",
            A64Arm1156t2S => "arm1156t2-s",
            A64Arm1176jzS => "arm1176jz-s",
            A64CortexA5 => "cortex-a5",
            A64CortexA7 => "cortex-a7",
            A64CortexA8 => "cortex-a8",
            A64CortexA9 => "cortex-a9",
            A64CortexA15 => "cortex-a15",
            A64CortexA17 => "cortex-a17",
            A64CortexM0 => "cortex-m0",
            A64CortexM3 => "cortex-m3",
            A64CortexM4 => "cortex-m4",
            A64CortexM7 => "cortex-m7",
            A64CortexM23 => "cortex-m23",
            A64CortexM33 => "cortex-m33",
            A64CortexM52 => "cortex-m52",
            A64CortexM55 => "cortex-m55",
            A64CortexM85 => "cortex-m85",
            A64CortexR8 => "cortex-r8",
            A64CortexR52 => "cortex-r52",
            A64CortexR52Plus => "cortex-r52plus",
            A64CortexR82 => "cortex-r82",
            A64CortexR82Ae => "cortex-r82ae",
            A64CortexA34 => "cortex-a34",
            A64CortexA35 => "cortex-a35",
            A64CortexA320 => "cortex-a320",
            A64CortexA53 => "cortex-a53",
            A64CortexA55 => "cortex-a55",
            A64CortexA510 => "cortex-a510",
            A64CortexA520 => "cortex-a520",
            A64CortexA520Ae => "cortex-a520ae",
            A64CortexA57 => "cortex-a57",
            A64CortexA65 => "cortex-a65",
            A64CortexA65Ae => "cortex-a65ae",
            A64CortexA72 => "cortex-a72",
            A64CortexA73 => "cortex-a73",
            A64CortexA75 => "cortex-a75",
            A64CortexA76 => "cortex-a76",
            A64CortexA76Ae => "cortex-a76ae",
            A64CortexA77 => "cortex-a77",
            A64CortexA78 => "cortex-a78",
            A64CortexA78Ae => "cortex-a78ae",
            A64CortexA78C => "cortex-a78c",
            A64CortexA710 => "cortex-a710",
            A64CortexA715 => "cortex-a715",
            A64CortexA720 => "cortex-a720",
            A64CortexA720Ae => "cortex-a720ae",
            A64CortexA725 => "cortex-a725",
            A64CortexX1 => "cortex-x1",
            A64CortexX1C => "cortex-x1c",
            A64CortexX2 => "cortex-x2",
            A64CortexX3 => "cortex-x3",
            A64CortexX4 => "cortex-x4",
            A64CortexX925 => "cortex-x925",
            A64NeoverseE1 => "neoverse-e1",
            A64NeoverseN1 => "neoverse-n1",
            A64NeoverseN2 => "neoverse-n2",
            A64NeoverseN3 => "neoverse-n3",
            A64NeoverseV1 => "neoverse-v1",
            A64NeoverseV2 => "neoverse-v2",
            A64NeoverseV3 => "neoverse-v3",
            A64NeoverseV3Ae => "neoverse-v3ae",
            A64Arm920T => "arm920t",
            A64XScale => "xscale",
            A64Swift => "swift",
            A64AppleA7 => "apple-a7",
            A64AppleA8 => "apple-a8",
            A64AppleA9 => "apple-a9",
            A64AppleA10 => "apple-a10",
            A64AppleA11 => "apple-a11",
            A64AppleA12 => "apple-a12",
            A64AppleA13 => "apple-a13",
            A64AppleM1 => "apple-m1",
            A64AppleM2 => "apple-m2",
            A64AppleA17 => "apple-a17",
            A64AppleM3 => "apple-m3",
            A64AppleM4 => "apple-m4",
        }
    }
}

/// CPU arch + CPU model + OS, the unit every compilation and link is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub cpu_arch: CpuArch,
    pub cpu_model: CpuModel,
    pub os: OperatingSystem,
}

impl Target {
    /// `<arch>-<os>-<model>`, used as the `build/` subdirectory name.
    #[must_use]
    pub fn triple(&self) -> String {
        format!(
            "{}-{}-{}",
            self.cpu_arch.as_str(),
            self.os.as_str(),
            self.cpu_model.as_str()
        )
    }

    /// `-march=<model>` on x86-64, `-mcpu=<model>` on aarch64.
    #[must_use]
    pub fn march_string(&self) -> String {
        match self.cpu_arch {
            CpuArch::X86_64 => format!("-march={}", self.cpu_model.as_str()),
            CpuArch::Aarch64 => format!("-mcpu={}", self.cpu_model.as_str()),
        }
    }

    /// The `Target` for the host this process is running on, with `cpu_model`
    /// resolved via [`crate::cpu::detect_native_model`].
    #[must_use]
    pub fn native() -> Target {
        Target {
            cpu_arch: native_cpu_arch(),
            cpu_model: crate::cpu::detect_native_model(),
            os: native_os(),
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn native_cpu_arch() -> CpuArch {
    CpuArch::X86_64
}

#[cfg(target_arch = "aarch64")]
fn native_cpu_arch() -> CpuArch {
    CpuArch::Aarch64
}

#[cfg(target_os = "linux")]
fn native_os() -> OperatingSystem {
    OperatingSystem::Linux
}

#[cfg(target_os = "macos")]
fn native_os() -> OperatingSystem {
    OperatingSystem::MacOs
}

#[cfg(target_os = "windows")]
fn native_os() -> OperatingSystem {
    OperatingSystem::Windows
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn triple_joins_arch_os_model() {
        let target = Target {
            cpu_arch: CpuArch::X86_64,
            cpu_model: CpuModel::AmdZnver4,
            os: OperatingSystem::Linux,
        };
        assert_eq!(target.triple(), "x86_64-linux-znver4");
    }

    #[test]
    fn march_string_selects_by_arch() {
        let x86 = Target {
            cpu_arch: CpuArch::X86_64,
            cpu_model: CpuModel::IntelSkylake,
            os: OperatingSystem::Linux,
        };
        assert_eq!(x86.march_string(), "-march=skylake");

        let arm = Target {
            cpu_arch: CpuArch::Aarch64,
            cpu_model: CpuModel::A64CortexA76,
            os: OperatingSystem::Linux,
        };
        assert_eq!(arm.march_string(), "-mcpu=cortex-a76");
    }

    #[test]
    fn cpu_model_mapping_is_total_and_distinct_for_known_samples() {
        assert_eq!(CpuModel::Baseline.as_str(), "baseline");
        assert_eq!(CpuModel::A64AppleM4.as_str(), "apple-m4");
        assert_eq!(CpuModel::IntelDiamondRapids.as_str(), "diamondrapids");
    }
}
