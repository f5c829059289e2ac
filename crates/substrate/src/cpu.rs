//! Native CPU model detection.
//!
//! Dispatches by compile-time architecture: `CPUID` on x86-64, `midr_el1` on
//! aarch64/Linux, `sysctlbyname` on aarch64/macOS.

use crate::target::CpuModel;

#[cfg(target_arch = "x86_64")]
pub fn detect_native_model() -> CpuModel {
    x86_64::detect()
}

#[cfg(all(target_arch = "aarch64", target_os = "linux"))]
pub fn detect_native_model() -> CpuModel {
    aarch64_linux::detect()
}

#[cfg(all(target_arch = "aarch64", target_os = "macos"))]
pub fn detect_native_model() -> CpuModel {
    aarch64_macos::detect()
}

#[cfg(all(target_arch = "aarch64", target_os = "windows"))]
pub fn detect_native_model() -> CpuModel {
    CpuModel::Baseline
}

#[cfg(target_arch = "x86_64")]
mod x86_64 {
    use super::CpuModel;
    use core::arch::x86_64::{__cpuid, __cpuid_count};

    /// `CPUID(0,0)` vendor string, then `CPUID(1,0)` family/model/stepping,
    /// folded into the closed family+model table clang's `-march=` accepts.
    pub(super) fn detect() -> CpuModel {
        let vendor = vendor_string();
        let leaf1 = unsafe { __cpuid(1) };
        let eax = leaf1.eax;

        let base_family = (eax >> 8) & 0xF;
        let base_model = (eax >> 4) & 0xF;
        let ext_family = (eax >> 20) & 0xFF;
        let ext_model = (eax >> 16) & 0xF;

        let family = if base_family == 0xF {
            base_family + ext_family
        } else {
            base_family
        };
        let model = if base_family == 0x6 || base_family == 0xF {
            (ext_model << 4) | base_model
        } else {
            base_model
        };

        // CPUID(7,0) feature leaf isn't required to distinguish any model in
        // our closed table today, so only the leaf-1 family/model are used.
        let _ = unsafe { __cpuid_count(7, 0) };

        match vendor.as_str() {
            "AuthenticAMD" => amd_family_model(family, model),
            "GenuineIntel" => intel_family_model(family, model),
            _ => CpuModel::Baseline,
        }
    }

    fn vendor_string() -> String {
        let leaf0 = unsafe { __cpuid(0) };
        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&leaf0.ebx.to_le_bytes());
        bytes[4..8].copy_from_slice(&leaf0.edx.to_le_bytes());
        bytes[8..12].copy_from_slice(&leaf0.ecx.to_le_bytes());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn amd_family_model(family: u32, model: u32) -> CpuModel {
        match (family, model) {
            (0x17, _) => CpuModel::AmdZnver1,
            (0x19, m) if m < 0x10 => CpuModel::AmdZnver3,
            (0x19, _) => CpuModel::AmdZnver4,
            (0x1A, _) => CpuModel::AmdZnver5,
            (0x15, _) => CpuModel::AmdBdver1,
            (0x10, _) => CpuModel::AmdFamily10,
            _ => CpuModel::Baseline,
        }
    }

    fn intel_family_model(family: u32, model: u32) -> CpuModel {
        match (family, model) {
            (0x6, 0x8E) | (0x6, 0x9E) => CpuModel::IntelSkylake,
            (0x6, 0x55) => CpuModel::IntelSkylakeAvx512,
            (0x6, 0x7E) => CpuModel::IntelIcelakeClient,
            (0x6, 0x6A) | (0x6, 0x6C) => CpuModel::IntelIcelakeServer,
            (0x6, 0x8C) | (0x6, 0x8D) => CpuModel::IntelTigerlake,
            (0x6, 0x97) | (0x6, 0x9A) => CpuModel::IntelAlderlake,
            (0x6, 0xB7) | (0x6, 0xBA) | (0x6, 0xBF) => CpuModel::IntelRaptorlake,
            (0x6, 0xAA) | (0x6, 0xAC) => CpuModel::IntelMeteorlake,
            (0x6, 0x3C) | (0x6, 0x45) | (0x6, 0x46) => CpuModel::IntelHaswell,
            (0x6, 0x3D) | (0x6, 0x47) | (0x6, 0x4F) | (0x6, 0x56) => CpuModel::IntelBroadwell,
            (0x6, 0x2A) => CpuModel::IntelSandyBridge,
            (0x6, 0x3A) => CpuModel::IntelIvyBridge,
            (0x6, 0x1A) | (0x6, 0x1E) | (0x6, 0x1F) | (0x6, 0x2E) => CpuModel::IntelNehalem,
            (0x6, 0x25) | (0x6, 0x2C) | (0x6, 0x2F) => CpuModel::IntelWestmere,
            _ => CpuModel::Baseline,
        }
    }
}

#[cfg(all(target_arch = "aarch64", target_os = "linux"))]
mod aarch64_linux {
    use super::CpuModel;
    use std::fs;

    const MIDR_PATH: &str = "/sys/devices/system/cpu/cpu0/regs/identification/midr_el1";

    /// Parses the `0x…` value of `midr_el1`, extracts implementer + part
    /// number, and looks them up in the closed model table.
    pub(super) fn detect() -> CpuModel {
        let Ok(raw) = fs::read_to_string(MIDR_PATH) else {
            return CpuModel::Error;
        };
        let trimmed = raw.trim();
        let Some(hex) = trimmed.strip_prefix("0x").or(trimmed.strip_prefix("0X")) else {
            return CpuModel::Error;
        };
        let Ok(midr) = u64::from_str_radix(hex, 16) else {
            return CpuModel::Error;
        };

        let implementer = (midr >> 24) & 0xFF;
        let part_num = (midr >> 4) & 0xFFF;

        match (implementer, part_num) {
            (0x41, 0xD0B) => CpuModel::A64CortexA76,
            (0x41, 0xD0D) => CpuModel::A64CortexA77,
            (0x41, 0xD41) => CpuModel::A64CortexA78,
            (0x41, 0xD44) => CpuModel::A64CortexX1,
            (0x41, 0xD46) => CpuModel::A64CortexA510,
            (0x41, 0xD47) => CpuModel::A64CortexA710,
            (0x41, 0xD48) => CpuModel::A64CortexX2,
            (0x41, 0xD49) => CpuModel::A64NeoverseN2,
            (0x41, 0xD4F) => CpuModel::A64NeoverseV1,
            (0x41, 0xD40) => CpuModel::A64NeoverseV2,
            (0x41, 0xD0C) => CpuModel::A64NeoverseN1,
            _ => CpuModel::A64Generic,
        }
    }
}

#[cfg(all(target_arch = "aarch64", target_os = "macos"))]
mod aarch64_macos {
    use super::CpuModel;
    use std::ffi::CString;
    use std::os::raw::{c_char, c_void};

    /// `sysctlbyname("hw.cpufamily", …)`, falling back to parsing
    /// `machdep.cpu.brand_string` for an "Apple M<n>" prefix.
    pub(super) fn detect() -> CpuModel {
        if let Some(family) = read_u32_sysctl("hw.cpufamily") {
            if let Some(model) = family_to_model(family) {
                return model;
            }
        }
        if let Some(brand) = read_string_sysctl("machdep.cpu.brand_string") {
            return brand_string_to_model(&brand);
        }
        CpuModel::A64Generic
    }

    fn read_u32_sysctl(name: &str) -> Option<u32> {
        let cname = CString::new(name).ok()?;
        let mut value: u32 = 0;
        let mut size = std::mem::size_of::<u32>();
        let rc = unsafe {
            libc::sysctlbyname(
                cname.as_ptr() as *const c_char,
                &mut value as *mut _ as *mut c_void,
                &mut size,
                std::ptr::null_mut(),
                0,
            )
        };
        if rc == 0 {
            Some(value)
        } else {
            None
        }
    }

    fn read_string_sysctl(name: &str) -> Option<String> {
        let cname = CString::new(name).ok()?;
        let mut size: usize = 0;
        let rc = unsafe {
            libc::sysctlbyname(
                cname.as_ptr() as *const c_char,
                std::ptr::null_mut(),
                &mut size,
                std::ptr::null_mut(),
                0,
            )
        };
        if rc != 0 || size == 0 {
            return None;
        }
        let mut buf = vec![0u8; size];
        let rc = unsafe {
            libc::sysctlbyname(
                cname.as_ptr() as *const c_char,
                buf.as_mut_ptr() as *mut c_void,
                &mut size,
                std::ptr::null_mut(),
                0,
            )
        };
        if rc != 0 {
            return None;
        }
        let nul = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Some(String::from_utf8_lossy(&buf[..nul]).into_owned())
    }

    fn family_to_model(family: u32) -> Option<CpuModel> {
        // Apple's published `hw.cpufamily` constants for recent `Apple Silicon` generations.
        match family {
            0x1B58_8BB3 => Some(CpuModel::A64AppleM1),
            0xDA33_D83D => Some(CpuModel::A64AppleM2),
            0xFA33_415E => Some(CpuModel::A64AppleM3),
            _ => None,
        }
    }

    fn brand_string_to_model(brand: &str) -> CpuModel {
        if brand.contains("M4") {
            CpuModel::A64AppleM4
        } else if brand.contains("M3") {
            CpuModel::A64AppleM3
        } else if brand.contains("M2") {
            CpuModel::A64AppleM2
        } else if brand.contains("M1") {
            CpuModel::A64AppleM1
        } else {
            CpuModel::A64Generic
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn detect_native_model_returns_a_defined_variant() {
        let model = detect_native_model();
        assert!(!model.as_str().is_empty());
    }
}
