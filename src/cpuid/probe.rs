// CLASSIFICATION: COMMUNITY
// Filename: probe.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Host CPUID probe.
//!
//! Reads the identification leaves directly on x86-64, once per
//! process, so the initial APIC ID does not follow thread migration.
//! Every other architecture yields an all-zero snapshot.

use log::debug;
use once_cell::sync::Lazy;

use super::{CpuidInfo, PlatformSource};

/// [`PlatformSource`] backed by the executing processor.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostCpuid;

static HOST: Lazy<CpuidInfo> = Lazy::new(|| {
    let info = imp::probe();
    debug!(
        "cpuid: probed vendor={:?} family={} model={} caches={}",
        info.vendor,
        info.display_family,
        info.display_model,
        info.cache_descriptors.len()
    );
    info
});

impl PlatformSource for HostCpuid {
    fn snapshot(&self) -> CpuidInfo {
        HOST.clone()
    }
}

#[cfg(target_arch = "x86_64")]
mod imp {
    use core::arch::x86_64::{CpuidResult, __cpuid_count};

    use crate::cpuid::{CacheDescriptor, CacheKind, CpuidInfo};

    const VENDOR_INTEL: &str = "GenuineIntel";
    const VENDOR_AMD: &str = "AuthenticAMD";

    #[allow(unused_unsafe)]
    fn cpuid(leaf: u32, sub: u32) -> CpuidResult {
        // SAFETY: CPUID is available on every x86-64 processor.
        unsafe { __cpuid_count(leaf, sub) }
    }

    fn regs_to_string(regs: &[u32]) -> String {
        let bytes: Vec<u8> = regs.iter().flat_map(|r| r.to_le_bytes()).collect();
        String::from_utf8_lossy(&bytes)
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string()
    }

    fn wide(low: u32, high: u32) -> u64 {
        u64::from(low) | (u64::from(high) << 32)
    }

    pub(super) fn probe() -> CpuidInfo {
        let mut info = CpuidInfo::default();

        let leaf0 = cpuid(0, 0);
        let max_leaf = leaf0.eax;
        info.vendor = regs_to_string(&[leaf0.ebx, leaf0.edx, leaf0.ecx]);

        let max_ext = cpuid(0x8000_0000, 0).eax;
        if max_ext >= 0x8000_0004 {
            let mut regs = Vec::with_capacity(12);
            for leaf in 0x8000_0002..=0x8000_0004 {
                let r = cpuid(leaf, 0);
                regs.extend_from_slice(&[r.eax, r.ebx, r.ecx, r.edx]);
            }
            info.brand = regs_to_string(&regs);
        }

        if max_leaf >= 1 {
            let r = cpuid(1, 0);
            let family = (r.eax >> 8) & 0xF;
            let model = (r.eax >> 4) & 0xF;
            let ext_model = (r.eax >> 16) & 0xF;
            let ext_family = (r.eax >> 20) & 0xFF;
            info.stepping_id = r.eax & 0xF;
            info.processor_type = (r.eax >> 12) & 0x3;
            info.display_family = if family == 0xF {
                family + ext_family
            } else {
                family
            };
            info.display_model = if family == 0x6 || family == 0xF {
                (ext_model << 4) + model
            } else {
                model
            };
            info.cache_line_size = ((r.ebx >> 8) & 0xFF) * 8;
            info.max_logical_cpu_id = (r.ebx >> 16) & 0xFF;
            info.initial_apic_id = r.ebx >> 24;
            info.features = wide(r.ecx, r.edx);
        }

        if max_leaf >= 5 {
            let r = cpuid(5, 0);
            info.monitor_line_size_min = r.eax & 0xFFFF;
            info.monitor_line_size_max = r.ebx & 0xFFFF;
            info.monitor_extensions = r.ecx & 0x1 != 0;
            info.monitor_interrupt_break_event = r.ecx & 0x2 != 0;
        }

        if max_leaf >= 6 {
            let r = cpuid(6, 0);
            info.thermal_power_features = u64::from(r.eax);
            info.thermal_interrupt_thresholds = r.ebx & 0xF;
        }

        if max_leaf >= 7 {
            let r = cpuid(7, 0);
            info.extended_features = wide(r.ebx, r.ecx);
        }

        if max_ext >= 0x8000_0001 {
            let r = cpuid(0x8000_0001, 0);
            info.extra_features = wide(r.ecx, r.edx);
        }

        info.avx_enabled = std::arch::is_x86_feature_detected!("avx");
        info.avx512_enabled = std::arch::is_x86_feature_detected!("avx512f");

        let cache_leaf = match info.vendor.as_str() {
            VENDOR_INTEL if max_leaf >= 4 => Some(4),
            VENDOR_AMD if max_ext >= 0x8000_001D => Some(0x8000_001D),
            _ => None,
        };
        if let Some(leaf) = cache_leaf {
            info.cache_descriptors = cache_descriptors(leaf);
        }

        info
    }

    fn cache_descriptors(leaf: u32) -> Vec<CacheDescriptor> {
        let mut out = Vec::new();
        // Sub-leaves end at the first null cache type; bound the walk anyway.
        for sub in 0..16 {
            let r = cpuid(leaf, sub);
            let Some(kind) = CacheKind::from_raw(r.eax & 0x1F) else {
                break;
            };
            out.push(CacheDescriptor {
                level: (r.eax >> 5) & 0x7,
                kind,
                ways: ((r.ebx >> 22) & 0x3FF) + 1,
                partitions: ((r.ebx >> 12) & 0x3FF) + 1,
                line_size: (r.ebx & 0xFFF) + 1,
                sets: r.ecx + 1,
            });
        }
        out
    }
}

#[cfg(not(target_arch = "x86_64"))]
mod imp {
    use crate::cpuid::CpuidInfo;

    pub(super) fn probe() -> CpuidInfo {
        CpuidInfo::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_snapshot_is_stable() {
        assert_eq!(HostCpuid.snapshot(), HostCpuid.snapshot());
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn x86_64_reports_vendor_and_long_mode() {
        let info = HostCpuid.snapshot();
        assert!(!info.vendor.is_empty());
        // LM is bit 29 of 0x80000001 EDX.
        assert_ne!(info.extra_features & (1u64 << 61), 0);
    }
}
