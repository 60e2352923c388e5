// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · cpuid
// Date Modified: 2026-10-18
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// Processor identification evidence
//
// A [`CpuidInfo`] snapshot is captured from a [`PlatformSource`]
// and rendered into the fixed-order text report that collectors
// measure and persist.
//
// ## Sub-modules
// * `features` – capability bit name tables and enumeration.
// * `probe`    – host CPUID probe.
// * `report`   – text report rendering.
// ─────────────────────────────────────────────────────────────

use std::fmt;

pub mod features;
pub mod probe;
pub mod report;

pub use features::{set_feature_names, FeatureTable};
pub use probe::HostCpuid;
pub use report::format_report;

/// Provider of processor identification data.
///
/// Implementations never fail: unavailable fields are reported as
/// zero or empty.
pub trait PlatformSource {
    /// Capture the current identification data.
    fn snapshot(&self) -> CpuidInfo;
}

/// Point-in-time view of the processor identification leaves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuidInfo {
    /// Vendor identification string, e.g. `GenuineIntel`.
    pub vendor: String,
    /// Processor brand string.
    pub brand: String,
    /// Stepping identifier.
    pub stepping_id: u32,
    /// Processor type.
    pub processor_type: u32,
    /// Display family (base plus extended family where applicable).
    pub display_family: u32,
    /// Display model (base plus extended model where applicable).
    pub display_model: u32,
    /// CLFLUSH line size in bytes.
    pub cache_line_size: u32,
    /// Maximum number of addressable logical processor IDs.
    pub max_logical_cpu_id: u32,
    /// Initial APIC ID of the probing processor.
    pub initial_apic_id: u32,
    /// Smallest monitor-line size in bytes.
    pub monitor_line_size_min: u32,
    /// Largest monitor-line size in bytes.
    pub monitor_line_size_max: u32,
    /// Interrupts break MWAIT even when masked.
    pub monitor_interrupt_break_event: bool,
    /// MONITOR/MWAIT extensions are enumerated.
    pub monitor_extensions: bool,
    /// AVX state is enabled by the OS.
    pub avx_enabled: bool,
    /// AVX-512 state is enabled by the OS.
    pub avx512_enabled: bool,
    /// Number of interrupt thresholds in the digital thermal sensor.
    pub thermal_interrupt_thresholds: u32,
    /// Leaf 1 capability bits (ECX low, EDX high).
    pub features: u64,
    /// Leaf 7 capability bits (EBX low, ECX high).
    pub extended_features: u64,
    /// Leaf 0x80000001 capability bits (ECX low, EDX high).
    pub extra_features: u64,
    /// Leaf 6 thermal and power management bits (EAX).
    pub thermal_power_features: u64,
    /// One entry per detected cache level and type.
    pub cache_descriptors: Vec<CacheDescriptor>,
}

/// Kind of cache described by a [`CacheDescriptor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheKind {
    /// Data cache.
    Data,
    /// Instruction cache.
    Instruction,
    /// Unified data and instruction cache.
    Unified,
}

impl CacheKind {
    /// Decode the cache type field of leaf 4 / 0x8000001D.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(CacheKind::Data),
            2 => Some(CacheKind::Instruction),
            3 => Some(CacheKind::Unified),
            _ => None,
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CacheKind::Data => "Data",
            CacheKind::Instruction => "Instruction",
            CacheKind::Unified => "Unified",
        };
        f.write_str(s)
    }
}

/// Geometry of one cache level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheDescriptor {
    /// Cache level, starting at 1.
    pub level: u32,
    /// Cache type.
    pub kind: CacheKind,
    /// Associativity.
    pub ways: u32,
    /// Physical line partitions.
    pub partitions: u32,
    /// Line size in bytes.
    pub line_size: u32,
    /// Number of sets.
    pub sets: u32,
}

impl CacheDescriptor {
    /// Total cache size in bytes.
    pub fn size_bytes(&self) -> u64 {
        u64::from(self.ways)
            * u64::from(self.partitions)
            * u64::from(self.line_size)
            * u64::from(self.sets)
    }
}

impl fmt::Display for CacheDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L{} {} {} KB, {}-way, {} byte lines, {} sets",
            self.level,
            self.kind,
            self.size_bytes() / 1024,
            self.ways,
            self.line_size,
            self.sets
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_descriptor_renders_size_in_kb() {
        let d = CacheDescriptor {
            level: 1,
            kind: CacheKind::Data,
            ways: 8,
            partitions: 1,
            line_size: 64,
            sets: 64,
        };
        assert_eq!(d.size_bytes(), 32 * 1024);
        assert_eq!(d.to_string(), "L1 Data 32 KB, 8-way, 64 byte lines, 64 sets");
    }

    #[test]
    fn unknown_cache_type_is_rejected() {
        assert_eq!(CacheKind::from_raw(0), None);
        assert_eq!(CacheKind::from_raw(3), Some(CacheKind::Unified));
    }
}
