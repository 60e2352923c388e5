// CLASSIFICATION: COMMUNITY
// Filename: features.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Capability bit name tables.
//!
//! Each group is a 64-bit mask assembled from two CPUID registers; the
//! low register occupies bits 0..32 and the high register bits 32..64.
//! Tables list `(bit, name)` pairs sorted by bit; reserved bits are
//! simply absent.

/// Named bit positions of one capability group.
pub type FeatureTable = &'static [(u8, &'static str)];

/// Names of every set bit in `mask` that has an entry in `table`,
/// in ascending bit order.
pub fn set_feature_names(mask: u64, table: FeatureTable) -> Vec<&'static str> {
    (0u8..64)
        .filter(|bit| mask & (1u64 << bit) != 0)
        .filter_map(|bit| {
            table
                .iter()
                .find(|(b, _)| *b == bit)
                .map(|(_, name)| *name)
        })
        .collect()
}

/// Leaf 1: ECX in bits 0..32, EDX in bits 32..64.
pub static BASE_FEATURES: FeatureTable = &[
    (0, "SSE3"),
    (1, "PCLMULQDQ"),
    (2, "DTES64"),
    (3, "MONITOR"),
    (4, "DS_CPL"),
    (5, "VMX"),
    (6, "SMX"),
    (7, "EST"),
    (8, "TM2"),
    (9, "SSSE3"),
    (10, "CNXT_ID"),
    (11, "SDBG"),
    (12, "FMA"),
    (13, "CX16"),
    (14, "XTPR"),
    (15, "PDCM"),
    (17, "PCID"),
    (18, "DCA"),
    (19, "SSE4_1"),
    (20, "SSE4_2"),
    (21, "X2APIC"),
    (22, "MOVBE"),
    (23, "POPCNT"),
    (24, "TSC_DEADLINE"),
    (25, "AES"),
    (26, "XSAVE"),
    (27, "OSXSAVE"),
    (28, "AVX"),
    (29, "F16C"),
    (30, "RDRAND"),
    (31, "HYPERVISOR"),
    (32, "FPU"),
    (33, "VME"),
    (34, "DE"),
    (35, "PSE"),
    (36, "TSC"),
    (37, "MSR"),
    (38, "PAE"),
    (39, "MCE"),
    (40, "CX8"),
    (41, "APIC"),
    (43, "SEP"),
    (44, "MTRR"),
    (45, "PGE"),
    (46, "MCA"),
    (47, "CMOV"),
    (48, "PAT"),
    (49, "PSE36"),
    (50, "PSN"),
    (51, "CLFSH"),
    (53, "DS"),
    (54, "ACPI"),
    (55, "MMX"),
    (56, "FXSR"),
    (57, "SSE"),
    (58, "SSE2"),
    (59, "SS"),
    (60, "HTT"),
    (61, "TM"),
    (63, "PBE"),
];

/// Leaf 7 sub-leaf 0: EBX in bits 0..32, ECX in bits 32..64.
pub static EXTENDED_FEATURES: FeatureTable = &[
    (0, "FSGSBASE"),
    (1, "TSC_ADJUST"),
    (2, "SGX"),
    (3, "BMI1"),
    (4, "HLE"),
    (5, "AVX2"),
    (7, "SMEP"),
    (8, "BMI2"),
    (9, "ERMS"),
    (10, "INVPCID"),
    (11, "RTM"),
    (12, "PQM"),
    (14, "MPX"),
    (15, "PQE"),
    (16, "AVX512F"),
    (17, "AVX512DQ"),
    (18, "RDSEED"),
    (19, "ADX"),
    (20, "SMAP"),
    (21, "AVX512IFMA"),
    (23, "CLFLUSHOPT"),
    (24, "CLWB"),
    (25, "INTEL_PT"),
    (26, "AVX512PF"),
    (27, "AVX512ER"),
    (28, "AVX512CD"),
    (29, "SHA"),
    (30, "AVX512BW"),
    (31, "AVX512VL"),
    (32, "PREFETCHWT1"),
    (33, "AVX512VBMI"),
    (34, "UMIP"),
    (35, "PKU"),
    (36, "OSPKE"),
    (37, "WAITPKG"),
    (38, "AVX512VBMI2"),
    (39, "CET_SS"),
    (40, "GFNI"),
    (41, "VAES"),
    (42, "VPCLMULQDQ"),
    (43, "AVX512VNNI"),
    (44, "AVX512BITALG"),
    (46, "AVX512VPOPCNTDQ"),
    (48, "LA57"),
    (54, "RDPID"),
    (57, "CLDEMOTE"),
    (59, "MOVDIRI"),
    (60, "MOVDIR64B"),
    (62, "SGX_LC"),
];

/// Leaf 0x80000001: ECX in bits 0..32, EDX in bits 32..64.
pub static EXTRA_FEATURES: FeatureTable = &[
    (0, "LAHF_LM"),
    (1, "CMP_LEGACY"),
    (2, "SVM"),
    (3, "EXTAPIC"),
    (4, "CR8_LEGACY"),
    (5, "ABM"),
    (6, "SSE4A"),
    (7, "MISALIGNSSE"),
    (8, "PREFETCHW"),
    (9, "OSVW"),
    (10, "IBS"),
    (11, "XOP"),
    (12, "SKINIT"),
    (13, "WDT"),
    (15, "LWP"),
    (16, "FMA4"),
    (17, "TCE"),
    (19, "NODEID_MSR"),
    (21, "TBM"),
    (22, "TOPOEXT"),
    (23, "PERFCTR_CORE"),
    (24, "PERFCTR_NB"),
    (26, "DBX"),
    (27, "PERFTSC"),
    (28, "PCX_L2I"),
    (29, "MONITORX"),
    (43, "SYSCALL"),
    (52, "NX"),
    (54, "MMXEXT"),
    (57, "FXSR_OPT"),
    (58, "PDPE1GB"),
    (59, "RDTSCP"),
    (61, "LM"),
    (62, "3DNOWEXT"),
    (63, "3DNOW"),
];

/// Leaf 6: EAX only; bits 32..64 are never set.
pub static THERMAL_POWER_FEATURES: FeatureTable = &[
    (0, "DIGITAL_TEMPERATURE_SENSOR"),
    (1, "TURBO_BOOST"),
    (2, "ARAT"),
    (4, "PLN"),
    (5, "ECMD"),
    (6, "PTM"),
    (7, "HWP"),
    (8, "HWP_NOTIFICATION"),
    (9, "HWP_ACTIVITY_WINDOW"),
    (10, "HWP_ENERGY_PERFORMANCE_PREFERENCE"),
    (11, "HWP_PACKAGE_LEVEL_REQUEST"),
    (13, "HDC"),
    (14, "TURBO_BOOST_MAX"),
    (15, "HWP_CAPABILITIES"),
    (16, "HWP_PECI_OVERRIDE"),
    (17, "FLEXIBLE_HWP"),
    (18, "FAST_ACCESS_MODE"),
    (20, "IGNORE_IDLE_LOGICAL_PROCESSOR_HWP"),
];
