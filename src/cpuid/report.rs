// CLASSIFICATION: COMMUNITY
// Filename: report.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Text rendering of a [`CpuidInfo`] snapshot.
//!
//! One `Label: value` line per field in a fixed order, four capability
//! group lines, then one `CacheDescriptor:` line per cache. The report
//! is the exact byte stream that gets measured, so field order must not
//! change between calls.

use std::fmt::Write;

use super::features::{
    set_feature_names, FeatureTable, BASE_FEATURES, EXTENDED_FEATURES, EXTRA_FEATURES,
    THERMAL_POWER_FEATURES,
};
use super::CpuidInfo;

/// Render `info` into the measured evidence report.
pub fn format_report(info: &CpuidInfo) -> Vec<u8> {
    let mut w = String::with_capacity(2048);
    let res = render(&mut w, info);
    debug_assert!(res.is_ok(), "fmt::Write for String is infallible");
    w.into_bytes()
}

fn render(w: &mut String, info: &CpuidInfo) -> std::fmt::Result {
    writeln!(w, "VendorString:           {}", info.vendor)?;
    writeln!(w, "ProcessorBrandString:   {}", info.brand)?;
    writeln!(w, "SteppingId:     {}", info.stepping_id)?;
    writeln!(w, "ProcessorType:  {}", info.processor_type)?;
    writeln!(w, "DisplayFamily:  {}", info.display_family)?;
    writeln!(w, "DisplayModel:   {}", info.display_model)?;
    writeln!(w, "CacheLineSize:  {}", info.cache_line_size)?;
    writeln!(w, "MaxLogicalCPUId:{}", info.max_logical_cpu_id)?;
    writeln!(w, "InitialAPICId:  {}", info.initial_apic_id)?;
    writeln!(
        w,
        "Smallest monitor-line size in bytes:  {}",
        info.monitor_line_size_min
    )?;
    writeln!(
        w,
        "Largest monitor-line size in bytes:   {}",
        info.monitor_line_size_max
    )?;
    writeln!(
        w,
        "Monitor Interrupt break-event is supported:  {}",
        info.monitor_interrupt_break_event
    )?;
    writeln!(
        w,
        "MONITOR/MWAIT extensions are supported:      {}",
        info.monitor_extensions
    )?;
    writeln!(w, "AVX state:     {}", info.avx_enabled)?;
    writeln!(w, "AVX-512 state: {}", info.avx512_enabled)?;
    writeln!(
        w,
        "Interrupt thresholds in digital thermal sensor: {}",
        info.thermal_interrupt_thresholds
    )?;

    feature_line(w, "Features", info.features, BASE_FEATURES)?;
    feature_line(w, "ExtendedFeatures", info.extended_features, EXTENDED_FEATURES)?;
    feature_line(w, "ExtraFeatures", info.extra_features, EXTRA_FEATURES)?;
    feature_line(
        w,
        "ThermalAndPowerFeatures",
        info.thermal_power_features,
        THERMAL_POWER_FEATURES,
    )?;

    for cache in &info.cache_descriptors {
        writeln!(w, "CacheDescriptor: {}", cache)?;
    }
    Ok(())
}

fn feature_line(w: &mut String, label: &str, mask: u64, table: FeatureTable) -> std::fmt::Result {
    writeln!(w, "{}: {}", label, set_feature_names(mask, table).join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpuid::{CacheDescriptor, CacheKind};

    fn sample() -> CpuidInfo {
        CpuidInfo {
            vendor: "GenuineIntel".into(),
            brand: "Intel(R) Xeon(R) CPU".into(),
            stepping_id: 4,
            display_family: 6,
            display_model: 85,
            cache_line_size: 64,
            features: 1 | (1 << 32),
            extended_features: 1 << 5,
            extra_features: 1 << 61,
            thermal_power_features: 1 << 2,
            cache_descriptors: vec![
                CacheDescriptor {
                    level: 1,
                    kind: CacheKind::Data,
                    ways: 8,
                    partitions: 1,
                    line_size: 64,
                    sets: 64,
                },
                CacheDescriptor {
                    level: 2,
                    kind: CacheKind::Unified,
                    ways: 16,
                    partitions: 1,
                    line_size: 64,
                    sets: 1024,
                },
            ],
            ..CpuidInfo::default()
        }
    }

    #[test]
    fn report_lines_follow_fixed_order() {
        let text = String::from_utf8(format_report(&sample())).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "VendorString:           GenuineIntel");
        assert_eq!(lines[1], "ProcessorBrandString:   Intel(R) Xeon(R) CPU");
        assert_eq!(lines[7], "MaxLogicalCPUId:0");
        assert_eq!(lines[16], "Features: SSE3 FPU");
        assert_eq!(lines[17], "ExtendedFeatures: AVX2");
        assert_eq!(lines[18], "ExtraFeatures: LM");
        assert_eq!(lines[19], "ThermalAndPowerFeatures: ARAT");
        assert_eq!(
            lines[20],
            "CacheDescriptor: L1 Data 32 KB, 8-way, 64 byte lines, 64 sets"
        );
        assert!(lines[21].starts_with("CacheDescriptor: L2 Unified 1024 KB"));
        assert_eq!(lines.len(), 22);
    }

    #[test]
    fn report_is_deterministic() {
        let info = sample();
        assert_eq!(format_report(&info), format_report(&info));
    }

    #[test]
    fn empty_snapshot_still_renders_every_field() {
        let text = String::from_utf8(format_report(&CpuidInfo::default())).unwrap();
        assert_eq!(text.lines().count(), 20);
        assert!(text.contains("AVX state:     false\n"));
        assert!(!text.contains("CacheDescriptor"));
    }

    #[test]
    fn render_matches_formatted_bytes() {
        let info = sample();
        let mut w = String::new();
        assert!(render(&mut w, &info).is_ok());
        assert_eq!(w.into_bytes(), format_report(&info));
    }
}
