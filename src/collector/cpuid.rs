// CLASSIFICATION: COMMUNITY
// Filename: cpuid.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! CPUID collector.
//!
//! Renders the processor identification report, extends its digest
//! into [`MEASUREMENT_PCR`] and keeps a copy on the volume named by the
//! `location` field of its policy record:
//!
//! ```json
//! { "type": "cpuid", "location": "sda1:/boot/cpuid.txt" }
//! ```

use log::{debug, error};
use serde::Deserialize;

use super::Collector;
use crate::cpuid::{format_report, HostCpuid, PlatformSource};
use crate::error::{CollectError, ConfigError};
use crate::tpm::{extend_from_reader, TrustAnchor, MEASUREMENT_PCR};
use crate::volume::{persist, VolumeMounter};

/// Policy `type` tag of the CPUID collector.
pub const COLLECTOR_TYPE: &str = "cpuid";

/// File name used when `location` names a directory.
pub const DEFAULT_CPUID_FILE: &str = "cpuid.txt";

/// Policy record of the CPUID collector.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CpuidConfig {
    /// Collector type tag, always `cpuid`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Target spec `<volume>:<path>`; empty means persistence will fail.
    #[serde(default)]
    pub location: String,
}

impl CpuidConfig {
    /// Parse and check a policy record.
    pub fn parse(config: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_slice(config)?;
        if cfg.kind != COLLECTOR_TYPE {
            return Err(ConfigError::TypeMismatch {
                expected: COLLECTOR_TYPE,
                found: cfg.kind,
            });
        }
        Ok(cfg)
    }
}

/// Collector measuring processor identification data.
pub struct CpuidCollector {
    config: CpuidConfig,
    source: Box<dyn PlatformSource>,
    mounter: Box<dyn VolumeMounter>,
}

#[cfg(target_os = "linux")]
fn default_mounter() -> Box<dyn VolumeMounter> {
    Box::new(crate::volume::BlockDeviceMounter::default())
}

#[cfg(not(target_os = "linux"))]
fn default_mounter() -> Box<dyn VolumeMounter> {
    Box::new(crate::volume::DirVolumes::new())
}

impl CpuidCollector {
    /// Build from a policy record, using the host processor and block
    /// devices. No I/O happens here.
    pub fn new(config: &[u8]) -> Result<Self, ConfigError> {
        let config = CpuidConfig::parse(config)?;
        debug!("cpuid collector: configured for {:?}", config.location);
        Ok(Self::with_parts(
            config,
            Box::new(HostCpuid),
            default_mounter(),
        ))
    }

    /// Build from an already parsed record and explicit collaborators.
    pub fn with_parts(
        config: CpuidConfig,
        source: Box<dyn PlatformSource>,
        mounter: Box<dyn VolumeMounter>,
    ) -> Self {
        Self {
            config,
            source,
            mounter,
        }
    }

    /// The record this collector was built from.
    pub fn config(&self) -> &CpuidConfig {
        &self.config
    }

    /// Render a fresh evidence report.
    pub fn report(&self) -> Vec<u8> {
        format_report(&self.source.snapshot())
    }
}

pub(super) fn new_boxed(config: &[u8]) -> Result<Box<dyn Collector>, ConfigError> {
    Ok(Box::new(CpuidCollector::new(config)?))
}

impl Collector for CpuidCollector {
    fn kind(&self) -> &'static str {
        COLLECTOR_TYPE
    }

    fn collect(&self, tpm: &mut dyn TrustAnchor) -> Result<(), CollectError> {
        let report = self.report();
        debug!("cpuid collector: report is {} bytes", report.len());

        extend_from_reader(tpm, MEASUREMENT_PCR, report.as_slice()).map_err(|source| {
            error!("cpuid collector: err = {}", source);
            CollectError::TrustAnchor {
                collector: COLLECTOR_TYPE,
                pcr: MEASUREMENT_PCR,
                source,
            }
        })?;

        let target = persist(
            self.mounter.as_ref(),
            &report,
            &self.config.location,
            DEFAULT_CPUID_FILE,
        )
        .map_err(|source| {
            error!("cpuid collector: err = {}", source);
            CollectError::Persist {
                collector: COLLECTOR_TYPE,
                source,
            }
        })?;
        debug!("cpuid collector: target file {:?}", target);
        Ok(())
    }
}
