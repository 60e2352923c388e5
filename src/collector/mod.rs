// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · collector
// Date Modified: 2026-10-18
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// Secure-launch collectors
//
// A collector is built from its JSON record in the launch policy
// and, when run, measures one kind of evidence into the shared
// PCR before persisting it. Variants register a constructor
// under their `type` tag.
//
// ## Public API
// * [`Collector`]     – the collect capability.
// * [`new_collector`] – build a collector from its record.
// * [`run_pipeline`]  – run collectors in order against one TPM.
// ─────────────────────────────────────────────────────────────

use std::collections::HashMap;

use log::{debug, error, info};
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::{CollectError, ConfigError};
use crate::tpm::TrustAnchor;

pub mod cpuid;

pub use cpuid::{CpuidCollector, CpuidConfig};

/// One evidence collector of the secure-launch pipeline.
pub trait Collector {
    /// Type tag this collector was registered under.
    fn kind(&self) -> &'static str;

    /// Measure the evidence into `tpm` and persist it.
    ///
    /// The handle is borrowed for this call only; its lifetime is the
    /// caller's business.
    fn collect(&self, tpm: &mut dyn TrustAnchor) -> Result<(), CollectError>;
}

/// Constructor registered for a collector type tag.
pub type CollectorCtor = fn(&[u8]) -> Result<Box<dyn Collector>, ConfigError>;

static REGISTRY: Lazy<HashMap<&'static str, CollectorCtor>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, CollectorCtor> = HashMap::new();
    map.insert(cpuid::COLLECTOR_TYPE, cpuid::new_boxed);
    map
});

#[derive(Deserialize)]
struct TypeTag {
    #[serde(rename = "type")]
    kind: String,
}

/// Type tags with a registered constructor, sorted.
pub fn registry() -> Vec<&'static str> {
    let mut tags: Vec<_> = REGISTRY.keys().copied().collect();
    tags.sort_unstable();
    tags
}

/// Build the collector named by the `type` field of `config`.
pub fn new_collector(config: &[u8]) -> Result<Box<dyn Collector>, ConfigError> {
    let tag: TypeTag = serde_json::from_slice(config)?;
    let ctor = REGISTRY
        .get(tag.kind.as_str())
        .ok_or_else(|| ConfigError::UnknownType(tag.kind.clone()))?;
    debug!("collector: constructing {:?}", tag.kind);
    ctor(config)
}

/// Outcome of one collector in a pipeline run.
#[derive(Debug)]
pub struct CollectorOutcome {
    /// Collector type tag.
    pub kind: &'static str,
    /// Collect result.
    pub result: Result<(), CollectError>,
}

/// Run `collectors` in order against `tpm`.
///
/// Ordinary failures are recorded and the run continues, so the PCR
/// chain still covers later evidence. A fatal failure stops the run;
/// collectors after it are not invoked.
pub fn run_pipeline(
    collectors: &[Box<dyn Collector>],
    tpm: &mut dyn TrustAnchor,
) -> Vec<CollectorOutcome> {
    let mut outcomes = Vec::with_capacity(collectors.len());
    for collector in collectors {
        let result = collector.collect(tpm);
        let fatal = match &result {
            Ok(()) => {
                info!("pipeline: {} collected", collector.kind());
                false
            }
            Err(e) => {
                error!("pipeline: {} failed: {}", collector.kind(), e);
                e.is_fatal()
            }
        };
        outcomes.push(CollectorOutcome {
            kind: collector.kind(),
            result,
        });
        if fatal {
            error!("pipeline: fatal error, remaining collectors skipped");
            break;
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tpm::{SoftTpm, TpmError};
    use crate::volume::PersistError;
    use std::cell::Cell;
    use std::io;
    use std::path::PathBuf;

    struct Scripted {
        calls: Cell<usize>,
        fail: Option<fn() -> CollectError>,
    }

    impl Collector for Scripted {
        fn kind(&self) -> &'static str {
            "scripted"
        }

        fn collect(&self, tpm: &mut dyn TrustAnchor) -> Result<(), CollectError> {
            self.calls.set(self.calls.get() + 1);
            tpm.pcr_extend(22, &[0u8; 32]).map_err(|source| CollectError::TrustAnchor {
                collector: "scripted",
                pcr: 22,
                source,
            })?;
            match self.fail {
                Some(f) => Err(f()),
                None => Ok(()),
            }
        }
    }

    fn ok() -> Box<dyn Collector> {
        Box::new(Scripted {
            calls: Cell::new(0),
            fail: None,
        })
    }

    fn write_failure() -> CollectError {
        CollectError::Persist {
            collector: "scripted",
            source: PersistError::Write {
                path: PathBuf::from("/x"),
                source: io::Error::new(io::ErrorKind::Other, "full"),
            },
        }
    }

    fn unmount_failure() -> CollectError {
        CollectError::Persist {
            collector: "scripted",
            source: PersistError::Unmount {
                mount_root: PathBuf::from("/m"),
                source: io::Error::new(io::ErrorKind::Other, "busy"),
                write_error: None,
            },
        }
    }

    #[test]
    fn registry_lists_cpuid() {
        assert_eq!(registry(), vec!["cpuid"]);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = new_collector(br#"{"type":"eventlog","location":"sda:/x"}"#)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::UnknownType(t) if t == "eventlog"));
    }

    #[test]
    fn malformed_record_is_rejected() {
        let err = new_collector(b"{\"type\":").err().unwrap();
        assert!(matches!(err, ConfigError::Malformed(_)));
        let err = new_collector(br#"{"location":"sda:/x"}"#).err().unwrap();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn registered_tag_builds_collector() {
        let c = new_collector(br#"{"type":"cpuid","location":"sda1:/boot/cpuid.txt"}"#).unwrap();
        assert_eq!(c.kind(), "cpuid");
    }

    #[test]
    fn pipeline_continues_after_ordinary_failure() {
        let collectors: Vec<Box<dyn Collector>> = vec![
            Box::new(Scripted {
                calls: Cell::new(0),
                fail: Some(write_failure),
            }),
            ok(),
        ];
        let mut tpm = SoftTpm::new();
        let outcomes = run_pipeline(&collectors, &mut tpm);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].result.is_ok());
        assert_eq!(tpm.extend_count(), 2);
    }

    #[test]
    fn pipeline_stops_on_fatal_failure() {
        let collectors: Vec<Box<dyn Collector>> = vec![
            Box::new(Scripted {
                calls: Cell::new(0),
                fail: Some(unmount_failure),
            }),
            ok(),
        ];
        let mut tpm = SoftTpm::new();
        let outcomes = run_pipeline(&collectors, &mut tpm);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.as_ref().unwrap_err().is_fatal());
        assert_eq!(tpm.extend_count(), 1);
    }

    #[test]
    fn pipeline_records_tpm_failures() {
        struct Dead;
        impl TrustAnchor for Dead {
            fn pcr_extend(&mut self, _: u32, _: &[u8; 32]) -> Result<(), TpmError> {
                Err(TpmError::ResponseCode(0x101))
            }
        }
        let collectors = vec![ok(), ok()];
        let outcomes = run_pipeline(&collectors, &mut Dead);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o.result, Err(CollectError::TrustAnchor { .. }))));
    }
}
