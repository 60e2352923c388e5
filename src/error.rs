// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Error types shared by collectors and their callers.

use thiserror::Error;

use crate::tpm::TpmError;
use crate::volume::PersistError;

/// Errors raised while constructing a collector from its config record.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The payload is not valid JSON or does not match the record schema.
    #[error("collector config malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    /// No collector is registered under the requested type tag.
    #[error("unknown collector type {0:?}")]
    UnknownType(String),
    /// The record was handed to a collector of a different variant.
    #[error("collector type mismatch: expected {expected:?}, found {found:?}")]
    TypeMismatch {
        /// Tag of the collector being constructed.
        expected: &'static str,
        /// Tag found in the payload.
        found: String,
    },
}

/// Outcome of a failed `collect` call.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The PCR extension failed; nothing was persisted.
    #[error("{collector}: extending PCR {pcr} failed: {source}")]
    TrustAnchor {
        /// Collector type tag.
        collector: &'static str,
        /// Register that was being extended.
        pcr: u32,
        /// Underlying device error.
        #[source]
        source: TpmError,
    },
    /// Persisting the evidence failed after the PCR was extended.
    #[error("{collector}: {source}")]
    Persist {
        /// Collector type tag.
        collector: &'static str,
        /// Resolution, write or unmount failure.
        #[source]
        source: PersistError,
    },
}

impl CollectError {
    /// True when the caller must not continue the boot flow.
    ///
    /// Only a failed unmount is fatal: the volume may still be attached
    /// to a mount point nobody will clean up.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CollectError::Persist {
                source: PersistError::Unmount { .. },
                ..
            }
        )
    }

    /// Persistence error, if that is where the collect sequence stopped.
    pub fn persist_error(&self) -> Option<&PersistError> {
        match self {
            CollectError::Persist { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn only_unmount_failures_are_fatal() {
        let write = CollectError::Persist {
            collector: "cpuid",
            source: PersistError::Write {
                path: PathBuf::from("/tmp/x/cpuid.txt"),
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            },
        };
        assert!(!write.is_fatal());

        let unmount = CollectError::Persist {
            collector: "cpuid",
            source: PersistError::Unmount {
                mount_root: PathBuf::from("/tmp/x"),
                source: io::Error::new(io::ErrorKind::Other, "busy"),
                write_error: None,
            },
        };
        assert!(unmount.is_fatal());

        let tpm = CollectError::TrustAnchor {
            collector: "cpuid",
            pcr: 22,
            source: TpmError::ResponseCode(0x101),
        };
        assert!(!tpm.is_fatal());
        assert!(tpm.persist_error().is_none());
    }

    #[test]
    fn messages_name_operation_and_target() {
        let err = CollectError::TrustAnchor {
            collector: "cpuid",
            pcr: 22,
            source: TpmError::ResponseCode(0x101),
        };
        let msg = err.to_string();
        assert!(msg.contains("cpuid"));
        assert!(msg.contains("PCR 22"));
    }
}
