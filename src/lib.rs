// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Date Modified: 2026-10-18
// Author: Lukas Bower

//! Secure-launch measurement collectors for Cohesix.
//!
//! A collector gathers one piece of platform evidence, extends its
//! SHA-256 digest into a TPM PCR and persists a readable copy of the
//! evidence onto a mounted storage volume. The CPUID collector is the
//! only variant shipped here; further variants register through
//! [`collector::registry`].

#![warn(missing_docs)]

/// Collector trait, registry and the CPUID collector.
pub mod collector;

/// Platform identification snapshot, feature tables and report formatting.
pub mod cpuid;

/// Crate-wide error types.
pub mod error;

/// Trust-anchor (TPM PCR) extension.
pub mod tpm;

/// Volume resolution, mounting and evidence persistence.
pub mod volume;

pub use collector::{new_collector, run_pipeline, Collector, CpuidCollector};
pub use error::{CollectError, ConfigError};
pub use tpm::{TrustAnchor, MEASUREMENT_PCR};
