// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · tpm
// Date Modified: 2026-10-18
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// Trust-anchor extension
//
// Collectors digest their evidence with SHA-256 and extend the
// result into a PCR through a borrowed [`TrustAnchor`] handle.
// The handle is opened and closed by the caller; nothing here
// retains it past a single call.
//
// ## Public API
// * [`extend_from_reader`] – digest a byte stream and extend a PCR.
// * [`SoftTpm`]            – in-memory SHA-256 PCR bank.
// * [`TpmDevice`]          – TPM 2.0 command transport.
// ─────────────────────────────────────────────────────────────

use std::io::{self, Read};

use log::{debug, info};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub mod device;
pub mod soft;

pub use device::TpmDevice;
pub use soft::SoftTpm;

/// PCR shared by every secure-launch collector.
///
/// All collectors extend the same register in invocation order so the
/// final value covers the whole evidence set of one boot.
pub const MEASUREMENT_PCR: u32 = 22;

/// Size of a SHA-256 PCR bank entry.
pub const DIGEST_LEN: usize = 32;

/// Errors reported by trust-anchor operations.
#[derive(Debug, Error)]
pub enum TpmError {
    /// Reading the evidence or talking to the device failed.
    #[error("tpm i/o: {0}")]
    Io(#[from] io::Error),
    /// The device answered with a non-success response code.
    #[error("tpm returned response code {0:#010x}")]
    ResponseCode(u32),
    /// The response was shorter than its header claims.
    #[error("tpm response truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Length announced in the response header.
        expected: usize,
        /// Bytes actually received.
        actual: usize,
    },
    /// The PCR index is outside the bank.
    #[error("pcr {0} out of range")]
    InvalidPcr(u32),
}

/// An open channel to a trust anchor that can extend PCRs.
pub trait TrustAnchor {
    /// Extend `pcr` with a SHA-256 `digest`.
    fn pcr_extend(&mut self, pcr: u32, digest: &[u8; DIGEST_LEN]) -> Result<(), TpmError>;
}

/// Digest everything `reader` yields and extend `pcr` with it.
///
/// The stream is consumed completely before the device is touched, so a
/// read failure never reaches the register. Returns the extended digest.
pub fn extend_from_reader<R: Read>(
    tpm: &mut dyn TrustAnchor,
    pcr: u32,
    mut reader: R,
) -> Result<[u8; DIGEST_LEN], TpmError> {
    let mut hasher = Sha256::new();
    let n = io::copy(&mut reader, &mut hasher)?;
    let digest: [u8; DIGEST_LEN] = hasher.finalize().into();
    debug!("tpm: {} bytes digested to {}", n, hex::encode(digest));
    tpm.pcr_extend(pcr, &digest)?;
    info!("tpm: extended PCR {} with {}", pcr, hex::encode(digest));
    Ok(digest)
}
