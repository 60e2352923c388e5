// CLASSIFICATION: COMMUNITY
// Filename: soft.rs v0.1
// Date Modified: 2026-10-18
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// Software PCR bank
//
// A TPM-style SHA-256 PCR bank held in memory. Used when no TPM
// is present (host runs, simulation) and by tests that need to
// check the resulting chain value.
// ─────────────────────────────────────────────────────────────

//! In-memory SHA-256 PCR bank.

use sha2::{Digest, Sha256};

use super::{TpmError, TrustAnchor, DIGEST_LEN};

/// Number of PCRs in a TPM 2.0 PC-client bank.
pub const PCR_COUNT: usize = 24;

/// Extend a 32-byte PCR value **in place**.
///
/// Pseudocode: `PCR := SHA256(PCR || digest)`
pub fn extend_pcr(pcr: &mut [u8; DIGEST_LEN], digest: &[u8]) {
    let mut hasher = Sha256::new();
    hasher.update(&pcr[..]);
    hasher.update(digest);
    *pcr = hasher.finalize().into();
}

/// In-memory SHA-256 PCR bank.
#[derive(Clone, Debug)]
pub struct SoftTpm {
    pcrs: [[u8; DIGEST_LEN]; PCR_COUNT],
    extends: usize,
}

impl Default for SoftTpm {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftTpm {
    /// Bank with every PCR reset to zero.
    pub fn new() -> Self {
        Self {
            pcrs: [[0u8; DIGEST_LEN]; PCR_COUNT],
            extends: 0,
        }
    }

    /// Current value of `pcr`.
    pub fn read_pcr(&self, pcr: u32) -> Result<[u8; DIGEST_LEN], TpmError> {
        self.pcrs
            .get(pcr as usize)
            .copied()
            .ok_or(TpmError::InvalidPcr(pcr))
    }

    /// Number of successful extensions since creation.
    pub fn extend_count(&self) -> usize {
        self.extends
    }
}

impl TrustAnchor for SoftTpm {
    fn pcr_extend(&mut self, pcr: u32, digest: &[u8; DIGEST_LEN]) -> Result<(), TpmError> {
        let slot = self
            .pcrs
            .get_mut(pcr as usize)
            .ok_or(TpmError::InvalidPcr(pcr))?;
        extend_pcr(slot, digest);
        self.extends += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcr_is_not_zero_after_extend() {
        let mut pcr = [0u8; DIGEST_LEN];
        extend_pcr(&mut pcr, b"cohesix");
        assert!(pcr.iter().any(|&b| b != 0));
    }

    #[test]
    fn extension_order_matters() {
        let a = [1u8; DIGEST_LEN];
        let b = [2u8; DIGEST_LEN];

        let mut first = SoftTpm::new();
        first.pcr_extend(22, &a).unwrap();
        first.pcr_extend(22, &b).unwrap();

        let mut second = SoftTpm::new();
        second.pcr_extend(22, &b).unwrap();
        second.pcr_extend(22, &a).unwrap();

        assert_ne!(first.read_pcr(22).unwrap(), second.read_pcr(22).unwrap());
        assert_eq!(first.extend_count(), 2);
        assert_eq!(first.read_pcr(0).unwrap(), [0u8; DIGEST_LEN]);
    }

    #[test]
    fn out_of_range_pcr_is_rejected() {
        let mut tpm = SoftTpm::new();
        let err = tpm.pcr_extend(24, &[0u8; DIGEST_LEN]).unwrap_err();
        assert!(matches!(err, TpmError::InvalidPcr(24)));
        assert_eq!(tpm.extend_count(), 0);
    }
}
