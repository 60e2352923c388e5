// CLASSIFICATION: COMMUNITY
// Filename: device.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! TPM 2.0 `TPM2_PCR_Extend` over a raw command channel.
//!
//! Works with any already-open byte stream that speaks the TPM command
//! protocol, typically `/dev/tpmrm0`. Only the SHA-256 bank is extended,
//! using an empty password session.

use std::io::{Read, Write};

use log::debug;

use super::{TpmError, TrustAnchor, DIGEST_LEN};

const TPM_ST_SESSIONS: u16 = 0x8002;
const TPM_CC_PCR_EXTEND: u32 = 0x0000_0182;
const TPM_RS_PW: u32 = 0x4000_0009;
const TPM_ALG_SHA256: u16 = 0x000B;
const HEADER_LEN: usize = 10;
// Largest response the kernel resource manager hands back.
const MAX_RESPONSE_LEN: usize = 4096;

/// TPM device speaking the TPM 2.0 command protocol over `T`.
///
/// The channel is borrowed in spirit: `TpmDevice` never opens it and
/// closes it only when dropped by its owner.
#[derive(Debug)]
pub struct TpmDevice<T> {
    io: T,
}

impl<T: Read + Write> TpmDevice<T> {
    /// Wrap an open TPM channel.
    pub fn new(io: T) -> Self {
        Self { io }
    }

    /// Release the underlying channel.
    pub fn into_inner(self) -> T {
        self.io
    }

    fn transact(&mut self, command: &[u8]) -> Result<Vec<u8>, TpmError> {
        self.io.write_all(command)?;
        self.io.flush()?;

        let mut resp = vec![0u8; MAX_RESPONSE_LEN];
        let n = self.io.read(&mut resp)?;
        if n < HEADER_LEN {
            return Err(TpmError::Truncated {
                expected: HEADER_LEN,
                actual: n,
            });
        }
        let size = u32::from_be_bytes([resp[2], resp[3], resp[4], resp[5]]) as usize;
        if n < size {
            return Err(TpmError::Truncated {
                expected: size,
                actual: n,
            });
        }
        let code = u32::from_be_bytes([resp[6], resp[7], resp[8], resp[9]]);
        if code != 0 {
            return Err(TpmError::ResponseCode(code));
        }
        resp.truncate(size);
        Ok(resp)
    }
}

/// Encode a `TPM2_PCR_Extend` command for a single SHA-256 digest.
pub fn pcr_extend_command(pcr: u32, digest: &[u8; DIGEST_LEN]) -> Vec<u8> {
    let mut body = Vec::with_capacity(64);
    body.extend_from_slice(&pcr.to_be_bytes());
    // Authorization area: password session, empty nonce and hmac.
    body.extend_from_slice(&9u32.to_be_bytes());
    body.extend_from_slice(&TPM_RS_PW.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.push(0);
    body.extend_from_slice(&0u16.to_be_bytes());
    // TPML_DIGEST_VALUES with one TPMT_HA.
    body.extend_from_slice(&1u32.to_be_bytes());
    body.extend_from_slice(&TPM_ALG_SHA256.to_be_bytes());
    body.extend_from_slice(digest);

    let total = (HEADER_LEN + body.len()) as u32;
    let mut cmd = Vec::with_capacity(total as usize);
    cmd.extend_from_slice(&TPM_ST_SESSIONS.to_be_bytes());
    cmd.extend_from_slice(&total.to_be_bytes());
    cmd.extend_from_slice(&TPM_CC_PCR_EXTEND.to_be_bytes());
    cmd.extend_from_slice(&body);
    cmd
}

impl<T: Read + Write> TrustAnchor for TpmDevice<T> {
    fn pcr_extend(&mut self, pcr: u32, digest: &[u8; DIGEST_LEN]) -> Result<(), TpmError> {
        let cmd = pcr_extend_command(pcr, digest);
        debug!("tpm: sending PCR_Extend for pcr {} ({} bytes)", pcr, cmd.len());
        self.transact(&cmd)?;
        Ok(())
    }
}
