//! Authenticated frame builder.
//!
//! Binds the beacon's monotonic counter to a truncated AES-128-CMAC tag.
//! The payload layout is fixed: 4-byte big-endian counter followed by the
//! first 4 bytes of the 16-byte tag computed over exactly those counter
//! bytes. No salt and no chaining, so every frame is independently
//! verifiable from the counter value and the shared key.

use aes::Aes128;
use cmac::{Cmac, Mac};

use crate::error::{BeaconError, Result};

/// CMAC key length in bytes
pub const KEY_LEN: usize = 16;

/// Full CMAC tag length in bytes
pub const TAG_LEN: usize = 16;

/// Tag bytes carried in the frame
pub const TRUNCATED_TAG_LEN: usize = 4;

/// Big-endian counter encoding length in bytes
pub const COUNTER_LEN: usize = 4;

/// Payload length: counter followed by the truncated tag
pub const PAYLOAD_LEN: usize = COUNTER_LEN + TRUNCATED_TAG_LEN;

/// Builds authenticated payloads from a monotonic counter.
///
/// Owns the CMAC context, keyed once at start-up; the key schedule is
/// reused across frames. Deterministic: the same counter under the same
/// key always yields the same payload.
pub struct FrameAuthenticator {
    mac: Cmac<Aes128>,
}

impl FrameAuthenticator {
    /// Keys the authenticator. The key must be exactly [`KEY_LEN`] bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        let mac = Cmac::<Aes128>::new_from_slice(key).map_err(|_| BeaconError::InvalidKey)?;
        Ok(Self { mac })
    }

    /// Full 16-byte tag over the counter's big-endian encoding
    pub fn tag(&mut self, counter: u32) -> [u8; TAG_LEN] {
        self.mac.update(&counter.to_be_bytes());
        self.mac.finalize_reset().into_bytes().into()
    }

    /// 8-byte payload: big-endian counter, then the first tag bytes
    pub fn build_payload(&mut self, counter: u32) -> [u8; PAYLOAD_LEN] {
        let counter_bytes = counter.to_be_bytes();
        let tag = self.tag(counter);

        let mut payload = [0u8; PAYLOAD_LEN];
        payload[..COUNTER_LEN].copy_from_slice(&counter_bytes);
        payload[COUNTER_LEN..].copy_from_slice(&tag[..TRUNCATED_TAG_LEN]);
        payload
    }
}
