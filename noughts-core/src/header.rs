//! Fixed-size frame header that precedes every move on the wire.
//!
//! ## Wire format
//!
//! ```text
//! magic:          [u8; 4]  "NGT0"
//! checksum:       u32 LE   first 4 bytes of blake3(payload)
//! payload_length: u32 LE
//! ```

use crate::error::NoughtsError;

/// Magic bytes identifying a noughts frame.
pub const MAGIC: [u8; 4] = *b"NGT0";

/// Encoded size of [`FrameHeader`] on the wire.
pub const HEADER_SIZE: usize = 12;

/// Per-frame metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    checksum: u32,
    payload_length: u32,
}

impl FrameHeader {
    /// Build a header for `payload`, computing its checksum.
    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            checksum: checksum(payload),
            payload_length: payload.len() as u32,
        }
    }

    /// Serialize to bytes (little-endian).
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4..8].copy_from_slice(&self.checksum.to_le_bytes());
        buf[8..12].copy_from_slice(&self.payload_length.to_le_bytes());
        buf
    }

    /// Deserialize from the first [`HEADER_SIZE`] bytes of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, NoughtsError> {
        if data.len() < HEADER_SIZE {
            return Err(NoughtsError::Encoding(format!(
                "frame header too short: {} < {HEADER_SIZE}",
                data.len(),
            )));
        }
        if data[0..4] != MAGIC {
            return Err(NoughtsError::InvalidMagic);
        }
        Ok(Self {
            checksum: read_u32(&data[4..8]),
            payload_length: read_u32(&data[8..12]),
        })
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn payload_length(&self) -> usize {
        self.payload_length as usize
    }

    /// Returns `true` if `payload` matches the recorded checksum.
    pub fn verify(&self, payload: &[u8]) -> bool {
        checksum(payload) == self.checksum
    }
}

/// Truncated blake3 digest of a payload.
pub fn checksum(payload: &[u8]) -> u32 {
    let digest = blake3::hash(payload);
    let bytes = digest.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
