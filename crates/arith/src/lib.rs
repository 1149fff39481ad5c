//! 256-bit limb arithmetic and the Montgomery kernel for the Pallas base
//! field.
//!
//! Everything here operates on little-endian 8×u32 limb arrays and mirrors,
//! operation for operation, the WGSL arithmetic the GPU pipeline runs. The
//! mirror is deliberate: the host-side tests exercise the exact carry and
//! borrow paths of the shader algorithms, not a widened-integer stand-in.

pub mod fp;
pub mod limb;
pub mod mont;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 256-bit unsigned integer as 8 little-endian 32-bit limbs.
///
/// Limb 0 is least significant. The container itself carries no reduction
/// guarantee; field-element semantics (value < p, Montgomery form) are a
/// property of the operations applied to it.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[repr(transparent)]
pub struct Limbs256(pub [u32; 8]);

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected at most 64 hex digits, got {0}")]
    TooLong(usize),
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl Limbs256 {
    pub const ZERO: Limbs256 = Limbs256([0; 8]);
    pub const ONE: Limbs256 = Limbs256([1, 0, 0, 0, 0, 0, 0, 0]);

    pub fn from_u64(v: u64) -> Self {
        Limbs256([v as u32, (v >> 32) as u32, 0, 0, 0, 0, 0, 0])
    }

    /// Little-endian 32-byte encoding, the CPU↔GPU wire format.
    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.0.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u32; 8];
        for (i, limb) in limbs.iter_mut().enumerate() {
            *limb = u32::from_le_bytes([
                bytes[i * 4],
                bytes[i * 4 + 1],
                bytes[i * 4 + 2],
                bytes[i * 4 + 3],
            ]);
        }
        Limbs256(limbs)
    }

    /// Big-endian hex, 64 digits, leading zeros preserved.
    pub fn to_hex(&self) -> String {
        let mut be = self.to_le_bytes();
        be.reverse();
        hex::encode(be)
    }

    /// Parse big-endian hex of up to 64 digits (shorter input is
    /// zero-extended at the top).
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() > 64 {
            return Err(ParseError::TooLong(s.len()));
        }
        let mut padded = String::with_capacity(64);
        for _ in 0..64 - s.len() {
            padded.push('0');
        }
        padded.push_str(s);
        let mut be = [0u8; 32];
        hex::decode_to_slice(&padded, &mut be)?;
        be.reverse();
        Ok(Self::from_le_bytes(&be))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&l| l == 0)
    }

    /// Bit `i` (0 = least significant) of the 256-bit value.
    pub fn bit(&self, i: usize) -> bool {
        debug_assert!(i < 256);
        (self.0[i / 32] >> (i % 32)) & 1 == 1
    }
}

impl core::fmt::Debug for Limbs256 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Limbs256(0x{})", self.to_hex())
    }
}
