//! Per-call MSM configuration.

use crate::error::MsmError;

/// Smallest and largest accepted Pippenger window widths.
pub const MIN_WINDOW_BITS: u32 = 1;
pub const MAX_WINDOW_BITS: u32 = 22;

#[derive(Clone, Debug)]
pub struct MsmConfig {
    /// Pippenger window width in bits.
    pub window_bits: u32,
    /// Promote per-call dispatch statistics and timings to `info` logs.
    pub verbose: bool,
    /// Cap on points per batch, below what the device limits allow.
    /// Tests use this to force the multi-batch path on small inputs.
    pub max_chunk_override: Option<usize>,
}

impl Default for MsmConfig {
    fn default() -> Self {
        MsmConfig {
            window_bits: 8,
            verbose: false,
            max_chunk_override: None,
        }
    }
}

impl MsmConfig {
    pub fn new(window_bits: u32) -> Self {
        MsmConfig {
            window_bits,
            ..Default::default()
        }
    }

    /// Window-width heuristic keyed on input size.
    pub fn with_auto_window(n: usize) -> Self {
        let window_bits = match n {
            0..=32 => 3,
            33..=128 => 5,
            129..=512 => 7,
            513..=8192 => 8,
            _ => 10,
        };
        Self::new(window_bits)
    }

    pub fn validate(&self) -> Result<(), MsmError> {
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&self.window_bits) {
            return Err(MsmError::WindowBits(self.window_bits));
        }
        Ok(())
    }
}
