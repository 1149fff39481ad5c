//! Error surface of the GPU MSM pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MsmError {
    /// No pairs were supplied.
    #[error("empty input")]
    EmptyInput,

    /// Scalar and point slices disagree in length.
    #[error("length mismatch: {scalars} scalars vs {points} points")]
    LengthMismatch { scalars: usize, points: usize },

    /// Window width outside the supported range.
    #[error("window_bits {0} outside supported range 1..=22")]
    WindowBits(u32),

    /// No WebGPU adapter could be acquired.
    #[error("no compatible gpu adapter available")]
    AdapterUnavailable,

    /// Adapter refused the device request.
    #[error("device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Buffer allocation failed; the call released everything it had
    /// acquired before returning.
    #[error("device allocation failed: {0}")]
    DeviceResourceExhausted(String),

    /// Result staging buffer failed to map.
    #[error("result readback failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    /// The device went away mid-call (map completion channel dropped).
    #[error("device lost before results were read back")]
    DeviceLost,
}
