//! Multi-scalar multiplication over Pallas on WebGPU compute shaders.
//!
//! Given scalars `k_i` and affine points `P_i`, computes `Q = Σ k_i · P_i`
//! with a windowed Pippenger pipeline: affine→projective conversion, a
//! bucket pass per (batch, window, bucket value) with workgroup-tree
//! reductions, value-weighted bucket aggregation, a Horner fold across
//! windows, and a final cross-batch reduction that normalizes to affine.
//! Inputs above the device's storage-binding limit are processed in
//! batches; all passes for all batches are encoded into one command buffer
//! and submitted once.
//!
//! Scalars are treated as raw 256-bit integers and points as raw field
//! coordinates; callers are responsible for curve membership and any
//! scalar-field reduction. Nothing here is constant-time.

pub mod config;
pub mod device;
pub mod error;
pub mod pipeline;
pub mod schedule;
pub mod shaders;

pub use config::MsmConfig;
pub use curve::{AffinePoint, ProjectivePoint, Scalar};
pub use device::GpuContext;
pub use error::MsmError;

use schedule::{PlanLimits, JACOBIAN_SIZE};

/// Argument validation; runs synchronously before any device work.
fn validate_inputs(
    scalars: &[Scalar],
    points: &[AffinePoint],
    config: &MsmConfig,
) -> Result<(), MsmError> {
    if scalars.is_empty() || points.is_empty() {
        return Err(MsmError::EmptyInput);
    }
    if scalars.len() != points.len() {
        return Err(MsmError::LengthMismatch {
            scalars: scalars.len(),
            points: points.len(),
        });
    }
    config.validate()
}

/// Compute `Σ k_i · P_i` on the GPU and return the affine result
/// (`(0, 0)` for the identity).
pub async fn msm(
    ctx: &GpuContext,
    scalars: &[Scalar],
    points: &[AffinePoint],
    config: &MsmConfig,
) -> Result<AffinePoint, MsmError> {
    validate_inputs(scalars, points, config)?;

    let limits = PlanLimits::from_device(&ctx.limits, config);
    let bucket_bytes = (1u64 << config.window_bits) * JACOBIAN_SIZE;
    if bucket_bytes > limits.max_storage_binding {
        return Err(MsmError::DeviceResourceExhausted(format!(
            "bucket buffer of {bucket_bytes} bytes exceeds the {} byte storage binding limit",
            limits.max_storage_binding
        )));
    }

    let plan = schedule::plan(scalars.len(), config.window_bits, &limits);
    if config.verbose {
        log::info!(
            "msm: n={} window_bits={} batches={} windows={} dispatches={}",
            plan.n,
            plan.window_bits,
            plan.num_batches,
            plan.num_windows,
            plan.dispatch_count()
        );
    } else {
        log::debug!(
            "msm: n={} window_bits={} batches={} dispatches={}",
            plan.n,
            plan.window_bits,
            plan.num_batches,
            plan.dispatch_count()
        );
    }

    let started = std::time::Instant::now();
    let result = pipeline::execute(ctx, &plan, scalars, points).await?;
    let elapsed = started.elapsed();
    if config.verbose {
        log::info!("msm: completed in {elapsed:.2?}");
    } else {
        log::debug!("msm: completed in {elapsed:.2?}");
    }
    Ok(result)
}

/// Blocking wrapper around [`msm`] for synchronous hosts and tests.
pub fn msm_blocking(
    ctx: &GpuContext,
    scalars: &[Scalar],
    points: &[AffinePoint],
    config: &MsmConfig,
) -> Result<AffinePoint, MsmError> {
    pollster::block_on(msm(ctx, scalars, points, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arith::Limbs256;

    #[test]
    fn rejects_empty_input() {
        let cfg = MsmConfig::default();
        assert!(matches!(
            validate_inputs(&[], &[], &cfg),
            Err(MsmError::EmptyInput)
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let cfg = MsmConfig::default();
        let k = [Limbs256::ONE];
        let ps = [AffinePoint::IDENTITY, AffinePoint::IDENTITY];
        match validate_inputs(&k, &ps, &cfg) {
            Err(MsmError::LengthMismatch { scalars, points }) => {
                assert_eq!((scalars, points), (1, 2));
            }
            other => panic!("expected length mismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_window() {
        let k = [Limbs256::ONE];
        let p = [AffinePoint::IDENTITY];
        for bad in [0u32, 23, 64] {
            assert!(matches!(
                validate_inputs(&k, &p, &MsmConfig::new(bad)),
                Err(MsmError::WindowBits(_))
            ));
        }
    }
}
