//! WGSL source assembly.
//!
//! The shader lives in four fragments under `src/shaders/`, included at
//! compile time and concatenated exactly once per MSM call behind a small
//! generated constants header. Every helper is declared in exactly one
//! fragment; the tests below keep it that way.

use crate::schedule::PassKind;

/// Limb arithmetic: `Fp`, comparisons, modular add/sub, `mul_add_carry`.
pub const LIMBS_SHADER: &str = include_str!("shaders/limbs.wgsl");

/// Montgomery reduce/multiply/convert and Fermat inversion.
pub const MONTGOMERY_SHADER: &str = include_str!("shaders/montgomery.wgsl");

/// Jacobian group law and scaling.
pub const CURVE_SHADER: &str = include_str!("shaders/curve.wgsl");

/// Bindings and the six pass entry points.
pub const MSM_SHADER: &str = include_str!("shaders/msm.wgsl");

/// Entry point name for a pass kind.
pub fn entry_point(pass: PassKind) -> &'static str {
    match pass {
        PassKind::AConvert => "pass_a_convert",
        PassKind::B1Bucket => "pass_b1_bucket",
        PassKind::B2Reduce => "pass_b2_reduce",
        PassKind::CAggregate => "pass_c_aggregate",
        PassKind::DReduce => "pass_d_reduce",
        PassKind::EReduce => "pass_e_reduce",
    }
}

pub const ALL_PASSES: [PassKind; 6] = [
    PassKind::AConvert,
    PassKind::B1Bucket,
    PassKind::B2Reduce,
    PassKind::CAggregate,
    PassKind::DReduce,
    PassKind::EReduce,
];

/// Assemble the complete shader module for a window width.
pub fn compose(window_bits: u32) -> String {
    let mask: u32 = ((1u64 << window_bits) - 1) as u32;
    format!(
        "const WINDOW_BITS: u32 = {window_bits}u;\n\
         const WINDOW_MASK: u32 = {mask:#010x}u;\n\n\
         {LIMBS_SHADER}\n{MONTGOMERY_SHADER}\n{CURVE_SHADER}\n{MSM_SHADER}"
    )
}
