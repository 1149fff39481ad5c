//! Interop with `pasta_curves`, plus deterministic test-point derivation.
//!
//! The limb types in this workspace are wire-level; `pasta_curves` is the
//! independently-implemented field library every layer is cross-checked
//! against. Derivation of on-curve points hashes `(chunk, idx)` to a scalar
//! with a personalized Blake2b and multiplies the generator.

use blake2b_simd::Params as Blake2bParams;
use ff::{FromUniformBytes, PrimeField};
use group::prime::PrimeCurveAffine;
use group::{Curve, Group};
use pasta_curves::arithmetic::CurveAffine;
use pasta_curves::{pallas, Fp};

use arith::Limbs256;

use crate::AffinePoint;

// Blake2b personalization; at most 16 bytes.
const DERIVE_DOMAIN: &[u8] = b"pallas-msm:base";

/// `Limbs256` → `Fp`, failing on non-canonical (≥ p) input.
pub fn limbs_to_fp(l: &Limbs256) -> Option<Fp> {
    let mut repr = <Fp as PrimeField>::Repr::default();
    repr.as_mut().copy_from_slice(&l.to_le_bytes());
    Option::from(Fp::from_repr(repr))
}

/// `Fp` → `Limbs256` (canonical little-endian repr).
pub fn fp_to_limbs(f: &Fp) -> Limbs256 {
    let repr = f.to_repr();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(repr.as_ref());
    Limbs256::from_le_bytes(&bytes)
}

/// `pallas::Scalar` → `Limbs256`.
pub fn scalar_to_limbs(s: &pallas::Scalar) -> Limbs256 {
    let repr = s.to_repr();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(repr.as_ref());
    Limbs256::from_le_bytes(&bytes)
}

/// Our affine wire type → `pallas::Affine`. The `(0, 0)` sentinel maps to
/// the pasta identity; otherwise the coordinates must be canonical and on
/// the curve.
pub fn to_pallas_affine(p: &AffinePoint) -> Option<pallas::Affine> {
    if p.is_identity() {
        return Some(pallas::Affine::identity());
    }
    let x = limbs_to_fp(&p.x)?;
    let y = limbs_to_fp(&p.y)?;
    Option::from(pallas::Affine::from_xy(x, y))
}

/// `pallas::Affine` → our affine wire type; the identity becomes `(0, 0)`.
pub fn from_pallas_affine(p: &pallas::Affine) -> AffinePoint {
    match Option::<pasta_curves::arithmetic::Coordinates<pallas::Affine>>::from(p.coordinates()) {
        Some(coords) => AffinePoint {
            x: fp_to_limbs(coords.x()),
            y: fp_to_limbs(coords.y()),
        },
        None => AffinePoint::IDENTITY,
    }
}

/// Derive a deterministic Pallas scalar from `(chunk, idx)` by wide
/// reduction of a domain-separated Blake2b-512 hash.
pub fn derive_scalar(chunk: u32, idx: u32) -> pallas::Scalar {
    let mut le = [0u8; 8];
    le[..4].copy_from_slice(&chunk.to_le_bytes());
    le[4..].copy_from_slice(&idx.to_le_bytes());
    let hash = Blake2bParams::new()
        .hash_length(64)
        .personal(DERIVE_DOMAIN)
        .hash(&le);
    let mut wide = [0u8; 64];
    wide.copy_from_slice(hash.as_bytes());
    <pallas::Scalar as FromUniformBytes<64>>::from_uniform_bytes(&wide)
}

/// Derive a deterministic on-curve base point as `s · G` with
/// `s = derive_scalar(chunk, idx)`.
pub fn derive_base(chunk: u32, idx: u32) -> AffinePoint {
    let s = derive_scalar(chunk, idx);
    from_pallas_affine(&(pallas::Point::generator() * s).to_affine())
}

/// The first `n` derived base points `G_0 .. G_{n-1}`.
pub fn derive_bases(n: usize) -> Vec<AffinePoint> {
    (0..n).map(|i| derive_base(0, i as u32)).collect()
}

/// The first `n` derived scalars, as raw limbs (already reduced mod r).
pub fn derive_scalars(n: usize) -> Vec<Limbs256> {
    (0..n)
        .map(|i| scalar_to_limbs(&derive_scalar(1, i as u32)))
        .collect()
}
