//! CPU reference accumulation used to cross-check the GPU pipeline.

use rayon::prelude::*;

use crate::ops::{point_add, scalar_mul_projective, to_affine};
use crate::{AffinePoint, ProjectivePoint, Scalar};

/// `Σ k_i · P_i` by per-pair double-and-add. Deliberately built from the
/// same `scalar_mul` / `point_add` primitives the tests reason about, not
/// from a windowed method, so it is an independent check on Pippenger.
pub fn msm_reference(scalars: &[Scalar], points: &[AffinePoint]) -> AffinePoint {
    let n = scalars.len().min(points.len());
    let acc = scalars[..n]
        .par_iter()
        .zip(points[..n].par_iter())
        .map(|(k, p)| scalar_mul_projective(k, p))
        .reduce(|| ProjectivePoint::IDENTITY, |a, b| point_add(&a, &b));
    to_affine(&acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::scalar_mul;
    use crate::generator;
    use arith::Limbs256 as L;

    #[test]
    fn empty_input_yields_identity() {
        assert_eq!(msm_reference(&[], &[]), AffinePoint::IDENTITY);
    }

    #[test]
    fn single_pair_is_scalar_mul() {
        let g = generator();
        let k = L::from_u64(12345);
        assert_eq!(msm_reference(&[k], &[g]), scalar_mul(&k, &g));
    }

    #[test]
    fn linear_in_scalars() {
        // k1*G + k2*G == (k1 + k2)*G for small scalars (no 256-bit overflow).
        let g = generator();
        let k1 = L::from_u64(0x1234_5678);
        let k2 = L::from_u64(0x9abc_def0);
        let sum = L::from_u64(0x1234_5678 + 0x9abc_def0);
        assert_eq!(msm_reference(&[k1, k2], &[g, g]), scalar_mul(&sum, &g));
    }

    #[test]
    fn permutation_invariant() {
        let g = generator();
        let g2 = scalar_mul(&L::from_u64(2), &g);
        let g3 = scalar_mul(&L::from_u64(3), &g);
        let ks = [L::from_u64(5), L::from_u64(9), L::from_u64(31)];
        let ps = [g, g2, g3];
        let forward = msm_reference(&ks, &ps);
        let ks_rev = [ks[2], ks[0], ks[1]];
        let ps_rev = [ps[2], ps[0], ps[1]];
        assert_eq!(forward, msm_reference(&ks_rev, &ps_rev));
    }
}
