//! Pallas curve primitives over the limb-level Montgomery kernel.
//!
//! Points live in two representations. `AffinePoint` carries normal-form
//! (non-Montgomery) coordinates and is the host-side wire type; `(0, 0)` is
//! the identity sentinel. `ProjectivePoint` carries Montgomery-form Jacobian
//! coordinates and is what the group law operates on; `Z = 0` is the
//! identity. The same representations and formulas run inside the WGSL
//! kernels, so this crate doubles as the CPU reference for GPU cross-checks.

pub mod ops;
pub mod pasta;
pub mod reference;

use arith::fp::MODULUS;
use arith::limb::sub_mod;
use arith::Limbs256;
use serde::{Deserialize, Serialize};

/// A scalar multiplier. Interpreted as a raw 256-bit integer; the core
/// performs no scalar-field reduction, so `k` and `k + r` multiply
/// differently unless the point has order `r`.
pub type Scalar = Limbs256;

/// Affine Pallas point in normal form; `(0, 0)` encodes the identity.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Default,
    Serialize,
    Deserialize,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[repr(C)]
pub struct AffinePoint {
    pub x: Limbs256,
    pub y: Limbs256,
}

/// Jacobian point with Montgomery-form coordinates; `Z = 0` encodes the
/// identity, and the all-zero byte pattern is a valid identity encoding
/// (0 · R = 0), which the GPU pipeline relies on when clearing buffers.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Default,
    Serialize,
    Deserialize,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[repr(C)]
pub struct ProjectivePoint {
    pub x: Limbs256,
    pub y: Limbs256,
    pub z: Limbs256,
}

impl AffinePoint {
    pub const IDENTITY: AffinePoint = AffinePoint {
        x: Limbs256::ZERO,
        y: Limbs256::ZERO,
    };

    pub fn new(x: Limbs256, y: Limbs256) -> Self {
        AffinePoint { x, y }
    }

    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// The inverse point `(x, p - y)`; identity maps to itself.
    pub fn negate(&self) -> AffinePoint {
        if self.is_identity() {
            return *self;
        }
        AffinePoint {
            x: self.x,
            y: sub_mod(&Limbs256::ZERO, &self.y, &MODULUS),
        }
    }

    /// Whether `y^2 = x^3 + 5` holds mod p. The identity sentinel counts
    /// as on-curve.
    pub fn is_on_curve(&self) -> bool {
        use arith::fp::COEFF_B;
        use arith::limb::add_mod;
        use arith::mont::{from_mont, mont_mul, to_mont};
        if self.is_identity() {
            return true;
        }
        let xm = to_mont(&self.x);
        let ym = to_mont(&self.y);
        let y2 = from_mont(&mont_mul(&ym, &ym));
        let x3 = from_mont(&mont_mul(&mont_mul(&xm, &xm), &xm));
        y2 == add_mod(&x3, &COEFF_B, &MODULUS)
    }
}

impl ProjectivePoint {
    pub const IDENTITY: ProjectivePoint = ProjectivePoint {
        x: Limbs256::ZERO,
        y: Limbs256::ZERO,
        z: Limbs256::ZERO,
    };

    pub fn is_identity(&self) -> bool {
        self.z.is_zero()
    }
}

/// The Pallas generator `(p - 1, 2)` in normal form.
pub fn generator() -> AffinePoint {
    AffinePoint {
        x: sub_mod(&Limbs256::ZERO, &Limbs256::ONE, &MODULUS),
        y: Limbs256::from_u64(2),
    }
}

/// The Pallas scalar-field order `r` (the group order), little-endian.
pub const SCALAR_ORDER: Limbs256 = Limbs256([
    0x0000_0001,
    0x8c46_eb21,
    0x0994_a8dd,
    0x2246_98fc,
    0x0000_0000,
    0x0000_0000,
    0x0000_0000,
    0x4000_0000,
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_sentinel() {
        assert!(AffinePoint::IDENTITY.is_identity());
        assert!(ProjectivePoint::IDENTITY.is_identity());
        assert!(AffinePoint::IDENTITY.is_on_curve());
    }

    #[test]
    fn generator_is_on_curve() {
        assert!(generator().is_on_curve());
        // (-1)^3 + 5 = 4 = 2^2
        assert_eq!(generator().y, Limbs256::from_u64(2));
    }

    #[test]
    fn negate_involution() {
        let g = generator();
        assert_eq!(g.negate().negate(), g);
        assert!(g.negate().is_on_curve());
        assert_eq!(AffinePoint::IDENTITY.negate(), AffinePoint::IDENTITY);
    }

    #[test]
    fn affine_point_serde_roundtrip() {
        let g = generator();
        let json = serde_json::to_string(&g).unwrap();
        let back: AffinePoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }
}
