//! Baked constants for the Pallas base field
//! `p = 0x40000000000000000000000000000000224698fc094cf91b992d30ed00000001`.
//!
//! All limb arrays are little-endian. `R2` agrees with the constant
//! published by `pasta_curves` for `Fp`; the test module asserts the
//! agreement so a limb-ordering mistake cannot survive unnoticed.

use crate::Limbs256;

/// The Pallas base-field prime `p`.
pub const MODULUS: Limbs256 = Limbs256([
    0x0000_0001,
    0x992d_30ed,
    0x094c_f91b,
    0x2246_98fc,
    0x0000_0000,
    0x0000_0000,
    0x0000_0000,
    0x4000_0000,
]);

/// `p - 2`, the Fermat-inversion exponent.
pub const MODULUS_MINUS_2: Limbs256 = Limbs256([
    0xffff_ffff,
    0x992d_30ec,
    0x094c_f91b,
    0x2246_98fc,
    0x0000_0000,
    0x0000_0000,
    0x0000_0000,
    0x4000_0000,
]);

/// `R mod p` where `R = 2^256`; this is `to_mont(1)`.
pub const R1: Limbs256 = Limbs256([
    0xffff_fffd,
    0x3478_6d38,
    0xe419_14ad,
    0x992c_350b,
    0xffff_ffff,
    0xffff_ffff,
    0xffff_ffff,
    0x3fff_ffff,
]);

/// `R^2 mod p`, the to-Montgomery multiplier.
pub const R2: Limbs256 = Limbs256([
    0x0000_000f,
    0x8c78_ecb3,
    0x8b0d_e0e7,
    0xd7d3_0dbd,
    0xc3c9_5d18,
    0x7797_a99b,
    0x7b9c_b714,
    0x096d_41af,
]);

/// `-p^{-1} mod 2^32`. For Pallas `p ≡ 1 (mod 2^32)`, so this is all ones.
pub const INV32: u32 = 0xffff_ffff;

/// The curve coefficient `b = 5` of `y^2 = x^3 + 5` (normal form).
pub const COEFF_B: Limbs256 = Limbs256([5, 0, 0, 0, 0, 0, 0, 0]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limb::{gte, sub_no_borrow};
    use ff::{Field, PrimeField};
    use pasta_curves::Fp;

    fn limbs_to_fp(l: &Limbs256) -> Fp {
        let mut repr = <Fp as PrimeField>::Repr::default();
        repr.as_mut().copy_from_slice(&l.to_le_bytes());
        Fp::from_repr(repr).unwrap()
    }

    #[test]
    fn modulus_matches_pasta() {
        // p - 1 is representable; adding one must wrap to zero in Fp.
        let p_minus_1 = sub_no_borrow(&MODULUS, &Limbs256::ONE);
        assert_eq!(limbs_to_fp(&p_minus_1) + Fp::ONE, Fp::ZERO);
    }

    #[test]
    fn r1_is_two_pow_256_mod_p() {
        // 2^256 mod p computed through pasta: ((2^128)^2) in Fp.
        let two_128 = Fp::from_u128(u128::MAX) + Fp::ONE;
        assert_eq!(limbs_to_fp(&R1), two_128 * two_128);
    }

    #[test]
    fn r2_is_r1_squared() {
        assert_eq!(limbs_to_fp(&R2), limbs_to_fp(&R1) * limbs_to_fp(&R1));
    }

    #[test]
    fn inv32_is_neg_inverse_of_p() {
        assert_eq!(MODULUS.0[0].wrapping_mul(INV32), 0xffff_ffff);
        // p * (-p^{-1}) ≡ -1 (mod 2^32)
        assert_eq!(INV32.wrapping_mul(MODULUS.0[0]).wrapping_add(1), 0);
    }

    #[test]
    fn exponent_is_p_minus_2() {
        let mut two = Limbs256::ZERO;
        two.0[0] = 2;
        assert_eq!(sub_no_borrow(&MODULUS, &two), MODULUS_MINUS_2);
        assert!(gte(&MODULUS, &MODULUS_MINUS_2));
    }
}
