//! Montgomery arithmetic over the Pallas base field with `R = 2^256`.
//!
//! The reduction is the textbook word-by-word form over a 512-bit
//! accumulator; multiplication is schoolbook 8×8 into 16 limbs followed by
//! reduction. Inversion is Fermat exponentiation to `p - 2` with base and
//! accumulator kept in Montgomery form throughout.

use crate::fp::{INV32, MODULUS, MODULUS_MINUS_2, R1, R2};
use crate::limb::{gte, mul_add_carry, sub_no_borrow};
use crate::Limbs256;

/// Montgomery-reduce a 512-bit accumulator: returns `t * R^{-1} mod p`,
/// always in `[0, p)`.
pub fn mont_reduce(t: &[u32; 16]) -> Limbs256 {
    let mut t = *t;
    for i in 0..8 {
        let m = t[i].wrapping_mul(INV32);
        let mut carry = 0u32;
        for j in 0..8 {
            let (lo, hi) = mul_add_carry(m, MODULUS.0[j], t[i + j], carry);
            t[i + j] = lo;
            carry = hi;
        }
        // Ripple the final carry upward until it falls off or goes zero.
        let mut k = i + 8;
        while carry != 0 && k < 16 {
            let (s, c) = t[k].overflowing_add(carry);
            t[k] = s;
            carry = c as u32;
            k += 1;
        }
    }
    let mut out = [0u32; 8];
    out.copy_from_slice(&t[8..]);
    let mut out = Limbs256(out);
    if gte(&out, &MODULUS) {
        out = sub_no_borrow(&out, &MODULUS);
    }
    out
}

/// `a * b * R^{-1} mod p`. For Montgomery-form inputs this is the
/// Montgomery form of the product.
pub fn mont_mul(a: &Limbs256, b: &Limbs256) -> Limbs256 {
    let mut t = [0u32; 16];
    for i in 0..8 {
        let mut carry = 0u32;
        for j in 0..8 {
            let (lo, hi) = mul_add_carry(a.0[i], b.0[j], t[i + j], carry);
            t[i + j] = lo;
            carry = hi;
        }
        t[i + 8] = carry;
    }
    mont_reduce(&t)
}

/// Convert into Montgomery form: `a * R mod p`.
pub fn to_mont(a: &Limbs256) -> Limbs256 {
    mont_mul(a, &R2)
}

/// Convert out of Montgomery form: `a * R^{-1} mod p`.
pub fn from_mont(a: &Limbs256) -> Limbs256 {
    mont_mul(a, &Limbs256::ONE)
}

/// Multiplicative inverse of a Montgomery-form element, by exponentiation
/// to `p - 2`. The bits are scanned LSB→MSB across limbs 0..8.
///
/// Zero has no inverse; the exponentiation maps it to zero and the caller
/// must not treat that as a unit.
pub fn mod_inv(a: &Limbs256) -> Limbs256 {
    let mut base = *a;
    let mut acc = R1; // to_mont(1)
    for limb in 0..8 {
        for bit in 0..32 {
            if (MODULUS_MINUS_2.0[limb] >> bit) & 1 == 1 {
                acc = mont_mul(&acc, &base);
            }
            base = mont_mul(&base, &base);
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limb::add_mod;
    use ff::{Field, PrimeField};
    use pasta_curves::Fp;
    use rand::{Rng, SeedableRng};

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(0x6d6f_6e74)
    }

    fn random_fe(rng: &mut impl Rng) -> Limbs256 {
        let mut l = [0u32; 8];
        for limb in &mut l {
            *limb = rng.gen();
        }
        let mut v = Limbs256(l);
        while gte(&v, &MODULUS) {
            v = sub_no_borrow(&v, &MODULUS);
        }
        v
    }

    fn limbs_to_fp(l: &Limbs256) -> Fp {
        let mut repr = <Fp as PrimeField>::Repr::default();
        repr.as_mut().copy_from_slice(&l.to_le_bytes());
        Fp::from_repr(repr).unwrap()
    }

    #[test]
    fn mont_of_one_is_r_mod_p() {
        assert_eq!(to_mont(&Limbs256::ONE), R1);
    }

    #[test]
    fn to_from_mont_roundtrip() {
        let mut rng = rng();
        for _ in 0..500 {
            let a = random_fe(&mut rng);
            assert_eq!(from_mont(&to_mont(&a)), a);
        }
    }

    #[test]
    fn mont_mul_matches_pasta() {
        let mut rng = rng();
        for _ in 0..500 {
            let a = random_fe(&mut rng);
            let b = random_fe(&mut rng);
            let ours = from_mont(&mont_mul(&to_mont(&a), &to_mont(&b)));
            let theirs = limbs_to_fp(&a) * limbs_to_fp(&b);
            assert_eq!(limbs_to_fp(&ours), theirs);
        }
    }

    #[test]
    fn add_mod_matches_pasta() {
        let mut rng = rng();
        for _ in 0..500 {
            let a = random_fe(&mut rng);
            let b = random_fe(&mut rng);
            let ours = add_mod(&a, &b, &MODULUS);
            assert_eq!(limbs_to_fp(&ours), limbs_to_fp(&a) + limbs_to_fp(&b));
        }
    }

    #[test]
    fn inverse_times_self_is_one() {
        let mut rng = rng();
        for _ in 0..50 {
            let mut a = random_fe(&mut rng);
            if a.is_zero() {
                a = Limbs256::ONE;
            }
            let am = to_mont(&a);
            let inv = mod_inv(&am);
            assert_eq!(mont_mul(&am, &inv), R1);
        }
    }

    #[test]
    fn inverse_of_zero_is_zero() {
        assert_eq!(mod_inv(&Limbs256::ZERO), Limbs256::ZERO);
    }

    #[test]
    fn inverse_matches_pasta() {
        let a = Limbs256::from_u64(0xdead_beef_cafe);
        let inv = from_mont(&mod_inv(&to_mont(&a)));
        let expected = limbs_to_fp(&a).invert().unwrap();
        assert_eq!(limbs_to_fp(&inv), expected);
    }

    #[test]
    fn reduce_of_shifted_value() {
        // mont_reduce(a << 256) == a mod p for small a: the upper half holds
        // a, the lower half is zero, and the reduction only folds p away.
        let mut t = [0u32; 16];
        t[8] = 7;
        assert_eq!(mont_reduce(&t), Limbs256::from_u64(7));
    }
}
