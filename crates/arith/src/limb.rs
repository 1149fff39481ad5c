//! Raw limb-array operations shared by the Montgomery kernel and the curve
//! layer. These mirror the WGSL helpers of the same names.

use crate::Limbs256;

/// `a >= b` as 256-bit unsigned integers. Scans from the most significant
/// limb down; equality counts as true.
pub fn gte(a: &Limbs256, b: &Limbs256) -> bool {
    for i in (0..8).rev() {
        if a.0[i] > b.0[i] {
            return true;
        }
        if a.0[i] < b.0[i] {
            return false;
        }
    }
    true
}

/// `a - b` assuming `a >= b`. With `a < b` the result wraps mod 2^256,
/// which the modular-add path relies on.
pub fn sub_no_borrow(a: &Limbs256, b: &Limbs256) -> Limbs256 {
    let mut out = [0u32; 8];
    let mut borrow = 0u32;
    for i in 0..8 {
        let (bl, bl_wrapped) = b.0[i].overflowing_add(borrow);
        if !bl_wrapped && a.0[i] >= bl {
            out[i] = a.0[i] - bl;
            borrow = 0;
        } else {
            // Wrap branch: (0xFFFFFFFF - b[i] - borrow + 1) + a[i], kept in
            // unsigned arithmetic throughout.
            out[i] = (0xFFFF_FFFF - bl).wrapping_add(1).wrapping_add(a.0[i]);
            borrow = 1;
        }
    }
    Limbs256(out)
}

/// `(a + b) mod p` for `a, b` in `[0, p)`.
pub fn add_mod(a: &Limbs256, b: &Limbs256, p: &Limbs256) -> Limbs256 {
    let mut out = [0u32; 8];
    let mut carry = 0u32;
    for i in 0..8 {
        let (s1, c1) = a.0[i].overflowing_add(b.0[i]);
        let (s2, c2) = s1.overflowing_add(carry);
        out[i] = s2;
        carry = (c1 as u32) + (c2 as u32);
    }
    let mut out = Limbs256(out);
    if carry != 0 || gte(&out, p) {
        out = sub_no_borrow(&out, p);
    }
    out
}

/// `(a - b) mod p` for `a, b` in `[0, p)`.
pub fn sub_mod(a: &Limbs256, b: &Limbs256, p: &Limbs256) -> Limbs256 {
    if gte(a, b) {
        sub_no_borrow(a, b)
    } else {
        sub_no_borrow(p, &sub_no_borrow(b, a))
    }
}

/// `a * b + acc + carry` as a 64-bit quantity, returned as (low, high).
///
/// Synthesized from 16-bit halves with explicit wrap tracking, exactly as
/// the shader does it (WGSL has no 64-bit integers). Partial high-side sums
/// never exceed the true high word, so the unchecked adds cannot overflow.
pub fn mul_add_carry(a: u32, b: u32, acc: u32, carry: u32) -> (u32, u32) {
    let a_lo = a & 0xFFFF;
    let a_hi = a >> 16;
    let b_lo = b & 0xFFFF;
    let b_hi = b >> 16;

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mut high = hh + (lh >> 16) + (hl >> 16);

    let (s1, c1) = ll.overflowing_add(lh << 16);
    let (s2, c2) = s1.overflowing_add(hl << 16);
    let (s3, c3) = s2.overflowing_add(acc);
    let (low, c4) = s3.overflowing_add(carry);
    high += c1 as u32 + c2 as u32 + c3 as u32 + c4 as u32;

    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fp::MODULUS;
    use rand::{Rng, SeedableRng};

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(0x6c69_6d62)
    }

    fn random_limbs(rng: &mut impl Rng) -> Limbs256 {
        let mut l = [0u32; 8];
        for limb in &mut l {
            *limb = rng.gen();
        }
        Limbs256(l)
    }

    #[test]
    fn gte_orders_correctly() {
        let a = Limbs256([0, 0, 0, 0, 0, 0, 0, 1]);
        let b = Limbs256([0xFFFF_FFFF, 0xFFFF_FFFF, 0, 0, 0, 0, 0, 0]);
        assert!(gte(&a, &b));
        assert!(!gte(&b, &a));
        assert!(gte(&a, &a));
    }

    #[test]
    fn sub_no_borrow_simple_and_ripple() {
        let a = Limbs256([0, 1, 0, 0, 0, 0, 0, 0]); // 2^32
        let b = Limbs256::ONE;
        assert_eq!(sub_no_borrow(&a, &b), Limbs256([0xFFFF_FFFF, 0, 0, 0, 0, 0, 0, 0]));
        let zero = Limbs256::ZERO;
        assert_eq!(sub_no_borrow(&a, &zero), a);
    }

    #[test]
    fn add_mod_boundary() {
        // (p - 1) + 1 == 0 mod p
        let p_minus_1 = sub_no_borrow(&MODULUS, &Limbs256::ONE);
        assert_eq!(add_mod(&p_minus_1, &Limbs256::ONE, &MODULUS), Limbs256::ZERO);
    }

    #[test]
    fn sub_mod_boundary() {
        // 0 - 1 == p - 1 mod p
        let p_minus_1 = sub_no_borrow(&MODULUS, &Limbs256::ONE);
        assert_eq!(sub_mod(&Limbs256::ZERO, &Limbs256::ONE, &MODULUS), p_minus_1);
    }

    #[test]
    fn mul_add_carry_max_operands() {
        assert_eq!(
            mul_add_carry(0xFFFF_FFFF, 0xFFFF_FFFF, 0, 0),
            (0x0000_0001, 0xFFFF_FFFE)
        );
        // Absolute maximum of the 64-bit quantity: full operands everywhere.
        assert_eq!(
            mul_add_carry(0xFFFF_FFFF, 0xFFFF_FFFF, 0xFFFF_FFFF, 0xFFFF_FFFF),
            (0xFFFF_FFFF, 0xFFFF_FFFF)
        );
    }

    #[test]
    fn mul_add_carry_matches_wide_multiply() {
        let mut rng = rng();
        for _ in 0..10_000 {
            let a: u32 = rng.gen();
            let b: u32 = rng.gen();
            let acc: u32 = rng.gen();
            let carry: u32 = rng.gen();
            let wide = a as u64 * b as u64 + acc as u64 + carry as u64;
            assert_eq!(mul_add_carry(a, b, acc, carry), (wide as u32, (wide >> 32) as u32));
        }
    }

    #[test]
    fn add_sub_roundtrip_mod_p() {
        let mut rng = rng();
        for _ in 0..1_000 {
            // Reduce by conditional subtraction; random 256-bit values are at
            // most ~4p so a few rounds suffice.
            let mut a = random_limbs(&mut rng);
            let mut b = random_limbs(&mut rng);
            while gte(&a, &MODULUS) {
                a = sub_no_borrow(&a, &MODULUS);
            }
            while gte(&b, &MODULUS) {
                b = sub_no_borrow(&b, &MODULUS);
            }
            let s = add_mod(&a, &b, &MODULUS);
            assert_eq!(sub_mod(&s, &b, &MODULUS), a);
        }
    }
}
