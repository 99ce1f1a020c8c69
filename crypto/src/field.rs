//! Arithmetic in GF(2^255 - 19)
//!
//! curve25519-dalek keeps its field type private, but the CryptoNote hash-to-point map works on
//! raw field elements. Elements are five 51-bit limbs and every operation leaves the limbs
//! weakly reduced (below 2^52).

use std::ops::{Add, Mul, Neg, Sub};

const LOW_51_BIT_MASK: u64 = (1 << 51) - 1;

/// `(p - 5) / 8 = 2^252 - 3`, little endian
const P_MINUS_5_OVER_8: [u8; 32] = [
    0xfd, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x0f,
];

/// `p - 2 = 2^255 - 21`, little endian
const P_MINUS_2: [u8; 32] = [
    0xeb, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f,
];

#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldElement([u64; 5]);

impl FieldElement {
    pub(crate) const ZERO: FieldElement = FieldElement([0; 5]);
    pub(crate) const ONE: FieldElement = FieldElement([1, 0, 0, 0, 0]);

    pub(crate) fn from_u64(value: u64) -> FieldElement {
        FieldElement([value & LOW_51_BIT_MASK, value >> 51, 0, 0, 0])
    }

    /// Loads all 256 bits of `bytes` as a little endian integer, reducing it modulo `p`
    ///
    /// Bit 255 is kept (worth `2^255 = 19`), unlike point decoding which masks it off.
    pub(crate) fn from_bytes(bytes: &[u8; 32]) -> FieldElement {
        let mut limbs = [0u64; 5];
        let mut accumulator: u128 = 0;
        let mut bits = 0;
        let mut limb = 0;

        for byte in bytes.iter() {
            accumulator |= u128::from(*byte) << bits;
            bits += 8;
            if bits >= 51 && limb < 5 {
                limbs[limb] = (accumulator as u64) & LOW_51_BIT_MASK;
                accumulator >>= 51;
                bits -= 51;
                limb += 1;
            }
        }
        // Only bit 255 is left over
        limbs[0] += 19 * (accumulator as u64);

        FieldElement::reduce(limbs)
    }

    /// Canonical little endian encoding
    pub(crate) fn to_bytes(&self) -> [u8; 32] {
        let mut limbs = FieldElement::reduce(self.0).0;

        // q is 1 when the value is at least p
        let mut q = (limbs[0] + 19) >> 51;
        for limb in &limbs[1..] {
            q = (limb + q) >> 51;
        }

        limbs[0] += 19 * q;
        for i in 0..4 {
            limbs[i + 1] += limbs[i] >> 51;
            limbs[i] &= LOW_51_BIT_MASK;
        }
        // Drops 2^255
        limbs[4] &= LOW_51_BIT_MASK;

        let mut bytes = [0u8; 32];
        let mut accumulator: u128 = 0;
        let mut bits = 0;
        let mut index = 0;
        for limb in limbs.iter() {
            accumulator |= u128::from(*limb) << bits;
            bits += 51;
            while bits >= 8 {
                bytes[index] = accumulator as u8;
                accumulator >>= 8;
                bits -= 8;
                index += 1;
            }
        }
        bytes[index] = accumulator as u8;

        bytes
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.to_bytes() == [0; 32]
    }

    pub(crate) fn square(&self) -> FieldElement {
        self * self
    }

    /// Raises to a little endian exponent, square and multiply from the top bit
    pub(crate) fn pow(&self, exponent: &[u8; 32]) -> FieldElement {
        let mut result = FieldElement::ONE;
        for byte in exponent.iter().rev() {
            for bit in (0..8).rev() {
                result = result.square();
                if (byte >> bit) & 1 == 1 {
                    result = &result * self;
                }
            }
        }
        result
    }

    /// `self^(p - 2)`, zero maps to zero
    pub(crate) fn invert(&self) -> FieldElement {
        self.pow(&P_MINUS_2)
    }

    /// `(u / v)^((p + 3) / 8)` computed as `u v^3 (u v^7)^((p - 5) / 8)`
    pub(crate) fn div_pow_m1(u: &FieldElement, v: &FieldElement) -> FieldElement {
        let v3 = &v.square() * v;
        let v7 = &v3.square() * v;
        &(u * &v3) * &(u * &v7).pow(&P_MINUS_5_OVER_8)
    }

    /// Carries every limb down to 51 bits, folding the top carry back in as `19 * carry`
    fn reduce(mut limbs: [u64; 5]) -> FieldElement {
        let c0 = limbs[0] >> 51;
        let c1 = limbs[1] >> 51;
        let c2 = limbs[2] >> 51;
        let c3 = limbs[3] >> 51;
        let c4 = limbs[4] >> 51;

        limbs[0] &= LOW_51_BIT_MASK;
        limbs[1] &= LOW_51_BIT_MASK;
        limbs[2] &= LOW_51_BIT_MASK;
        limbs[3] &= LOW_51_BIT_MASK;
        limbs[4] &= LOW_51_BIT_MASK;

        limbs[0] += c4 * 19;
        limbs[1] += c0;
        limbs[2] += c1;
        limbs[3] += c2;
        limbs[4] += c3;

        FieldElement(limbs)
    }
}

impl<'a, 'b> Add<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: &'b FieldElement) -> FieldElement {
        let mut limbs = self.0;
        for (limb, other) in limbs.iter_mut().zip(rhs.0.iter()) {
            *limb += other;
        }
        FieldElement::reduce(limbs)
    }
}

impl<'a, 'b> Sub<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: &'b FieldElement) -> FieldElement {
        // Adds 16p so the limbs never underflow
        FieldElement::reduce([
            (self.0[0] + 36_028_797_018_963_664) - rhs.0[0],
            (self.0[1] + 36_028_797_018_963_952) - rhs.0[1],
            (self.0[2] + 36_028_797_018_963_952) - rhs.0[2],
            (self.0[3] + 36_028_797_018_963_952) - rhs.0[3],
            (self.0[4] + 36_028_797_018_963_952) - rhs.0[4],
        ])
    }
}

impl<'a> Neg for &'a FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        &FieldElement::ZERO - self
    }
}

impl<'a, 'b> Mul<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: &'b FieldElement) -> FieldElement {
        #[inline(always)]
        fn m(x: u64, y: u64) -> u128 {
            u128::from(x) * u128::from(y)
        }

        let a = &self.0;
        let b = &rhs.0;

        let b1_19 = b[1] * 19;
        let b2_19 = b[2] * 19;
        let b3_19 = b[3] * 19;
        let b4_19 = b[4] * 19;

        let c0 = m(a[0], b[0]) + m(a[4], b1_19) + m(a[3], b2_19) + m(a[2], b3_19) + m(a[1], b4_19);
        let mut c1 =
            m(a[1], b[0]) + m(a[0], b[1]) + m(a[4], b2_19) + m(a[3], b3_19) + m(a[2], b4_19);
        let mut c2 =
            m(a[2], b[0]) + m(a[1], b[1]) + m(a[0], b[2]) + m(a[4], b3_19) + m(a[3], b4_19);
        let mut c3 =
            m(a[3], b[0]) + m(a[2], b[1]) + m(a[1], b[2]) + m(a[0], b[3]) + m(a[4], b4_19);
        let mut c4 = m(a[4], b[0]) + m(a[3], b[1]) + m(a[2], b[2]) + m(a[1], b[3]) + m(a[0], b[4]);

        let mut out = [0u64; 5];
        c1 += c0 >> 51;
        out[0] = (c0 as u64) & LOW_51_BIT_MASK;
        c2 += c1 >> 51;
        out[1] = (c1 as u64) & LOW_51_BIT_MASK;
        c3 += c2 >> 51;
        out[2] = (c2 as u64) & LOW_51_BIT_MASK;
        c4 += c3 >> 51;
        out[3] = (c3 as u64) & LOW_51_BIT_MASK;
        let carry = (c4 >> 51) as u64;
        out[4] = (c4 as u64) & LOW_51_BIT_MASK;

        out[0] += carry * 19;
        out[1] += out[0] >> 51;
        out[0] &= LOW_51_BIT_MASK;

        FieldElement(out)
    }
}
