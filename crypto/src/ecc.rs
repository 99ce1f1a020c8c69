use curve25519_dalek::traits::Identity;

use crate::{field::FieldElement, hash::Hash256Data, CNFastHash, Digest};

pub use curve25519_dalek::constants::ED25519_BASEPOINT_POINT as BASEPOINT;
pub use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE as BASEPOINT_TABLE;
pub use curve25519_dalek::edwards::CompressedEdwardsY as CompressedPoint;
pub use curve25519_dalek::edwards::EdwardsBasepointTable as PointTable;
pub use curve25519_dalek::edwards::EdwardsPoint as Point;
pub use curve25519_dalek::scalar::Scalar;

/// `A` of the Montgomery form `v^2 = u^3 + Au^2 + u` of Curve25519
const MONTGOMERY_A: u64 = 486_662;

/// Helper Extension Trait for Scalar
pub trait ScalarExt {
    /// Generates a Scalar from a [u8] slice, reducing it modulo the group order
    ///
    /// The constructor for Scalar requires a [u8; 32] (for obvious reasons)
    /// However, the code for converting between a slice and [u8; 32] tends to be repeated,
    /// hence, this common implementation. Slices shorter than 32 bytes are zero padded,
    /// longer ones are truncated.
    fn from_slice(data: &[u8]) -> Scalar {
        let mut scalar: [u8; 32] = [0; 32];
        let len = data.len().min(32);
        scalar[..len].copy_from_slice(&data[..len]);
        Scalar::from_bytes_mod_order(scalar)
    }
}

impl ScalarExt for Scalar {}

/// Helper Extension Trait for Point
pub trait PointExt {
    /// Decodes a compressed point from a [u8] slice
    ///
    /// Returns `None` if the slice is not 32 bytes long or is not a valid curve point
    fn from_slice(data: &[u8]) -> Option<Point> {
        if data.len() != 32 {
            return None;
        }
        CompressedPoint::from_slice(data).decompress()
    }
}

impl PointExt for Point {}

/// Converts a given hash to a `Scalar`
pub fn hash_to_scalar(hash: Hash256Data) -> Scalar {
    let mut buf: [u8; 32] = [0; 32];
    buf.copy_from_slice(&hash);
    Scalar::from_bytes_mod_order(buf)
}

/// H_s(data)
pub fn data_to_scalar(data: &[u8]) -> Scalar {
    hash_to_scalar(CNFastHash::digest(data))
}

/// Converts a given hash to a `Point` in the prime order subgroup
///
/// This is CryptoNote's `ge_fromfe_frombytes_vartime` followed by a multiplication by 8. The
/// hash is read as a field element `u` and sent through an Elligator style map: with
/// `w = 2u^2 + 1` and `x = w^2 - 2A^2u^2`, the branch depends on whether `w / x` is a square.
/// Only the `y` coordinate and the sign of `x` are computed here, dalek recovers the rest.
pub fn hash_to_point(hash: Hash256Data) -> Point {
    let mut bytes = [0; 32];
    bytes.copy_from_slice(&hash);

    let a = FieldElement::from_u64(MONTGOMERY_A);
    let u = FieldElement::from_bytes(&bytes);
    let u_squared = u.square();
    let v = &u_squared + &u_squared;
    let w = &v + &FieldElement::ONE;
    let x = &w.square() - &(&a.square() * &v);

    let root = FieldElement::div_pow_m1(&w, &x);
    let check = &root.square() * &x;
    let (z, x_sign) = if (&w - &check).is_zero() || (&w + &check).is_zero() {
        (-&(&a * &v), 0)
    } else {
        (-&a, 1)
    };

    let y = &(&z - &w) * &(&z + &w).invert();
    let mut encoded = y.to_bytes();
    encoded[31] |= x_sign << 7;

    // (x, y) always satisfies the curve equation
    CompressedPoint(encoded)
        .decompress()
        .map_or_else(Point::identity, |point| point.mul_by_cofactor())
}

/// H_p(P), the base point of the key image for `key`
pub fn hash_to_ec(key: &Point) -> Point {
    hash_to_point(CNFastHash::digest(key.compress().as_bytes()))
}
