use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crypto::{
    curve25519_dalek::traits::MultiscalarMul,
    ecc::{Point, BASEPOINT},
    SecretKey,
};

use crate::MASK_BASEPOINT;

/// Pedersen Commitments
///
/// `C = aG + bH`
#[derive(Clone, Serialize, Deserialize)]
pub struct Commitment {
    /// The amount being transacted `b`
    pub amount: SecretKey,
    /// The blinding factor `a`
    pub mask: SecretKey,
}

impl Commitment {
    pub fn new(value: u64, mask: SecretKey) -> Commitment {
        Commitment {
            amount: SecretKey::from(value),
            mask,
        }
    }

    /// Generate a commitment to the given value using a random mask
    pub fn commit_to_value<R: RngCore + CryptoRng>(value: u64, rng: &mut R) -> Commitment {
        Commitment::new(value, SecretKey::random(rng))
    }

    /// Returns the result of the commitment
    ///
    /// Computes `C` where `C = aG + bH`
    pub fn to_public(&self) -> Point {
        Point::multiscalar_mul(&[self.mask, self.amount], &[BASEPOINT, *MASK_BASEPOINT])
    }
}

impl Drop for Commitment {
    fn drop(&mut self) {
        self.mask.zeroize();
        self.amount.zeroize();
    }
}
