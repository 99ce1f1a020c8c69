//! Stealth address derivation
//!
//! A sender with transaction secret `r` and a recipient with view secret `a` share the point
//! `8raG`. Each output `i` gets the one-time key `H_s(8raG || i)G + B`, which only the
//! recipient can spend.

use crypto::{
    curve25519_dalek::traits::{Identity, IsIdentity},
    ecc::{Point, Scalar, BASEPOINT_TABLE},
    CNFastHash, Digest, PublicKey, ScalarExt, SecretKey,
};

use crate::{address::Address, Error, Result};

/// Wrapper around the result (secret key * public key)
pub struct Derivation(pub(crate) Point);

impl Derivation {
    /// Create a new derivation from the given secret and public keys
    ///
    /// Returns `None` if the derivation is the identity point
    pub fn from(scalar: &Scalar, public_key: &PublicKey) -> Option<Self> {
        let point = (scalar * public_key).mul_by_cofactor();
        if point.is_identity() {
            return None;
        }

        Some(Derivation(point))
    }

    /// Convert this derivation into a Scalar
    /// H_s(derivation || output_index)
    pub fn to_scalar(&self, output_index: u64) -> Scalar {
        let mut hasher = CNFastHash::new();

        hasher.input(self.0.compress().as_bytes());
        hasher.input(varint::serialize(output_index));

        Scalar::from_slice(&hasher.result())
    }

    /// One-time public key of an output
    /// H_s(derivation || output_index)G + B
    pub fn to_public_key(&self, output_index: u64, spend_public_key: &PublicKey) -> PublicKey {
        (&self.to_scalar(output_index) * &BASEPOINT_TABLE) + spend_public_key
    }

    /// One-time secret key of an output
    /// H_s(derivation || output_index) + b
    pub fn to_secret_key(&self, output_index: u64, spend_secret_key: &SecretKey) -> SecretKey {
        self.to_scalar(output_index) + spend_secret_key
    }
}

impl Drop for Derivation {
    fn drop(&mut self) {
        // Points don't implement Zeroize
        self.0 = Point::identity();
    }
}

/// Derives the one-time public key of output `output_index` paying to `address`
///
/// Returns the key along with the per-output scalar `H_s(rA || i)` used for encoding the
/// output amount
pub fn derive_output(
    address: &Address,
    tx_secret_key: &SecretKey,
    output_index: u64,
) -> Result<(PublicKey, SecretKey)> {
    let derivation =
        Derivation::from(tx_secret_key, &address.view_public_key).ok_or(Error::Derivation)?;

    Ok((
        derivation.to_public_key(output_index, &address.spend_public_key),
        derivation.to_scalar(output_index),
    ))
}
