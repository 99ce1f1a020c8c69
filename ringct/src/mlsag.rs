//! # Multilayered Linked Spontaneous Ad-Hoc Group Signatures
//! This implementation aims to follow the RingCT whitepaper with certain changes to variables
//! for clarity

// The range loops we use here aren't really unnecessary as we need the index to multiple Vecs
#![allow(clippy::needless_range_loop)]

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crypto::{
    ecc::{self, CompressedPoint, Point, Scalar, BASEPOINT_TABLE},
    CNFastHash, Digest, KeyImage, SecretKey,
};

use crate::Matrix;

/// Error type for MLSAG operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when the signature parameters are inconsistent
    #[error("Input parameters are inconsistent")]
    InconsistentParameters,

    /// Returned when the signature is inconsistent
    #[error("Signature is inconsistent")]
    InconsistentSignature,

    /// Returned when the signature fails to verify correctly
    #[error("Signature is invalid")]
    InvalidSignature,
}

/// MLSAG signature
#[allow(missing_docs)]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signature {
    pub s: Matrix<Scalar>,
    pub c: Scalar,

    /// Key Images
    pub key_images: Vec<KeyImage>,
}

impl Signature {
    /// Canonical byte representation of the signature, excluding the key images
    /// (those are carried by the transaction inputs)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(32 * (self.s.rows() * self.s.cols() + 1));
        for row in 0..self.s.rows() {
            for scalar in self.s.row(row) {
                bytes.extend_from_slice(scalar.as_bytes());
            }
        }
        bytes.extend_from_slice(self.c.as_bytes());
        bytes
    }
}

/// SIGN algorithm as defined in Monero
///
/// The version implemented in Monero differs from the version defined in
/// the RingCT whitepaper in that it allows specifying which keys need a key image.
/// The first `double_spendable_keys` columns are linked through key images, the rest are not
pub fn sign<R: RngCore + CryptoRng>(
    message: &[u8],
    ring: &Matrix<Point>,
    index: usize,
    signer_keys: &[SecretKey],
    double_spendable_keys: usize,
    rng: &mut R,
) -> Result<Signature, Error> {
    // Assertions to ensure input sanity
    // NOTE: KeyMatrix rows contain key vectors, whose columns contain keys
    let rows = ring.rows();
    if rows < 2 {
        return Err(Error::InconsistentParameters);
    }
    if index >= rows {
        return Err(Error::InconsistentParameters);
    }

    let cols = ring.cols();
    if signer_keys.len() != cols || double_spendable_keys > cols {
        return Err(Error::InconsistentParameters);
    }

    // Most of MLSAG hashes the compressed keys
    let compressed = Matrix::from_fn(rows, cols, |row, col| ring[(row, col)].compress())
        .ok_or(Error::InconsistentParameters)?;
    let key_bases = Matrix::from_fn(rows, double_spendable_keys, |row, col| {
        ecc::hash_to_ec(&ring[(row, col)])
    })
    .ok_or(Error::InconsistentParameters)?;

    // Generate key images
    let key_images: Vec<KeyImage> = signer_keys
        .iter()
        .take(double_spendable_keys)
        .enumerate()
        .map(|(i_key, x)| x * key_bases[(index, i_key)])
        .collect();

    // Generate random scalar vector and matrix for signature
    let alpha: Vec<Scalar> = (0..cols).map(|_| Scalar::random(rng)).collect();
    let mut signature = Matrix::from_fn(rows, cols, |_, _| Scalar::random(rng))
        .ok_or(Error::InconsistentParameters)?;

    let mut hasher = CNFastHash::new();

    hasher.input(message);
    for i_key in 0..double_spendable_keys {
        hasher.input(compressed[(index, i_key)].as_bytes());
        hasher.input((&alpha[i_key] * &BASEPOINT_TABLE).compress().as_bytes());
        hasher.input(
            (alpha[i_key] * key_bases[(index, i_key)])
                .compress()
                .as_bytes(),
        );
    }
    for i_key in double_spendable_keys..cols {
        hasher.input(compressed[(index, i_key)].as_bytes());
        hasher.input((&alpha[i_key] * &BASEPOINT_TABLE).compress().as_bytes());
    }

    let mut vec_c: Vec<Scalar> = (0..rows).map(|_| Scalar::one()).collect();
    vec_c[(index + 1) % rows] = ecc::hash_to_scalar(hasher.result_reset());

    // Progress the calculation
    for i_key_vector in 1..rows {
        let i_key_vector = (index + i_key_vector) % rows;

        hasher.input(message);
        for i_key in 0..double_spendable_keys {
            hasher.input(compressed[(i_key_vector, i_key)].as_bytes());
            // L_j = s_j * G + c_j * P_j
            hasher.input(
                ((&signature[(i_key_vector, i_key)] * &BASEPOINT_TABLE)
                    + (vec_c[i_key_vector] * ring[(i_key_vector, i_key)]))
                    .compress()
                    .as_bytes(),
            );

            // R_j = s_j * H(P_j) + c_j * I
            hasher.input(
                ((signature[(i_key_vector, i_key)] * key_bases[(i_key_vector, i_key)])
                    + (vec_c[i_key_vector] * key_images[i_key]))
                    .compress()
                    .as_bytes(),
            )
        }

        for i_key in double_spendable_keys..cols {
            hasher.input(compressed[(i_key_vector, i_key)].as_bytes());
            // L_j = s_j * G + c_j * P_j
            hasher.input(
                ((&signature[(i_key_vector, i_key)] * &BASEPOINT_TABLE)
                    + (vec_c[i_key_vector] * ring[(i_key_vector, i_key)]))
                    .compress()
                    .as_bytes(),
            );
        }

        // c
        vec_c[(i_key_vector + 1) % rows] = ecc::hash_to_scalar(hasher.result_reset());
    }

    // Tweak signature for successful validation
    for (i_key, a) in alpha.iter().enumerate() {
        signature[(index, i_key)] = a - (vec_c[index] * signer_keys[i_key]);
    }

    Ok(Signature {
        s: signature,
        c: vec_c[0],
        key_images,
    })
}

/// VERIFY algorithm as defined in the RingCT paper
pub fn verify(
    message: &[u8],
    ring: &Matrix<Point>,
    signature: &Signature,
    double_spendable_keys: usize,
) -> Result<(), Error> {
    // Assertions for input sanity
    let rows = ring.rows();
    if rows < 2 {
        return Err(Error::InconsistentSignature);
    }

    let cols = ring.cols();
    if cols < 1 {
        return Err(Error::InconsistentSignature);
    }
    if double_spendable_keys > cols {
        return Err(Error::InconsistentSignature);
    }
    if signature.s.rows() != rows || signature.s.cols() != cols {
        return Err(Error::InconsistentSignature);
    }
    if signature.key_images.len() != double_spendable_keys {
        return Err(Error::InconsistentSignature);
    }

    let Signature {
        key_images,
        c: c_0,
        s: signature,
    } = signature;

    // Start the chain of computations
    let mut hasher = CNFastHash::new();

    let mut last_c = *c_0;
    for i_key_vector in 0..rows {
        hasher.input(message);

        // Start with the double spendable keys
        for i_key in 0..double_spendable_keys {
            let key: CompressedPoint = ring[(i_key_vector, i_key)].compress();
            // L_j = s_j * G + c_j * P_j
            let l = (&signature[(i_key_vector, i_key)] * &BASEPOINT_TABLE)
                + (last_c * ring[(i_key_vector, i_key)]);
            // R_j = s_j * H(P_j) + c_j * I
            let r = (signature[(i_key_vector, i_key)] * ecc::hash_to_ec(&ring[(i_key_vector, i_key)]))
                + (last_c * key_images[i_key]);

            // pubkey || L || R
            hasher.input(key.as_bytes());
            hasher.input(l.compress().as_bytes());
            hasher.input(r.compress().as_bytes());
        }

        // Continue with the non double spendable keys
        for i_key in double_spendable_keys..cols {
            // L_j = s_j * G + c_j * P_j
            let l = (&signature[(i_key_vector, i_key)] * &BASEPOINT_TABLE)
                + (last_c * ring[(i_key_vector, i_key)]);

            // pubkey || L
            hasher.input(ring[(i_key_vector, i_key)].compress().as_bytes());
            hasher.input(l.compress().as_bytes());
        }
        last_c = ecc::hash_to_scalar(hasher.result_reset());
    }

    if last_c != *c_0 {
        return Err(Error::InvalidSignature);
    }
    Ok(())
}
