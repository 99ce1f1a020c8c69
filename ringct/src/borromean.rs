//! # Borromean range proofs
//! Proves that a commitment hides a value in `[0, 2^64)` by splitting it into one
//! commitment per bit and ring signing each bit commitment against `{C_i, C_i - 2^i H}`

use lazy_static::lazy_static;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crypto::{
    curve25519_dalek::traits::Identity,
    ecc::{self, Point, Scalar, BASEPOINT_TABLE},
    CNFastHash, Digest,
};

use crate::MASK_BASEPOINT;

/// Number of bits `N` of the value
///
/// The committed value is proved to be within `[0, 2^N)`
pub const N_BITS: usize = 64;

lazy_static! {
    /// `2^i * H` for every bit position
    static ref H_POWERS: Vec<Point> = (0..N_BITS)
        .scan(*MASK_BASEPOINT, |power, _| {
            let current = *power;
            *power = current + current;
            Some(current)
        })
        .collect();
}

/// Error type for range proof verification
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when the proof does not have one entry per bit
    #[error("Range proof is inconsistent")]
    InconsistentProof,

    /// Returned when the bit commitments do not add up to the output commitment
    #[error("Bit commitments do not sum to the commitment")]
    CommitmentMismatch,

    /// Returned when the Borromean signature does not verify
    #[error("Range proof signature is invalid")]
    InvalidSignature,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BorromeanSignature {
    pub s0: Vec<Scalar>,
    pub s1: Vec<Scalar>,
    pub ee: Scalar,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RangeProof {
    pub signature: BorromeanSignature,
    /// `C_i`, one commitment per bit of the amount
    pub bit_commitments: Vec<Point>,
}

impl RangeProof {
    /// Canonical byte representation, used when hashing the proof
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(32 * (3 * N_BITS + 1));
        for scalar in self.signature.s0.iter().chain(self.signature.s1.iter()) {
            bytes.extend_from_slice(scalar.as_bytes());
        }
        bytes.extend_from_slice(self.signature.ee.as_bytes());
        for commitment in &self.bit_commitments {
            bytes.extend_from_slice(commitment.compress().as_bytes());
        }
        bytes
    }
}

fn hash_point(point: &Point) -> Scalar {
    ecc::data_to_scalar(point.compress().as_bytes())
}

fn hash_points(points: &[Point]) -> Scalar {
    let mut hasher = CNFastHash::new();
    for point in points {
        hasher.input(point.compress().as_bytes());
    }
    ecc::hash_to_scalar(hasher.result())
}

/// Signs each pair `(p1[i], p2[i])` knowing the discrete log of `p2[i]` if `indices[i]`
/// is set, and of `p1[i]` otherwise
fn sign<R: RngCore + CryptoRng>(
    secrets: &[Scalar],
    p1: &[Point],
    p2: &[Point],
    indices: &[bool],
    rng: &mut R,
) -> BorromeanSignature {
    let mut alpha = vec![Scalar::zero(); N_BITS];
    let mut s0 = vec![Scalar::zero(); N_BITS];
    let mut s1 = vec![Scalar::zero(); N_BITS];
    let mut l1 = vec![Point::identity(); N_BITS];

    for ii in 0..N_BITS {
        alpha[ii] = Scalar::random(rng);
        let l = &alpha[ii] * &BASEPOINT_TABLE;
        if indices[ii] {
            l1[ii] = l;
        } else {
            s1[ii] = Scalar::random(rng);
            l1[ii] = (&s1[ii] * &BASEPOINT_TABLE) + hash_point(&l) * p2[ii];
        }
    }

    let ee = hash_points(&l1);

    for jj in 0..N_BITS {
        if indices[jj] {
            s0[jj] = Scalar::random(rng);
            let ll = (&s0[jj] * &BASEPOINT_TABLE) + ee * p1[jj];
            s1[jj] = alpha[jj] - secrets[jj] * hash_point(&ll);
        } else {
            s0[jj] = alpha[jj] - secrets[jj] * ee;
        }
    }

    BorromeanSignature { s0, s1, ee }
}

/// Proves that `amount` is in range
///
/// Returns the commitment `C = aG + amount*H`, its mask `a` and the proof
pub fn prove<R: RngCore + CryptoRng>(amount: u64, rng: &mut R) -> (Point, Scalar, RangeProof) {
    let mut masks = Vec::with_capacity(N_BITS);
    let mut bit_commitments = Vec::with_capacity(N_BITS);
    let mut shifted_commitments = Vec::with_capacity(N_BITS);
    let mut indices = Vec::with_capacity(N_BITS);

    for (i, h_power) in H_POWERS.iter().enumerate() {
        let bit = (amount >> i) & 1 == 1;
        let mask = Scalar::random(rng);

        let mut commitment = &mask * &BASEPOINT_TABLE;
        if bit {
            commitment += h_power;
        }

        masks.push(mask);
        shifted_commitments.push(commitment - h_power);
        bit_commitments.push(commitment);
        indices.push(bit);
    }

    let signature = sign(&masks, &bit_commitments, &shifted_commitments, &indices, rng);

    let commitment = bit_commitments.iter().sum();
    let mask = masks.iter().sum();

    (
        commitment,
        mask,
        RangeProof {
            signature,
            bit_commitments,
        },
    )
}

/// Verifies that `proof` shows `commitment` hides a value in range
pub fn verify(commitment: &Point, proof: &RangeProof) -> Result<(), Error> {
    let RangeProof {
        signature,
        bit_commitments,
    } = proof;

    if bit_commitments.len() != N_BITS
        || signature.s0.len() != N_BITS
        || signature.s1.len() != N_BITS
    {
        return Err(Error::InconsistentProof);
    }

    if bit_commitments.iter().sum::<Point>() != *commitment {
        return Err(Error::CommitmentMismatch);
    }

    let l1 = bit_commitments
        .iter()
        .zip(H_POWERS.iter())
        .enumerate()
        .map(|(i, (c, h_power))| {
            let ll = (&signature.s0[i] * &BASEPOINT_TABLE) + signature.ee * c;
            (&signature.s1[i] * &BASEPOINT_TABLE) + hash_point(&ll) * (c - h_power)
        })
        .collect::<Vec<_>>();

    if hash_points(&l1) != signature.ee {
        return Err(Error::InvalidSignature);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Commitment;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn it_proves_amounts_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for &amount in &[0, 1, 900_000, u64::max_value()] {
            let (commitment, mask, proof) = prove(amount, &mut rng);

            assert_eq!(commitment, Commitment::new(amount, mask).to_public());
            verify(&commitment, &proof).unwrap();
        }
    }

    #[test]
    fn it_rejects_a_proof_for_another_commitment() {
        let mut rng = StdRng::seed_from_u64(12);
        let (_, _, proof) = prove(5, &mut rng);
        let (other, _, _) = prove(5, &mut rng);

        match verify(&other, &proof) {
            Err(Error::CommitmentMismatch) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn it_rejects_tampered_signatures() {
        let mut rng = StdRng::seed_from_u64(13);
        let (commitment, _, mut proof) = prove(42, &mut rng);
        proof.signature.s1[7] += Scalar::one();

        match verify(&commitment, &proof) {
            Err(Error::InvalidSignature) => {}
            _ => panic!("Wrong error type"),
        }
    }
}
