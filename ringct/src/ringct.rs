use log::debug;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use ensure_macro::ensure;

use crypto::{
    ecc::{Point, Scalar},
    CNFastHash, Digest, Hash256, Hash256Data, KeyImage, PublicKey, SecretKey,
};

use crate::{
    borromean::{self, RangeProof},
    mlsag::{self, Signature as MLSAGSignature},
    Commitment, ECDHTuple, Matrix, MASK_BASEPOINT_TABLE,
};

/// Error type for RingCT signing and verification
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when there are no inputs to sign
    #[error("No inputs were given")]
    NoInputs,

    /// Returned when there are no outputs to sign
    #[error("No outputs were given")]
    NoOutputs,

    /// Returned when a ring is empty, ragged, or does not contain its real index
    #[error("Ring is inconsistent with the given index")]
    InconsistentRing,

    /// Returned when the inputs cannot share a single ring
    #[error("All inputs of a full signature need the same ring size and real index")]
    MixinMismatch,

    /// Returned when summing amounts overflows
    #[error("Amount overflow")]
    AmountOverflow,

    /// Returned when inputs do not equal outputs plus fee
    #[error("Inputs do not balance outputs and fee")]
    Unbalanced,

    /// Returned when a range proof fails to verify
    #[error("Range proof is invalid: {0}")]
    InvalidRangeProof(#[from] borromean::Error),

    /// Returned when the pseudo output commitments do not sum to the outputs
    #[error("Sum of inputs does not equal sum of outputs")]
    InvalidCommitmentSum,

    /// Returned for signature types that cannot be built or checked
    #[error("Unsupported signature type")]
    UnsupportedType,

    /// Returned when there is an error in the MLSAG layer
    #[error("MLSAG error: {0}")]
    MLSAG(#[from] mlsag::Error),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RingCTType {
    Null = 0,
    Full = 1,
    Simple = 2,
}

/// One ring member: an output's one-time key and its amount commitment
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestinationCommitmentPair {
    pub destination: PublicKey,
    pub commitment: PublicKey,
}

/// A real output being spent, along with the ring it hides in
pub struct RingCTInput {
    /// `x`, the one-time secret key of the real output
    pub destination_secret_key: SecretKey,
    /// Mask of the real output's commitment
    pub commitment_secret_key: SecretKey,
    pub amount: u64,
    /// Position of the real output in `ring_row`
    pub ring_index: usize,
    pub ring_row: Vec<DestinationCommitmentPair>,
}

impl Drop for RingCTInput {
    fn drop(&mut self) {
        self.destination_secret_key.zeroize();
        self.commitment_secret_key.zeroize();
    }
}

/// An output to commit to
pub struct RingCTOutput {
    pub destination_public_key: PublicKey,
    pub amount: u64,
    /// Shared secret scalar used to encode the amount for the recipient
    pub amount_secret_key: SecretKey,
}

impl Drop for RingCTOutput {
    fn drop(&mut self) {
        self.amount_secret_key.zeroize();
    }
}

/// Fields shared by both signature layouts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RingCTBase {
    /// Hash of the transaction prefix being signed
    pub message: Hash256,
    /// Rings indexed by input, then by member. Not serialized, verifiers rebuild it from the
    /// key offsets
    #[serde(skip)]
    pub mix_ring: Vec<Vec<DestinationCommitmentPair>>,
    pub output_commitments: Vec<PublicKey>,
    pub ecdh_info: Vec<ECDHTuple>,
    pub fee: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RingCTSignature {
    /// One MLSAG over all inputs, which share a real index
    Full {
        base: RingCTBase,
        range_proofs: Vec<RangeProof>,
        mlsag: MLSAGSignature,
    },
    /// One pseudo output commitment and one MLSAG per input
    Simple {
        base: RingCTBase,
        range_proofs: Vec<RangeProof>,
        pseudo_outputs: Vec<PublicKey>,
        mlsags: Vec<MLSAGSignature>,
    },
}

impl RingCTSignature {
    pub fn signature_type(&self) -> RingCTType {
        match self {
            RingCTSignature::Full { .. } => RingCTType::Full,
            RingCTSignature::Simple { .. } => RingCTType::Simple,
        }
    }

    pub fn base(&self) -> &RingCTBase {
        match self {
            RingCTSignature::Full { base, .. } | RingCTSignature::Simple { base, .. } => base,
        }
    }

    pub fn range_proofs(&self) -> &[RangeProof] {
        match self {
            RingCTSignature::Full { range_proofs, .. }
            | RingCTSignature::Simple { range_proofs, .. } => range_proofs,
        }
    }

    /// Key images of the signed inputs, in input order
    pub fn key_images(&self) -> Vec<KeyImage> {
        match self {
            RingCTSignature::Full { mlsag, .. } => mlsag.key_images.clone(),
            RingCTSignature::Simple { mlsags, .. } => mlsags
                .iter()
                .filter_map(|mlsag| mlsag.key_images.first().copied())
                .collect(),
        }
    }

    /// Serialized base: type, fee, pseudo outputs, encoded amounts and output commitments
    pub fn base_blob(&self) -> Vec<u8> {
        match self {
            RingCTSignature::Full { base, .. } => serialize_base(RingCTType::Full, base, &[]),
            RingCTSignature::Simple {
                base,
                pseudo_outputs,
                ..
            } => serialize_base(RingCTType::Simple, base, pseudo_outputs),
        }
    }

    /// Serialized prunable part: range proofs followed by the MLSAGs
    pub fn prunable_blob(&self) -> Vec<u8> {
        let mut blob = Vec::new();
        for proof in self.range_proofs() {
            blob.extend(proof.to_bytes());
        }
        match self {
            RingCTSignature::Full { mlsag, .. } => blob.extend(mlsag.to_bytes()),
            RingCTSignature::Simple { mlsags, .. } => {
                for mlsag in mlsags {
                    blob.extend(mlsag.to_bytes());
                }
            }
        }
        blob
    }
}

fn serialize_base(signature_type: RingCTType, base: &RingCTBase, pseudo_outputs: &[Point]) -> Vec<u8> {
    let mut blob = vec![signature_type as u8];
    blob.extend(varint::serialize(base.fee));
    for pseudo_output in pseudo_outputs {
        blob.extend_from_slice(pseudo_output.compress().as_bytes());
    }
    for ecdh in &base.ecdh_info {
        blob.extend_from_slice(ecdh.mask.as_bytes());
        blob.extend_from_slice(ecdh.amount.as_bytes());
    }
    for commitment in &base.output_commitments {
        blob.extend_from_slice(commitment.compress().as_bytes());
    }
    blob
}

/// The message the MLSAGs sign: H(message || H(base) || H(range proofs))
fn get_pre_mlsag_hash(message: &Hash256, base_blob: &[u8], range_proofs: &[RangeProof]) -> Hash256Data {
    let mut proof_hasher = CNFastHash::new();
    for proof in range_proofs {
        proof_hasher.input(proof.to_bytes());
    }

    let mut hasher = CNFastHash::new();
    hasher.input(message.data());
    hasher.input(CNFastHash::digest(base_blob));
    hasher.input(proof_hasher.result());
    hasher.result()
}

fn check_balance(inputs: &[RingCTInput], outputs: &[RingCTOutput], fee: u64) -> Result<(), Error> {
    ensure!(!inputs.is_empty(), Error::NoInputs);
    ensure!(!outputs.is_empty(), Error::NoOutputs);

    let in_sum = inputs
        .iter()
        .try_fold(0u64, |sum, input| sum.checked_add(input.amount))
        .ok_or(Error::AmountOverflow)?;
    let out_sum = outputs
        .iter()
        .try_fold(fee, |sum, output| sum.checked_add(output.amount))
        .ok_or(Error::AmountOverflow)?;
    ensure!(in_sum == out_sum, Error::Unbalanced);

    for input in inputs {
        ensure!(input.ring_index < input.ring_row.len(), Error::InconsistentRing);
    }

    Ok(())
}

/// Commits to every output, returning the commitments, their range proofs, the encoded
/// amounts and the commitment masks
fn prove_outputs<R: RngCore + CryptoRng>(
    outputs: &[RingCTOutput],
    rng: &mut R,
) -> (Vec<Point>, Vec<RangeProof>, Vec<ECDHTuple>, Vec<SecretKey>) {
    let mut commitments = Vec::with_capacity(outputs.len());
    let mut range_proofs = Vec::with_capacity(outputs.len());
    let mut ecdh_info = Vec::with_capacity(outputs.len());
    let mut masks = Vec::with_capacity(outputs.len());

    for output in outputs {
        let (commitment, mask, proof) = borromean::prove(output.amount, rng);
        ecdh_info.push(ECDHTuple::encode(&mask, output.amount, &output.amount_secret_key));
        commitments.push(commitment);
        range_proofs.push(proof);
        masks.push(mask);
    }

    (commitments, range_proofs, ecdh_info, masks)
}

fn fee_commitment(fee: u64) -> Point {
    &Scalar::from(fee) * &*MASK_BASEPOINT_TABLE
}

/// Builds the shared ring of a full signature
///
/// Row `j` holds the `j`th destination key of every input, followed by
/// `sum(C_ij) - sum(C_out) - fee*H`
fn full_ring(mix_ring: &[Vec<DestinationCommitmentPair>], output_sum: &Point) -> Result<Matrix<Point>, Error> {
    let ring_size = mix_ring.first().map_or(0, Vec::len);
    ensure!(
        mix_ring.iter().all(|ring| ring.len() == ring_size),
        Error::MixinMismatch
    );

    let inputs = mix_ring.len();
    Matrix::from_fn(ring_size, inputs + 1, |row, col| {
        if col < inputs {
            mix_ring[col][row].destination
        } else {
            mix_ring.iter().map(|ring| ring[row].commitment).sum::<Point>() - output_sum
        }
    })
    .ok_or(Error::InconsistentRing)
}

/// Builds the two column ring of a simple signature input
fn simple_ring(ring_row: &[DestinationCommitmentPair], pseudo_output: &Point) -> Result<Matrix<Point>, Error> {
    Matrix::from_fn(ring_row.len(), 2, |row, col| {
        if col == 0 {
            ring_row[row].destination
        } else {
            ring_row[row].commitment - pseudo_output
        }
    })
    .ok_or(Error::InconsistentRing)
}

/// Creates a full RingCT signature
///
/// All inputs must have rings of the same size with the real output at the same index.
/// Returns the signature along with the output commitment masks
pub fn sign_full<R: RngCore + CryptoRng>(
    message: Hash256,
    inputs: &[RingCTInput],
    outputs: &[RingCTOutput],
    fee: u64,
    rng: &mut R,
) -> Result<(RingCTSignature, Vec<SecretKey>), Error> {
    check_balance(inputs, outputs, fee)?;

    let index = inputs[0].ring_index;
    let ring_size = inputs[0].ring_row.len();
    ensure!(
        inputs
            .iter()
            .all(|input| input.ring_index == index && input.ring_row.len() == ring_size),
        Error::MixinMismatch
    );

    let (output_commitments, range_proofs, ecdh_info, output_masks) = prove_outputs(outputs, rng);
    let base = RingCTBase {
        message,
        mix_ring: inputs.iter().map(|input| input.ring_row.clone()).collect(),
        output_commitments,
        ecdh_info,
        fee,
    };

    let pre_mlsag_hash = get_pre_mlsag_hash(
        &message,
        &serialize_base(RingCTType::Full, &base, &[]),
        &range_proofs,
    );

    let output_sum = base.output_commitments.iter().sum::<Point>() + fee_commitment(fee);
    let ring = full_ring(&base.mix_ring, &output_sum)?;

    // The last column signs with the difference of the input and output masks
    let mut signer_keys: Vec<SecretKey> = inputs
        .iter()
        .map(|input| input.destination_secret_key)
        .collect();
    signer_keys.push(
        inputs
            .iter()
            .map(|input| input.commitment_secret_key)
            .sum::<Scalar>()
            - output_masks.iter().sum::<Scalar>(),
    );

    let mlsag = mlsag::sign(&pre_mlsag_hash, &ring, index, &signer_keys, inputs.len(), rng);
    signer_keys.zeroize();

    Ok((
        RingCTSignature::Full {
            base,
            range_proofs,
            mlsag: mlsag?,
        },
        output_masks,
    ))
}

/// Creates a simple RingCT signature
///
/// Every input gets a pseudo output commitment to the same amount, and an MLSAG proving
/// one of its ring members commits to it. The pseudo output masks sum to the output masks.
/// Returns the signature along with the output commitment masks
pub fn sign_simple<R: RngCore + CryptoRng>(
    message: Hash256,
    inputs: &[RingCTInput],
    outputs: &[RingCTOutput],
    fee: u64,
    rng: &mut R,
) -> Result<(RingCTSignature, Vec<SecretKey>), Error> {
    check_balance(inputs, outputs, fee)?;

    let (output_commitments, range_proofs, ecdh_info, output_masks) = prove_outputs(outputs, rng);

    let mut pseudo_masks: Vec<SecretKey> = (1..inputs.len()).map(|_| Scalar::random(rng)).collect();
    pseudo_masks.push(output_masks.iter().sum::<Scalar>() - pseudo_masks.iter().sum::<Scalar>());

    let pseudo_outputs: Vec<PublicKey> = inputs
        .iter()
        .zip(pseudo_masks.iter())
        .map(|(input, mask)| Commitment::new(input.amount, *mask).to_public())
        .collect();

    let base = RingCTBase {
        message,
        mix_ring: inputs.iter().map(|input| input.ring_row.clone()).collect(),
        output_commitments,
        ecdh_info,
        fee,
    };

    let pre_mlsag_hash = get_pre_mlsag_hash(
        &message,
        &serialize_base(RingCTType::Simple, &base, &pseudo_outputs),
        &range_proofs,
    );

    let mlsags = inputs
        .iter()
        .zip(pseudo_outputs.iter())
        .zip(pseudo_masks.iter())
        .map(|((input, pseudo_output), pseudo_mask)| -> Result<MLSAGSignature, Error> {
            let ring = simple_ring(&input.ring_row, pseudo_output)?;
            let mut signer_keys = [
                input.destination_secret_key,
                input.commitment_secret_key - pseudo_mask,
            ];
            let mlsag = mlsag::sign(&pre_mlsag_hash, &ring, input.ring_index, &signer_keys, 1, rng);
            signer_keys.zeroize();
            Ok(mlsag?)
        })
        .collect::<Result<Vec<_>, Error>>();
    pseudo_masks.zeroize();

    Ok((
        RingCTSignature::Simple {
            base,
            range_proofs,
            pseudo_outputs,
            mlsags: mlsags?,
        },
        output_masks,
    ))
}

/// Creates a RingCT signature of the given type
pub fn sign<R: RngCore + CryptoRng>(
    signature_type: RingCTType,
    message: Hash256,
    inputs: &[RingCTInput],
    outputs: &[RingCTOutput],
    fee: u64,
    rng: &mut R,
) -> Result<(RingCTSignature, Vec<SecretKey>), Error> {
    debug!(
        "Signing {} inputs and {} outputs ({:?})",
        inputs.len(),
        outputs.len(),
        signature_type
    );

    match signature_type {
        RingCTType::Full => sign_full(message, inputs, outputs, fee, rng),
        RingCTType::Simple => sign_simple(message, inputs, outputs, fee, rng),
        RingCTType::Null => Err(Error::UnsupportedType),
    }
}

/// Checks a signature built by this crate
///
/// Requires `mix_ring` to be populated
pub fn verify(signature: &RingCTSignature) -> Result<(), Error> {
    let base = signature.base();
    let range_proofs = signature.range_proofs();

    ensure!(!base.mix_ring.is_empty(), Error::NoInputs);
    ensure!(!base.output_commitments.is_empty(), Error::NoOutputs);
    ensure!(
        base.output_commitments.len() == range_proofs.len(),
        Error::InvalidRangeProof(borromean::Error::InconsistentProof)
    );

    for (commitment, proof) in base.output_commitments.iter().zip(range_proofs.iter()) {
        borromean::verify(commitment, proof)?;
    }

    let pre_mlsag_hash = get_pre_mlsag_hash(&base.message, &signature.base_blob(), range_proofs);
    let output_sum = base.output_commitments.iter().sum::<Point>() + fee_commitment(base.fee);

    match signature {
        RingCTSignature::Full { mlsag, .. } => {
            let ring = full_ring(&base.mix_ring, &output_sum)?;
            mlsag::verify(&pre_mlsag_hash, &ring, mlsag, base.mix_ring.len())?;
        }
        RingCTSignature::Simple {
            pseudo_outputs,
            mlsags,
            ..
        } => {
            ensure!(
                pseudo_outputs.len() == base.mix_ring.len() && mlsags.len() == base.mix_ring.len(),
                Error::InconsistentRing
            );
            ensure!(
                pseudo_outputs.iter().sum::<Point>() == output_sum,
                Error::InvalidCommitmentSum
            );

            for ((ring_row, pseudo_output), mlsag) in
                base.mix_ring.iter().zip(pseudo_outputs.iter()).zip(mlsags.iter())
            {
                let ring = simple_ring(ring_row, pseudo_output)?;
                mlsag::verify(&pre_mlsag_hash, &ring, mlsag, 1)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto::{ecc, KeyPair};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn mock_input(rng: &mut StdRng, amount: u64, ring_size: usize, ring_index: usize) -> RingCTInput {
        let destination = KeyPair::random(rng);
        let mask = Scalar::random(rng);

        let mut ring_row = Vec::with_capacity(ring_size);
        for i in 0..ring_size {
            if i == ring_index {
                ring_row.push(DestinationCommitmentPair {
                    destination: destination.public_key,
                    commitment: Commitment::new(amount, mask).to_public(),
                });
            } else {
                let decoy_amount = rng.gen_range(0, 1_000_000);
                ring_row.push(DestinationCommitmentPair {
                    destination: KeyPair::random(rng).public_key,
                    commitment: Commitment::commit_to_value(decoy_amount, rng).to_public(),
                });
            }
        }

        RingCTInput {
            destination_secret_key: destination.secret_key,
            commitment_secret_key: mask,
            amount,
            ring_index,
            ring_row,
        }
    }

    fn mock_output(rng: &mut StdRng, amount: u64) -> RingCTOutput {
        RingCTOutput {
            destination_public_key: KeyPair::random(rng).public_key,
            amount,
            amount_secret_key: Scalar::random(rng),
        }
    }

    fn message() -> Hash256 {
        Hash256::from(CNFastHash::digest(b"transaction prefix"))
    }

    #[test]
    fn it_signs_and_verifies_full_signatures() {
        let mut rng = StdRng::seed_from_u64(31);
        let inputs = vec![
            mock_input(&mut rng, 600_000, 4, 1),
            mock_input(&mut rng, 400_000, 4, 1),
        ];
        let outputs = vec![mock_output(&mut rng, 700_000), mock_output(&mut rng, 250_000)];

        let (signature, masks) = sign_full(message(), &inputs, &outputs, 50_000, &mut rng).unwrap();
        assert_eq!(signature.signature_type(), RingCTType::Full);
        assert_eq!(masks.len(), 2);
        verify(&signature).unwrap();

        // Key images are bound to the real one-time keys
        let expected: Vec<_> = inputs
            .iter()
            .map(|input| {
                input.destination_secret_key
                    * ecc::hash_to_ec(&input.ring_row[input.ring_index].destination)
            })
            .collect();
        assert_eq!(signature.key_images(), expected);
    }

    #[test]
    fn it_signs_and_verifies_simple_signatures() {
        let mut rng = StdRng::seed_from_u64(32);
        let inputs = vec![
            mock_input(&mut rng, 500_000, 5, 2),
            mock_input(&mut rng, 500_000, 7, 2),
        ];
        let outputs = vec![mock_output(&mut rng, 900_000)];

        let (signature, _) = sign(RingCTType::Simple, message(), &inputs, &outputs, 100_000, &mut rng).unwrap();
        assert_eq!(signature.signature_type(), RingCTType::Simple);
        assert_eq!(signature.key_images().len(), 2);
        verify(&signature).unwrap();
    }

    #[test]
    fn it_encodes_amounts_for_the_recipient() {
        let mut rng = StdRng::seed_from_u64(33);
        let inputs = vec![mock_input(&mut rng, 1_000_000, 3, 0)];
        let outputs = vec![mock_output(&mut rng, 900_000)];

        let (signature, masks) = sign_simple(message(), &inputs, &outputs, 100_000, &mut rng).unwrap();
        let (mask, amount) = signature.base().ecdh_info[0].decode(&outputs[0].amount_secret_key);

        assert_eq!(mask, masks[0]);
        assert_eq!(amount, Scalar::from(900_000u64));
        assert_eq!(
            Commitment::new(900_000, mask).to_public(),
            signature.base().output_commitments[0]
        );
    }

    #[test]
    fn full_signatures_need_a_shared_index() {
        let mut rng = StdRng::seed_from_u64(34);
        let inputs = vec![
            mock_input(&mut rng, 500_000, 5, 1),
            mock_input(&mut rng, 500_000, 5, 3),
        ];
        let outputs = vec![mock_output(&mut rng, 1_000_000)];

        match sign_full(message(), &inputs, &outputs, 0, &mut rng) {
            Err(Error::MixinMismatch) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn it_rejects_unbalanced_amounts() {
        let mut rng = StdRng::seed_from_u64(35);
        let inputs = vec![mock_input(&mut rng, 500_000, 3, 0)];
        let outputs = vec![mock_output(&mut rng, 600_000)];

        match sign_simple(message(), &inputs, &outputs, 0, &mut rng) {
            Err(Error::Unbalanced) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn it_rejects_a_modified_fee() {
        let mut rng = StdRng::seed_from_u64(36);
        let inputs = vec![mock_input(&mut rng, 500_000, 3, 2)];
        let outputs = vec![mock_output(&mut rng, 400_000)];

        let (mut signature, _) = sign_full(message(), &inputs, &outputs, 100_000, &mut rng).unwrap();
        if let RingCTSignature::Full { base, .. } = &mut signature {
            base.fee = 200_000;
        }

        match verify(&signature) {
            Err(Error::MLSAG(mlsag::Error::InvalidSignature)) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn it_refuses_null_signatures() {
        let mut rng = StdRng::seed_from_u64(37);
        let inputs = vec![mock_input(&mut rng, 10, 3, 0)];
        let outputs = vec![mock_output(&mut rng, 10)];

        match sign(RingCTType::Null, message(), &inputs, &outputs, 0, &mut rng) {
            Err(Error::UnsupportedType) => {}
            _ => panic!("Wrong error type"),
        }
    }
}
