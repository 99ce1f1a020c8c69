//! Synthetic sources and destinations

use rand::{CryptoRng, Rng, RngCore};

use crypto::{ecc::Scalar, KeyPair};
use ringct::{Commitment, DestinationCommitmentPair};
use transaction_util::{
    derive_output, AccountKeys, Address, SubAddressIndex, TXDestination, TXDestinationType,
    TXSource,
};

/// Amount held by every mock source
pub const SOURCE_AMOUNT: u64 = 1_000_000_000;

/// Fee left over by the mock destinations
pub const FEE: u64 = 10_000;

/// A source paying `owner` hidden among `ring_size - 1` random decoys
pub fn source<R: RngCore + CryptoRng>(
    rng: &mut R,
    owner: &AccountKeys,
    ring_size: usize,
) -> anyhow::Result<TXSource> {
    let tx_keypair = KeyPair::random(rng);
    let real_output_tx_index = rng.gen_range(0, 4);
    let real_output_index = rng.gen_range(0, ring_size);
    let (output_key, _) =
        derive_output(&owner.address(), &tx_keypair.secret_key, real_output_tx_index)?;
    let amount_mask = Scalar::random(rng);

    let mut offset = rng.gen_range(0, 1000);
    let mut outputs = Vec::with_capacity(ring_size);
    for i in 0..ring_size {
        let pair = if i == real_output_index {
            DestinationCommitmentPair {
                destination: output_key,
                commitment: Commitment::new(SOURCE_AMOUNT, amount_mask).to_public(),
            }
        } else {
            DestinationCommitmentPair {
                destination: KeyPair::random(rng).public_key,
                commitment: KeyPair::random(rng).public_key,
            }
        };
        outputs.push((offset, pair));
        offset += rng.gen_range(1, 1000);
    }

    Ok(TXSource {
        amount: SOURCE_AMOUNT,
        amount_mask,
        outputs,
        real_output_index,
        real_output_tx_index,
        real_output_tx_public_keys: vec![tx_keypair.public_key],
        subaddress_index: SubAddressIndex::PRIMARY,
    })
}

/// Splits the inputs minus the fee into `count` destinations, the last one being change
pub fn destinations(recipient: &Address, inputs: usize, count: usize) -> Vec<TXDestination> {
    let spendable = SOURCE_AMOUNT * inputs as u64 - FEE;
    let share = spendable / count as u64;

    (0..count)
        .map(|i| {
            if i + 1 == count {
                TXDestination {
                    amount: spendable - share * (count as u64 - 1),
                    destination_type: TXDestinationType::Change(SubAddressIndex::PRIMARY),
                }
            } else {
                TXDestination {
                    amount: share,
                    destination_type: TXDestinationType::PayToAddress(recipient.clone()),
                }
            }
        })
        .collect()
}
