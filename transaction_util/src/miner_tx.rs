//! Coinbase (miner reward) transactions
//!
//! The reward is paid transparently to a single stealth output, so no RingCT signature is
//! attached.

use log::info;
use rand::{CryptoRng, RngCore};

use common::{
    ExtraFields, GetHash, TXExtra, TXIn, TXNonce, TXOut, TXOutTarget, Transaction,
    TransactionPrefix, CURRENT_TRANSACTION_VERSION,
};
use crypto::KeyPair;
use ensure_macro::ensure;

use crate::{derive_output, Address, Error, Result};

/// Number of blocks a coinbase output stays locked for
pub const MINED_MONEY_UNLOCK_WINDOW: u64 = 60;

/// Constructs the reward transaction of the block at `height`
///
/// The single output pays `block_reward + fee` to `miner_address`. A non-empty `extra_nonce`
/// is added to the extra field.
pub fn construct_miner_tx<R: RngCore + CryptoRng>(
    height: u64,
    block_reward: u64,
    fee: u64,
    miner_address: &Address,
    extra_nonce: &[u8],
    rng: &mut R,
) -> Result<Transaction> {
    let tx_keypair = KeyPair::random(rng);

    let mut extra = ExtraFields::new();
    extra.replace(TXExtra::TxPublicKey(tx_keypair.public_key));
    if !extra_nonce.is_empty() {
        ensure!(
            extra_nonce.len() <= common::extra::TX_EXTRA_NONCE_MAX_COUNT,
            Error::Extra(common::extra::Error::NonceTooLong)
        );
        extra.replace(TXExtra::TxNonce(TXNonce::from_bytes(extra_nonce)));
    }

    let amount = block_reward.checked_add(fee).ok_or(Error::AmountOverflow)?;
    let (output_key, _) = derive_output(miner_address, &tx_keypair.secret_key, 0)?;

    let transaction = Transaction::new(
        TransactionPrefix {
            version: CURRENT_TRANSACTION_VERSION,
            unlock_time: height.saturating_add(MINED_MONEY_UNLOCK_WINDOW),
            inputs: vec![TXIn::Gen(height)],
            outputs: vec![TXOut {
                amount,
                target: TXOutTarget::ToKey { key: output_key },
            }],
            extra,
        },
        None,
    );

    info!(
        "Created miner transaction {} at height {} for {}",
        transaction.get_hash(),
        height,
        amount
    );
    Ok(transaction)
}
