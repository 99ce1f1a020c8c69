#![deny(missing_docs)]
//! Utilities for building CryptoNote transactions
//!
//! Covers the account side of a transaction (keys, addresses, subaddresses), stealth output
//! derivation, key images, payment ID encryption and the assembly of complete RingCT signed
//! transactions.

use zeroize::Zeroize;

use crypto::{PublicKey, SecretKey};
use ringct::DestinationCommitmentPair;

mod account_keys;
pub mod address;
pub mod derivation;
mod error;
pub mod key_image;
pub mod miner_tx;
pub mod payment_id;
pub mod shuffle;
pub mod subaddress;
pub mod tx_construction;
pub mod tx_scanning;

pub use account_keys::AccountKeys;
pub use address::{Address, AddressType};
pub use derivation::{derive_output, Derivation};
pub use error::{Error, Result};
pub use subaddress::SubAddressIndex;
pub use tx_construction::{construct_tx, ProofEngine, RctMode, RingCTProver, TxConstructor, TxKeys};

/// A source entry for a given transaction
pub struct TXSource {
    /// Amount obtained from the given output in a previous transaction
    pub amount: u64,
    /// Mask value used to hide the amount
    pub amount_mask: SecretKey,
    /// The ring: global output offsets (strictly increasing) with their keys and commitments
    pub outputs: Vec<(u64, DestinationCommitmentPair)>,
    /// The position of the real output being spent among the set of outputs
    pub real_output_index: usize,
    /// The position of the real output among the set of outputs in its parent transaction
    ///
    /// Used for the key image scalar derivation
    pub real_output_tx_index: u64,
    /// Set of transaction public keys for the real output
    pub real_output_tx_public_keys: Vec<PublicKey>,
    /// Index of the subaddress to which the real output was paid to
    pub subaddress_index: SubAddressIndex,
}

impl Drop for TXSource {
    fn drop(&mut self) {
        self.amount_mask.zeroize();
    }
}

/// Destination type
#[derive(Clone, Debug)]
pub enum TXDestinationType {
    /// Output amount is towards another address
    PayToAddress(Address),
    /// Output amount is to be sent back to us as change
    Change(SubAddressIndex),
}

/// A destination entry for a given transaction
#[derive(Clone, Debug)]
pub struct TXDestination {
    /// Amount being paid to this destination
    pub amount: u64,
    /// Type of destination
    pub destination_type: TXDestinationType,
}
