use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crypto::{CNFastHash, Digest, Hash256, Hash256Data, KeyImage, PublicKey};
use ringct::RingCTSignature;

use crate::{ExtraFields, GetHash};

/// Version of transactions carrying RingCT signatures
pub const CURRENT_TRANSACTION_VERSION: usize = 2;

/// Transaction input
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum TXIn {
    /// Coinbase (genesis) input. Creates new coins
    /// Contains the Block height of this transaction
    Gen(u64),
    /// Coins from an existing "ToKey" output
    FromKey {
        /// Amount spent (0 for RingCT)
        amount: u64,
        /// Relative offsets of each output in the ring
        key_offsets: Vec<u64>,
        /// Key image of the sender's output
        key_image: KeyImage,
    },
}

/// Transaction output target
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum TXOutTarget {
    /// Send to specified public key
    ToKey {
        /// Target public key
        key: PublicKey,
    },
}

/// Transaction output
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TXOut {
    /// Amount of coins received (0 for RingCT)
    pub amount: u64,
    /// Transaction output target
    pub target: TXOutTarget,
}

/// Transaction prefix
#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq)]
pub struct TransactionPrefix {
    /// This transaction's version
    pub version: usize,
    /// Block height or timestamp until which the outputs are locked
    pub unlock_time: u64,
    /// List of inputs to this transaction
    pub inputs: Vec<TXIn>,
    /// List of outputs in this transaction
    pub outputs: Vec<TXOut>,
    /// Extra information tagged to this transaction
    pub extra: ExtraFields,
}

/// A complete Transaction
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct Transaction {
    /// This transaction's prefix
    pub prefix: TransactionPrefix,

    /// RingCT Signature to prove ownership, authorize the transaction and hide amounts
    ///
    /// `None` for coinbase and unsigned transactions
    pub rct_signature: Option<RingCTSignature>,

    #[serde(skip)]
    hash: OnceLock<Hash256>,
}

impl Transaction {
    pub fn new(prefix: TransactionPrefix, rct_signature: Option<RingCTSignature>) -> Self {
        Transaction {
            prefix,
            rct_signature,
            hash: OnceLock::new(),
        }
    }

    /// Drops the cached hash, to be called after modifying the transaction
    pub fn invalidate_hashes(&mut self) {
        self.hash = OnceLock::new();
    }

    fn rct_base_blob(&self) -> Vec<u8> {
        match &self.rct_signature {
            Some(signature) => signature.base_blob(),
            // Null signature type
            None => vec![0],
        }
    }

    fn compute_hash(&self) -> Hash256 {
        let prefix_blob = self.prefix.get_hash_blob();
        if self.prefix.version == 1 {
            return Hash256::from(CNFastHash::digest(&prefix_blob));
        }

        let prunable_hash = match &self.rct_signature {
            Some(signature) => CNFastHash::digest(&signature.prunable_blob()),
            None => Hash256Data::default(),
        };

        let mut hasher = CNFastHash::new();
        hasher.input(CNFastHash::digest(&prefix_blob));
        hasher.input(CNFastHash::digest(&self.rct_base_blob()));
        hasher.input(prunable_hash);
        Hash256::from(hasher.result())
    }
}

impl GetHash for TransactionPrefix {
    fn get_hash_blob(&self) -> Vec<u8> {
        let mut vec = Vec::new();

        // Tx version
        vec.extend_from_slice(&varint::serialize(self.version as u64));

        // Unlock time
        vec.extend_from_slice(&varint::serialize(self.unlock_time));

        // Inputs
        vec.extend_from_slice(&varint::serialize(self.inputs.len() as u64));
        for input in &self.inputs {
            match input {
                TXIn::Gen(height) => {
                    // Enum tag
                    vec.push(0xff);

                    // Input
                    vec.extend_from_slice(&varint::serialize(*height));
                }
                TXIn::FromKey {
                    amount,
                    key_offsets,
                    key_image,
                } => {
                    // Enum tag
                    vec.push(0x02);

                    vec.extend_from_slice(&varint::serialize(*amount));
                    vec.extend_from_slice(&varint::serialize(key_offsets.len() as u64));
                    for offset in key_offsets {
                        vec.extend_from_slice(&varint::serialize(*offset));
                    }
                    vec.extend_from_slice(key_image.compress().as_bytes());
                }
            }
        }

        // Outputs
        vec.extend_from_slice(&varint::serialize(self.outputs.len() as u64));
        for output in &self.outputs {
            // Amount
            vec.extend_from_slice(&varint::serialize(output.amount));

            // Target
            match output.target {
                TXOutTarget::ToKey { key } => {
                    // Enum tag
                    vec.push(0x02);

                    // Public Key
                    vec.extend_from_slice(key.compress().as_bytes());
                }
            }
        }

        // Extra
        let extra = self.extra.to_bytes();
        vec.extend_from_slice(&varint::serialize(extra.len() as u64));
        vec.extend_from_slice(&extra);
        vec
    }
}

impl GetHash for Transaction {
    fn get_hash_blob(&self) -> Vec<u8> {
        let mut vec = self.prefix.get_hash_blob();
        if self.prefix.version > 1 {
            vec.extend(self.rct_base_blob());
            if let Some(signature) = &self.rct_signature {
                vec.extend(signature.prunable_blob());
            }
        }
        vec
    }

    /// Computed once and cached until `invalidate_hashes` is called
    fn get_hash(&self) -> Hash256 {
        *self.hash.get_or_init(|| self.compute_hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TXExtra;
    use crypto::KeyPair;

    fn coinbase() -> Transaction {
        let mut extra = ExtraFields::new();
        extra.replace(TXExtra::TxPublicKey(KeyPair::generate().public_key));

        Transaction::new(
            TransactionPrefix {
                version: CURRENT_TRANSACTION_VERSION,
                unlock_time: 160,
                inputs: vec![TXIn::Gen(100)],
                outputs: vec![TXOut {
                    amount: 17_000_000,
                    target: TXOutTarget::ToKey {
                        key: KeyPair::generate().public_key,
                    },
                }],
                extra,
            },
            None,
        )
    }

    #[test]
    fn prefix_blob_layout() {
        let tx = coinbase();
        let blob = tx.prefix.get_hash_blob();

        // version, unlock time, input count, gen tag, height
        assert_eq!(&blob[..6], &[0x02, 0xa0, 0x01, 0x01, 0xff, 0x64]);
        // extra: length, tag, key
        assert_eq!(&blob[blob.len() - 34..blob.len() - 32], &[33, 0x01]);
    }

    #[test]
    fn hashes_are_cached_until_invalidated() {
        let mut tx = coinbase();
        let hash = tx.get_hash();
        assert_eq!(tx.get_hash(), hash);

        tx.prefix.unlock_time += 1;
        assert_eq!(tx.get_hash(), hash);

        tx.invalidate_hashes();
        assert_ne!(tx.get_hash(), hash);
    }

    #[test]
    fn version_one_hashes_the_prefix() {
        let mut tx = coinbase();
        tx.prefix.version = 1;
        assert_eq!(tx.get_hash(), tx.prefix.get_hash());
    }
}
