use crypto::{Digest, Hash256};

/// Identity hash of a transaction or transaction prefix
pub trait GetHash {
    /// Canonical byte serialization that the identity hash covers
    fn get_hash_blob(&self) -> Vec<u8>;

    /// Keccak-256 of [`get_hash_blob`](GetHash::get_hash_blob)
    ///
    /// Version 2 transactions override this to hash the prefix and ringct parts separately.
    fn get_hash(&self) -> Hash256 {
        Hash256::from(crypto::CNFastHash::digest(&self.get_hash_blob()))
    }
}
