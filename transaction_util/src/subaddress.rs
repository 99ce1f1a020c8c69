//! Module for handling subaddresses

use byteorder::ByteOrder;
use serde::{Deserialize, Serialize};

use crypto::{ecc::BASEPOINT_TABLE, CNFastHash, Digest, SecretKey};

use crate::{AccountKeys, Address};

/// Tuple of (major, minor) index for a subaddress
#[derive(Debug, Eq, Clone, Copy, Hash, PartialEq, Serialize, Deserialize)]
pub struct SubAddressIndex(pub u32, pub u32);

impl SubAddressIndex {
    /// Index of the primary address
    pub const PRIMARY: SubAddressIndex = SubAddressIndex(0, 0);

    /// Whether this indexes the primary address
    pub fn is_primary(&self) -> bool {
        *self == Self::PRIMARY
    }
}

impl Default for SubAddressIndex {
    fn default() -> Self {
        Self::PRIMARY
    }
}

/// Get the address at a given index from the current wallet
pub fn get_address_for_index(account_keys: &AccountKeys, index: &SubAddressIndex) -> Address {
    if index.is_primary() {
        return account_keys.address();
    }
    // Subaddress secret key
    let subaddress_secret_key = get_subaddress_secret_key(account_keys, index);
    let subaddress_public_key = &subaddress_secret_key * &BASEPOINT_TABLE;

    // Subaddress spend public key
    // D = B + mG
    let spend_public_key = account_keys.spend_keypair.public_key + subaddress_public_key;

    // Subaddress view public key
    // C = aD
    let view_public_key = account_keys.view_keypair.secret_key * spend_public_key;

    Address::subaddress(spend_public_key, view_public_key)
}

/// Get the secret key used in generating a subaddress in the given index
pub fn get_subaddress_secret_key(
    account_keys: &AccountKeys,
    SubAddressIndex(major, minor): &SubAddressIndex,
) -> SecretKey {
    // m = H_s("SubAddr" | a | major | minor)
    // Length of buffer = length("SubAddr\0") + length(secret_key) + 2 * length(u32)
    //                  = 8 + 32 + 8 = 48
    let mut buffer = [0; 48];

    // SubAddr
    buffer[..8].copy_from_slice(b"SubAddr\0");
    // View secret key
    buffer[8..40].copy_from_slice(account_keys.view_keypair.secret_key.as_bytes());
    // Major index
    byteorder::LittleEndian::write_u32(&mut buffer[40..44], *major);
    // Minor index
    byteorder::LittleEndian::write_u32(&mut buffer[44..48], *minor);

    let secret_key = crypto::ecc::hash_to_scalar(CNFastHash::digest(&buffer));
    zeroize::Zeroize::zeroize(&mut buffer[8..40]);

    secret_key
}
