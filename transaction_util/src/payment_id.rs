//! Module for encrypting and decrypting payment IDs

use crypto::{CNFastHash, Digest, Hash8, Hash8Data, PublicKey, SecretKey};

use crate::{
    derivation::Derivation, subaddress, AccountKeys, Address, Error, Result, SubAddressIndex,
    TXDestination, TXDestinationType,
};

/// Domain separator appended to the derivation when hashing the payment ID key
pub const ENCRYPTED_PAYMENT_ID_TAIL: u8 = 0x8d;

/// Encrypts a payment ID
///
/// Encryption is done by taking a hash of a shared key derivation and
/// bitwise XOR'ing it with the payment ID
pub fn encrypt(payment_id: Hash8, key_derivation: &Derivation) -> Hash8 {
    let mut hasher = CNFastHash::new();

    hasher.input(key_derivation.0.compress().to_bytes());
    hasher.input(&[ENCRYPTED_PAYMENT_ID_TAIL]);

    let hash = hasher.result();

    Hash8::from(
        payment_id
            .data()
            .iter()
            .zip(hash.iter())
            .map(|(pid, hash)| pid ^ hash)
            .collect::<Hash8Data>(),
    )
}

/// Decrypts a payment ID. XOR is its own inverse
pub fn decrypt(payment_id: Hash8, key_derivation: &Derivation) -> Hash8 {
    encrypt(payment_id, key_derivation)
}

/// Encrypts a payment ID for the owner of `view_public_key`
pub fn encrypt_for(
    payment_id: Hash8,
    view_public_key: &PublicKey,
    tx_secret_key: &SecretKey,
) -> Result<Hash8> {
    let derivation = Derivation::from(tx_secret_key, view_public_key).ok_or(Error::Derivation)?;
    Ok(encrypt(payment_id, &derivation))
}

/// Finds the view key of the single recipient of a transaction
///
/// Change and empty destinations are skipped, as are payments to the sender's own primary
/// address. If only change remains, the change address is the recipient.
pub fn find_destination_view_key(
    sender_keys: &AccountKeys,
    destinations: &[TXDestination],
) -> Result<PublicKey> {
    let sender_address = sender_keys.address();
    let mut recipient: Option<&Address> = None;
    let mut change = None;

    for destination in destinations.iter().filter(|d| d.amount != 0) {
        match &destination.destination_type {
            TXDestinationType::Change(index) => {
                change = Some(*index);
            }
            TXDestinationType::PayToAddress(address) if address.same_keys(&sender_address) => {
                change = change.or(Some(SubAddressIndex::PRIMARY));
            }
            TXDestinationType::PayToAddress(address) => match recipient {
                Some(current) if !current.same_keys(address) => {
                    return Err(Error::AmbiguousRecipient)
                }
                _ => recipient = Some(address),
            },
        }
    }

    match (recipient, change) {
        (Some(address), _) => Ok(address.view_public_key),
        (None, Some(index)) => {
            Ok(subaddress::get_address_for_index(sender_keys, &index).view_public_key)
        }
        (None, None) => Err(Error::AmbiguousRecipient),
    }
}
