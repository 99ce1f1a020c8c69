//! Key images: the double spend tags of spent outputs

use crypto::{ecc, KeyImage, KeyPair, PublicKey, SecretKey};

use crate::{
    account_keys::AccountKeys,
    subaddress::SubAddressIndex,
    tx_scanning,
};

/// KI = x * H_p(P)
pub fn key_image(secret_key: &SecretKey, public_key: &PublicKey) -> KeyImage {
    secret_key * ecc::hash_to_ec(public_key)
}

/// Generates a key image for an output owned by the account
///
/// Recovers the one-time keypair `(x, P = xG)` of output `tx_output_index` of the transaction
/// with the given public keys, and checks `P` against `expected_key`, the key recorded for
/// the output being spent. Returns `None` on a mismatch.
pub fn generate_key_image(
    account_keys: &AccountKeys,
    subaddress_index: &SubAddressIndex,
    tx_public_keys: &[PublicKey],
    tx_output_index: u64,
    expected_key: &PublicKey,
) -> Option<(KeyPair, KeyImage)> {
    // x = H_s(aR || idx) + b
    let output_secret_key = tx_scanning::get_output_secret_key(
        account_keys,
        subaddress_index,
        tx_output_index,
        expected_key,
        tx_public_keys,
    )?;

    // Generate the ephemeral keypair for this output (x, X = xG)
    let ephemeral_keypair = KeyPair::from(output_secret_key);
    if ephemeral_keypair.public_key != *expected_key {
        return None;
    }

    let key_image = key_image(&ephemeral_keypair.secret_key, &ephemeral_keypair.public_key);
    Some((ephemeral_keypair, key_image))
}
