//! Module for scanning transactions

use crypto::{ecc::BASEPOINT_TABLE, PublicKey, SecretKey};

use crate::{
    account_keys::AccountKeys,
    derivation::Derivation,
    subaddress::{self, SubAddressIndex},
};

/// Computes the output secret key needed for spending the given output
///
/// Returns the output secret key H_s(aR || idx) + b (=H_s(arG || idx) + b) if it indeed is
/// towards the account given
pub fn get_output_secret_key(
    account_keys: &AccountKeys,
    subaddress_index: &SubAddressIndex,
    tx_output_index: u64,
    output_key: &PublicKey,
    tx_public_keys: &[PublicKey],
) -> Option<SecretKey> {
    let derivation = find_derivation(account_keys, subaddress_index, tx_output_index, output_key, tx_public_keys)?;

    let mut output_secret_key =
        derivation.to_secret_key(tx_output_index, &account_keys.spend_keypair.secret_key);
    if !subaddress_index.is_primary() {
        // Subaddresses require an extra addition for the subaddress secret key
        // H_s(aR) + b + m_i
        output_secret_key += subaddress::get_subaddress_secret_key(account_keys, subaddress_index);
    }

    Some(output_secret_key)
}

/// Checks whether the output pays to the given subaddress of the account
///
/// Only needs the view secret key, so works for watch-only accounts
pub fn output_belongs_to(
    account_keys: &AccountKeys,
    subaddress_index: &SubAddressIndex,
    tx_output_index: u64,
    output_key: &PublicKey,
    tx_public_keys: &[PublicKey],
) -> bool {
    find_derivation(account_keys, subaddress_index, tx_output_index, output_key, tx_public_keys)
        .is_some()
}

/// Finds the transaction public key whose derivation yields `output_key`
///
/// P - H_s(aR || idx)G == D
fn find_derivation(
    account_keys: &AccountKeys,
    subaddress_index: &SubAddressIndex,
    tx_output_index: u64,
    output_key: &PublicKey,
    tx_public_keys: &[PublicKey],
) -> Option<Derivation> {
    let address = subaddress::get_address_for_index(account_keys, subaddress_index);

    tx_public_keys
        .iter()
        .filter_map(|tx_public_key| {
            Derivation::from(&account_keys.view_keypair.secret_key, tx_public_key)
        })
        .find(|derivation| {
            let derivation_scalar = derivation.to_scalar(tx_output_index);
            output_key - (&derivation_scalar * &BASEPOINT_TABLE) == address.spend_public_key
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::derive_output;
    use crypto::KeyPair;

    #[test]
    fn it_recognizes_own_outputs() {
        let account_keys = AccountKeys::from(KeyPair::generate().secret_key);
        let tx_keypair = KeyPair::generate();
        let (output_key, _) = derive_output(&account_keys.address(), &tx_keypair.secret_key, 1).unwrap();

        let secret_key = get_output_secret_key(
            &account_keys,
            &SubAddressIndex::PRIMARY,
            1,
            &output_key,
            &[KeyPair::generate().public_key, tx_keypair.public_key],
        )
        .unwrap();
        assert_eq!(&secret_key * &BASEPOINT_TABLE, output_key);

        // Wrong index
        assert!(!output_belongs_to(
            &account_keys,
            &SubAddressIndex::PRIMARY,
            0,
            &output_key,
            &[tx_keypair.public_key],
        ));
    }

    #[test]
    fn it_recognizes_subaddress_outputs() {
        let account_keys = AccountKeys::from(KeyPair::generate().secret_key);
        let index = SubAddressIndex(1, 4);
        let address = subaddress::get_address_for_index(&account_keys, &index);

        // Outputs to a subaddress use R = rD
        let tx_secret_key = KeyPair::generate().secret_key;
        let tx_public_key = tx_secret_key * address.spend_public_key;
        let (output_key, _) = derive_output(&address, &tx_secret_key, 0).unwrap();

        let secret_key =
            get_output_secret_key(&account_keys, &index, 0, &output_key, &[tx_public_key]).unwrap();
        assert_eq!(&secret_key * &BASEPOINT_TABLE, output_key);

        let view_only = AccountKeys::view_only(
            account_keys.spend_keypair.public_key,
            account_keys.view_keypair.secret_key,
        );
        assert!(output_belongs_to(&view_only, &index, 0, &output_key, &[tx_public_key]));
        assert!(!output_belongs_to(
            &view_only,
            &SubAddressIndex::PRIMARY,
            0,
            &output_key,
            &[tx_public_key]
        ));
    }
}
