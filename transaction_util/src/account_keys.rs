use serde::{Deserialize, Serialize};

use crypto::{CNFastHash, Digest, KeyPair, PublicKey, ScalarExt, SecretKey};

use crate::address::Address;

#[derive(Deserialize, Serialize)]
/// A combination of a view and spend keypair which is used to create and recognize transactions
///
/// Both secret keys are wiped when the keys are dropped
pub struct AccountKeys {
    /// Spend keypair
    pub spend_keypair: KeyPair,
    /// View keypair
    pub view_keypair: KeyPair,
}

/// Deterministic keypair generation
///
/// The view secret key is derived by taking the Keccak (non-standard) hash of the spend secret key
impl From<SecretKey> for AccountKeys {
    fn from(spend_secret_key: SecretKey) -> AccountKeys {
        let view_secret_key =
            SecretKey::from_slice(&CNFastHash::digest(spend_secret_key.as_bytes()));

        AccountKeys {
            spend_keypair: KeyPair::from(spend_secret_key),
            view_keypair: KeyPair::from(view_secret_key),
        }
    }
}

impl AccountKeys {
    /// Generate an account keypair with distinct view and secret keys
    pub fn from_non_deterministic_keys(
        spend_secret_key: SecretKey,
        view_secret_key: SecretKey,
    ) -> AccountKeys {
        AccountKeys {
            spend_keypair: KeyPair::from(spend_secret_key),
            view_keypair: KeyPair::from(view_secret_key),
        }
    }

    /// Watch-only account: the spend secret key is null
    ///
    /// Such an account can recognize its outputs and build unsigned transactions
    pub fn view_only(spend_public_key: PublicKey, view_secret_key: SecretKey) -> AccountKeys {
        AccountKeys {
            spend_keypair: KeyPair {
                secret_key: SecretKey::zero(),
                public_key: spend_public_key,
            },
            view_keypair: KeyPair::from(view_secret_key),
        }
    }

    /// Whether the spend secret key is null
    pub fn is_watch_only(&self) -> bool {
        self.spend_keypair.secret_key == SecretKey::zero()
    }

    /// The primary (standard) address of this account
    pub fn address(&self) -> Address {
        Address::standard(
            self.spend_keypair.public_key,
            self.view_keypair.public_key,
        )
    }
}
