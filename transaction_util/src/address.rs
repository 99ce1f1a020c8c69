//! Recipient addresses as seen by transaction construction

use serde::{Deserialize, Serialize};

use crypto::{Hash8, PublicKey};

/// Kind of recipient an address names
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Debug)]
pub enum AddressType {
    /// Primary account address, outputs derive from the transaction public key
    Standard,
    /// Subaddress, outputs derive from `rD` instead of `rG`
    SubAddress,
    /// Standard address carrying a short payment ID that gets encrypted into the extra
    Integrated(Hash8),
}

impl Default for AddressType {
    fn default() -> Self {
        AddressType::Standard
    }
}

/// Public spend and view keys of a recipient
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Kind of recipient
    pub address_type: AddressType,
    /// Public spend key (`B`, or `D` for a subaddress)
    pub spend_public_key: PublicKey,
    /// Public view key (`A`, or `C` for a subaddress)
    pub view_public_key: PublicKey,
}

impl Address {
    /// Primary address made of the given keys
    pub fn standard(spend_public_key: PublicKey, view_public_key: PublicKey) -> Self {
        Address {
            address_type: AddressType::Standard,
            spend_public_key,
            view_public_key,
        }
    }

    /// Subaddress made of the given keys
    pub fn subaddress(spend_public_key: PublicKey, view_public_key: PublicKey) -> Self {
        Address {
            address_type: AddressType::SubAddress,
            spend_public_key,
            view_public_key,
        }
    }

    /// Primary address that also asks the sender to attach `payment_id`
    pub fn integrated(
        spend_public_key: PublicKey,
        view_public_key: PublicKey,
        payment_id: Hash8,
    ) -> Self {
        Address {
            address_type: AddressType::Integrated(payment_id),
            spend_public_key,
            view_public_key,
        }
    }

    /// Whether this is a subaddress
    pub fn is_subaddress(&self) -> bool {
        self.address_type == AddressType::SubAddress
    }

    /// Payment ID carried by an integrated address
    pub fn payment_id(&self) -> Option<Hash8> {
        match self.address_type {
            AddressType::Integrated(payment_id) => Some(payment_id),
            _ => None,
        }
    }

    /// Whether both addresses point to the same keys, regardless of type
    ///
    /// An integrated address and its underlying standard address pay the same wallet.
    pub fn same_keys(&self, other: &Address) -> bool {
        self.spend_public_key == other.spend_public_key
            && self.view_public_key == other.view_public_key
    }
}
