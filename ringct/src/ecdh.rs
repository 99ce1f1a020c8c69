use serde::{Deserialize, Serialize};

use crypto::{ecc, SecretKey};

/// H_s(key)
fn ecdh_hash(key: &SecretKey) -> SecretKey {
    ecc::data_to_scalar(key.as_bytes())
}

/// ECDH encoded tuple of amount and mask
///
/// Both values are offset by hashes of the output's shared secret, so only the sender and
/// the recipient of the output can recover them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ECDHTuple {
    /// Encoded Mask
    pub mask: SecretKey,
    /// Encoded Amount
    pub amount: SecretKey,
}

impl ECDHTuple {
    /// Encodes an output's mask and amount with the output's shared secret
    pub fn encode(mask: &SecretKey, amount: u64, shared_secret: &SecretKey) -> ECDHTuple {
        let mask_offset = ecdh_hash(shared_secret);
        let amount_offset = ecdh_hash(&mask_offset);

        ECDHTuple {
            mask: mask + mask_offset,
            amount: SecretKey::from(amount) + amount_offset,
        }
    }

    /// Recovers `(mask, amount)` from the tuple
    ///
    /// The amount is returned as a scalar; it is only meaningful if it fits in 64 bits,
    /// which the caller can confirm by recomputing the output commitment
    pub fn decode(&self, shared_secret: &SecretKey) -> (SecretKey, SecretKey) {
        let mask_offset = ecdh_hash(shared_secret);
        let amount_offset = ecdh_hash(&mask_offset);

        (self.mask - mask_offset, self.amount - amount_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn recipient_recovers_mask_and_amount() {
        let mut rng = StdRng::seed_from_u64(3);
        let shared_secret = SecretKey::random(&mut rng);
        let mask = SecretKey::random(&mut rng);

        let tuple = ECDHTuple::encode(&mask, 900_000, &shared_secret);
        assert_ne!(tuple.amount, SecretKey::from(900_000u64));

        let (decoded_mask, decoded_amount) = tuple.decode(&shared_secret);
        assert_eq!(decoded_mask, mask);
        assert_eq!(decoded_amount, SecretKey::from(900_000u64));
    }

    #[test]
    fn wrong_secret_does_not_decode() {
        let mut rng = StdRng::seed_from_u64(4);
        let mask = SecretKey::random(&mut rng);
        let tuple = ECDHTuple::encode(&mask, 1, &SecretKey::random(&mut rng));

        let (decoded_mask, _) = tuple.decode(&SecretKey::random(&mut rng));
        assert_ne!(decoded_mask, mask);
    }
}
