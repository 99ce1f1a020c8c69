use rand::{rngs::OsRng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::ecc::{Point, Scalar, BASEPOINT_TABLE};

/// An unsigned 256-bit value used as a private key. Represented with lowercase letters
pub type SecretKey = Scalar;

/// A point on the elliptic curve. Usually determined by multiplication of a scalar to the curve
/// basepoint
pub type PublicKey = Point;

/// Type alias specific to Cryptonote
pub type KeyImage = PublicKey;

/// A pair of a given secret key and its corresponding public key
///
/// The secret key is wiped when the pair is dropped
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyPair {
    /// The secret key
    pub secret_key: SecretKey,
    /// The public key
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a random keypair using the OS CSPRNG
    pub fn generate() -> Self {
        Self::random(&mut OsRng)
    }

    /// Generates a random keypair from the given CSPRNG
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from(Scalar::random(rng))
    }
}

impl From<Scalar> for KeyPair {
    fn from(secret_key: SecretKey) -> Self {
        let public_key = &secret_key * &BASEPOINT_TABLE;
        Self {
            secret_key,
            public_key,
        }
    }
}

impl Zeroize for KeyPair {
    fn zeroize(&mut self) {
        self.secret_key.zeroize();
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key.compress())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::ScalarExt;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn public_key_matches_known_vector() {
        // Known view key vector
        let kp = KeyPair::from(Scalar::from_slice(
            &hex::decode("cae2b02f3a317b0ef61e694d899060f8434aef556bfe60239846533b52ab4608")
                .unwrap(),
        ));
        assert_eq!(
            hex::encode(kp.public_key.compress().to_bytes()),
            "36440552e76c9029d22edb4db283b0d9daf2ed21001728248eb4300eaba7f4e0"
        );
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = KeyPair::random(&mut StdRng::seed_from_u64(7));
        let b = KeyPair::random(&mut StdRng::seed_from_u64(7));
        assert_eq!(a.public_key, b.public_key);
    }

    #[test]
    fn zeroize_wipes_the_secret_key() {
        let mut kp = KeyPair::generate();
        kp.zeroize();
        assert_eq!(kp.secret_key, Scalar::zero());
    }
}
