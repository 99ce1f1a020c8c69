//! Elliptic curve and hashing primitives for CryptoNote style transactions

pub use curve25519_dalek;
pub use digest::Digest;

pub mod ecc;
mod field;
pub mod hash;
mod keys;

pub use ecc::{PointExt, ScalarExt};
pub use hash::{CNFastHash, Hash256, Hash256Data, Hash8, Hash8Data};
pub use keys::{KeyImage, KeyPair, PublicKey, SecretKey};
