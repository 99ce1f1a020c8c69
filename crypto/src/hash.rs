use std::convert::{From, TryFrom};
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The Keccak (pre-standard SHA3) hash used throughout CryptoNote
pub type CNFastHash = sha3::Keccak256;

pub type Hash256Data = generic_array::GenericArray<u8, generic_array::typenum::U32>;
pub type Hash8Data = generic_array::GenericArray<u8, generic_array::typenum::U8>;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Hash256(Hash256Data);

impl Hash256 {
    pub fn null_hash() -> Self {
        Hash256::from(Hash256Data::from([0; 32]))
    }
    pub fn data(&self) -> &Hash256Data {
        &self.0
    }
}

impl Display for Hash256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<Hash256Data> for Hash256 {
    fn from(data: Hash256Data) -> Self {
        Hash256(data)
    }
}

impl TryFrom<&str> for Hash256 {
    type Error = hex::FromHexError;
    fn try_from(data: &str) -> Result<Self, Self::Error> {
        if data.len() != 64 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        Ok(Hash256(Hash256Data::clone_from_slice(&hex::decode(data)?)))
    }
}

/// Short 8 byte hash, used for (encrypted) payment IDs
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Hash8(Hash8Data);

impl Hash8 {
    pub fn null_hash() -> Self {
        Hash8::from(Hash8Data::from([0; 8]))
    }
    pub fn data(&self) -> &Hash8Data {
        &self.0
    }
}

impl Display for Hash8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<Hash8Data> for Hash8 {
    fn from(data: Hash8Data) -> Self {
        Hash8(data)
    }
}

impl From<[u8; 8]> for Hash8 {
    fn from(data: [u8; 8]) -> Self {
        Hash8(Hash8Data::from(data))
    }
}
