//! # Ring Confidential Transactions (RingCT)
//! This implementation is based on the whitepaper, producing the two original signature
//! layouts: a single MLSAG over a shared ring (`Full`) and one MLSAG per input (`Simple`)

use lazy_static::lazy_static;

use crypto::ecc::{CompressedPoint, Point, PointTable};

pub mod borromean;
mod commitment;
mod ecdh;
mod matrix;
pub mod mlsag;
mod ringct;

pub use crate::ringct::{
    sign, sign_full, sign_simple, verify, DestinationCommitmentPair, Error, RingCTBase,
    RingCTInput, RingCTOutput, RingCTSignature, RingCTType,
};
pub use commitment::Commitment;
pub use ecdh::ECDHTuple;
pub use matrix::Matrix;

/// Compressed encoding of `H`, the second generator used for blinding amounts
const MASK_BASEPOINT_COMPRESSED: [u8; 32] = [
    0x8b, 0x65, 0x59, 0x70, 0x15, 0x37, 0x99, 0xaf, 0x2a, 0xea, 0xdc, 0x9f, 0xf1, 0xad, 0xd0, 0xea,
    0x6c, 0x72, 0x51, 0xd5, 0x41, 0x54, 0xcf, 0xa9, 0x2c, 0x17, 0x3a, 0x0d, 0xd3, 0x9c, 0x1f, 0x94,
];

lazy_static! {
    /// `H = 8 * decompress(Keccak(G))`: Generator for the amount component of commitments
    pub static ref MASK_BASEPOINT: Point = CompressedPoint(MASK_BASEPOINT_COMPRESSED)
        .decompress()
        .expect("H is a fixed valid point");
    /// Precomputed multiples of `H`
    pub static ref MASK_BASEPOINT_TABLE: PointTable = PointTable::create(&MASK_BASEPOINT);
}
