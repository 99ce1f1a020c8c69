//! Output order randomization
//!
//! Outputs are written in a random order so that their position does not reveal which one
//! is the change.

use rand::{seq::SliceRandom, Rng};

/// Random permutation of `0..len`
///
/// Entry `i` is the index of the destination placed at output position `i`
pub fn permutation<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}
