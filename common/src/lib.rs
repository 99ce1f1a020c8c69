//! Transaction data model: inputs, outputs, the extra field and transaction identity

pub mod extra;
pub mod key_offsets;
mod traits;
mod transaction;

pub use extra::{ExtraFields, TXExtra, TXNonce};
pub use traits::GetHash;
pub use transaction::{
    Transaction, TransactionPrefix, TXIn, TXOut, TXOutTarget, CURRENT_TRANSACTION_VERSION,
};
