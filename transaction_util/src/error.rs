use thiserror::Error;

/// Error type for transaction construction
///
/// Every error aborts construction; no partial transaction is returned
#[derive(Error, Debug)]
pub enum Error {
    /// Returned when there are no transaction sources
    #[error("No transaction sources")]
    NoSources,

    /// Returned when there are no transaction destinations
    #[error("No transaction destinations")]
    NoDestinations,

    /// Returned when a key derivation results in the identity point
    #[error("Degenerate key derivation")]
    Derivation,

    /// Returned when the real output of a source does not belong to the sender
    #[error("Real output of source {index} does not belong to the sender")]
    InputMismatch {
        /// Index of the offending source
        index: usize,
    },

    /// Returned when the index of the real output is beyond the mixin set provided
    #[error("Real output index of source {index} is beyond its output mixin set")]
    RealIndexOutOfBounds {
        /// Index of the offending source
        index: usize,
    },

    /// Returned when the ring of a source is not sorted by global offset
    #[error("Ring offsets of source {index} are not strictly increasing")]
    UnsortedRingOffsets {
        /// Index of the offending source
        index: usize,
    },

    /// Returned when a full signature is requested for sources which do not share
    /// a ring size and real index
    #[error("Sources do not share a ring size and real output index")]
    MixinMismatch,

    /// Returned when the recipient of an encrypted payment ID cannot be determined
    #[error("Encrypted payment IDs need exactly one recipient")]
    AmbiguousRecipient,

    /// Returned when the transaction has more than one payment ID
    #[error("Transaction has more than one payment ID")]
    MultiplePaymentIds,

    /// Returned when the sum of output amounts is greater than the sum of input amounts
    #[error("Transaction spends {outputs} but only has {inputs} as input")]
    InsufficientFunds {
        /// Sum of the source amounts
        inputs: u64,
        /// Sum of the destination amounts
        outputs: u64,
    },

    /// Returned when summing amounts overflows
    #[error("Amount overflow")]
    AmountOverflow,

    /// Returned when the given extra field cannot be parsed
    #[error("Invalid extra field: {0}")]
    Extra(#[from] common::extra::Error),

    /// Returned when there is an error when creating the RingCT signature
    #[error(transparent)]
    RingCT(#[from] ringct::Error),
}

/// Result type used throughout this crate
pub type Result<T> = std::result::Result<T, Error>;
