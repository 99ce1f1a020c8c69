//! The `extra` field of a transaction: a sequence of tagged fields
//!
//! Fields are kept as a list of variants rather than raw bytes. Replacing a field removes
//! every field with the same tag first, so at most one of each kind set during construction
//! is ever present.

use serde::{Deserialize, Serialize};

use ensure_macro::ensure;

use crypto::{ecc::PointExt, Hash256, Hash256Data, Hash8, Hash8Data, PublicKey};

pub const TX_EXTRA_PADDING_MAX_COUNT: usize = 255;
pub const TX_EXTRA_NONCE_MAX_COUNT: usize = 255;

pub const TX_EXTRA_TAG_PADDING: u8 = 0x00;
pub const TX_EXTRA_TAG_PUBKEY: u8 = 0x01;
pub const TX_EXTRA_TAG_NONCE: u8 = 0x02;
pub const TX_EXTRA_TAG_MERGE_MINING: u8 = 0x03;
pub const TX_EXTRA_TAG_ADDITIONAL_PUBKEYS: u8 = 0x04;

const TX_EXTRA_NONCE_PAYMENT_ID: u8 = 0x00;
const TX_EXTRA_NONCE_ENCRYPTED_PAYMENT_ID: u8 = 0x01;

/// Error type for parsing the extra field
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// Returned when a field runs past the end of the data
    #[error("Extra field is truncated")]
    Truncated,

    /// Returned when a public key does not decode to a curve point
    #[error("Extra field contains an invalid public key")]
    InvalidPoint,

    /// Returned when padding is too long or contains non-zero bytes
    #[error("Invalid padding in extra field")]
    InvalidPadding,

    /// Returned when a nonce exceeds `TX_EXTRA_NONCE_MAX_COUNT` bytes
    #[error("Extra nonce is too long")]
    NonceTooLong,

    /// Returned for unrecognised tags
    #[error("Unknown extra field tag {0:#04x}")]
    UnknownTag(u8),
}

/// Nonces added to the transaction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TXNonce {
    /// Plaintext payment ID
    PaymentId(Hash256),
    /// The Encrypted Payment ID for this transaction
    ///
    /// Useful for identifying transactions by the receiver
    EncryptedPaymentId(Hash8),
    /// Any other nonce
    Custom(Vec<u8>),
}

impl TXNonce {
    /// Classifies raw nonce bytes
    pub fn from_bytes(data: &[u8]) -> TXNonce {
        match data.split_first() {
            Some((&TX_EXTRA_NONCE_PAYMENT_ID, id)) if id.len() == 32 => {
                TXNonce::PaymentId(Hash256::from(Hash256Data::clone_from_slice(id)))
            }
            Some((&TX_EXTRA_NONCE_ENCRYPTED_PAYMENT_ID, id)) if id.len() == 8 => {
                TXNonce::EncryptedPaymentId(Hash8::from(Hash8Data::clone_from_slice(id)))
            }
            _ => TXNonce::Custom(data.to_vec()),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        match self {
            TXNonce::PaymentId(id) => {
                let mut data = vec![TX_EXTRA_NONCE_PAYMENT_ID];
                data.extend_from_slice(id.data());
                data
            }
            TXNonce::EncryptedPaymentId(id) => {
                let mut data = vec![TX_EXTRA_NONCE_ENCRYPTED_PAYMENT_ID];
                data.extend_from_slice(id.data());
                data
            }
            TXNonce::Custom(data) => data.clone(),
        }
    }
}

/// Extra information added to the transaction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TXExtra {
    /// Zero bytes up to the end of the field. Holds the count of zeros after the tag
    Padding(usize),
    /// Public key of this transaction (for determining output secret key)
    TxPublicKey(PublicKey),
    /// Nonces for this transaction
    TxNonce(TXNonce),
    /// Merge mining tag
    MergeMiningTag { depth: u64, merkle_root: Hash256 },
    /// Additional public keys for this transaction, one per output
    TxAdditionalPublicKeys(Vec<PublicKey>),
}

impl TXExtra {
    pub fn tag(&self) -> u8 {
        match self {
            TXExtra::Padding(_) => TX_EXTRA_TAG_PADDING,
            TXExtra::TxPublicKey(_) => TX_EXTRA_TAG_PUBKEY,
            TXExtra::TxNonce(_) => TX_EXTRA_TAG_NONCE,
            TXExtra::MergeMiningTag { .. } => TX_EXTRA_TAG_MERGE_MINING,
            TXExtra::TxAdditionalPublicKeys(_) => TX_EXTRA_TAG_ADDITIONAL_PUBKEYS,
        }
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.push(self.tag());
        match self {
            TXExtra::Padding(size) => {
                buf.extend(std::iter::repeat(0).take(*size));
            }
            TXExtra::TxPublicKey(key) => {
                buf.extend_from_slice(key.compress().as_bytes());
            }
            TXExtra::TxNonce(nonce) => {
                let data = nonce.to_bytes();
                buf.extend(varint::serialize(data.len() as u64));
                buf.extend(data);
            }
            TXExtra::MergeMiningTag { depth, merkle_root } => {
                let mut field = varint::serialize(*depth);
                field.extend_from_slice(merkle_root.data());
                buf.extend(varint::serialize(field.len() as u64));
                buf.extend(field);
            }
            TXExtra::TxAdditionalPublicKeys(keys) => {
                buf.extend(varint::serialize(keys.len() as u64));
                for key in keys {
                    buf.extend_from_slice(key.compress().as_bytes());
                }
            }
        }
    }
}

/// Cursor over raw extra bytes
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn read_varint(&mut self) -> Result<u64, Error> {
        let (value, len) = varint::deserialize(self.remaining()).ok_or(Error::Truncated)?;
        self.pos += len;
        Ok(value)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        ensure!(self.remaining().len() >= len, Error::Truncated);
        let data = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(data)
    }

    fn read_point(&mut self) -> Result<PublicKey, Error> {
        PublicKey::from_slice(self.read_bytes(32)?).ok_or(Error::InvalidPoint)
    }
}

/// All the extra fields of a transaction, in order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraFields(Vec<TXExtra>);

impl ExtraFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw extra field
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader { bytes, pos: 0 };
        let mut fields = Vec::new();

        while let Some((&tag, _)) = reader.remaining().split_first() {
            reader.pos += 1;
            let field = match tag {
                TX_EXTRA_TAG_PADDING => {
                    // Padding runs to the end of the extra field
                    let padding = reader.remaining();
                    ensure!(
                        padding.len() < TX_EXTRA_PADDING_MAX_COUNT,
                        Error::InvalidPadding
                    );
                    ensure!(padding.iter().all(|&b| b == 0), Error::InvalidPadding);
                    reader.pos = bytes.len();
                    TXExtra::Padding(padding.len())
                }
                TX_EXTRA_TAG_PUBKEY => TXExtra::TxPublicKey(reader.read_point()?),
                TX_EXTRA_TAG_NONCE => {
                    let len = reader.read_varint()? as usize;
                    ensure!(len <= TX_EXTRA_NONCE_MAX_COUNT, Error::NonceTooLong);
                    TXExtra::TxNonce(TXNonce::from_bytes(reader.read_bytes(len)?))
                }
                TX_EXTRA_TAG_MERGE_MINING => {
                    let len = reader.read_varint()? as usize;
                    let mut field = Reader {
                        bytes: reader.read_bytes(len)?,
                        pos: 0,
                    };
                    let depth = field.read_varint()?;
                    let merkle_root = Hash256::from(Hash256Data::clone_from_slice(field.read_bytes(32)?));
                    ensure!(field.remaining().is_empty(), Error::Truncated);
                    TXExtra::MergeMiningTag { depth, merkle_root }
                }
                TX_EXTRA_TAG_ADDITIONAL_PUBKEYS => {
                    let count = reader.read_varint()? as usize;
                    ensure!(
                        count <= reader.remaining().len() / 32,
                        Error::Truncated
                    );
                    let keys = (0..count)
                        .map(|_| reader.read_point())
                        .collect::<Result<Vec<_>, _>>()?;
                    TXExtra::TxAdditionalPublicKeys(keys)
                }
                other => return Err(Error::UnknownTag(other)),
            };
            fields.push(field);
        }

        Ok(ExtraFields(fields))
    }

    /// Canonical byte representation, as hashed into the transaction prefix
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for field in &self.0 {
            field.write(&mut buf);
        }
        buf
    }

    pub fn fields(&self) -> &[TXExtra] {
        &self.0
    }

    /// First field with the given tag
    pub fn find(&self, tag: u8) -> Option<&TXExtra> {
        self.0.iter().find(|field| field.tag() == tag)
    }

    /// Removes every field with the same tag as `field`, then adds `field`
    ///
    /// Padding stays at the end
    pub fn replace(&mut self, field: TXExtra) {
        self.remove(field.tag());
        match self.0.iter().position(|f| f.tag() == TX_EXTRA_TAG_PADDING) {
            Some(index) => self.0.insert(index, field),
            None => self.0.push(field),
        }
    }

    /// Removes every field with the given tag
    pub fn remove(&mut self, tag: u8) {
        self.0.retain(|field| field.tag() != tag);
    }

    pub fn tx_public_key(&self) -> Option<PublicKey> {
        match self.find(TX_EXTRA_TAG_PUBKEY) {
            Some(TXExtra::TxPublicKey(key)) => Some(*key),
            _ => None,
        }
    }

    pub fn additional_public_keys(&self) -> Option<&[PublicKey]> {
        match self.find(TX_EXTRA_TAG_ADDITIONAL_PUBKEYS) {
            Some(TXExtra::TxAdditionalPublicKeys(keys)) => Some(keys),
            _ => None,
        }
    }

    pub fn nonce(&self) -> Option<&TXNonce> {
        match self.find(TX_EXTRA_TAG_NONCE) {
            Some(TXExtra::TxNonce(nonce)) => Some(nonce),
            _ => None,
        }
    }
}
