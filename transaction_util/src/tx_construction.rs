//! Module for constructing Cryptonote transactions
//!
//! Construction runs through a fixed sequence of states: the extra field is built, inputs
//! are bound to key images, outputs are derived in a shuffled order, the balance is checked
//! and finally the RingCT signature is attached. Any failure aborts the whole construction.

use log::{debug, info, warn};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use zeroize::Zeroize;

use common::{
    key_offsets, ExtraFields, GetHash, TXExtra, TXIn, TXNonce, TXOut, TXOutTarget, Transaction,
    TransactionPrefix, CURRENT_TRANSACTION_VERSION,
};
use crypto::{
    curve25519_dalek::traits::Identity, ecc::Point, Hash256, Hash8, KeyPair, SecretKey,
};
use ensure_macro::ensure;
use ringct::{RingCTInput, RingCTOutput, RingCTSignature, RingCTType};

use crate::{
    account_keys::AccountKeys, derivation::Derivation, key_image,
    payment_id, shuffle, subaddress, tx_scanning, Address, Error, Result, TXDestination,
    TXDestinationType, TXSource,
};

/// Choice of RingCT signature layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RctMode {
    /// Simple for more than one input, full otherwise
    Auto,
    /// One MLSAG over a shared ring. Needs equal ring sizes and real indices
    Full,
    /// One MLSAG per input
    Simple,
}

impl Default for RctMode {
    fn default() -> Self {
        RctMode::Auto
    }
}

impl RctMode {
    fn signature_type(self, sources: &[TXSource]) -> Result<RingCTType> {
        match self {
            RctMode::Simple => Ok(RingCTType::Simple),
            RctMode::Auto if sources.len() > 1 => Ok(RingCTType::Simple),
            RctMode::Auto => Ok(RingCTType::Full),
            RctMode::Full => {
                let index = sources[0].real_output_index;
                let ring_size = sources[0].outputs.len();
                ensure!(
                    sources.iter().all(|source| source.real_output_index == index
                        && source.outputs.len() == ring_size),
                    Error::MixinMismatch
                );
                Ok(RingCTType::Full)
            }
        }
    }
}

/// Builds the RingCT signature of an assembled transaction
pub trait ProofEngine {
    /// Signs `message` spending `inputs` towards `outputs`
    ///
    /// Returns the signature along with the output commitment masks
    fn prove<R: RngCore + CryptoRng>(
        &mut self,
        signature_type: RingCTType,
        message: Hash256,
        inputs: &[RingCTInput],
        outputs: &[RingCTOutput],
        fee: u64,
        rng: &mut R,
    ) -> std::result::Result<(RingCTSignature, Vec<SecretKey>), ringct::Error>;
}

/// Proof engine backed by `ringct::sign`
#[derive(Clone, Copy, Debug, Default)]
pub struct RingCTProver;

impl ProofEngine for RingCTProver {
    fn prove<R: RngCore + CryptoRng>(
        &mut self,
        signature_type: RingCTType,
        message: Hash256,
        inputs: &[RingCTInput],
        outputs: &[RingCTOutput],
        fee: u64,
        rng: &mut R,
    ) -> std::result::Result<(RingCTSignature, Vec<SecretKey>), ringct::Error> {
        ringct::sign(signature_type, message, inputs, outputs, fee, rng)
    }
}

/// Secret material produced alongside a transaction
///
/// Only meant for the sender, e.g. for proving a payment later. Wiped on drop
pub struct TxKeys {
    /// Transaction secret key `r`
    pub tx_secret_key: SecretKey,
    /// One secret key per output when additional transaction keys are used
    pub additional_tx_secret_keys: Vec<SecretKey>,
    /// Commitment masks of the outputs, in output order. Empty for unsigned transactions
    pub output_masks: Vec<SecretKey>,
}

impl Drop for TxKeys {
    fn drop(&mut self) {
        self.tx_secret_key.zeroize();
        self.additional_tx_secret_keys.zeroize();
        self.output_masks.zeroize();
    }
}

/// Destinations grouped by the kind of key derivation they need
struct DestinationSummary<'d> {
    standard: Vec<&'d Address>,
    subaddresses: Vec<&'d Address>,
    payment_id: Option<Hash8>,
}

impl<'d> DestinationSummary<'d> {
    /// Counts the distinct addresses paid to, ignoring change
    ///
    /// Also grabs the payment ID of an integrated address
    fn classify(destinations: &'d [TXDestination]) -> Result<Self> {
        let mut summary = DestinationSummary {
            standard: Vec::new(),
            subaddresses: Vec::new(),
            payment_id: None,
        };

        for destination in destinations {
            // Change pays to the sender
            let address = match &destination.destination_type {
                TXDestinationType::PayToAddress(address) => address,
                TXDestinationType::Change(_) => continue,
            };

            if let Some(payment_id) = address.payment_id() {
                // Check if we've got a payment ID already
                ensure!(
                    summary.payment_id.is_none() || summary.payment_id == Some(payment_id),
                    Error::MultiplePaymentIds
                );
                summary.payment_id = Some(payment_id);
            }

            let group = if address.is_subaddress() {
                &mut summary.subaddresses
            } else {
                &mut summary.standard
            };
            if !group.iter().any(|known| known.same_keys(address)) {
                group.push(address);
            }
        }

        Ok(summary)
    }

    /// The lone subaddress when it is the only recipient
    fn single_subaddress(&self) -> Option<&'d Address> {
        match (self.standard.len(), self.subaddresses.as_slice()) {
            (0, [address]) => Some(*address),
            _ => None,
        }
    }

    /// More than one transaction key is needed when paying a subaddress along with any other
    /// address
    fn needs_additional_keys(&self) -> bool {
        !self.subaddresses.is_empty() && (!self.standard.is_empty() || self.subaddresses.len() > 1)
    }
}

/// Builds signed transactions for one sender
///
/// Randomness and the proof engine are injected so that construction can be made
/// reproducible or instrumented.
pub struct TxConstructor<'a, R, P = RingCTProver> {
    sender_keys: &'a AccountKeys,
    rng: R,
    prover: P,
}

impl<'a, R: RngCore + CryptoRng> TxConstructor<'a, R, RingCTProver> {
    /// Constructor using the RingCT signature engine
    pub fn new(sender_keys: &'a AccountKeys, rng: R) -> Self {
        Self::with_prover(sender_keys, rng, RingCTProver)
    }
}

impl<'a, R: RngCore + CryptoRng, P: ProofEngine> TxConstructor<'a, R, P> {
    /// Constructor using the given proof engine
    pub fn with_prover(sender_keys: &'a AccountKeys, rng: R, prover: P) -> Self {
        TxConstructor {
            sender_keys,
            rng,
            prover,
        }
    }

    /// The proof engine in use
    pub fn prover(&self) -> &P {
        &self.prover
    }

    /// Constructs a transaction spending the given sources towards the given destinations
    ///
    /// `extra` holds the caller's extra field, which may carry a payment ID nonce. Returns
    /// the transaction along with its secret keys.
    pub fn construct(
        &mut self,
        sources: &[TXSource],
        destinations: &[TXDestination],
        extra: &[u8],
        unlock_time: u64,
        mode: RctMode,
    ) -> Result<(Transaction, TxKeys)> {
        // Perform sanity checks
        ensure!(!sources.is_empty(), Error::NoSources);
        ensure!(!destinations.is_empty(), Error::NoDestinations);

        let sender_keys = self.sender_keys;
        let watch_only = sender_keys.is_watch_only();
        if watch_only {
            warn!("Null secret spend key, skipping signatures");
        }

        // Extra field
        let mut extra = ExtraFields::parse(extra)?;
        let summary = DestinationSummary::classify(destinations)?;

        if let Some(payment_id) = summary.payment_id {
            ensure!(
                !matches!(
                    extra.nonce(),
                    Some(TXNonce::PaymentId(_)) | Some(TXNonce::EncryptedPaymentId(_))
                ),
                Error::MultiplePaymentIds
            );
            // Encrypted below like any caller supplied short payment ID
            extra.replace(TXExtra::TxNonce(TXNonce::EncryptedPaymentId(payment_id)));
        }

        // Create the transaction keypair (r, R = rG)
        let mut tx_keypair = KeyPair::random(&mut self.rng);
        if let Some(address) = summary.single_subaddress() {
            // A single subaddress recipient gets R = rD
            tx_keypair.public_key = tx_keypair.secret_key * address.spend_public_key;
        }
        extra.replace(TXExtra::TxPublicKey(tx_keypair.public_key));

        let plain_payment_id = match extra.nonce() {
            Some(TXNonce::EncryptedPaymentId(payment_id)) => Some(*payment_id),
            _ => None,
        };
        if let Some(payment_id) = plain_payment_id {
            let view_public_key = payment_id::find_destination_view_key(sender_keys, destinations)?;
            let encrypted =
                payment_id::encrypt_for(payment_id, &view_public_key, &tx_keypair.secret_key)?;
            extra.replace(TXExtra::TxNonce(TXNonce::EncryptedPaymentId(encrypted)));
        }
        debug!("Extra field built with {} fields", extra.fields().len());

        // Inputs
        let mut in_amount: u64 = 0;
        let mut inputs = Vec::with_capacity(sources.len());
        let mut input_keypairs = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let (_, real_output) = source
                .outputs
                .get(source.real_output_index)
                .ok_or(Error::RealIndexOutOfBounds { index })?;

            in_amount = in_amount
                .checked_add(source.amount)
                .ok_or(Error::AmountOverflow)?;

            let key_image = if watch_only {
                ensure!(
                    tx_scanning::output_belongs_to(
                        sender_keys,
                        &source.subaddress_index,
                        source.real_output_tx_index,
                        &real_output.destination,
                        &source.real_output_tx_public_keys,
                    ),
                    Error::InputMismatch { index }
                );
                Point::identity()
            } else {
                // x * H_p(P)
                let (keypair, key_image) = key_image::generate_key_image(
                    sender_keys,
                    &source.subaddress_index,
                    &source.real_output_tx_public_keys,
                    source.real_output_tx_index,
                    &real_output.destination,
                )
                .ok_or(Error::InputMismatch { index })?;
                input_keypairs.push(keypair);
                key_image
            };

            let absolute_offsets: Vec<u64> =
                source.outputs.iter().map(|(offset, _)| *offset).collect();
            let key_offsets = key_offsets::absolute_to_relative(&absolute_offsets)
                .ok_or(Error::UnsortedRingOffsets { index })?;

            inputs.push(TXIn::FromKey {
                amount: source.amount,
                key_offsets,
                key_image,
            });
        }
        debug!("Bound {} inputs worth {}", inputs.len(), in_amount);

        // Outputs, in a shuffled order
        let order = shuffle::permutation(destinations.len(), &mut self.rng);
        let need_additional_keys = summary.needs_additional_keys();

        let mut out_amount: u64 = 0;
        let mut outputs = Vec::with_capacity(destinations.len());
        let mut amount_keys = Vec::with_capacity(destinations.len());
        let mut additional_keypairs = Vec::new();
        for (output_index, &destination_index) in order.iter().enumerate() {
            let destination = &destinations[destination_index];
            let output_index = output_index as u64;

            let address = match &destination.destination_type {
                TXDestinationType::Change(index) => {
                    subaddress::get_address_for_index(sender_keys, index)
                }
                TXDestinationType::PayToAddress(address) => address.clone(),
            };

            let additional_keypair = if need_additional_keys {
                let mut keypair = KeyPair::random(&mut self.rng);
                if address.is_subaddress() {
                    keypair.public_key = keypair.secret_key * address.spend_public_key;
                }
                Some(keypair)
            } else {
                None
            };

            let (output_key, amount_key) = match &destination.destination_type {
                TXDestinationType::Change(_) => {
                    // Change to ourselves, aR
                    let derivation = Derivation::from(
                        &sender_keys.view_keypair.secret_key,
                        &tx_keypair.public_key,
                    )
                    .ok_or(Error::Derivation)?;
                    (
                        derivation.to_public_key(output_index, &address.spend_public_key),
                        derivation.to_scalar(output_index),
                    )
                }
                TXDestinationType::PayToAddress(_) => {
                    // rA, with the output's own key for subaddresses
                    let secret_key = match &additional_keypair {
                        Some(keypair) if address.is_subaddress() => &keypair.secret_key,
                        _ => &tx_keypair.secret_key,
                    };
                    crate::derive_output(&address, secret_key, output_index)?
                }
            };

            if let Some(keypair) = additional_keypair {
                additional_keypairs.push(keypair);
            }

            out_amount = out_amount
                .checked_add(destination.amount)
                .ok_or(Error::AmountOverflow)?;
            amount_keys.push(amount_key);
            outputs.push(TXOut {
                amount: destination.amount,
                target: TXOutTarget::ToKey { key: output_key },
            });
        }

        if need_additional_keys {
            extra.replace(TXExtra::TxAdditionalPublicKeys(
                additional_keypairs
                    .iter()
                    .map(|keypair| keypair.public_key)
                    .collect(),
            ));
        }
        debug!("Bound {} outputs worth {}", outputs.len(), out_amount);

        // Check if the transaction is spending more than its inputs
        ensure!(
            out_amount <= in_amount,
            Error::InsufficientFunds {
                inputs: in_amount,
                outputs: out_amount,
            }
        );
        let fee = in_amount - out_amount;
        let signature_type = mode.signature_type(sources)?;
        debug!("Balance checked, fee {}, signing as {:?}", fee, signature_type);

        let mut tx_keys = TxKeys {
            tx_secret_key: tx_keypair.secret_key,
            additional_tx_secret_keys: additional_keypairs
                .iter()
                .map(|keypair| keypair.secret_key)
                .collect(),
            output_masks: Vec::new(),
        };

        let mut transaction = Transaction::new(
            TransactionPrefix {
                version: CURRENT_TRANSACTION_VERSION,
                unlock_time,
                inputs,
                outputs,
                extra,
            },
            None,
        );

        if watch_only {
            // Amounts stay in place for whoever holds the spend key
            amount_keys.zeroize();
            info!("Created unsigned transaction {}", transaction.get_hash());
            return Ok((transaction, tx_keys));
        }

        // Convert the transaction inputs and outputs into a form recognizable by RingCT
        let rct_inputs: Vec<RingCTInput> = sources
            .iter()
            .zip(input_keypairs.iter())
            .map(|(source, keypair)| RingCTInput {
                destination_secret_key: keypair.secret_key,
                commitment_secret_key: source.amount_mask,
                amount: source.amount,
                ring_index: source.real_output_index,
                ring_row: source.outputs.iter().map(|(_, pair)| *pair).collect(),
            })
            .collect();
        let rct_outputs: Vec<RingCTOutput> = transaction
            .prefix
            .outputs
            .iter()
            .zip(amount_keys.iter())
            .map(|(output, amount_key)| {
                let TXOutTarget::ToKey { key } = &output.target;
                RingCTOutput {
                    destination_public_key: *key,
                    amount: output.amount,
                    amount_secret_key: *amount_key,
                }
            })
            .collect();
        amount_keys.zeroize();

        // From here on, amounts only live in the commitments
        for input in transaction.prefix.inputs.iter_mut() {
            if let TXIn::FromKey { amount, .. } = input {
                *amount = 0;
            }
        }
        for output in transaction.prefix.outputs.iter_mut() {
            output.amount = 0;
        }

        let message = transaction.prefix.get_hash();
        let (signature, output_masks) = self.prover.prove(
            signature_type,
            message,
            &rct_inputs,
            &rct_outputs,
            fee,
            &mut self.rng,
        )?;
        tx_keys.output_masks = output_masks;

        transaction.rct_signature = Some(signature);
        transaction.invalidate_hashes();

        info!("Created transaction {}", transaction.get_hash());
        Ok((transaction, tx_keys))
    }
}

/// Constructs a transaction with the OS random number generator and the RingCT prover
pub fn construct_tx(
    sender_keys: &AccountKeys,
    sources: &[TXSource],
    destinations: &[TXDestination],
    extra: &[u8],
    unlock_time: u64,
    mode: RctMode,
) -> Result<(Transaction, TxKeys)> {
    TxConstructor::new(sender_keys, OsRng).construct(
        sources,
        destinations,
        extra,
        unlock_time,
        mode,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{derive_output, SubAddressIndex};
    use common::extra::TX_EXTRA_TAG_PUBKEY;
    use crypto::ecc::{Scalar, BASEPOINT_TABLE};
    use rand::{rngs::StdRng, SeedableRng};
    use ringct::{Commitment, DestinationCommitmentPair};

    fn account(rng: &mut StdRng) -> AccountKeys {
        AccountKeys::from(Scalar::random(rng))
    }

    /// A source whose real output pays to `owner`, hidden among random decoys
    fn mock_source(
        rng: &mut StdRng,
        owner: &AccountKeys,
        amount: u64,
        ring_size: usize,
        real_output_index: usize,
    ) -> TXSource {
        let tx_keypair = KeyPair::random(rng);
        let real_output_tx_index = 1;
        let (output_key, _) =
            derive_output(&owner.address(), &tx_keypair.secret_key, real_output_tx_index)
                .unwrap();
        let amount_mask = Scalar::random(rng);

        let mut outputs = Vec::new();
        for i in 0..ring_size {
            let pair = if i == real_output_index {
                DestinationCommitmentPair {
                    destination: output_key,
                    commitment: Commitment::new(amount, amount_mask).to_public(),
                }
            } else {
                DestinationCommitmentPair {
                    destination: KeyPair::random(rng).public_key,
                    commitment: KeyPair::random(rng).public_key,
                }
            };
            outputs.push((100 * (i as u64 + 1), pair));
        }

        TXSource {
            amount,
            amount_mask,
            outputs,
            real_output_index,
            real_output_tx_index,
            real_output_tx_public_keys: vec![tx_keypair.public_key],
            subaddress_index: SubAddressIndex::PRIMARY,
        }
    }

    fn pay_to(address: Address, amount: u64) -> TXDestination {
        TXDestination {
            amount,
            destination_type: TXDestinationType::PayToAddress(address),
        }
    }

    fn change(amount: u64) -> TXDestination {
        TXDestination {
            amount,
            destination_type: TXDestinationType::Change(SubAddressIndex::PRIMARY),
        }
    }

    fn output_key(transaction: &Transaction, index: usize) -> Point {
        let TXOutTarget::ToKey { key } = &transaction.prefix.outputs[index].target;
        *key
    }

    /// Counts the signatures it is asked to build
    #[derive(Default)]
    struct CountingProver {
        calls: usize,
    }

    impl ProofEngine for CountingProver {
        fn prove<R: RngCore + CryptoRng>(
            &mut self,
            signature_type: RingCTType,
            message: Hash256,
            inputs: &[RingCTInput],
            outputs: &[RingCTOutput],
            fee: u64,
            rng: &mut R,
        ) -> std::result::Result<(RingCTSignature, Vec<SecretKey>), ringct::Error> {
            self.calls += 1;
            ringct::sign(signature_type, message, inputs, outputs, fee, rng)
        }
    }

    #[test]
    fn it_creates_transactions_correctly() {
        let mut rng = StdRng::seed_from_u64(100);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let sources = vec![mock_source(&mut rng, &sender, 1_000_000, 5, 2)];
        let destinations = vec![pay_to(recipient.address(), 900_000)];

        let (transaction, tx_keys) = TxConstructor::new(&sender, rng)
            .construct(&sources, &destinations, &[], 0, RctMode::Simple)
            .unwrap();

        // One input with a key image and five relative offsets
        assert_eq!(transaction.prefix.version, CURRENT_TRANSACTION_VERSION);
        assert_eq!(transaction.prefix.inputs.len(), 1);
        match &transaction.prefix.inputs[0] {
            TXIn::FromKey {
                amount,
                key_offsets,
                key_image,
            } => {
                assert_eq!(*amount, 0);
                assert_eq!(key_offsets, &vec![100; 5]);

                let (_, expected) = key_image::generate_key_image(
                    &sender,
                    &SubAddressIndex::PRIMARY,
                    &sources[0].real_output_tx_public_keys,
                    1,
                    &sources[0].outputs[2].1.destination,
                )
                .unwrap();
                assert_eq!(*key_image, expected);
            }
            TXIn::Gen(_) => panic!("Wrong input type"),
        }

        assert_eq!(transaction.prefix.outputs.len(), 1);
        assert_eq!(transaction.prefix.outputs[0].amount, 0);

        // The transaction public key matches the returned secret
        let tx_public_key = transaction.prefix.extra.tx_public_key().unwrap();
        assert_eq!(tx_public_key, &tx_keys.tx_secret_key * &BASEPOINT_TABLE);

        // The recipient recognizes its output
        assert!(tx_scanning::output_belongs_to(
            &recipient,
            &SubAddressIndex::PRIMARY,
            0,
            &output_key(&transaction, 0),
            &[tx_public_key],
        ));

        // The remainder is the fee
        let signature = transaction.rct_signature.as_ref().unwrap();
        assert_eq!(signature.signature_type(), RingCTType::Simple);
        assert_eq!(signature.base().fee, 100_000);
        assert_eq!(tx_keys.output_masks.len(), 1);
        ringct::verify(signature).unwrap();
    }

    #[test]
    fn it_creates_full_signatures_when_forced() {
        let mut rng = StdRng::seed_from_u64(101);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let sources = vec![mock_source(&mut rng, &sender, 1_000_000, 5, 2)];
        let destinations = vec![
            pay_to(recipient.address(), 900_000),
            change(50_000),
        ];

        let (transaction, _) = TxConstructor::new(&sender, rng)
            .construct(&sources, &destinations, &[], 0, RctMode::Full)
            .unwrap();

        let signature = transaction.rct_signature.as_ref().unwrap();
        assert_eq!(signature.signature_type(), RingCTType::Full);
        assert_eq!(signature.base().fee, 50_000);
        ringct::verify(signature).unwrap();

        // The sender finds its change
        let tx_public_key = transaction.prefix.extra.tx_public_key().unwrap();
        let change_outputs = (0..2)
            .filter(|&i| {
                tx_scanning::output_belongs_to(
                    &sender,
                    &SubAddressIndex::PRIMARY,
                    i as u64,
                    &output_key(&transaction, i),
                    &[tx_public_key],
                )
            })
            .count();
        assert_eq!(change_outputs, 1);
    }

    #[test]
    fn it_picks_simple_signatures_for_different_ring_sizes() {
        let mut rng = StdRng::seed_from_u64(102);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let sources = vec![
            mock_source(&mut rng, &sender, 600_000, 5, 1),
            mock_source(&mut rng, &sender, 400_000, 7, 1),
        ];
        let destinations = vec![pay_to(recipient.address(), 900_000)];

        let mut constructor = TxConstructor::new(&sender, rng);
        let (transaction, _) = constructor
            .construct(&sources, &destinations, &[], 0, RctMode::Auto)
            .unwrap();

        let signature = transaction.rct_signature.as_ref().unwrap();
        assert_eq!(signature.signature_type(), RingCTType::Simple);
        ringct::verify(signature).unwrap();

        match constructor.construct(&sources, &destinations, &[], 0, RctMode::Full) {
            Err(Error::MixinMismatch) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn full_signatures_need_a_shared_real_index() {
        let mut rng = StdRng::seed_from_u64(103);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let sources = vec![
            mock_source(&mut rng, &sender, 600_000, 5, 1),
            mock_source(&mut rng, &sender, 400_000, 5, 3),
        ];
        let destinations = vec![pay_to(recipient.address(), 900_000)];

        match TxConstructor::new(&sender, rng).construct(
            &sources,
            &destinations,
            &[],
            0,
            RctMode::Full,
        ) {
            Err(Error::MixinMismatch) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn it_rejects_overspending_before_signing() {
        let mut rng = StdRng::seed_from_u64(104);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let sources = vec![mock_source(&mut rng, &sender, 500_000, 5, 0)];
        let destinations = vec![pay_to(recipient.address(), 600_000)];

        let mut constructor =
            TxConstructor::with_prover(&sender, rng, CountingProver::default());
        match constructor.construct(&sources, &destinations, &[], 0, RctMode::Auto) {
            Err(Error::InsufficientFunds {
                inputs: 500_000,
                outputs: 600_000,
            }) => {}
            _ => panic!("Wrong error type"),
        }
        assert_eq!(constructor.prover().calls, 0);

        let destinations = vec![pay_to(recipient.address(), 500_000)];
        constructor
            .construct(&sources, &destinations, &[], 0, RctMode::Auto)
            .unwrap();
        assert_eq!(constructor.prover().calls, 1);
    }

    #[test]
    fn seeded_construction_is_reproducible() {
        let mut rng = StdRng::seed_from_u64(105);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let sources = vec![
            mock_source(&mut rng, &sender, 600_000, 4, 3),
            mock_source(&mut rng, &sender, 400_000, 4, 3),
        ];
        let destinations = vec![
            pay_to(recipient.address(), 700_000),
            change(250_000),
            pay_to(recipient.address(), 10_000),
        ];

        let build = |seed| {
            TxConstructor::new(&sender, StdRng::seed_from_u64(seed))
                .construct(&sources, &destinations, &[], 10, RctMode::Auto)
                .unwrap()
                .0
        };

        assert_eq!(build(7).get_hash(), build(7).get_hash());
        assert_ne!(build(7).get_hash(), build(8).get_hash());
    }

    #[test]
    fn it_encrypts_payment_ids() {
        let mut rng = StdRng::seed_from_u64(106);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let sources = vec![mock_source(&mut rng, &sender, 1_000_000, 3, 0)];
        let payment_id = Hash8::from([1, 2, 3, 4, 5, 6, 7, 8]);

        let destinations = vec![
            pay_to(
                Address::integrated(
                    recipient.spend_keypair.public_key,
                    recipient.view_keypair.public_key,
                    payment_id,
                ),
                600_000,
            ),
            change(300_000),
        ];

        let mut constructor = TxConstructor::new(&sender, rng);
        let (transaction, _) = constructor
            .construct(&sources, &destinations, &[], 0, RctMode::Auto)
            .unwrap();

        let encrypted = match transaction.prefix.extra.nonce() {
            Some(TXNonce::EncryptedPaymentId(encrypted)) => *encrypted,
            _ => panic!("Missing encrypted payment ID"),
        };
        assert_ne!(encrypted, payment_id);

        let derivation = Derivation::from(
            &recipient.view_keypair.secret_key,
            &transaction.prefix.extra.tx_public_key().unwrap(),
        )
        .unwrap();
        assert_eq!(payment_id::decrypt(encrypted, &derivation), payment_id);

        // A caller supplied short payment ID on top of the integrated one
        let mut extra = ExtraFields::new();
        extra.replace(TXExtra::TxNonce(TXNonce::EncryptedPaymentId(payment_id)));
        match constructor.construct(&sources, &destinations, &extra.to_bytes(), 0, RctMode::Auto)
        {
            Err(Error::MultiplePaymentIds) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn payment_ids_need_a_single_recipient() {
        let mut rng = StdRng::seed_from_u64(107);
        let sender = account(&mut rng);
        let sources = vec![mock_source(&mut rng, &sender, 1_000_000, 3, 0)];
        let destinations = vec![
            pay_to(account(&mut rng).address(), 300_000),
            pay_to(account(&mut rng).address(), 300_000),
        ];

        let mut extra = ExtraFields::new();
        extra.replace(TXExtra::TxNonce(TXNonce::EncryptedPaymentId(Hash8::from([9; 8]))));

        match TxConstructor::new(&sender, rng).construct(
            &sources,
            &destinations,
            &extra.to_bytes(),
            0,
            RctMode::Auto,
        ) {
            Err(Error::AmbiguousRecipient) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn it_replaces_the_transaction_public_key() {
        let mut rng = StdRng::seed_from_u64(108);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let sources = vec![mock_source(&mut rng, &sender, 1_000_000, 3, 0)];
        let destinations = vec![pay_to(recipient.address(), 1_000_000)];

        let stale_key = KeyPair::random(&mut rng).public_key;
        let mut extra = ExtraFields::new();
        extra.replace(TXExtra::TxPublicKey(stale_key));

        let (transaction, tx_keys) = TxConstructor::new(&sender, rng)
            .construct(&sources, &destinations, &extra.to_bytes(), 0, RctMode::Auto)
            .unwrap();

        let public_keys = transaction
            .prefix
            .extra
            .fields()
            .iter()
            .filter(|field| field.tag() == TX_EXTRA_TAG_PUBKEY)
            .count();
        assert_eq!(public_keys, 1);
        assert_eq!(
            transaction.prefix.extra.tx_public_key().unwrap(),
            &tx_keys.tx_secret_key * &BASEPOINT_TABLE
        );
    }

    #[test]
    fn it_pays_to_subaddresses() {
        let mut rng = StdRng::seed_from_u64(109);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let index = SubAddressIndex(0, 1);
        let subaddress = subaddress::get_address_for_index(&recipient, &index);
        let sources = vec![mock_source(&mut rng, &sender, 1_000_000, 3, 0)];

        // A lone subaddress recipient: R = rD
        let destinations = vec![pay_to(subaddress.clone(), 800_000), change(200_000)];
        let mut constructor = TxConstructor::new(&sender, rng);
        let (transaction, tx_keys) = constructor
            .construct(&sources, &destinations, &[], 0, RctMode::Auto)
            .unwrap();

        let tx_public_key = transaction.prefix.extra.tx_public_key().unwrap();
        assert_eq!(
            tx_public_key,
            tx_keys.tx_secret_key * subaddress.spend_public_key
        );
        assert!(transaction.prefix.extra.additional_public_keys().is_none());
        assert!((0..2).any(|i| tx_scanning::output_belongs_to(
            &recipient,
            &index,
            i as u64,
            &output_key(&transaction, i),
            &[tx_public_key],
        )));

        // Alongside a standard address every output gets its own key
        let destinations = vec![
            pay_to(subaddress, 400_000),
            pay_to(account(&mut StdRng::seed_from_u64(110)).address(), 400_000),
        ];
        let (transaction, tx_keys) = constructor
            .construct(&sources, &destinations, &[], 0, RctMode::Auto)
            .unwrap();

        let additional = transaction.prefix.extra.additional_public_keys().unwrap();
        assert_eq!(additional.len(), 2);
        assert_eq!(tx_keys.additional_tx_secret_keys.len(), 2);
        assert!((0..2).any(|i| tx_scanning::output_belongs_to(
            &recipient,
            &index,
            i as u64,
            &output_key(&transaction, i),
            &[additional[i]],
        )));
    }

    #[test]
    fn watch_only_accounts_build_unsigned_transactions() {
        let mut rng = StdRng::seed_from_u64(111);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let sources = vec![mock_source(&mut rng, &sender, 1_000_000, 3, 1)];
        let destinations = vec![pay_to(recipient.address(), 900_000)];

        let watch_only = AccountKeys::view_only(
            sender.spend_keypair.public_key,
            sender.view_keypair.secret_key,
        );
        let (transaction, tx_keys) = TxConstructor::new(&watch_only, rng)
            .construct(&sources, &destinations, &[], 0, RctMode::Auto)
            .unwrap();

        assert!(transaction.rct_signature.is_none());
        assert!(tx_keys.output_masks.is_empty());
        assert_eq!(transaction.prefix.outputs[0].amount, 900_000);
        match &transaction.prefix.inputs[0] {
            TXIn::FromKey {
                amount, key_image, ..
            } => {
                assert_eq!(*amount, 1_000_000);
                assert_eq!(*key_image, Point::identity());
            }
            TXIn::Gen(_) => panic!("Wrong input type"),
        }
    }

    #[test]
    fn it_rejects_foreign_inputs() {
        let mut rng = StdRng::seed_from_u64(112);
        let sender = account(&mut rng);
        let someone_else = account(&mut rng);
        let sources = vec![
            mock_source(&mut rng, &sender, 500_000, 3, 0),
            mock_source(&mut rng, &someone_else, 500_000, 3, 0),
        ];
        let destinations = vec![pay_to(someone_else.address(), 900_000)];

        match TxConstructor::new(&sender, rng).construct(
            &sources,
            &destinations,
            &[],
            0,
            RctMode::Auto,
        ) {
            Err(Error::InputMismatch { index: 1 }) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn it_validates_rings() {
        let mut rng = StdRng::seed_from_u64(113);
        let sender = account(&mut rng);
        let recipient = account(&mut rng);
        let destinations = vec![pay_to(recipient.address(), 900_000)];

        let mut out_of_bounds = mock_source(&mut rng, &sender, 1_000_000, 5, 4);
        out_of_bounds.real_output_index = 5;
        let mut unsorted = mock_source(&mut rng, &sender, 1_000_000, 5, 4);
        unsorted.outputs.swap(0, 1);

        let mut constructor = TxConstructor::new(&sender, rng);
        match constructor.construct(&[out_of_bounds], &destinations, &[], 0, RctMode::Auto) {
            Err(Error::RealIndexOutOfBounds { index: 0 }) => {}
            _ => panic!("Wrong error type"),
        }
        match constructor.construct(&[unsorted], &destinations, &[], 0, RctMode::Auto) {
            Err(Error::UnsortedRingOffsets { index: 0 }) => {}
            _ => panic!("Wrong error type"),
        }
        match constructor.construct(&[], &destinations, &[], 0, RctMode::Auto) {
            Err(Error::NoSources) => {}
            _ => panic!("Wrong error type"),
        }
    }
}
