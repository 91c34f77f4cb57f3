//! Unsigned and signed transaction envelopes.
//!
//! `UnsignedTx<T>` pairs a VM's transaction enum with the codec version;
//! signing hashes its bytes and attaches one credential per signing slot
//! to produce a `Tx<T>`. The enum's `read_body` is the central type-ID
//! table for transactions.

use std::fmt;
use std::str::FromStr;

use avax_primitives::base58::{cb58_decode, cb58_encode};
use avax_primitives::hash::sha256;
use avax_primitives::util::{AvaxReader, AvaxWriter};
use log::debug;

use crate::constants::CODEC_VERSION;
use crate::credential::{Credential, CredentialKind};
use crate::fee;
use crate::input::SigIdx;
use crate::keychain::KeyChain;
use crate::nbytes::Id;
use crate::TransactionError;

/// The signatures one credential must carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningSlot {
    /// Type ID of the credential produced for this slot.
    pub credential_type_id: u32,
    /// Owners to sign for, in signature order.
    pub sig_idxs: Vec<SigIdx>,
}

impl SigningSlot {
    pub fn new(credential_type_id: u32, sig_idxs: Vec<SigIdx>) -> Self {
        SigningSlot {
            credential_type_id,
            sig_idxs,
        }
    }
}

/// A VM's closed set of transaction variants.
pub trait TxKind: Clone + fmt::Debug + PartialEq + Sized {
    /// The VM's credential enum.
    type Credential: CredentialKind;

    /// Wire type ID of this variant.
    fn type_id(&self) -> u32;

    /// Human readable variant name.
    fn type_name(&self) -> &'static str;

    /// Write the body that follows the type ID.
    fn write_body(&self, writer: &mut AvaxWriter);

    /// Construct the variant registered for `type_id` and read its body.
    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError>;

    /// Credentials this transaction needs, in credential order.
    ///
    /// Base inputs come first; variants with extra input arrays append
    /// their slots after them.
    fn signing_slots(&self) -> Result<Vec<SigningSlot>, TransactionError>;

    /// Sum of all consumed value of `asset_id`.
    fn input_total(&self, asset_id: &Id) -> u64;

    /// Sum of all produced value of `asset_id`.
    fn output_total(&self, asset_id: &Id) -> u64;
}

// ---------------------------------------------------------------------------
// UnsignedTx
// ---------------------------------------------------------------------------

/// A transaction body waiting for credentials.
///
/// Wire: `codec_id(u16) || type_id(u32) || body`.
#[derive(Clone, Debug, PartialEq)]
pub struct UnsignedTx<T> {
    pub codec_id: u16,
    pub transaction: T,
}

impl<T: TxKind> UnsignedTx<T> {
    pub fn new(transaction: T) -> Self {
        UnsignedTx {
            codec_id: CODEC_VERSION,
            transaction,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let codec_id = read_codec_id(reader)?;
        let type_id = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading tx type id: {}", e))
        })?;
        let transaction = T::read_body(type_id, reader)?;
        Ok(UnsignedTx {
            codec_id,
            transaction,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u16_be(self.codec_id);
        writer.write_u32_be(self.transaction.type_id());
        self.transaction.write_body(writer);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = AvaxWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Parse exactly one unsigned transaction with no trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = AvaxReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        expect_end(&reader, "unsigned transaction")?;
        Ok(tx)
    }

    /// `sha256` of the serialized bytes: the digest every signer signs.
    pub fn signing_digest(&self) -> [u8; 32] {
        sha256(&self.to_bytes())
    }

    /// Sign with `keychain`, producing one credential per signing slot.
    ///
    /// Fails with `KeyNotFound` if any slot names an address the keychain
    /// lacks; no partial `Tx` is returned.
    pub fn sign(&self, keychain: &KeyChain) -> Result<Tx<T>, TransactionError> {
        let digest = self.signing_digest();
        let slots = self.transaction.signing_slots()?;
        debug!(
            "signing {} with {} credentials",
            self.transaction.type_name(),
            slots.len()
        );
        let credentials = slots
            .iter()
            .map(|slot| {
                let cred = Credential::sign(&digest, &slot.sig_idxs, keychain)?;
                T::Credential::from_parts(slot.credential_type_id, cred)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Tx {
            unsigned: self.clone(),
            credentials,
        })
    }

    /// Value of `asset_id` destroyed by this transaction.
    pub fn get_burn(&self, asset_id: &Id) -> u64 {
        fee::get_burn(
            self.transaction.input_total(asset_id),
            self.transaction.output_total(asset_id),
        )
    }

    /// Reject implausibly large fees.
    ///
    /// # Arguments
    /// * `fee_asset_id` - Asset the fee is paid in.
    /// * `out_total` - Output total to compare against; defaults to the
    ///   transaction's own outputs of `fee_asset_id` when `None` or zero.
    pub fn check_goose_egg(&self, fee_asset_id: &Id, out_total: Option<u64>) -> Result<(), TransactionError> {
        let output_total = match out_total {
            Some(total) if total > 0 => total,
            _ => self.transaction.output_total(fee_asset_id),
        };
        fee::check_goose_egg(self.get_burn(fee_asset_id), output_total)
    }
}

// ---------------------------------------------------------------------------
// Tx
// ---------------------------------------------------------------------------

/// A signed transaction.
///
/// Wire: `unsigned || num_creds(u32) || (cred_type_id(u32) || cred_body)*`.
#[derive(Clone, Debug, PartialEq)]
pub struct Tx<T: TxKind> {
    pub unsigned: UnsignedTx<T>,
    pub credentials: Vec<T::Credential>,
}

impl<T: TxKind> Tx<T> {
    pub fn new(unsigned: UnsignedTx<T>, credentials: Vec<T::Credential>) -> Self {
        Tx {
            unsigned,
            credentials,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let unsigned = UnsignedTx::read_from(reader)?;
        // type id + signature count
        let count = reader.read_count(8).map_err(|e| {
            TransactionError::SerializationError(format!("reading credential count: {}", e))
        })?;
        let mut credentials = Vec::with_capacity(count);
        for _ in 0..count {
            credentials.push(T::Credential::read_from(reader)?);
        }
        Ok(Tx {
            unsigned,
            credentials,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.unsigned.write_to(writer);
        writer.write_u32_be(self.credentials.len() as u32);
        for cred in &self.credentials {
            cred.write_to(writer);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = AvaxWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Parse exactly one signed transaction with no trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = AvaxReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        expect_end(&reader, "transaction")?;
        Ok(tx)
    }

    /// Transaction ID: `sha256` of the signed bytes.
    pub fn id(&self) -> Id {
        Id::new(sha256(&self.to_bytes()))
    }

    /// Whether every credential signature recovers to the address its
    /// signing slot names.
    ///
    /// Owner addresses are not on the wire, so a parsed transaction fails
    /// with `UnresolvedSigner` rather than reporting `false`. A signature
    /// that does not recover at all counts as invalid.
    pub fn verify_signatures(&self) -> Result<bool, TransactionError> {
        let digest = self.unsigned.signing_digest();
        let slots = self.unsigned.transaction.signing_slots()?;
        let signers = slots
            .iter()
            .map(|slot| slot.sig_idxs.iter().map(SigIdx::signer).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        if signers.len() != self.credentials.len() {
            return Ok(false);
        }
        for (expected, cred) in signers.iter().zip(&self.credentials) {
            let sigs = &cred.credential().sig_array;
            if sigs.len() != expected.len() {
                return Ok(false);
            }
            for (sig, signer) in sigs.iter().zip(expected) {
                match sig.recover_address(&digest) {
                    Ok(recovered) if recovered == *signer => {}
                    Ok(_) => return Ok(false),
                    Err(e) => {
                        debug!("signature does not recover: {}", e);
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }
}

impl<T: TxKind> fmt::Display for Tx<T> {
    /// cb58 of the signed bytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cb58_encode(&self.to_bytes()))
    }
}

impl<T: TxKind> FromStr for Tx<T> {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(&cb58_decode(s)?)
    }
}

/// Read a codec version, rejecting versions this crate cannot decode.
pub fn read_codec_id(reader: &mut AvaxReader) -> Result<u16, TransactionError> {
    let codec_id = reader.read_u16_be().map_err(|e| {
        TransactionError::SerializationError(format!("reading codec id: {}", e))
    })?;
    if codec_id != CODEC_VERSION {
        return Err(TransactionError::UnknownType {
            kind: "codec",
            type_id: codec_id as u32,
        });
    }
    Ok(codec_id)
}

pub(crate) fn expect_end(reader: &AvaxReader, what: &str) -> Result<(), TransactionError> {
    if reader.remaining() != 0 {
        return Err(TransactionError::SerializationError(format!(
            "trailing {} bytes after {}",
            reader.remaining(),
            what
        )));
    }
    Ok(())
}
