//! Inputs: references to the UTXOs a transaction consumes.
//!
//! A `TransferableInput` points at a previous output by `(txid, output_idx)`
//! and carries a typed input whose `SigIdx` list tells signers and
//! verifiers which owner address each credential signature belongs to.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use avax_primitives::base58::cb58_encode;
use avax_primitives::util::{AvaxReader, AvaxWriter};

use crate::nbytes::{Address, Id};
use crate::output::OutputOwners;
use crate::TransactionError;

/// A signature slot: an index into the spent output's owner list.
///
/// Only `index` goes on the wire, and only `index` takes part in equality.
/// `source` is the owner address the index resolves to, recorded at build
/// time so the keychain can find the key; a parsed slot has none.
#[derive(Clone, Copy, Debug, Default)]
pub struct SigIdx {
    /// Position of the signer in the output's owner list.
    pub index: u32,
    /// Owner address at that position, when known.
    pub source: Option<Address>,
}

impl SigIdx {
    pub fn new(index: u32, source: Address) -> Self {
        SigIdx {
            index,
            source: Some(source),
        }
    }

    /// A slot whose owner address is not known, as read from the wire.
    pub fn unresolved(index: u32) -> Self {
        SigIdx { index, source: None }
    }

    /// The owner address, or `UnresolvedSigner` if the slot has none.
    pub fn signer(&self) -> Result<Address, TransactionError> {
        self.source
            .ok_or(TransactionError::UnresolvedSigner { index: self.index })
    }
}

impl PartialEq for SigIdx {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for SigIdx {}

impl Hash for SigIdx {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

/// Read a `count(u32) || index(u32)*` signature index list.
pub fn read_sig_idxs(reader: &mut AvaxReader) -> Result<Vec<SigIdx>, TransactionError> {
    let count = reader.read_count(4).map_err(|e| {
        TransactionError::SerializationError(format!("reading sig index count: {}", e))
    })?;
    let mut sig_idxs = Vec::with_capacity(count);
    for _ in 0..count {
        let index = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading sig index: {}", e))
        })?;
        sig_idxs.push(SigIdx::unresolved(index));
    }
    Ok(sig_idxs)
}

/// Write a `count(u32) || index(u32)*` signature index list.
pub fn write_sig_idxs(sig_idxs: &[SigIdx], writer: &mut AvaxWriter) {
    writer.write_u32_be(sig_idxs.len() as u32);
    for sig_idx in sig_idxs {
        writer.write_u32_be(sig_idx.index);
    }
}

/// Signature slots for the spenders among `addrs` of an output owned by
/// `owners`, in owner order.
pub fn spender_sig_idxs(owners: &OutputOwners, addrs: &[Address], as_of: u64) -> Vec<SigIdx> {
    owners
        .get_spenders(addrs, as_of)
        .into_iter()
        .filter_map(|spender| owners.get_address_idx(&spender).map(|idx| SigIdx::new(idx, spender)))
        .collect()
}

/// Spends an amount-carrying secp256k1 output.
///
/// Body: `amount(u64) || num_sig_idxs(u32) || index(u32)*`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferInput {
    /// Amount of the consumed output.
    pub amount: u64,
    /// Signature slots, one per required signer.
    pub sig_idxs: Vec<SigIdx>,
}

impl TransferInput {
    pub fn new(amount: u64) -> Self {
        TransferInput {
            amount,
            sig_idxs: Vec::new(),
        }
    }

    /// An input spending an output owned by `owners`, with a signature slot
    /// for every spender among `addrs` at time `as_of`.
    pub fn spending(amount: u64, owners: &OutputOwners, addrs: &[Address], as_of: u64) -> Self {
        TransferInput {
            amount,
            sig_idxs: spender_sig_idxs(owners, addrs, as_of),
        }
    }

    /// Record that owner `address` at `index` will sign this input.
    pub fn add_signature_idx(&mut self, index: u32, address: Address) {
        self.sig_idxs.push(SigIdx::new(index, address));
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let amount = reader.read_u64_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading input amount: {}", e))
        })?;
        let sig_idxs = read_sig_idxs(reader)?;
        Ok(TransferInput { amount, sig_idxs })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u64_be(self.amount);
        write_sig_idxs(&self.sig_idxs, writer);
    }
}

/// A VM's closed set of input variants.
///
/// `read_body` is the central type-ID table for inputs.
pub trait InputKind: Clone + fmt::Debug + PartialEq + Sized {
    /// Wire type ID of this variant.
    fn type_id(&self) -> u32;

    /// Write the body that follows the type ID.
    fn write_body(&self, writer: &mut AvaxWriter);

    /// Construct the variant registered for `type_id` and read its body.
    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError>;

    /// Signature slots of this input.
    fn sig_idxs(&self) -> &[SigIdx];

    /// Amount consumed.
    fn amount(&self) -> u64;

    fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.type_id());
        self.write_body(writer);
    }

    fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let type_id = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading input type id: {}", e))
        })?;
        Self::read_body(type_id, reader)
    }
}

/// A typed input tagged with the UTXO it consumes.
///
/// # Wire format
///
/// | Field      | Size             |
/// |------------|------------------|
/// | txid       | 32 bytes         |
/// | output idx | 4 bytes (BE)     |
/// | asset id   | 32 bytes         |
/// | type id    | 4 bytes (BE)     |
/// | body       | variable         |
#[derive(Clone, Debug, PartialEq)]
pub struct TransferableInput<I> {
    /// Transaction that created the consumed output.
    pub txid: Id,
    /// Index of the consumed output in that transaction.
    pub output_idx: u32,
    /// Asset consumed.
    pub asset_id: Id,
    /// Typed input body.
    pub input: I,
}

impl<I: InputKind> TransferableInput<I> {
    pub fn new(txid: Id, output_idx: u32, asset_id: Id, input: I) -> Self {
        TransferableInput {
            txid,
            output_idx,
            asset_id,
            input,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let txid = Id::read_from(reader)?;
        let output_idx = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;
        let asset_id = Id::read_from(reader)?;
        let input = I::read_from(reader)?;
        Ok(TransferableInput {
            txid,
            output_idx,
            asset_id,
            input,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.txid.write_to(writer);
        writer.write_u32_be(self.output_idx);
        self.asset_id.write_to(writer);
        self.input.write_to(writer);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = AvaxWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Parse exactly one input with no trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = AvaxReader::new(bytes);
        let input = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after input",
                reader.remaining()
            )));
        }
        Ok(input)
    }

    /// `txid || output_idx`, the sort key and UTXO reference of this input.
    pub fn utxo_ref(&self) -> [u8; 36] {
        utxo_ref(&self.txid, self.output_idx)
    }

    /// cb58 of `txid || output_idx`.
    pub fn utxo_id(&self) -> String {
        cb58_encode(&self.utxo_ref())
    }

    /// Canonical order: by `txid || output_idx`.
    pub fn comparator(a: &Self, b: &Self) -> Ordering {
        a.utxo_ref().cmp(&b.utxo_ref())
    }
}

/// `txid || output_idx(BE)`.
pub fn utxo_ref(txid: &Id, output_idx: u32) -> [u8; 36] {
    let mut out = [0u8; 36];
    out[..32].copy_from_slice(txid.as_bytes());
    out[32..].copy_from_slice(&output_idx.to_be_bytes());
    out
}

/// Sort inputs into canonical order.
pub fn sort_inputs<I: InputKind>(ins: &mut [TransferableInput<I>]) {
    ins.sort_by(TransferableInput::comparator);
}

/// Borrow inputs in canonical order without reordering the slice.
///
/// Serialization and signing both walk this order, which keeps
/// credential `i` paired with serialized input `i`.
pub fn sorted_inputs<I: InputKind>(ins: &[TransferableInput<I>]) -> Vec<&TransferableInput<I>> {
    let mut refs: Vec<&TransferableInput<I>> = ins.iter().collect();
    refs.sort_by(|a, b| TransferableInput::comparator(a, b));
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_input_layout() {
        let mut input = TransferInput::new(5);
        input.add_signature_idx(0, Address::new([1; 20]));
        input.add_signature_idx(2, Address::new([2; 20]));
        let mut writer = AvaxWriter::new();
        input.write_to(&mut writer);
        assert_eq!(
            hex::encode(writer.as_bytes()),
            "0000000000000005000000020000000000000002"
        );

        let bytes = writer.into_bytes();
        let mut reader = AvaxReader::new(&bytes);
        let parsed = TransferInput::read_from(&mut reader).unwrap();
        assert_eq!(parsed.amount, 5);
        let indices: Vec<u32> = parsed.sig_idxs.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert!(parsed.sig_idxs.iter().all(|s| s.source.is_none()));
        assert_eq!(parsed, input);
        assert!(matches!(
            parsed.sig_idxs[1].signer(),
            Err(TransactionError::UnresolvedSigner { index: 2 })
        ));
    }

    #[test]
    fn test_spending_records_owner_positions() {
        let a = Address::new([1; 20]);
        let b = Address::new([2; 20]);
        let c = Address::new([3; 20]);
        let owners = OutputOwners::new(vec![c, a, b], 0, 2);
        let input = TransferInput::spending(9, &owners, &[c, b], 0);
        assert_eq!(input.sig_idxs, vec![SigIdx::new(1, b), SigIdx::new(2, c)]);
        let sources: Vec<Option<Address>> = input.sig_idxs.iter().map(|s| s.source).collect();
        assert_eq!(sources, vec![Some(b), Some(c)]);
    }

    #[test]
    fn test_utxo_ref_order() {
        let txid = Id::new([1; 32]);
        let a = utxo_ref(&txid, 1);
        let b = utxo_ref(&txid, 256);
        assert!(a < b);
        assert_eq!(&a[32..], &[0, 0, 0, 1]);
    }

    #[test]
    fn test_hostile_sig_idx_count() {
        let data = [0u8, 0, 0, 0, 0, 0, 0, 1, 0xff, 0xff, 0xff, 0xff];
        let mut reader = AvaxReader::new(&data);
        assert!(TransferInput::read_from(&mut reader).is_err());
    }
}
