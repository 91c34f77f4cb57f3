//! The fields every X and P chain transaction starts with.
//!
//! Outputs and inputs are sorted when a `BaseTx` is constructed, and both
//! serialization and signing walk them through the same canonical-order
//! helpers, so independently built copies of a transaction hash the same.

use avax_primitives::util::{AvaxReader, AvaxWriter};

use crate::constants::MAX_MEMO_LEN;
use crate::input::{sort_inputs, sorted_inputs, InputKind, TransferableInput};
use crate::nbytes::Id;
use crate::output::{sort_outputs, sorted_outputs, OutputKind, TransferableOutput};
use crate::tx::SigningSlot;
use crate::TransactionError;

/// Network header, outputs, inputs and memo.
///
/// # Wire format
///
/// | Field         | Size             |
/// |---------------|------------------|
/// | network id    | 4 bytes (BE)     |
/// | blockchain id | 32 bytes         |
/// | num outs      | 4 bytes (BE)     |
/// | outs          | variable         |
/// | num ins       | 4 bytes (BE)     |
/// | ins           | variable         |
/// | memo length   | 4 bytes (BE)     |
/// | memo          | memo length      |
#[derive(Clone, Debug, PartialEq)]
pub struct BaseTx<I, O> {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outs: Vec<TransferableOutput<O>>,
    pub ins: Vec<TransferableInput<I>>,
    pub memo: Vec<u8>,
}

impl<I: InputKind, O: OutputKind> BaseTx<I, O> {
    /// Build a base transaction with outputs and inputs in canonical order.
    ///
    /// Fails with `InvalidTransaction` if the memo is longer than
    /// `MAX_MEMO_LEN` bytes.
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        mut outs: Vec<TransferableOutput<O>>,
        mut ins: Vec<TransferableInput<I>>,
        memo: Vec<u8>,
    ) -> Result<Self, TransactionError> {
        if memo.len() > MAX_MEMO_LEN {
            return Err(TransactionError::InvalidTransaction(format!(
                "memo is {} bytes, limit is {}",
                memo.len(),
                MAX_MEMO_LEN
            )));
        }
        sort_outputs(&mut outs);
        sort_inputs(&mut ins);
        Ok(BaseTx {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        })
    }

    /// Deserialize the base fields, keeping outputs and inputs in wire order.
    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let network_id = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading network id: {}", e))
        })?;
        let blockchain_id = Id::read_from(reader)?;
        let outs = read_outputs(reader)?;
        let ins = read_inputs(reader)?;
        let memo = reader
            .read_len_prefixed()
            .map_err(|e| TransactionError::SerializationError(format!("reading memo: {}", e)))?
            .to_vec();
        Ok(BaseTx {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.network_id);
        self.blockchain_id.write_to(writer);
        write_outputs(&self.outs, writer);
        write_inputs(&self.ins, writer);
        writer.write_len_prefixed(&self.memo);
    }

    /// One signing slot per input, in serialized order.
    pub fn signing_slots(&self, credential_type_id: u32) -> Vec<SigningSlot> {
        input_signing_slots(&self.ins, credential_type_id)
    }

    /// Sum of the inputs of `asset_id`.
    pub fn input_total(&self, asset_id: &Id) -> u64 {
        inputs_total(&self.ins, asset_id)
    }

    /// Sum of the outputs of `asset_id`.
    pub fn output_total(&self, asset_id: &Id) -> u64 {
        outputs_total(&self.outs, asset_id)
    }
}

// ---------------------------------------------------------------------------
// Array helpers shared by the transaction variants
// ---------------------------------------------------------------------------

/// Read `count(u32) || output*`.
pub fn read_outputs<O: OutputKind>(reader: &mut AvaxReader) -> Result<Vec<TransferableOutput<O>>, TransactionError> {
    // asset id + type id is the smallest possible output
    let count = reader.read_count(36).map_err(|e| {
        TransactionError::SerializationError(format!("reading output count: {}", e))
    })?;
    let mut outs = Vec::with_capacity(count);
    for _ in 0..count {
        outs.push(TransferableOutput::read_from(reader)?);
    }
    Ok(outs)
}

/// Write `count(u32) || output*` in canonical order.
pub fn write_outputs<O: OutputKind>(outs: &[TransferableOutput<O>], writer: &mut AvaxWriter) {
    writer.write_u32_be(outs.len() as u32);
    for out in sorted_outputs(outs) {
        out.write_to(writer);
    }
}

/// Read `count(u32) || input*`.
pub fn read_inputs<I: InputKind>(reader: &mut AvaxReader) -> Result<Vec<TransferableInput<I>>, TransactionError> {
    let count = reader.read_count(72).map_err(|e| {
        TransactionError::SerializationError(format!("reading input count: {}", e))
    })?;
    let mut ins = Vec::with_capacity(count);
    for _ in 0..count {
        ins.push(TransferableInput::read_from(reader)?);
    }
    Ok(ins)
}

/// Write `count(u32) || input*` in canonical order.
pub fn write_inputs<I: InputKind>(ins: &[TransferableInput<I>], writer: &mut AvaxWriter) {
    writer.write_u32_be(ins.len() as u32);
    for input in sorted_inputs(ins) {
        input.write_to(writer);
    }
}

/// One signing slot per input, in canonical order.
pub fn input_signing_slots<I: InputKind>(ins: &[TransferableInput<I>], credential_type_id: u32) -> Vec<SigningSlot> {
    sorted_inputs(ins)
        .into_iter()
        .map(|input| SigningSlot::new(credential_type_id, input.input.sig_idxs().to_vec()))
        .collect()
}

pub fn inputs_total<I: InputKind>(ins: &[TransferableInput<I>], asset_id: &Id) -> u64 {
    ins.iter()
        .filter(|i| &i.asset_id == asset_id)
        .fold(0u64, |acc, i| acc.saturating_add(i.input.amount()))
}

pub fn outputs_total<O: OutputKind>(outs: &[TransferableOutput<O>], asset_id: &Id) -> u64 {
    outs.iter()
        .filter(|o| &o.asset_id == asset_id)
        .fold(0u64, |acc, o| acc.saturating_add(o.output.amount().unwrap_or(0)))
}
