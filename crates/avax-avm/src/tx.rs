//! X-chain transaction variants.
//!
//! Every variant starts with a [`BaseTx`] and appends its own fields.
//! [`Transaction`] is the closed set the codec dispatches on; its
//! `read_body` is the type-ID table for X-chain transactions.

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_transaction::base_tx::{
    input_signing_slots, inputs_total, outputs_total, read_inputs, read_outputs, write_inputs, write_outputs,
    BaseTx,
};
use avax_transaction::input::{sort_inputs, TransferableInput};
use avax_transaction::output::{sort_outputs, OutputKind, TransferableOutput};
use avax_transaction::tx::{SigningSlot, TxKind};
use avax_transaction::{Id, TransactionError};

use crate::constants::*;
use crate::credentials::AvmCredential;
use crate::inputs::AvmInput;
use crate::operations::{sorted_operations, TransferableOperation};
use crate::outputs::AvmOutput;

/// The base fields with X-chain inputs and outputs.
pub type AvmBaseTx = BaseTx<AvmInput, AvmOutput>;

// ---------------------------------------------------------------------------
// CreateAssetTx
// ---------------------------------------------------------------------------

/// Outputs a new asset starts with, grouped by feature extension.
///
/// Wire: `fx_id(u32) || num_outputs(u32) || (type_id(u32) || output)*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitialState {
    pub fx_id: u32,
    pub outputs: Vec<AvmOutput>,
}

impl InitialState {
    pub fn new(fx_id: u32, outputs: Vec<AvmOutput>) -> Self {
        InitialState { fx_id, outputs }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let fx_id = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading fx id: {}", e))
        })?;
        // type id + empty owners
        let count = reader.read_count(20).map_err(|e| {
            TransactionError::SerializationError(format!("reading initial state output count: {}", e))
        })?;
        let mut outputs = Vec::with_capacity(count);
        for _ in 0..count {
            outputs.push(AvmOutput::read_from(reader)?);
        }
        Ok(InitialState { fx_id, outputs })
    }

    /// Outputs are written in byte order of their serialized form.
    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.fx_id);
        let mut encoded: Vec<Vec<u8>> = self
            .outputs
            .iter()
            .map(|o| {
                let mut w = AvaxWriter::new();
                o.write_to(&mut w);
                w.into_bytes()
            })
            .collect();
        encoded.sort();
        writer.write_u32_be(encoded.len() as u32);
        for bytes in encoded {
            writer.write_bytes(&bytes);
        }
    }
}

/// Create a new asset.
///
/// Wire: `base || name(u16 len) || symbol(u16 len) || denomination(u8) ||
/// num_states(u32) || initial_state*`.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateAssetTx {
    pub base: AvmBaseTx,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
    pub initial_states: Vec<InitialState>,
}

impl CreateAssetTx {
    /// Validates the asset description; initial states are sorted by fx ID.
    pub fn new(
        base: AvmBaseTx,
        name: &str,
        symbol: &str,
        denomination: u8,
        mut initial_states: Vec<InitialState>,
    ) -> Result<Self, TransactionError> {
        if name.is_empty() || name.len() > MAX_ASSET_NAME_LEN {
            return Err(TransactionError::InvalidTransaction(format!(
                "asset name must be 1 to {} bytes",
                MAX_ASSET_NAME_LEN
            )));
        }
        if symbol.is_empty() || symbol.len() > MAX_ASSET_SYMBOL_LEN {
            return Err(TransactionError::InvalidTransaction(format!(
                "asset symbol must be 1 to {} bytes",
                MAX_ASSET_SYMBOL_LEN
            )));
        }
        if !name.is_ascii() || !symbol.is_ascii() {
            return Err(TransactionError::InvalidTransaction(
                "asset name and symbol must be ascii".to_string(),
            ));
        }
        if denomination > MAX_DENOMINATION {
            return Err(TransactionError::InvalidTransaction(format!(
                "denomination {} exceeds {}",
                denomination, MAX_DENOMINATION
            )));
        }
        initial_states.sort_by_key(|s| s.fx_id);
        Ok(CreateAssetTx {
            base,
            name: name.to_string(),
            symbol: symbol.to_string(),
            denomination,
            initial_states,
        })
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let base = BaseTx::read_from(reader)?;
        let name = reader
            .read_string16()
            .map_err(|e| TransactionError::SerializationError(format!("reading asset name: {}", e)))?;
        let symbol = reader
            .read_string16()
            .map_err(|e| TransactionError::SerializationError(format!("reading asset symbol: {}", e)))?;
        let denomination = reader
            .read_u8()
            .map_err(|e| TransactionError::SerializationError(format!("reading denomination: {}", e)))?;
        let count = reader.read_count(8).map_err(|e| {
            TransactionError::SerializationError(format!("reading initial state count: {}", e))
        })?;
        let mut initial_states = Vec::with_capacity(count);
        for _ in 0..count {
            initial_states.push(InitialState::read_from(reader)?);
        }
        Ok(CreateAssetTx {
            base,
            name,
            symbol,
            denomination,
            initial_states,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        writer.write_string16(&self.name);
        writer.write_string16(&self.symbol);
        writer.write_u8(self.denomination);
        writer.write_u32_be(self.initial_states.len() as u32);
        for state in &self.initial_states {
            state.write_to(writer);
        }
    }
}

// ---------------------------------------------------------------------------
// OperationTx
// ---------------------------------------------------------------------------

/// Apply operations to mint and NFT outputs.
///
/// Wire: `base || num_ops(u32) || operation*`.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationTx {
    pub base: AvmBaseTx,
    pub ops: Vec<TransferableOperation>,
}

impl OperationTx {
    /// Operations are sorted into canonical order.
    pub fn new(base: AvmBaseTx, mut ops: Vec<TransferableOperation>) -> Self {
        ops.sort_by_cached_key(|o| o.to_bytes());
        OperationTx { base, ops }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let base = BaseTx::read_from(reader)?;
        // asset id + utxo count + type id
        let count = reader.read_count(40).map_err(|e| {
            TransactionError::SerializationError(format!("reading operation count: {}", e))
        })?;
        let mut ops = Vec::with_capacity(count);
        for _ in 0..count {
            ops.push(TransferableOperation::read_from(reader)?);
        }
        Ok(OperationTx { base, ops })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        writer.write_u32_be(self.ops.len() as u32);
        for op in sorted_operations(&self.ops) {
            op.write_to(writer);
        }
    }

    /// Base input slots, then one slot per operation in serialized order.
    pub fn signing_slots(&self) -> Vec<SigningSlot> {
        let mut slots = self.base.signing_slots(SECP_CREDENTIAL_ID);
        for op in sorted_operations(&self.ops) {
            slots.push(SigningSlot::new(
                op.operation.credential_type_id(),
                op.operation.sig_idxs().to_vec(),
            ));
        }
        slots
    }
}

// ---------------------------------------------------------------------------
// ImportTx / ExportTx
// ---------------------------------------------------------------------------

/// Consume UTXOs exported to the X-chain by another chain.
///
/// Wire: `base || source_chain || num_ins(u32) || import_in*`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportTx {
    pub base: AvmBaseTx,
    pub source_chain: Id,
    pub import_ins: Vec<TransferableInput<AvmInput>>,
}

impl ImportTx {
    pub fn new(base: AvmBaseTx, source_chain: Id, mut import_ins: Vec<TransferableInput<AvmInput>>) -> Self {
        sort_inputs(&mut import_ins);
        ImportTx {
            base,
            source_chain,
            import_ins,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let base = BaseTx::read_from(reader)?;
        let source_chain = Id::read_from(reader)?;
        let import_ins = read_inputs(reader)?;
        Ok(ImportTx {
            base,
            source_chain,
            import_ins,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        self.source_chain.write_to(writer);
        write_inputs(&self.import_ins, writer);
    }
}

/// Move value from the X-chain into another chain's shared memory.
///
/// Wire: `base || destination_chain || num_outs(u32) || export_out*`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportTx {
    pub base: AvmBaseTx,
    pub destination_chain: Id,
    pub export_outs: Vec<TransferableOutput<AvmOutput>>,
}

impl ExportTx {
    pub fn new(
        base: AvmBaseTx,
        destination_chain: Id,
        mut export_outs: Vec<TransferableOutput<AvmOutput>>,
    ) -> Self {
        sort_outputs(&mut export_outs);
        ExportTx {
            base,
            destination_chain,
            export_outs,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let base = BaseTx::read_from(reader)?;
        let destination_chain = Id::read_from(reader)?;
        let export_outs = read_outputs(reader)?;
        Ok(ExportTx {
            base,
            destination_chain,
            export_outs,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        self.destination_chain.write_to(writer);
        write_outputs(&self.export_outs, writer);
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Every transaction the X-chain codec can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum Transaction {
    Base(AvmBaseTx),
    CreateAsset(CreateAssetTx),
    Operation(OperationTx),
    Import(ImportTx),
    Export(ExportTx),
}

impl Transaction {
    /// The base fields shared by every variant.
    pub fn base(&self) -> &AvmBaseTx {
        match self {
            Transaction::Base(tx) => tx,
            Transaction::CreateAsset(tx) => &tx.base,
            Transaction::Operation(tx) => &tx.base,
            Transaction::Import(tx) => &tx.base,
            Transaction::Export(tx) => &tx.base,
        }
    }
}

impl TxKind for Transaction {
    type Credential = AvmCredential;

    fn type_id(&self) -> u32 {
        match self {
            Transaction::Base(_) => BASE_TX_ID,
            Transaction::CreateAsset(_) => CREATE_ASSET_TX_ID,
            Transaction::Operation(_) => OPERATION_TX_ID,
            Transaction::Import(_) => IMPORT_TX_ID,
            Transaction::Export(_) => EXPORT_TX_ID,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Transaction::Base(_) => "BaseTx",
            Transaction::CreateAsset(_) => "CreateAssetTx",
            Transaction::Operation(_) => "OperationTx",
            Transaction::Import(_) => "ImportTx",
            Transaction::Export(_) => "ExportTx",
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            Transaction::Base(tx) => tx.write_to(writer),
            Transaction::CreateAsset(tx) => tx.write_to(writer),
            Transaction::Operation(tx) => tx.write_to(writer),
            Transaction::Import(tx) => tx.write_to(writer),
            Transaction::Export(tx) => tx.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            BASE_TX_ID => Ok(Transaction::Base(BaseTx::read_from(reader)?)),
            CREATE_ASSET_TX_ID => Ok(Transaction::CreateAsset(CreateAssetTx::read_from(reader)?)),
            OPERATION_TX_ID => Ok(Transaction::Operation(OperationTx::read_from(reader)?)),
            IMPORT_TX_ID => Ok(Transaction::Import(ImportTx::read_from(reader)?)),
            EXPORT_TX_ID => Ok(Transaction::Export(ExportTx::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "transaction", type_id }),
        }
    }

    fn signing_slots(&self) -> Result<Vec<SigningSlot>, TransactionError> {
        Ok(match self {
            Transaction::Operation(tx) => tx.signing_slots(),
            Transaction::Import(tx) => {
                let mut slots = tx.base.signing_slots(SECP_CREDENTIAL_ID);
                slots.extend(input_signing_slots(&tx.import_ins, SECP_CREDENTIAL_ID));
                slots
            }
            other => other.base().signing_slots(SECP_CREDENTIAL_ID),
        })
    }

    fn input_total(&self, asset_id: &Id) -> u64 {
        let base = self.base().input_total(asset_id);
        match self {
            Transaction::Import(tx) => base.saturating_add(inputs_total(&tx.import_ins, asset_id)),
            _ => base,
        }
    }

    fn output_total(&self, asset_id: &Id) -> u64 {
        let base = self.base().output_total(asset_id);
        match self {
            Transaction::Export(tx) => base.saturating_add(outputs_total(&tx.export_outs, asset_id)),
            _ => base,
        }
    }
}
