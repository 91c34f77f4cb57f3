//! C-chain atomic transactions.
//!
//! Neither variant carries outputs, inputs or a memo of its own; the
//! UTXO side lives in shared memory and the account side in the EVM
//! state.

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_primitives::PrimitivesError;
use avax_transaction::base_tx::{
    input_signing_slots, inputs_total, outputs_total, read_inputs, read_outputs, write_inputs, write_outputs,
};
use avax_transaction::input::{sort_inputs, TransferableInput};
use avax_transaction::output::{sort_outputs, TransferableOutput};
use avax_transaction::tx::{SigningSlot, TxKind};
use avax_transaction::{Id, TransactionError};

use crate::atomic::{AtomicInput, AtomicOutput};
use crate::constants::*;
use crate::credentials::EvmCredential;
use crate::evm_io::{EvmInput, EvmOutput};

fn read_err(what: &'static str) -> impl Fn(PrimitivesError) -> TransactionError {
    move |e| TransactionError::SerializationError(format!("reading {}: {}", what, e))
}

/// Credit EVM accounts with UTXOs another chain exported to the C-chain.
///
/// Wire: `network_id(u32) || blockchain_id || source_chain ||
/// num_ins(u32) || import_in* || num_outs(u32) || evm_out*`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub source_chain: Id,
    pub import_ins: Vec<TransferableInput<AtomicInput>>,
    pub outs: Vec<EvmOutput>,
}

impl ImportTx {
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        source_chain: Id,
        mut import_ins: Vec<TransferableInput<AtomicInput>>,
        mut outs: Vec<EvmOutput>,
    ) -> Result<Self, TransactionError> {
        if import_ins.is_empty() {
            return Err(TransactionError::InvalidTransaction("import has no inputs".to_string()));
        }
        sort_inputs(&mut import_ins);
        outs.sort_by(EvmOutput::comparator);
        Ok(ImportTx {
            network_id,
            blockchain_id,
            source_chain,
            import_ins,
            outs,
        })
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let network_id = reader.read_u32_be().map_err(read_err("network id"))?;
        let blockchain_id = Id::read_from(reader)?;
        let source_chain = Id::read_from(reader)?;
        let import_ins = read_inputs(reader)?;
        let count = reader.read_count(EvmOutput::SIZE).map_err(read_err("evm output count"))?;
        let mut outs = Vec::with_capacity(count);
        for _ in 0..count {
            outs.push(EvmOutput::read_from(reader)?);
        }
        Ok(ImportTx {
            network_id,
            blockchain_id,
            source_chain,
            import_ins,
            outs,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.network_id);
        self.blockchain_id.write_to(writer);
        self.source_chain.write_to(writer);
        write_inputs(&self.import_ins, writer);
        writer.write_u32_be(self.outs.len() as u32);
        for out in &self.outs {
            out.write_to(writer);
        }
    }
}

/// Debit EVM accounts into another chain's shared memory.
///
/// Wire: `network_id(u32) || blockchain_id || destination_chain ||
/// num_ins(u32) || evm_in* || num_outs(u32) || export_out*`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub destination_chain: Id,
    pub ins: Vec<EvmInput>,
    pub export_outs: Vec<TransferableOutput<AtomicOutput>>,
}

impl ExportTx {
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        destination_chain: Id,
        mut ins: Vec<EvmInput>,
        mut export_outs: Vec<TransferableOutput<AtomicOutput>>,
    ) -> Result<Self, TransactionError> {
        if ins.is_empty() {
            return Err(TransactionError::InvalidTransaction("export has no inputs".to_string()));
        }
        ins.sort_by(EvmInput::comparator);
        if ins.windows(2).any(|w| w[0].address == w[1].address && w[0].asset_id == w[1].asset_id) {
            return Err(TransactionError::InvalidTransaction(
                "export debits the same account and asset twice".to_string(),
            ));
        }
        sort_outputs(&mut export_outs);
        Ok(ExportTx {
            network_id,
            blockchain_id,
            destination_chain,
            ins,
            export_outs,
        })
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let network_id = reader.read_u32_be().map_err(read_err("network id"))?;
        let blockchain_id = Id::read_from(reader)?;
        let destination_chain = Id::read_from(reader)?;
        let count = reader.read_count(EvmInput::SIZE).map_err(read_err("evm input count"))?;
        let mut ins = Vec::with_capacity(count);
        for _ in 0..count {
            ins.push(EvmInput::read_from(reader)?);
        }
        Ok(ExportTx {
            network_id,
            blockchain_id,
            destination_chain,
            ins,
            export_outs: read_outputs(reader)?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.network_id);
        self.blockchain_id.write_to(writer);
        self.destination_chain.write_to(writer);
        writer.write_u32_be(self.ins.len() as u32);
        for input in &self.ins {
            input.write_to(writer);
        }
        write_outputs(&self.export_outs, writer);
    }
}

/// Every transaction the C-chain atomic codec can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum Transaction {
    Import(ImportTx),
    Export(ExportTx),
}

impl Transaction {
    pub fn network_id(&self) -> u32 {
        match self {
            Transaction::Import(tx) => tx.network_id,
            Transaction::Export(tx) => tx.network_id,
        }
    }

    pub fn blockchain_id(&self) -> Id {
        match self {
            Transaction::Import(tx) => tx.blockchain_id,
            Transaction::Export(tx) => tx.blockchain_id,
        }
    }
}

impl TxKind for Transaction {
    type Credential = EvmCredential;

    fn type_id(&self) -> u32 {
        match self {
            Transaction::Import(_) => IMPORT_TX_ID,
            Transaction::Export(_) => EXPORT_TX_ID,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Transaction::Import(_) => "ImportTx",
            Transaction::Export(_) => "ExportTx",
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            Transaction::Import(tx) => tx.write_to(writer),
            Transaction::Export(tx) => tx.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            IMPORT_TX_ID => Ok(Transaction::Import(ImportTx::read_from(reader)?)),
            EXPORT_TX_ID => Ok(Transaction::Export(ExportTx::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "transaction", type_id }),
        }
    }

    fn signing_slots(&self) -> Result<Vec<SigningSlot>, TransactionError> {
        match self {
            Transaction::Import(tx) => Ok(input_signing_slots(&tx.import_ins, SECP_CREDENTIAL_ID)),
            Transaction::Export(tx) => Ok(tx
                .ins
                .iter()
                .map(|input| SigningSlot::new(SECP_CREDENTIAL_ID, input.sig_idxs.clone()))
                .collect()),
        }
    }

    fn input_total(&self, asset_id: &Id) -> u64 {
        match self {
            Transaction::Import(tx) => inputs_total(&tx.import_ins, asset_id),
            Transaction::Export(tx) => tx
                .ins
                .iter()
                .filter(|i| &i.asset_id == asset_id)
                .fold(0u64, |acc, i| acc.saturating_add(i.amount)),
        }
    }

    fn output_total(&self, asset_id: &Id) -> u64 {
        match self {
            Transaction::Import(tx) => tx
                .outs
                .iter()
                .filter(|o| &o.asset_id == asset_id)
                .fold(0u64, |acc, o| acc.saturating_add(o.amount)),
            Transaction::Export(tx) => outputs_total(&tx.export_outs, asset_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avax_transaction::output::TransferOutput;
    use avax_transaction::Address;

    const AVAX: Id = Id::new([0xaa; 32]);

    #[test]
    fn test_export_rejects_duplicate_debits() {
        let input = EvmInput::new(Address::new([1; 20]), 10, AVAX, 0);
        let out = TransferableOutput::new(
            AVAX,
            AtomicOutput::SecpTransfer(TransferOutput::new(5, vec![Address::new([2; 20])], 0, 1)),
        );
        assert!(ExportTx::new(1, Id::default(), Id::default(), vec![input.clone()], vec![out.clone()]).is_ok());
        assert!(matches!(
            ExportTx::new(1, Id::default(), Id::default(), vec![input.clone(), input], vec![out]),
            Err(TransactionError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_export_totals_and_slots() {
        let signer = Address::new([7; 20]);
        let tx = Transaction::Export(
            ExportTx::new(
                1,
                Id::default(),
                Id::default(),
                vec![EvmInput::new(Address::new([1; 20]), 10, AVAX, 4).with_signer(signer)],
                vec![TransferableOutput::new(
                    AVAX,
                    AtomicOutput::SecpTransfer(TransferOutput::new(9, vec![Address::new([2; 20])], 0, 1)),
                )],
            )
            .unwrap(),
        );
        assert_eq!(tx.input_total(&AVAX), 10);
        assert_eq!(tx.output_total(&AVAX), 9);
        let slots = tx.signing_slots().unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].sig_idxs[0].source, Some(signer));
    }

    #[test]
    fn test_import_needs_inputs() {
        assert!(matches!(
            ImportTx::new(1, Id::default(), Id::default(), vec![], vec![]),
            Err(TransactionError::InvalidTransaction(_))
        ));
    }
}
