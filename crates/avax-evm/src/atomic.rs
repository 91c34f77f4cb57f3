//! Shared-memory inputs and outputs.
//!
//! The C-chain only moves secp256k1 transfers through shared memory, so
//! both variant sets have a single member.

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_transaction::input::{InputKind, SigIdx, TransferInput};
use avax_transaction::output::{OutputKind, OutputOwners, TransferOutput};
use avax_transaction::utxo::{AmountInputKind, AmountOutputKind};
use avax_transaction::TransactionError;

use crate::constants::{SECP_INPUT_ID, SECP_XFER_OUTPUT_ID};

/// An output exported to, or imported from, shared memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtomicOutput {
    /// secp256k1fx transfer output (7).
    SecpTransfer(TransferOutput),
}

impl AtomicOutput {
    pub fn type_name(&self) -> &'static str {
        match self {
            AtomicOutput::SecpTransfer(_) => "SECPTransferOutput",
        }
    }
}

impl OutputKind for AtomicOutput {
    fn type_id(&self) -> u32 {
        match self {
            AtomicOutput::SecpTransfer(_) => SECP_XFER_OUTPUT_ID,
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            AtomicOutput::SecpTransfer(o) => o.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            SECP_XFER_OUTPUT_ID => Ok(AtomicOutput::SecpTransfer(TransferOutput::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "output", type_id }),
        }
    }

    fn owners(&self) -> &OutputOwners {
        match self {
            AtomicOutput::SecpTransfer(o) => &o.owners,
        }
    }

    fn amount(&self) -> Option<u64> {
        match self {
            AtomicOutput::SecpTransfer(o) => Some(o.amount),
        }
    }
}

impl AmountOutputKind for AtomicOutput {
    fn from_transfer(output: TransferOutput) -> Self {
        AtomicOutput::SecpTransfer(output)
    }

    fn as_transfer(&self) -> Option<&TransferOutput> {
        match self {
            AtomicOutput::SecpTransfer(o) => Some(o),
        }
    }
}

/// An input consuming a UTXO from shared memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtomicInput {
    /// secp256k1fx transfer input (5).
    SecpTransfer(TransferInput),
}

impl AtomicInput {
    pub fn type_name(&self) -> &'static str {
        match self {
            AtomicInput::SecpTransfer(_) => "SECPTransferInput",
        }
    }
}

impl InputKind for AtomicInput {
    fn type_id(&self) -> u32 {
        match self {
            AtomicInput::SecpTransfer(_) => SECP_INPUT_ID,
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            AtomicInput::SecpTransfer(i) => i.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            SECP_INPUT_ID => Ok(AtomicInput::SecpTransfer(TransferInput::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "input", type_id }),
        }
    }

    fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            AtomicInput::SecpTransfer(i) => &i.sig_idxs,
        }
    }

    fn amount(&self) -> u64 {
        match self {
            AtomicInput::SecpTransfer(i) => i.amount,
        }
    }
}

impl AmountInputKind for AtomicInput {
    fn from_transfer(input: TransferInput) -> Self {
        AtomicInput::SecpTransfer(input)
    }
}
