//! P-chain inputs.

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_transaction::input::{InputKind, SigIdx, TransferInput};
use avax_transaction::utxo::AmountInputKind;
use avax_transaction::TransactionError;

use crate::constants::{SECP_INPUT_ID, STAKEABLE_LOCK_IN_ID};

/// Spends a [`StakeableLockOut`](crate::outputs::StakeableLockOut) before
/// its stakeable locktime.
///
/// Body: `stakeable_locktime(u64) || 5(u32) || transfer input`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeableLockIn {
    pub stakeable_locktime: u64,
    pub transfer_input: TransferInput,
}

impl StakeableLockIn {
    pub fn new(stakeable_locktime: u64, transfer_input: TransferInput) -> Self {
        StakeableLockIn {
            stakeable_locktime,
            transfer_input,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let stakeable_locktime = reader.read_u64_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading stakeable locktime: {}", e))
        })?;
        let inner_type = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading locked input type id: {}", e))
        })?;
        if inner_type != SECP_INPUT_ID {
            return Err(TransactionError::UnknownType {
                kind: "locked input",
                type_id: inner_type,
            });
        }
        Ok(StakeableLockIn {
            stakeable_locktime,
            transfer_input: TransferInput::read_from(reader)?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u64_be(self.stakeable_locktime);
        writer.write_u32_be(SECP_INPUT_ID);
        self.transfer_input.write_to(writer);
    }
}

/// Every input the P-chain codec can carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformInput {
    /// secp256k1fx transfer input (5).
    SecpTransfer(TransferInput),
    /// Stakeable locked transfer input (21).
    StakeableLock(StakeableLockIn),
}

impl PlatformInput {
    pub fn type_name(&self) -> &'static str {
        match self {
            PlatformInput::SecpTransfer(_) => "SECPTransferInput",
            PlatformInput::StakeableLock(_) => "StakeableLockIn",
        }
    }

    fn transfer_input(&self) -> &TransferInput {
        match self {
            PlatformInput::SecpTransfer(i) => i,
            PlatformInput::StakeableLock(i) => &i.transfer_input,
        }
    }
}

impl InputKind for PlatformInput {
    fn type_id(&self) -> u32 {
        match self {
            PlatformInput::SecpTransfer(_) => SECP_INPUT_ID,
            PlatformInput::StakeableLock(_) => STAKEABLE_LOCK_IN_ID,
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            PlatformInput::SecpTransfer(i) => i.write_to(writer),
            PlatformInput::StakeableLock(i) => i.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            SECP_INPUT_ID => Ok(PlatformInput::SecpTransfer(TransferInput::read_from(reader)?)),
            STAKEABLE_LOCK_IN_ID => Ok(PlatformInput::StakeableLock(StakeableLockIn::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "input", type_id }),
        }
    }

    fn sig_idxs(&self) -> &[SigIdx] {
        &self.transfer_input().sig_idxs
    }

    fn amount(&self) -> u64 {
        self.transfer_input().amount
    }
}

impl AmountInputKind for PlatformInput {
    fn from_transfer(input: TransferInput) -> Self {
        PlatformInput::SecpTransfer(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avax_transaction::Address;

    #[test]
    fn test_stakeable_lock_in_roundtrip() {
        let mut inner = TransferInput::new(900);
        inner.add_signature_idx(1, Address::new([4; 20]));
        let input = PlatformInput::StakeableLock(StakeableLockIn::new(77, inner));
        let mut writer = AvaxWriter::new();
        input.write_to(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..4], &[0, 0, 0, 21]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 5]);

        let mut reader = AvaxReader::new(&bytes);
        let parsed = PlatformInput::read_from(&mut reader).unwrap();
        assert_eq!(parsed.amount(), 900);
        assert_eq!(parsed.sig_idxs().len(), 1);
        assert_eq!(parsed.sig_idxs()[0].index, 1);
        // the wire carries only the index
        assert_eq!(parsed.sig_idxs()[0].source, None);
    }

    #[test]
    fn test_unknown_input_type() {
        let data = [0u8; 16];
        let mut reader = AvaxReader::new(&data);
        assert!(matches!(
            PlatformInput::read_body(22, &mut reader),
            Err(TransactionError::UnknownType { kind: "input", type_id: 22 })
        ));
    }
}
