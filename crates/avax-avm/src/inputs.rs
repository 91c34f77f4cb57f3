//! X-chain inputs.

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_transaction::input::{InputKind, SigIdx, TransferInput};
use avax_transaction::utxo::AmountInputKind;
use avax_transaction::TransactionError;

use crate::constants::SECP_INPUT_ID;

/// Every input the X-chain codec can carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvmInput {
    /// secp256k1fx transfer input (5).
    SecpTransfer(TransferInput),
}

impl InputKind for AvmInput {
    fn type_id(&self) -> u32 {
        match self {
            AvmInput::SecpTransfer(_) => SECP_INPUT_ID,
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            AvmInput::SecpTransfer(i) => i.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            SECP_INPUT_ID => Ok(AvmInput::SecpTransfer(TransferInput::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "input", type_id }),
        }
    }

    fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            AvmInput::SecpTransfer(i) => &i.sig_idxs,
        }
    }

    fn amount(&self) -> u64 {
        match self {
            AvmInput::SecpTransfer(i) => i.amount,
        }
    }
}

impl AmountInputKind for AvmInput {
    fn from_transfer(input: TransferInput) -> Self {
        AvmInput::SecpTransfer(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_input_type() {
        let data = [0u8; 12];
        let mut reader = AvaxReader::new(&data);
        assert!(matches!(
            AvmInput::read_body(7, &mut reader),
            Err(TransactionError::UnknownType { kind: "input", type_id: 7 })
        ));
    }

    #[test]
    fn test_secp_input_prefix() {
        let input = AvmInput::from_transfer(TransferInput::new(1));
        let mut writer = AvaxWriter::new();
        input.write_to(&mut writer);
        assert_eq!(&writer.as_bytes()[..4], &[0, 0, 0, 5]);
        assert_eq!(input.amount(), 1);
    }
}
