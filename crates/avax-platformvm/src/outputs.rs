//! P-chain outputs.
//!
//! Besides the plain secp256k1 transfer output the P-chain knows two more
//! shapes: an owners-only output naming who receives rewards or controls
//! a subnet, and a transfer output that stays locked for anything but
//! staking until its stakeable locktime passes.

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_transaction::output::{OutputKind, OutputOwners, TransferOutput};
use avax_transaction::utxo::AmountOutputKind;
use avax_transaction::TransactionError;

use crate::constants::{SECP_OWNER_OUTPUT_ID, SECP_XFER_OUTPUT_ID, STAKEABLE_LOCK_OUT_ID};

/// A transfer output that can only be staked before `stakeable_locktime`.
///
/// Body: `stakeable_locktime(u64) || 7(u32) || transfer output`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeableLockOut {
    pub stakeable_locktime: u64,
    pub transfer_output: TransferOutput,
}

impl StakeableLockOut {
    pub fn new(stakeable_locktime: u64, transfer_output: TransferOutput) -> Self {
        StakeableLockOut {
            stakeable_locktime,
            transfer_output,
        }
    }

    /// Whether the funds are still stake-only at `as_of`.
    pub fn is_locked(&self, as_of: u64) -> bool {
        self.stakeable_locktime > as_of
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let stakeable_locktime = reader.read_u64_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading stakeable locktime: {}", e))
        })?;
        let inner_type = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading locked output type id: {}", e))
        })?;
        if inner_type != SECP_XFER_OUTPUT_ID {
            return Err(TransactionError::UnknownType {
                kind: "locked output",
                type_id: inner_type,
            });
        }
        let transfer_output = TransferOutput::read_from(reader)?;
        Ok(StakeableLockOut {
            stakeable_locktime,
            transfer_output,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u64_be(self.stakeable_locktime);
        writer.write_u32_be(SECP_XFER_OUTPUT_ID);
        self.transfer_output.write_to(writer);
    }
}

/// Every output the P-chain codec can carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformOutput {
    /// secp256k1fx transfer output (7).
    SecpTransfer(TransferOutput),
    /// secp256k1fx owners output (11).
    SecpOwner(OutputOwners),
    /// Stakeable locked transfer output (22).
    StakeableLock(StakeableLockOut),
}

impl PlatformOutput {
    pub fn type_name(&self) -> &'static str {
        match self {
            PlatformOutput::SecpTransfer(_) => "SECPTransferOutput",
            PlatformOutput::SecpOwner(_) => "SECPOwnerOutput",
            PlatformOutput::StakeableLock(_) => "StakeableLockOut",
        }
    }

    /// The transfer output this carries, locked or not.
    pub fn transfer_output(&self) -> Option<&TransferOutput> {
        match self {
            PlatformOutput::SecpTransfer(o) => Some(o),
            PlatformOutput::StakeableLock(o) => Some(&o.transfer_output),
            PlatformOutput::SecpOwner(_) => None,
        }
    }
}

impl OutputKind for PlatformOutput {
    fn type_id(&self) -> u32 {
        match self {
            PlatformOutput::SecpTransfer(_) => SECP_XFER_OUTPUT_ID,
            PlatformOutput::SecpOwner(_) => SECP_OWNER_OUTPUT_ID,
            PlatformOutput::StakeableLock(_) => STAKEABLE_LOCK_OUT_ID,
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            PlatformOutput::SecpTransfer(o) => o.write_to(writer),
            PlatformOutput::SecpOwner(o) => o.write_to(writer),
            PlatformOutput::StakeableLock(o) => o.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            SECP_XFER_OUTPUT_ID => Ok(PlatformOutput::SecpTransfer(TransferOutput::read_from(reader)?)),
            SECP_OWNER_OUTPUT_ID => Ok(PlatformOutput::SecpOwner(OutputOwners::read_from(reader)?)),
            STAKEABLE_LOCK_OUT_ID => Ok(PlatformOutput::StakeableLock(StakeableLockOut::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "output", type_id }),
        }
    }

    fn owners(&self) -> &OutputOwners {
        match self {
            PlatformOutput::SecpTransfer(o) => &o.owners,
            PlatformOutput::SecpOwner(o) => o,
            PlatformOutput::StakeableLock(o) => &o.transfer_output.owners,
        }
    }

    fn amount(&self) -> Option<u64> {
        self.transfer_output().map(|o| o.amount)
    }
}

impl AmountOutputKind for PlatformOutput {
    fn from_transfer(output: TransferOutput) -> Self {
        PlatformOutput::SecpTransfer(output)
    }

    // Locked outputs need a stakeable lock input, so plain selection
    // must not treat them as transfers.
    fn as_transfer(&self) -> Option<&TransferOutput> {
        match self {
            PlatformOutput::SecpTransfer(o) => Some(o),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avax_transaction::Address;

    #[test]
    fn test_stakeable_lock_out_layout() {
        let out = PlatformOutput::StakeableLock(StakeableLockOut::new(
            1_700_000_000,
            TransferOutput::new(50, vec![Address::new([1; 20])], 0, 1),
        ));
        let mut writer = AvaxWriter::new();
        out.write_to(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..4], &[0, 0, 0, 22]);
        assert_eq!(&bytes[4..12], &1_700_000_000u64.to_be_bytes());
        assert_eq!(&bytes[12..16], &[0, 0, 0, 7]);
        assert_eq!(&bytes[16..24], &50u64.to_be_bytes());

        let mut reader = AvaxReader::new(&bytes);
        let parsed = PlatformOutput::read_from(&mut reader).unwrap();
        assert_eq!(parsed, out);
        assert_eq!(parsed.amount(), Some(50));
        assert!(parsed.as_transfer().is_none());
    }

    #[test]
    fn test_locked_output_must_wrap_transfer() {
        let mut writer = AvaxWriter::new();
        writer.write_u64_be(1);
        writer.write_u32_be(SECP_OWNER_OUTPUT_ID);
        OutputOwners::new(vec![], 0, 0).write_to(&mut writer);
        let bytes = writer.into_bytes();
        let mut reader = AvaxReader::new(&bytes);
        assert!(matches!(
            StakeableLockOut::read_from(&mut reader),
            Err(TransactionError::UnknownType { kind: "locked output", type_id: 11 })
        ));
    }

    #[test]
    fn test_owner_output_has_no_amount() {
        let out = PlatformOutput::SecpOwner(OutputOwners::new(vec![Address::new([2; 20])], 0, 1));
        assert_eq!(out.amount(), None);
        assert_eq!(out.type_id(), 11);
        assert_eq!(out.owners().threshold, 1);
    }

    #[test]
    fn test_unknown_output_type() {
        let data = [0u8; 16];
        let mut reader = AvaxReader::new(&data);
        assert!(matches!(
            PlatformOutput::read_body(6, &mut reader),
            Err(TransactionError::UnknownType { kind: "output", type_id: 6 })
        ));
    }
}
