//! Operations: state transitions on mint and NFT outputs.
//!
//! An operation consumes the UTXOs it names and produces new outputs of
//! the same asset. Each carries its own signature indices and is signed
//! with its own credential, after the base inputs.

use std::cmp::Ordering;

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_transaction::input::{read_sig_idxs, utxo_ref, write_sig_idxs, SigIdx};
use avax_transaction::output::{MintOutput, OutputOwners, TransferOutput};
use avax_transaction::{Id, TransactionError};

use crate::constants::{
    NFT_CREDENTIAL_ID, NFT_MINT_OP_ID, NFT_XFER_OP_ID, SECP_CREDENTIAL_ID, SECP_MINT_OP_ID,
};
use crate::outputs::{check_payload, NftTransferOutput};

/// A reference to a UTXO: `txid || output_idx(u32)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UtxoId {
    pub txid: Id,
    pub output_idx: u32,
}

impl UtxoId {
    pub fn new(txid: Id, output_idx: u32) -> Self {
        UtxoId { txid, output_idx }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let txid = Id::read_from(reader)?;
        let output_idx = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading utxo output index: {}", e))
        })?;
        Ok(UtxoId { txid, output_idx })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.txid.write_to(writer);
        writer.write_u32_be(self.output_idx);
    }
}

impl PartialOrd for UtxoId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UtxoId {
    fn cmp(&self, other: &Self) -> Ordering {
        utxo_ref(&self.txid, self.output_idx).cmp(&utxo_ref(&other.txid, other.output_idx))
    }
}

/// Mint fungible tokens with a secp256k1fx mint output.
///
/// Body: `sig_idxs || mint_output || transfer_output`, both outputs without
/// type IDs. The consumed mint output is replaced by `mint_output`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecpMintOperation {
    pub sig_idxs: Vec<SigIdx>,
    pub mint_output: MintOutput,
    pub transfer_output: TransferOutput,
}

/// Mint NFTs of one group, one per owner set.
///
/// Body: `sig_idxs || group_id(u32) || payload_len(u32) || payload ||
/// num_outputs(u32) || owners*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftMintOperation {
    pub sig_idxs: Vec<SigIdx>,
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub outputs: Vec<OutputOwners>,
}

/// Move an NFT to new owners.
///
/// Body: `sig_idxs || nft_transfer_output`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftTransferOperation {
    pub sig_idxs: Vec<SigIdx>,
    pub output: NftTransferOutput,
}

/// Every operation the X-chain codec can carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    SecpMint(SecpMintOperation),
    NftMint(NftMintOperation),
    NftTransfer(NftTransferOperation),
}

impl Operation {
    pub fn type_id(&self) -> u32 {
        match self {
            Operation::SecpMint(_) => SECP_MINT_OP_ID,
            Operation::NftMint(_) => NFT_MINT_OP_ID,
            Operation::NftTransfer(_) => NFT_XFER_OP_ID,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Operation::SecpMint(_) => "SECPMintOperation",
            Operation::NftMint(_) => "NFTMintOperation",
            Operation::NftTransfer(_) => "NFTTransferOperation",
        }
    }

    /// Type ID of the credential that signs this operation.
    pub fn credential_type_id(&self) -> u32 {
        match self {
            Operation::SecpMint(_) => SECP_CREDENTIAL_ID,
            Operation::NftMint(_) | Operation::NftTransfer(_) => NFT_CREDENTIAL_ID,
        }
    }

    pub fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Operation::SecpMint(op) => &op.sig_idxs,
            Operation::NftMint(op) => &op.sig_idxs,
            Operation::NftTransfer(op) => &op.sig_idxs,
        }
    }

    pub fn write_body(&self, writer: &mut AvaxWriter) {
        write_sig_idxs(self.sig_idxs(), writer);
        match self {
            Operation::SecpMint(op) => {
                op.mint_output.write_to(writer);
                op.transfer_output.write_to(writer);
            }
            Operation::NftMint(op) => {
                writer.write_u32_be(op.group_id);
                writer.write_len_prefixed(&op.payload);
                writer.write_u32_be(op.outputs.len() as u32);
                for owners in &op.outputs {
                    owners.write_to(writer);
                }
            }
            Operation::NftTransfer(op) => op.output.write_to(writer),
        }
    }

    /// The operation type-ID table.
    pub fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            SECP_MINT_OP_ID => {
                let sig_idxs = read_sig_idxs(reader)?;
                let mint_output = MintOutput::read_from(reader)?;
                let transfer_output = TransferOutput::read_from(reader)?;
                Ok(Operation::SecpMint(SecpMintOperation {
                    sig_idxs,
                    mint_output,
                    transfer_output,
                }))
            }
            NFT_MINT_OP_ID => {
                let sig_idxs = read_sig_idxs(reader)?;
                let group_id = reader.read_u32_be().map_err(|e| {
                    TransactionError::SerializationError(format!("reading nft group id: {}", e))
                })?;
                let payload = reader
                    .read_len_prefixed()
                    .map_err(|e| TransactionError::SerializationError(format!("reading nft payload: {}", e)))?
                    .to_vec();
                check_payload(&payload)?;
                // locktime + threshold + address count
                let count = reader.read_count(16).map_err(|e| {
                    TransactionError::SerializationError(format!("reading nft owner count: {}", e))
                })?;
                let mut outputs = Vec::with_capacity(count);
                for _ in 0..count {
                    outputs.push(OutputOwners::read_from(reader)?);
                }
                Ok(Operation::NftMint(NftMintOperation {
                    sig_idxs,
                    group_id,
                    payload,
                    outputs,
                }))
            }
            NFT_XFER_OP_ID => {
                let sig_idxs = read_sig_idxs(reader)?;
                let output = NftTransferOutput::read_from(reader)?;
                Ok(Operation::NftTransfer(NftTransferOperation { sig_idxs, output }))
            }
            _ => Err(TransactionError::UnknownType { kind: "operation", type_id }),
        }
    }
}

/// An operation tagged with its asset and the UTXOs it consumes.
///
/// Wire: `asset_id || num_utxos(u32) || utxo_id* || type_id(u32) || body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferableOperation {
    pub asset_id: Id,
    pub utxo_ids: Vec<UtxoId>,
    pub operation: Operation,
}

impl TransferableOperation {
    /// UTXO references are kept sorted.
    pub fn new(asset_id: Id, mut utxo_ids: Vec<UtxoId>, operation: Operation) -> Self {
        utxo_ids.sort();
        TransferableOperation {
            asset_id,
            utxo_ids,
            operation,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let asset_id = Id::read_from(reader)?;
        let count = reader.read_count(36).map_err(|e| {
            TransactionError::SerializationError(format!("reading utxo id count: {}", e))
        })?;
        let mut utxo_ids = Vec::with_capacity(count);
        for _ in 0..count {
            utxo_ids.push(UtxoId::read_from(reader)?);
        }
        let type_id = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading operation type id: {}", e))
        })?;
        let operation = Operation::read_body(type_id, reader)?;
        Ok(TransferableOperation {
            asset_id,
            utxo_ids,
            operation,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.asset_id.write_to(writer);
        writer.write_u32_be(self.utxo_ids.len() as u32);
        for utxo_id in &self.utxo_ids {
            utxo_id.write_to(writer);
        }
        writer.write_u32_be(self.operation.type_id());
        self.operation.write_body(writer);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = AvaxWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Canonical order: byte-lexicographic over the serialized form.
    pub fn comparator(a: &Self, b: &Self) -> Ordering {
        a.to_bytes().cmp(&b.to_bytes())
    }
}

/// Borrow operations in canonical order.
pub fn sorted_operations(ops: &[TransferableOperation]) -> Vec<&TransferableOperation> {
    let mut keyed: Vec<(Vec<u8>, &TransferableOperation)> = ops.iter().map(|o| (o.to_bytes(), o)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, o)| o).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use avax_transaction::Address;

    fn owners(b: u8) -> OutputOwners {
        OutputOwners::new(vec![Address::new([b; 20])], 0, 1)
    }

    fn reparse(op: &TransferableOperation) -> TransferableOperation {
        let bytes = op.to_bytes();
        let mut reader = AvaxReader::new(&bytes);
        let parsed = TransferableOperation::read_from(&mut reader).unwrap();
        assert_eq!(reader.remaining(), 0);
        parsed
    }

    #[test]
    fn test_secp_mint_layout() {
        let op = TransferableOperation::new(
            Id::new([9; 32]),
            vec![UtxoId::new(Id::new([1; 32]), 2)],
            Operation::SecpMint(SecpMintOperation {
                sig_idxs: vec![SigIdx::new(0, Address::new([1; 20]))],
                mint_output: MintOutput::new(vec![Address::new([1; 20])], 0, 1),
                transfer_output: TransferOutput::new(500, vec![Address::new([2; 20])], 0, 1),
            }),
        );
        let bytes = op.to_bytes();
        // asset, one utxo id, type 8, one sig idx of 0
        assert_eq!(&bytes[32..36], &[0, 0, 0, 1]);
        assert_eq!(&bytes[72..76], &[0, 0, 0, 8]);
        assert_eq!(&bytes[76..84], &[0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(bytes.len(), 32 + 4 + 36 + 4 + 8 + (16 + 20) + (8 + 16 + 20));
        let parsed = reparse(&op);
        assert_eq!(parsed.operation.type_id(), SECP_MINT_OP_ID);
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn test_nft_operations_reparse() {
        let mint = TransferableOperation::new(
            Id::new([3; 32]),
            vec![UtxoId::new(Id::new([5; 32]), 1)],
            Operation::NftMint(NftMintOperation {
                sig_idxs: vec![],
                group_id: 4,
                payload: b"ipfs://x".to_vec(),
                outputs: vec![owners(1), owners(2)],
            }),
        );
        assert_eq!(reparse(&mint), mint);
        assert_eq!(mint.operation.credential_type_id(), NFT_CREDENTIAL_ID);

        let transfer = TransferableOperation::new(
            Id::new([3; 32]),
            vec![UtxoId::new(Id::new([6; 32]), 0)],
            Operation::NftTransfer(NftTransferOperation {
                sig_idxs: vec![],
                output: NftTransferOutput::new(4, b"x".to_vec(), owners(3)).unwrap(),
            }),
        );
        let parsed = reparse(&transfer);
        assert_eq!(parsed.to_bytes(), transfer.to_bytes());
    }

    #[test]
    fn test_utxo_ids_are_sorted() {
        let op = TransferableOperation::new(
            Id::new([3; 32]),
            vec![UtxoId::new(Id::new([5; 32]), 256), UtxoId::new(Id::new([5; 32]), 1)],
            Operation::NftTransfer(NftTransferOperation {
                sig_idxs: vec![],
                output: NftTransferOutput::new(0, vec![], owners(3)).unwrap(),
            }),
        );
        assert_eq!(op.utxo_ids[0].output_idx, 1);
    }

    #[test]
    fn test_unknown_operation() {
        let data = [0u8; 8];
        let mut reader = AvaxReader::new(&data);
        assert!(matches!(
            Operation::read_body(99, &mut reader),
            Err(TransactionError::UnknownType { kind: "operation", type_id: 99 })
        ));
    }
}
