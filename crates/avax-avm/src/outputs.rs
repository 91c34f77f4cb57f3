//! X-chain outputs.
//!
//! [`AvmOutput`] is the closed set of outputs the X-chain codec
//! understands; its `read_body` is the type-ID table for outputs.

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_transaction::output::{MintOutput, OutputKind, OutputOwners, TransferOutput};
use avax_transaction::utxo::AmountOutputKind;
use avax_transaction::{Address, TransactionError};

use crate::constants::{
    MAX_NFT_PAYLOAD_LEN, NFT_MINT_OUTPUT_ID, NFT_XFER_OUTPUT_ID, SECP_MINT_OUTPUT_ID, SECP_XFER_OUTPUT_ID,
};

/// Authority to mint NFTs of one group.
///
/// Body: `group_id(u32) || owners`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftMintOutput {
    pub group_id: u32,
    pub owners: OutputOwners,
}

impl NftMintOutput {
    pub fn new(group_id: u32, addresses: Vec<Address>, locktime: u64, threshold: u32) -> Self {
        NftMintOutput {
            group_id,
            owners: OutputOwners::new(addresses, locktime, threshold),
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let group_id = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading nft group id: {}", e))
        })?;
        let owners = OutputOwners::read_from(reader)?;
        Ok(NftMintOutput { group_id, owners })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.group_id);
        self.owners.write_to(writer);
    }
}

/// A minted NFT.
///
/// Body: `group_id(u32) || payload_len(u32) || payload || owners`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftTransferOutput {
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub owners: OutputOwners,
}

impl NftTransferOutput {
    /// Fails with `InvalidTransaction` if the payload exceeds
    /// `MAX_NFT_PAYLOAD_LEN`.
    pub fn new(group_id: u32, payload: Vec<u8>, owners: OutputOwners) -> Result<Self, TransactionError> {
        check_payload(&payload)?;
        Ok(NftTransferOutput {
            group_id,
            payload,
            owners,
        })
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let group_id = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading nft group id: {}", e))
        })?;
        let payload = reader
            .read_len_prefixed()
            .map_err(|e| TransactionError::SerializationError(format!("reading nft payload: {}", e)))?
            .to_vec();
        check_payload(&payload)?;
        let owners = OutputOwners::read_from(reader)?;
        Ok(NftTransferOutput {
            group_id,
            payload,
            owners,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.group_id);
        writer.write_len_prefixed(&self.payload);
        self.owners.write_to(writer);
    }
}

pub(crate) fn check_payload(payload: &[u8]) -> Result<(), TransactionError> {
    if payload.len() > MAX_NFT_PAYLOAD_LEN {
        return Err(TransactionError::InvalidTransaction(format!(
            "nft payload is {} bytes, limit is {}",
            payload.len(),
            MAX_NFT_PAYLOAD_LEN
        )));
    }
    Ok(())
}

/// Every output the X-chain codec can carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvmOutput {
    /// secp256k1fx transfer output (7).
    SecpTransfer(TransferOutput),
    /// secp256k1fx mint output (6).
    SecpMint(MintOutput),
    /// nftfx transfer output (11).
    NftTransfer(NftTransferOutput),
    /// nftfx mint output (10).
    NftMint(NftMintOutput),
}

impl AvmOutput {
    /// Human readable variant name used by the JSON form.
    pub fn type_name(&self) -> &'static str {
        match self {
            AvmOutput::SecpTransfer(_) => "SECPTransferOutput",
            AvmOutput::SecpMint(_) => "SECPMintOutput",
            AvmOutput::NftTransfer(_) => "NFTTransferOutput",
            AvmOutput::NftMint(_) => "NFTMintOutput",
        }
    }
}

impl OutputKind for AvmOutput {
    fn type_id(&self) -> u32 {
        match self {
            AvmOutput::SecpTransfer(_) => SECP_XFER_OUTPUT_ID,
            AvmOutput::SecpMint(_) => SECP_MINT_OUTPUT_ID,
            AvmOutput::NftTransfer(_) => NFT_XFER_OUTPUT_ID,
            AvmOutput::NftMint(_) => NFT_MINT_OUTPUT_ID,
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            AvmOutput::SecpTransfer(o) => o.write_to(writer),
            AvmOutput::SecpMint(o) => o.write_to(writer),
            AvmOutput::NftTransfer(o) => o.write_to(writer),
            AvmOutput::NftMint(o) => o.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            SECP_XFER_OUTPUT_ID => Ok(AvmOutput::SecpTransfer(TransferOutput::read_from(reader)?)),
            SECP_MINT_OUTPUT_ID => Ok(AvmOutput::SecpMint(MintOutput::read_from(reader)?)),
            NFT_XFER_OUTPUT_ID => Ok(AvmOutput::NftTransfer(NftTransferOutput::read_from(reader)?)),
            NFT_MINT_OUTPUT_ID => Ok(AvmOutput::NftMint(NftMintOutput::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "output", type_id }),
        }
    }

    fn owners(&self) -> &OutputOwners {
        match self {
            AvmOutput::SecpTransfer(o) => &o.owners,
            AvmOutput::SecpMint(o) => &o.owners,
            AvmOutput::NftTransfer(o) => &o.owners,
            AvmOutput::NftMint(o) => &o.owners,
        }
    }

    fn amount(&self) -> Option<u64> {
        match self {
            AvmOutput::SecpTransfer(o) => Some(o.amount),
            _ => None,
        }
    }
}

impl AmountOutputKind for AvmOutput {
    fn from_transfer(output: TransferOutput) -> Self {
        AvmOutput::SecpTransfer(output)
    }

    fn as_transfer(&self) -> Option<&TransferOutput> {
        match self {
            AvmOutput::SecpTransfer(o) => Some(o),
            _ => None,
        }
    }
}
