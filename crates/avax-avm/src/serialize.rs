//! JSON serialization form of the X-chain variants.

use avax_primitives::serialization::SerializedEncoding;
use avax_transaction::input::{InputKind, SigIdx, TransferInput};
use avax_transaction::output::{MintOutput, OutputKind, OutputOwners, TransferOutput};
use avax_transaction::serializable::{
    decode_blob, decode_id, decode_string, decode_u32, decode_u8, deserialize_array, deserialize_credential,
    encode_blob, encode_id, encode_string, encode_u32, encode_u8, extend_object, field, read_type_id,
    serialize_array, serialize_credential, typed_object, Serializable,
};
use avax_transaction::tx::TxKind;
use avax_transaction::{BaseTx, TransactionError};
use serde_json::{Map, Value};

use crate::constants::*;
use crate::credentials::AvmCredential;
use crate::inputs::AvmInput;
use crate::operations::{
    NftMintOperation, NftTransferOperation, Operation, SecpMintOperation, TransferableOperation, UtxoId,
};
use crate::outputs::{AvmOutput, NftMintOutput, NftTransferOutput};
use crate::tx::{CreateAssetTx, ExportTx, ImportTx, InitialState, OperationTx, Transaction};

fn typed(type_name: &str, type_id: u32, body: Value) -> Value {
    let mut obj = typed_object(type_name, type_id);
    extend_object(&mut obj, body);
    Value::Object(obj)
}

impl Serializable for NftMintOutput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("groupID".to_string(), encode_u32(self.group_id, encoding)?);
        extend_object(&mut obj, self.owners.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(NftMintOutput {
            group_id: decode_u32(value, "groupID", encoding)?,
            owners: OutputOwners::deserialize(value, encoding)?,
        })
    }
}

impl Serializable for NftTransferOutput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("groupID".to_string(), encode_u32(self.group_id, encoding)?);
        obj.insert("payload".to_string(), encode_blob(&self.payload, encoding)?);
        extend_object(&mut obj, self.owners.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        NftTransferOutput::new(
            decode_u32(value, "groupID", encoding)?,
            decode_blob(value, "payload", encoding)?,
            OutputOwners::deserialize(value, encoding)?,
        )
    }
}

impl Serializable for AvmOutput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let body = match self {
            AvmOutput::SecpTransfer(o) => o.serialize(encoding)?,
            AvmOutput::SecpMint(o) => o.serialize(encoding)?,
            AvmOutput::NftTransfer(o) => o.serialize(encoding)?,
            AvmOutput::NftMint(o) => o.serialize(encoding)?,
        };
        Ok(typed(self.type_name(), self.type_id(), body))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        match read_type_id(value)? {
            SECP_XFER_OUTPUT_ID => Ok(AvmOutput::SecpTransfer(TransferOutput::deserialize(value, encoding)?)),
            SECP_MINT_OUTPUT_ID => Ok(AvmOutput::SecpMint(MintOutput::deserialize(value, encoding)?)),
            NFT_XFER_OUTPUT_ID => Ok(AvmOutput::NftTransfer(NftTransferOutput::deserialize(value, encoding)?)),
            NFT_MINT_OUTPUT_ID => Ok(AvmOutput::NftMint(NftMintOutput::deserialize(value, encoding)?)),
            type_id => Err(TransactionError::UnknownType { kind: "output", type_id }),
        }
    }
}

impl Serializable for AvmInput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        match self {
            AvmInput::SecpTransfer(i) => Ok(typed("SECPTransferInput", self.type_id(), i.serialize(encoding)?)),
        }
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        match read_type_id(value)? {
            SECP_INPUT_ID => Ok(AvmInput::SecpTransfer(TransferInput::deserialize(value, encoding)?)),
            type_id => Err(TransactionError::UnknownType { kind: "input", type_id }),
        }
    }
}

impl Serializable for AvmCredential {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        serialize_credential(self, self.type_name(), encoding)
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        deserialize_credential(value, encoding)
    }
}

impl Serializable for UtxoId {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("txid".to_string(), encode_id(&self.txid, encoding)?);
        obj.insert("outputidx".to_string(), encode_u32(self.output_idx, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(UtxoId::new(
            decode_id(value, "txid", encoding)?,
            decode_u32(value, "outputidx", encoding)?,
        ))
    }
}

impl Serializable for Operation {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = typed_object(self.type_name(), self.type_id());
        obj.insert("sigIdxs".to_string(), serialize_array(self.sig_idxs(), encoding)?);
        match self {
            Operation::SecpMint(op) => {
                obj.insert("mintOutput".to_string(), op.mint_output.serialize(encoding)?);
                obj.insert("transferOutput".to_string(), op.transfer_output.serialize(encoding)?);
            }
            Operation::NftMint(op) => {
                obj.insert("groupID".to_string(), encode_u32(op.group_id, encoding)?);
                obj.insert("payload".to_string(), encode_blob(&op.payload, encoding)?);
                obj.insert("outputOwners".to_string(), serialize_array(&op.outputs, encoding)?);
            }
            Operation::NftTransfer(op) => {
                obj.insert("output".to_string(), op.output.serialize(encoding)?);
            }
        }
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        let sig_idxs: Vec<SigIdx> = deserialize_array(value, "sigIdxs", encoding)?;
        match read_type_id(value)? {
            SECP_MINT_OP_ID => Ok(Operation::SecpMint(SecpMintOperation {
                sig_idxs,
                mint_output: MintOutput::deserialize(field(value, "mintOutput")?, encoding)?,
                transfer_output: TransferOutput::deserialize(field(value, "transferOutput")?, encoding)?,
            })),
            NFT_MINT_OP_ID => Ok(Operation::NftMint(NftMintOperation {
                sig_idxs,
                group_id: decode_u32(value, "groupID", encoding)?,
                payload: decode_blob(value, "payload", encoding)?,
                outputs: deserialize_array(value, "outputOwners", encoding)?,
            })),
            NFT_XFER_OP_ID => Ok(Operation::NftTransfer(NftTransferOperation {
                sig_idxs,
                output: NftTransferOutput::deserialize(field(value, "output")?, encoding)?,
            })),
            type_id => Err(TransactionError::UnknownType { kind: "operation", type_id }),
        }
    }
}

impl Serializable for TransferableOperation {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("assetID".to_string(), encode_id(&self.asset_id, encoding)?);
        obj.insert("utxoIDs".to_string(), serialize_array(&self.utxo_ids, encoding)?);
        obj.insert("operation".to_string(), self.operation.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(TransferableOperation::new(
            decode_id(value, "assetID", encoding)?,
            deserialize_array(value, "utxoIDs", encoding)?,
            Operation::deserialize(field(value, "operation")?, encoding)?,
        ))
    }
}

impl Serializable for InitialState {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("fxID".to_string(), encode_u32(self.fx_id, encoding)?);
        obj.insert("outputs".to_string(), serialize_array(&self.outputs, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(InitialState::new(
            decode_u32(value, "fxID", encoding)?,
            deserialize_array(value, "outputs", encoding)?,
        ))
    }
}

impl Serializable for Transaction {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = typed_object(self.type_name(), self.type_id());
        extend_object(&mut obj, self.base().serialize(encoding)?);
        match self {
            Transaction::Base(_) => {}
            Transaction::CreateAsset(tx) => {
                obj.insert("name".to_string(), encode_string(&tx.name, encoding)?);
                obj.insert("symbol".to_string(), encode_string(&tx.symbol, encoding)?);
                obj.insert("denomination".to_string(), encode_u8(tx.denomination, encoding)?);
                obj.insert("initialState".to_string(), serialize_array(&tx.initial_states, encoding)?);
            }
            Transaction::Operation(tx) => {
                obj.insert("ops".to_string(), serialize_array(&tx.ops, encoding)?);
            }
            Transaction::Import(tx) => {
                obj.insert("sourceChain".to_string(), encode_id(&tx.source_chain, encoding)?);
                obj.insert("importIns".to_string(), serialize_array(&tx.import_ins, encoding)?);
            }
            Transaction::Export(tx) => {
                obj.insert("destinationChain".to_string(), encode_id(&tx.destination_chain, encoding)?);
                obj.insert("exportOuts".to_string(), serialize_array(&tx.export_outs, encoding)?);
            }
        }
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        let type_id = read_type_id(value)?;
        if type_id > EXPORT_TX_ID {
            return Err(TransactionError::UnknownType { kind: "transaction", type_id });
        }
        let base = BaseTx::deserialize(value, encoding)?;
        match type_id {
            BASE_TX_ID => Ok(Transaction::Base(base)),
            CREATE_ASSET_TX_ID => Ok(Transaction::CreateAsset(CreateAssetTx::new(
                base,
                &decode_string(value, "name", encoding)?,
                &decode_string(value, "symbol", encoding)?,
                decode_u8(value, "denomination", encoding)?,
                deserialize_array(value, "initialState", encoding)?,
            )?)),
            OPERATION_TX_ID => Ok(Transaction::Operation(OperationTx::new(
                base,
                deserialize_array(value, "ops", encoding)?,
            ))),
            IMPORT_TX_ID => Ok(Transaction::Import(ImportTx::new(
                base,
                decode_id(value, "sourceChain", encoding)?,
                deserialize_array(value, "importIns", encoding)?,
            ))),
            EXPORT_TX_ID => Ok(Transaction::Export(ExportTx::new(
                base,
                decode_id(value, "destinationChain", encoding)?,
                deserialize_array(value, "exportOuts", encoding)?,
            ))),
            _ => Err(TransactionError::UnknownType { kind: "transaction", type_id }),
        }
    }
}
