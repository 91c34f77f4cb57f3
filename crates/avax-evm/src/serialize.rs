//! JSON serialization form of the C-chain atomic variants.
//!
//! Account addresses are rendered as hex rather than cb58, matching how
//! EVM tooling prints them. The signer of an [`EvmInput`] is not part of
//! the form.

use avax_primitives::serialization::{SerializeArgs, SerializedEncoding, SerializedType};
use avax_transaction::input::{InputKind, TransferInput};
use avax_transaction::output::{OutputKind, TransferOutput};
use avax_transaction::serializable::{
    decode_bytes, decode_id, decode_u32, decode_u64, deserialize_array, deserialize_credential, encode_bytes,
    encode_id, encode_u32, encode_u64, extend_object, read_type_id, serialize_array, serialize_credential,
    typed_object, Serializable,
};
use avax_transaction::tx::TxKind;
use avax_transaction::{Address, TransactionError};
use serde_json::{Map, Value};

use crate::atomic::{AtomicInput, AtomicOutput};
use crate::constants::*;
use crate::credentials::EvmCredential;
use crate::evm_io::{EvmInput, EvmOutput};
use crate::tx::{ExportTx, ImportTx, Transaction};

fn encode_account(address: &Address, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    encode_bytes(address.as_bytes(), encoding, SerializedType::Hex, &SerializeArgs::fixed(Address::SIZE))
}

fn decode_account(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<Address, TransactionError> {
    let bytes = decode_bytes(value, key, encoding, SerializedType::Hex, &SerializeArgs::fixed(Address::SIZE))?;
    Address::from_bytes(&bytes)
}

impl Serializable for AtomicOutput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = typed_object(self.type_name(), self.type_id());
        match self {
            AtomicOutput::SecpTransfer(o) => extend_object(&mut obj, o.serialize(encoding)?),
        }
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        match read_type_id(value)? {
            SECP_XFER_OUTPUT_ID => Ok(AtomicOutput::SecpTransfer(TransferOutput::deserialize(value, encoding)?)),
            type_id => Err(TransactionError::UnknownType { kind: "output", type_id }),
        }
    }
}

impl Serializable for AtomicInput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = typed_object(self.type_name(), self.type_id());
        match self {
            AtomicInput::SecpTransfer(i) => extend_object(&mut obj, i.serialize(encoding)?),
        }
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        match read_type_id(value)? {
            SECP_INPUT_ID => Ok(AtomicInput::SecpTransfer(TransferInput::deserialize(value, encoding)?)),
            type_id => Err(TransactionError::UnknownType { kind: "input", type_id }),
        }
    }
}

impl Serializable for EvmCredential {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        serialize_credential(self, self.type_name(), encoding)
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        deserialize_credential(value, encoding)
    }
}

impl Serializable for EvmOutput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("address".to_string(), encode_account(&self.address, encoding)?);
        obj.insert("amount".to_string(), encode_u64(self.amount, encoding)?);
        obj.insert("assetID".to_string(), encode_id(&self.asset_id, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(EvmOutput::new(
            decode_account(value, "address", encoding)?,
            decode_u64(value, "amount", encoding)?,
            decode_id(value, "assetID", encoding)?,
        ))
    }
}

impl Serializable for EvmInput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("address".to_string(), encode_account(&self.address, encoding)?);
        obj.insert("amount".to_string(), encode_u64(self.amount, encoding)?);
        obj.insert("assetID".to_string(), encode_id(&self.asset_id, encoding)?);
        obj.insert("nonce".to_string(), encode_u64(self.nonce, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(EvmInput::new(
            decode_account(value, "address", encoding)?,
            decode_u64(value, "amount", encoding)?,
            decode_id(value, "assetID", encoding)?,
            decode_u64(value, "nonce", encoding)?,
        ))
    }
}

impl Serializable for Transaction {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = typed_object(self.type_name(), self.type_id());
        obj.insert("networkID".to_string(), encode_u32(self.network_id(), encoding)?);
        obj.insert("blockchainID".to_string(), encode_id(&self.blockchain_id(), encoding)?);
        match self {
            Transaction::Import(tx) => {
                obj.insert("sourceChain".to_string(), encode_id(&tx.source_chain, encoding)?);
                obj.insert("importIns".to_string(), serialize_array(&tx.import_ins, encoding)?);
                obj.insert("outs".to_string(), serialize_array(&tx.outs, encoding)?);
            }
            Transaction::Export(tx) => {
                obj.insert("destinationChain".to_string(), encode_id(&tx.destination_chain, encoding)?);
                obj.insert("ins".to_string(), serialize_array(&tx.ins, encoding)?);
                obj.insert("exportedOutputs".to_string(), serialize_array(&tx.export_outs, encoding)?);
            }
        }
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        let type_id = read_type_id(value)?;
        if !matches!(type_id, IMPORT_TX_ID | EXPORT_TX_ID) {
            return Err(TransactionError::UnknownType { kind: "transaction", type_id });
        }
        let network_id = decode_u32(value, "networkID", encoding)?;
        let blockchain_id = decode_id(value, "blockchainID", encoding)?;
        if type_id == IMPORT_TX_ID {
            Ok(Transaction::Import(ImportTx::new(
                network_id,
                blockchain_id,
                decode_id(value, "sourceChain", encoding)?,
                deserialize_array(value, "importIns", encoding)?,
                deserialize_array(value, "outs", encoding)?,
            )?))
        } else {
            Ok(Transaction::Export(ExportTx::new(
                network_id,
                blockchain_id,
                decode_id(value, "destinationChain", encoding)?,
                deserialize_array(value, "ins", encoding)?,
                deserialize_array(value, "exportedOutputs", encoding)?,
            )?))
        }
    }
}
