//! The JSON serialization form of codec objects.
//!
//! Used for persistence and debugging, not for the wire. Every field is a
//! string produced by `avax_primitives::serialization::encoder` from the
//! field's raw bytes and its display type, keyed by field name. Polymorphic
//! items carry `_typeName` and `_typeID` so they can be decoded through the
//! same type-ID tables as the binary codec.

use avax_primitives::serialization::{decoder, encoder, SerializeArgs, SerializedEncoding, SerializedType};
use serde_json::{Map, Value};

use crate::base_tx::BaseTx;
use crate::credential::{Credential, CredentialKind};
use crate::input::{InputKind, SigIdx, TransferInput, TransferableInput};
use crate::nbytes::{Address, Id, NodeId, Signature};
use crate::output::{MintOutput, OutputKind, OutputOwners, TransferOutput, TransferableOutput};
use crate::tx::{Tx, TxKind, UnsignedTx};
use crate::utxo::Utxo;
use crate::TransactionError;

/// Conversion to and from the JSON serialization form.
pub trait Serializable: Sized {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError>;

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError>;
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Look up a field of a JSON object.
pub fn field<'a>(value: &'a Value, key: &str) -> Result<&'a Value, TransactionError> {
    value
        .get(key)
        .ok_or_else(|| TransactionError::Json(format!("missing field {}", key)))
}

fn field_str<'a>(value: &'a Value, key: &str) -> Result<&'a str, TransactionError> {
    field(value, key)?
        .as_str()
        .ok_or_else(|| TransactionError::Json(format!("field {} is not a string", key)))
}

/// Encode raw bytes as a string field.
pub fn encode_bytes(
    bytes: &[u8],
    encoding: SerializedEncoding,
    ty: SerializedType,
    args: &SerializeArgs,
) -> Result<Value, TransactionError> {
    Ok(Value::String(encoder(bytes, encoding, ty, args)?))
}

/// Decode a string field back into raw bytes.
pub fn decode_bytes(
    value: &Value,
    key: &str,
    encoding: SerializedEncoding,
    ty: SerializedType,
    args: &SerializeArgs,
) -> Result<Vec<u8>, TransactionError> {
    Ok(decoder(field_str(value, key)?, encoding, ty, args)?)
}

pub fn encode_u64(n: u64, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    encode_bytes(&n.to_be_bytes(), encoding, SerializedType::DecimalString, &SerializeArgs::fixed(8))
}

pub fn decode_u64(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<u64, TransactionError> {
    let bytes = decode_bytes(value, key, encoding, SerializedType::DecimalString, &SerializeArgs::fixed(8))?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes);
    Ok(u64::from_be_bytes(buf))
}

pub fn encode_u32(n: u32, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    encode_bytes(&n.to_be_bytes(), encoding, SerializedType::DecimalString, &SerializeArgs::fixed(4))
}

pub fn decode_u32(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<u32, TransactionError> {
    let bytes = decode_bytes(value, key, encoding, SerializedType::DecimalString, &SerializeArgs::fixed(4))?;
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes);
    Ok(u32::from_be_bytes(buf))
}

pub fn encode_u8(n: u8, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    encode_bytes(&[n], encoding, SerializedType::DecimalString, &SerializeArgs::fixed(1))
}

pub fn decode_u8(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<u8, TransactionError> {
    let bytes = decode_bytes(value, key, encoding, SerializedType::DecimalString, &SerializeArgs::fixed(1))?;
    bytes
        .first()
        .copied()
        .ok_or_else(|| TransactionError::Json(format!("field {} is empty", key)))
}

/// Text fields such as asset names.
pub fn encode_string(s: &str, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    encode_bytes(s.as_bytes(), encoding, SerializedType::Utf8, &SerializeArgs::default())
}

pub fn decode_string(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<String, TransactionError> {
    let bytes = decode_bytes(value, key, encoding, SerializedType::Utf8, &SerializeArgs::default())?;
    String::from_utf8(bytes).map_err(|e| TransactionError::Json(format!("field {} is not utf-8: {}", key, e)))
}

pub fn encode_id(id: &Id, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    encode_bytes(id.as_bytes(), encoding, SerializedType::Cb58, &SerializeArgs::fixed(Id::SIZE))
}

pub fn decode_id(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<Id, TransactionError> {
    let bytes = decode_bytes(value, key, encoding, SerializedType::Cb58, &SerializeArgs::fixed(Id::SIZE))?;
    Id::from_bytes(&bytes)
}

pub fn encode_address(addr: &Address, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    encode_bytes(addr.as_bytes(), encoding, SerializedType::Cb58, &SerializeArgs::fixed(Address::SIZE))
}

pub fn decode_address(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<Address, TransactionError> {
    let bytes = decode_bytes(value, key, encoding, SerializedType::Cb58, &SerializeArgs::fixed(Address::SIZE))?;
    Address::from_bytes(&bytes)
}

pub fn encode_node_id(node: &NodeId, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    encode_bytes(node.as_bytes(), encoding, SerializedType::NodeId, &SerializeArgs::fixed(NodeId::SIZE))
}

pub fn decode_node_id(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<NodeId, TransactionError> {
    let bytes = decode_bytes(value, key, encoding, SerializedType::NodeId, &SerializeArgs::fixed(NodeId::SIZE))?;
    NodeId::from_bytes(&bytes)
}

/// Variable-length bytes such as memos and NFT payloads.
pub fn encode_blob(bytes: &[u8], encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    encode_bytes(bytes, encoding, SerializedType::Hex, &SerializeArgs::default())
}

pub fn decode_blob(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<Vec<u8>, TransactionError> {
    decode_bytes(value, key, encoding, SerializedType::Hex, &SerializeArgs::default())
}

pub fn serialize_array<T: Serializable>(items: &[T], encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    Ok(Value::Array(
        items
            .iter()
            .map(|item| item.serialize(encoding))
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

pub fn deserialize_array<T: Serializable>(
    value: &Value,
    key: &str,
    encoding: SerializedEncoding,
) -> Result<Vec<T>, TransactionError> {
    field(value, key)?
        .as_array()
        .ok_or_else(|| TransactionError::Json(format!("field {} is not an array", key)))?
        .iter()
        .map(|item| T::deserialize(item, encoding))
        .collect()
}

/// Start an object for a polymorphic item.
pub fn typed_object(type_name: &str, type_id: u32) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("_typeName".to_string(), Value::String(type_name.to_string()));
    obj.insert("_typeID".to_string(), Value::from(type_id));
    obj
}

/// Merge the fields of `inner` into `obj`.
pub fn extend_object(obj: &mut Map<String, Value>, inner: Value) {
    if let Value::Object(fields) = inner {
        obj.extend(fields);
    }
}

/// The `_typeID` of a polymorphic item.
pub fn read_type_id(value: &Value) -> Result<u32, TransactionError> {
    field(value, "_typeID")?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| TransactionError::Json("invalid _typeID".to_string()))
}

// ---------------------------------------------------------------------------
// Common codec types
// ---------------------------------------------------------------------------

impl Serializable for Address {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("bytes".to_string(), encode_address(self, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        decode_address(value, "bytes", encoding)
    }
}

impl Serializable for Signature {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert(
            "bytes".to_string(),
            encode_bytes(self.as_bytes(), encoding, SerializedType::Cb58, &SerializeArgs::fixed(Signature::SIZE))?,
        );
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        let bytes = decode_bytes(value, "bytes", encoding, SerializedType::Cb58, &SerializeArgs::fixed(Signature::SIZE))?;
        Signature::from_bytes(&bytes)
    }
}

impl Serializable for SigIdx {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        if let Some(source) = &self.source {
            obj.insert("source".to_string(), encode_address(source, encoding)?);
        }
        obj.insert("index".to_string(), encode_u32(self.index, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        let index = decode_u32(value, "index", encoding)?;
        match value.get("source") {
            Some(_) => Ok(SigIdx::new(index, decode_address(value, "source", encoding)?)),
            None => Ok(SigIdx::unresolved(index)),
        }
    }
}

impl Serializable for OutputOwners {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("locktime".to_string(), encode_u64(self.locktime, encoding)?);
        obj.insert("threshold".to_string(), encode_u32(self.threshold, encoding)?);
        obj.insert("addresses".to_string(), serialize_array(self.addresses(), encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(OutputOwners::new(
            deserialize_array(value, "addresses", encoding)?,
            decode_u64(value, "locktime", encoding)?,
            decode_u32(value, "threshold", encoding)?,
        ))
    }
}

impl Serializable for TransferOutput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("amount".to_string(), encode_u64(self.amount, encoding)?);
        extend_object(&mut obj, self.owners.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(TransferOutput {
            amount: decode_u64(value, "amount", encoding)?,
            owners: OutputOwners::deserialize(value, encoding)?,
        })
    }
}

impl Serializable for MintOutput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        self.owners.serialize(encoding)
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(MintOutput {
            owners: OutputOwners::deserialize(value, encoding)?,
        })
    }
}

impl Serializable for TransferInput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("amount".to_string(), encode_u64(self.amount, encoding)?);
        obj.insert("sigIdxs".to_string(), serialize_array(&self.sig_idxs, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(TransferInput {
            amount: decode_u64(value, "amount", encoding)?,
            sig_idxs: deserialize_array(value, "sigIdxs", encoding)?,
        })
    }
}

impl Serializable for Credential {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("sigArray".to_string(), serialize_array(&self.sig_array, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(Credential::new(deserialize_array(value, "sigArray", encoding)?))
    }
}

impl<O: OutputKind + Serializable> Serializable for TransferableOutput<O> {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("assetID".to_string(), encode_id(&self.asset_id, encoding)?);
        obj.insert("output".to_string(), self.output.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(TransferableOutput::new(
            decode_id(value, "assetID", encoding)?,
            O::deserialize(field(value, "output")?, encoding)?,
        ))
    }
}

impl<I: InputKind + Serializable> Serializable for TransferableInput<I> {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("txid".to_string(), encode_id(&self.txid, encoding)?);
        obj.insert("outputidx".to_string(), encode_u32(self.output_idx, encoding)?);
        obj.insert("assetID".to_string(), encode_id(&self.asset_id, encoding)?);
        obj.insert("input".to_string(), self.input.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(TransferableInput::new(
            decode_id(value, "txid", encoding)?,
            decode_u32(value, "outputidx", encoding)?,
            decode_id(value, "assetID", encoding)?,
            I::deserialize(field(value, "input")?, encoding)?,
        ))
    }
}

impl<I, O> Serializable for BaseTx<I, O>
where
    I: InputKind + Serializable,
    O: OutputKind + Serializable,
{
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("networkID".to_string(), encode_u32(self.network_id, encoding)?);
        obj.insert("blockchainID".to_string(), encode_id(&self.blockchain_id, encoding)?);
        obj.insert("outs".to_string(), serialize_array(&self.outs, encoding)?);
        obj.insert("ins".to_string(), serialize_array(&self.ins, encoding)?);
        obj.insert("memo".to_string(), encode_blob(&self.memo, encoding)?);
        Ok(Value::Object(obj))
    }

    /// Rebuilds through `BaseTx::new`, so the memo limit and canonical
    /// ordering apply.
    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        BaseTx::new(
            decode_u32(value, "networkID", encoding)?,
            decode_id(value, "blockchainID", encoding)?,
            deserialize_array(value, "outs", encoding)?,
            deserialize_array(value, "ins", encoding)?,
            decode_blob(value, "memo", encoding)?,
        )
    }
}

impl<O: OutputKind + Serializable> Serializable for Utxo<O> {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("codecID".to_string(), Value::from(self.codec_id));
        obj.insert("txid".to_string(), encode_id(&self.txid, encoding)?);
        obj.insert("outputidx".to_string(), encode_u32(self.output_idx, encoding)?);
        obj.insert("assetID".to_string(), encode_id(&self.asset_id, encoding)?);
        obj.insert("output".to_string(), self.output.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(Utxo::new(
            decode_id(value, "txid", encoding)?,
            decode_u32(value, "outputidx", encoding)?,
            decode_id(value, "assetID", encoding)?,
            O::deserialize(field(value, "output")?, encoding)?,
        ))
    }
}

impl<T: TxKind + Serializable> Serializable for UnsignedTx<T> {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("codecID".to_string(), Value::from(self.codec_id));
        obj.insert("transaction".to_string(), self.transaction.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(UnsignedTx::new(T::deserialize(field(value, "transaction")?, encoding)?))
    }
}

impl<T> Serializable for Tx<T>
where
    T: TxKind + Serializable,
    T::Credential: Serializable,
{
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("unsignedTx".to_string(), self.unsigned.serialize(encoding)?);
        obj.insert("credentials".to_string(), serialize_array(&self.credentials, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Ok(Tx::new(
            UnsignedTx::deserialize(field(value, "unsignedTx")?, encoding)?,
            deserialize_array(value, "credentials", encoding)?,
        ))
    }
}

/// Serialize a credential variant with its type header.
pub fn serialize_credential<C: CredentialKind>(
    cred: &C,
    type_name: &str,
    encoding: SerializedEncoding,
) -> Result<Value, TransactionError> {
    let mut obj = typed_object(type_name, cred.type_id());
    extend_object(&mut obj, cred.credential().serialize(encoding)?);
    Ok(Value::Object(obj))
}

/// Deserialize a credential variant through its type-ID table.
pub fn deserialize_credential<C: CredentialKind>(
    value: &Value,
    encoding: SerializedEncoding,
) -> Result<C, TransactionError> {
    C::from_parts(read_type_id(value)?, Credential::deserialize(value, encoding)?)
}
