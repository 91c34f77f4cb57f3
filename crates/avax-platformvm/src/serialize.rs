//! JSON serialization form of the P-chain variants.

use avax_primitives::serialization::SerializedEncoding;
use avax_transaction::input::{InputKind, TransferInput};
use avax_transaction::output::{OutputKind, OutputOwners, TransferOutput};
use avax_transaction::serializable::{
    decode_id, decode_node_id, decode_u32, decode_u64, deserialize_array, deserialize_credential, encode_id,
    encode_node_id, encode_u32, encode_u64, extend_object, field, read_type_id, serialize_array,
    serialize_credential, typed_object, Serializable,
};
use avax_transaction::tx::TxKind;
use avax_transaction::{BaseTx, TransactionError};
use serde_json::{Map, Value};

use crate::constants::*;
use crate::credentials::PlatformCredential;
use crate::inputs::{PlatformInput, StakeableLockIn};
use crate::outputs::{PlatformOutput, StakeableLockOut};
use crate::tx::{
    AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx, CreateSubnetTx, ExportTx, ImportTx, SubnetAuth,
    Transaction, Validator,
};

fn typed(type_name: &str, type_id: u32, body: Value) -> Value {
    let mut obj = typed_object(type_name, type_id);
    extend_object(&mut obj, body);
    Value::Object(obj)
}

impl Serializable for PlatformOutput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let body = match self {
            PlatformOutput::SecpTransfer(o) => o.serialize(encoding)?,
            PlatformOutput::SecpOwner(o) => o.serialize(encoding)?,
            PlatformOutput::StakeableLock(o) => {
                let mut obj = Map::new();
                obj.insert("stakeableLocktime".to_string(), encode_u64(o.stakeable_locktime, encoding)?);
                obj.insert(
                    "transferableOutput".to_string(),
                    typed("SECPTransferOutput", SECP_XFER_OUTPUT_ID, o.transfer_output.serialize(encoding)?),
                );
                Value::Object(obj)
            }
        };
        Ok(typed(self.type_name(), self.type_id(), body))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        match read_type_id(value)? {
            SECP_XFER_OUTPUT_ID => Ok(PlatformOutput::SecpTransfer(TransferOutput::deserialize(value, encoding)?)),
            SECP_OWNER_OUTPUT_ID => Ok(PlatformOutput::SecpOwner(OutputOwners::deserialize(value, encoding)?)),
            STAKEABLE_LOCK_OUT_ID => {
                let inner = field(value, "transferableOutput")?;
                let inner_type = read_type_id(inner)?;
                if inner_type != SECP_XFER_OUTPUT_ID {
                    return Err(TransactionError::UnknownType {
                        kind: "locked output",
                        type_id: inner_type,
                    });
                }
                Ok(PlatformOutput::StakeableLock(StakeableLockOut::new(
                    decode_u64(value, "stakeableLocktime", encoding)?,
                    TransferOutput::deserialize(inner, encoding)?,
                )))
            }
            type_id => Err(TransactionError::UnknownType { kind: "output", type_id }),
        }
    }
}

impl Serializable for PlatformInput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let body = match self {
            PlatformInput::SecpTransfer(i) => i.serialize(encoding)?,
            PlatformInput::StakeableLock(i) => {
                let mut obj = Map::new();
                obj.insert("stakeableLocktime".to_string(), encode_u64(i.stakeable_locktime, encoding)?);
                obj.insert(
                    "transferableInput".to_string(),
                    typed("SECPTransferInput", SECP_INPUT_ID, i.transfer_input.serialize(encoding)?),
                );
                Value::Object(obj)
            }
        };
        Ok(typed(self.type_name(), self.type_id(), body))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        match read_type_id(value)? {
            SECP_INPUT_ID => Ok(PlatformInput::SecpTransfer(TransferInput::deserialize(value, encoding)?)),
            STAKEABLE_LOCK_IN_ID => {
                let inner = field(value, "transferableInput")?;
                let inner_type = read_type_id(inner)?;
                if inner_type != SECP_INPUT_ID {
                    return Err(TransactionError::UnknownType {
                        kind: "locked input",
                        type_id: inner_type,
                    });
                }
                Ok(PlatformInput::StakeableLock(StakeableLockIn::new(
                    decode_u64(value, "stakeableLocktime", encoding)?,
                    TransferInput::deserialize(inner, encoding)?,
                )))
            }
            type_id => Err(TransactionError::UnknownType { kind: "input", type_id }),
        }
    }
}

impl Serializable for PlatformCredential {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        serialize_credential(self, self.type_name(), encoding)
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        deserialize_credential(value, encoding)
    }
}

impl Serializable for Validator {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = Map::new();
        obj.insert("nodeID".to_string(), encode_node_id(&self.node_id, encoding)?);
        obj.insert("startTime".to_string(), encode_u64(self.start_time, encoding)?);
        obj.insert("endTime".to_string(), encode_u64(self.end_time, encoding)?);
        obj.insert("weight".to_string(), encode_u64(self.weight, encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        Validator::new(
            decode_node_id(value, "nodeID", encoding)?,
            decode_u64(value, "startTime", encoding)?,
            decode_u64(value, "endTime", encoding)?,
            decode_u64(value, "weight", encoding)?,
        )
    }
}

impl Serializable for SubnetAuth {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = typed_object("SubnetAuth", SUBNET_AUTH_ID);
        let indices = self
            .sig_indices
            .iter()
            .map(|idx| encode_u32(*idx, encoding))
            .collect::<Result<Vec<_>, _>>()?;
        obj.insert("sigIndices".to_string(), Value::Array(indices));
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        let type_id = read_type_id(value)?;
        if type_id != SUBNET_AUTH_ID {
            return Err(TransactionError::UnknownType {
                kind: "subnet auth",
                type_id,
            });
        }
        let items = field(value, "sigIndices")?
            .as_array()
            .ok_or_else(|| TransactionError::Json("field sigIndices is not an array".to_string()))?;
        let mut sig_indices = Vec::with_capacity(items.len());
        for item in items {
            // decode_u32 reads a keyed field, so wrap each element
            let mut wrapper = Map::new();
            wrapper.insert("index".to_string(), item.clone());
            sig_indices.push(decode_u32(&Value::Object(wrapper), "index", encoding)?);
        }
        Ok(SubnetAuth::new(sig_indices))
    }
}

fn owner_output(owners: &OutputOwners, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
    Ok(typed("SECPOwnerOutput", SECP_OWNER_OUTPUT_ID, owners.serialize(encoding)?))
}

fn read_owner_output(value: &Value, key: &str, encoding: SerializedEncoding) -> Result<OutputOwners, TransactionError> {
    let inner = field(value, key)?;
    let type_id = read_type_id(inner)?;
    if type_id != SECP_OWNER_OUTPUT_ID {
        return Err(TransactionError::UnknownType {
            kind: "owner output",
            type_id,
        });
    }
    OutputOwners::deserialize(inner, encoding)
}

impl Serializable for Transaction {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = typed_object(self.type_name(), self.type_id());
        extend_object(&mut obj, self.base().serialize(encoding)?);
        match self {
            Transaction::AddValidator(tx) => {
                obj.insert("validator".to_string(), tx.validator.serialize(encoding)?);
                obj.insert("stake".to_string(), serialize_array(&tx.stake_outs, encoding)?);
                obj.insert("rewardsOwner".to_string(), owner_output(&tx.rewards_owner, encoding)?);
                obj.insert("delegationFee".to_string(), encode_u32(tx.delegation_shares, encoding)?);
            }
            Transaction::AddDelegator(tx) => {
                obj.insert("validator".to_string(), tx.validator.serialize(encoding)?);
                obj.insert("stake".to_string(), serialize_array(&tx.stake_outs, encoding)?);
                obj.insert("rewardsOwner".to_string(), owner_output(&tx.rewards_owner, encoding)?);
            }
            Transaction::AddSubnetValidator(tx) => {
                obj.insert("validator".to_string(), tx.validator.serialize(encoding)?);
                obj.insert("subnetID".to_string(), encode_id(&tx.subnet_id, encoding)?);
                obj.insert("subnetAuth".to_string(), tx.subnet_auth.serialize(encoding)?);
            }
            Transaction::CreateSubnet(tx) => {
                obj.insert("subnetOwners".to_string(), owner_output(&tx.owners, encoding)?);
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
        if !matches!(
            type_id,
            ADD_VALIDATOR_TX_ID
                | ADD_SUBNET_VALIDATOR_TX_ID
                | ADD_DELEGATOR_TX_ID
                | CREATE_SUBNET_TX_ID
                | IMPORT_TX_ID
                | EXPORT_TX_ID
        ) {
            return Err(TransactionError::UnknownType { kind: "transaction", type_id });
        }
        let base = BaseTx::deserialize(value, encoding)?;
        let validator = || Validator::deserialize(field(value, "validator")?, encoding);
        match type_id {
            ADD_VALIDATOR_TX_ID => Ok(Transaction::AddValidator(AddValidatorTx::new(
                base,
                validator()?,
                deserialize_array(value, "stake", encoding)?,
                read_owner_output(value, "rewardsOwner", encoding)?,
                decode_u32(value, "delegationFee", encoding)?,
            )?)),
            ADD_DELEGATOR_TX_ID => Ok(Transaction::AddDelegator(AddDelegatorTx::new(
                base,
                validator()?,
                deserialize_array(value, "stake", encoding)?,
                read_owner_output(value, "rewardsOwner", encoding)?,
            )?)),
            ADD_SUBNET_VALIDATOR_TX_ID => Ok(Transaction::AddSubnetValidator(AddSubnetValidatorTx::new(
                base,
                validator()?,
                decode_id(value, "subnetID", encoding)?,
                SubnetAuth::deserialize(field(value, "subnetAuth")?, encoding)?,
            ))),
            CREATE_SUBNET_TX_ID => Ok(Transaction::CreateSubnet(CreateSubnetTx::new(
                base,
                read_owner_output(value, "subnetOwners", encoding)?,
            )?)),
            IMPORT_TX_ID => Ok(Transaction::Import(ImportTx::new(
                base,
                decode_id(value, "sourceChain", encoding)?,
                deserialize_array(value, "importIns", encoding)?,
            ))),
            _ => Ok(Transaction::Export(ExportTx::new(
                base,
                decode_id(value, "destinationChain", encoding)?,
                deserialize_array(value, "exportOuts", encoding)?,
            ))),
        }
    }
}
