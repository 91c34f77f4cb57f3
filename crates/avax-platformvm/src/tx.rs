//! P-chain transaction variants.
//!
//! Staking transactions append a [`Validator`] description, the locked
//! stake outputs and a rewards owner to the base fields. Subnet
//! transactions name the subnet's owners or prove authority over them.

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_transaction::base_tx::{
    input_signing_slots, inputs_total, outputs_total, read_inputs, read_outputs, write_inputs, write_outputs,
    BaseTx,
};
use avax_transaction::constants::DELEGATION_FEE_DENOMINATOR;
use avax_transaction::input::{sort_inputs, TransferableInput};
use avax_transaction::output::{sort_outputs, OutputKind, OutputOwners, TransferableOutput};
use avax_transaction::tx::{SigningSlot, TxKind};
use avax_transaction::{Id, NodeId, TransactionError};

use crate::constants::*;
use crate::credentials::PlatformCredential;
use crate::inputs::PlatformInput;
use crate::outputs::PlatformOutput;

/// The base fields with P-chain inputs and outputs.
pub type PlatformBaseTx = BaseTx<PlatformInput, PlatformOutput>;

fn read_err(what: &str) -> impl Fn(avax_primitives::PrimitivesError) -> TransactionError + '_ {
    move |e| TransactionError::SerializationError(format!("reading {}: {}", what, e))
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// The node being staked on and for how long.
///
/// Wire: `node_id(20) || start_time(u64) || end_time(u64) || weight(u64)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validator {
    pub node_id: NodeId,
    pub start_time: u64,
    pub end_time: u64,
    pub weight: u64,
}

impl Validator {
    /// Fails with `InvalidTransaction` unless `start_time < end_time`.
    pub fn new(node_id: NodeId, start_time: u64, end_time: u64, weight: u64) -> Result<Self, TransactionError> {
        if start_time >= end_time {
            return Err(TransactionError::InvalidTransaction(format!(
                "end time {} must come after start time {}",
                end_time, start_time
            )));
        }
        Ok(Validator {
            node_id,
            start_time,
            end_time,
            weight,
        })
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        Ok(Validator {
            node_id: NodeId::read_from(reader)?,
            start_time: reader.read_u64_be().map_err(read_err("start time"))?,
            end_time: reader.read_u64_be().map_err(read_err("end time"))?,
            weight: reader.read_u64_be().map_err(read_err("weight"))?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.node_id.write_to(writer);
        writer.write_u64_be(self.start_time);
        writer.write_u64_be(self.end_time);
        writer.write_u64_be(self.weight);
    }
}

/// Read `11(u32) || owners`.
pub fn read_owner_output(reader: &mut AvaxReader) -> Result<OutputOwners, TransactionError> {
    let type_id = reader.read_u32_be().map_err(read_err("owner output type id"))?;
    if type_id != SECP_OWNER_OUTPUT_ID {
        return Err(TransactionError::UnknownType {
            kind: "owner output",
            type_id,
        });
    }
    OutputOwners::read_from(reader)
}

pub fn write_owner_output(owners: &OutputOwners, writer: &mut AvaxWriter) {
    writer.write_u32_be(SECP_OWNER_OUTPUT_ID);
    owners.write_to(writer);
}

/// Indices into the subnet owners' addresses whose keys approve a change.
///
/// Wire: `10(u32) || num_indices(u32) || index(u32)*`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubnetAuth {
    pub sig_indices: Vec<u32>,
}

impl SubnetAuth {
    pub fn new(sig_indices: Vec<u32>) -> Self {
        SubnetAuth { sig_indices }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let type_id = reader.read_u32_be().map_err(read_err("subnet auth type id"))?;
        if type_id != SUBNET_AUTH_ID {
            return Err(TransactionError::UnknownType {
                kind: "subnet auth",
                type_id,
            });
        }
        let count = reader.read_count(4).map_err(read_err("subnet auth count"))?;
        let mut sig_indices = Vec::with_capacity(count);
        for _ in 0..count {
            sig_indices.push(reader.read_u32_be().map_err(read_err("subnet auth index"))?);
        }
        Ok(SubnetAuth { sig_indices })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(SUBNET_AUTH_ID);
        writer.write_u32_be(self.sig_indices.len() as u32);
        for idx in &self.sig_indices {
            writer.write_u32_be(*idx);
        }
    }
}

// ---------------------------------------------------------------------------
// Staking
// ---------------------------------------------------------------------------

/// Delegate stake to an existing validator.
///
/// Wire: `base || validator || num_stake(u32) || stake_out* || 11 || rewards_owner`.
#[derive(Clone, Debug, PartialEq)]
pub struct AddDelegatorTx {
    pub base: PlatformBaseTx,
    pub validator: Validator,
    pub stake_outs: Vec<TransferableOutput<PlatformOutput>>,
    pub rewards_owner: OutputOwners,
}

fn check_stake(validator: &Validator, stake_outs: &[TransferableOutput<PlatformOutput>]) -> Result<(), TransactionError> {
    let staked = stake_outs
        .iter()
        .fold(0u64, |acc, o| acc.saturating_add(o.output.amount().unwrap_or(0)));
    if staked != validator.weight {
        return Err(TransactionError::InvalidTransaction(format!(
            "stake outputs total {} but validator weight is {}",
            staked, validator.weight
        )));
    }
    Ok(())
}

impl AddDelegatorTx {
    /// Stake outputs are sorted and must add up to the validator weight.
    pub fn new(
        base: PlatformBaseTx,
        validator: Validator,
        mut stake_outs: Vec<TransferableOutput<PlatformOutput>>,
        rewards_owner: OutputOwners,
    ) -> Result<Self, TransactionError> {
        check_stake(&validator, &stake_outs)?;
        sort_outputs(&mut stake_outs);
        Ok(AddDelegatorTx {
            base,
            validator,
            stake_outs,
            rewards_owner,
        })
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        Ok(AddDelegatorTx {
            base: BaseTx::read_from(reader)?,
            validator: Validator::read_from(reader)?,
            stake_outs: read_outputs(reader)?,
            rewards_owner: read_owner_output(reader)?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        self.validator.write_to(writer);
        write_outputs(&self.stake_outs, writer);
        write_owner_output(&self.rewards_owner, writer);
    }
}

/// Register a primary network validator.
///
/// Wire: the [`AddDelegatorTx`] layout followed by `delegation_shares(u32)`,
/// the cut of delegator rewards in millionths.
#[derive(Clone, Debug, PartialEq)]
pub struct AddValidatorTx {
    pub base: PlatformBaseTx,
    pub validator: Validator,
    pub stake_outs: Vec<TransferableOutput<PlatformOutput>>,
    pub rewards_owner: OutputOwners,
    pub delegation_shares: u32,
}

impl AddValidatorTx {
    /// Rejects a delegation fee above 100%.
    pub fn new(
        base: PlatformBaseTx,
        validator: Validator,
        mut stake_outs: Vec<TransferableOutput<PlatformOutput>>,
        rewards_owner: OutputOwners,
        delegation_shares: u32,
    ) -> Result<Self, TransactionError> {
        if delegation_shares > DELEGATION_FEE_DENOMINATOR {
            return Err(TransactionError::InvalidTransaction(format!(
                "delegation fee of {} shares exceeds 100%",
                delegation_shares
            )));
        }
        check_stake(&validator, &stake_outs)?;
        sort_outputs(&mut stake_outs);
        Ok(AddValidatorTx {
            base,
            validator,
            stake_outs,
            rewards_owner,
            delegation_shares,
        })
    }

    /// Delegation fee as a percentage.
    pub fn delegation_fee(&self) -> f64 {
        f64::from(self.delegation_shares) * 100.0 / f64::from(DELEGATION_FEE_DENOMINATOR)
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        Ok(AddValidatorTx {
            base: BaseTx::read_from(reader)?,
            validator: Validator::read_from(reader)?,
            stake_outs: read_outputs(reader)?,
            rewards_owner: read_owner_output(reader)?,
            delegation_shares: reader.read_u32_be().map_err(read_err("delegation shares"))?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        self.validator.write_to(writer);
        write_outputs(&self.stake_outs, writer);
        write_owner_output(&self.rewards_owner, writer);
        writer.write_u32_be(self.delegation_shares);
    }
}

/// Add a validator to a subnet.
///
/// Wire: `base || validator || subnet_id || subnet_auth`.
#[derive(Clone, Debug, PartialEq)]
pub struct AddSubnetValidatorTx {
    pub base: PlatformBaseTx,
    pub validator: Validator,
    pub subnet_id: Id,
    pub subnet_auth: SubnetAuth,
}

impl AddSubnetValidatorTx {
    pub fn new(base: PlatformBaseTx, validator: Validator, subnet_id: Id, subnet_auth: SubnetAuth) -> Self {
        AddSubnetValidatorTx {
            base,
            validator,
            subnet_id,
            subnet_auth,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        Ok(AddSubnetValidatorTx {
            base: BaseTx::read_from(reader)?,
            validator: Validator::read_from(reader)?,
            subnet_id: Id::read_from(reader)?,
            subnet_auth: SubnetAuth::read_from(reader)?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        self.validator.write_to(writer);
        self.subnet_id.write_to(writer);
        self.subnet_auth.write_to(writer);
    }
}

// ---------------------------------------------------------------------------
// Subnets and atomic transfers
// ---------------------------------------------------------------------------

/// Create a subnet controlled by `owners`.
///
/// Wire: `base || 11(u32) || owners`.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateSubnetTx {
    pub base: PlatformBaseTx,
    pub owners: OutputOwners,
}

impl CreateSubnetTx {
    pub fn new(base: PlatformBaseTx, owners: OutputOwners) -> Result<Self, TransactionError> {
        if owners.threshold as usize > owners.addresses().len() {
            return Err(TransactionError::InvalidTransaction(format!(
                "subnet threshold {} exceeds {} owners",
                owners.threshold,
                owners.addresses().len()
            )));
        }
        Ok(CreateSubnetTx { base, owners })
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        Ok(CreateSubnetTx {
            base: BaseTx::read_from(reader)?,
            owners: read_owner_output(reader)?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        write_owner_output(&self.owners, writer);
    }
}

/// Consume UTXOs another chain exported to the P-chain.
///
/// Wire: `base || source_chain || num_ins(u32) || import_in*`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportTx {
    pub base: PlatformBaseTx,
    pub source_chain: Id,
    pub import_ins: Vec<TransferableInput<PlatformInput>>,
}

impl ImportTx {
    pub fn new(base: PlatformBaseTx, source_chain: Id, mut import_ins: Vec<TransferableInput<PlatformInput>>) -> Self {
        sort_inputs(&mut import_ins);
        ImportTx {
            base,
            source_chain,
            import_ins,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        Ok(ImportTx {
            base: BaseTx::read_from(reader)?,
            source_chain: Id::read_from(reader)?,
            import_ins: read_inputs(reader)?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        self.source_chain.write_to(writer);
        write_inputs(&self.import_ins, writer);
    }
}

/// Move value from the P-chain into another chain's shared memory.
///
/// Wire: `base || destination_chain || num_outs(u32) || export_out*`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportTx {
    pub base: PlatformBaseTx,
    pub destination_chain: Id,
    pub export_outs: Vec<TransferableOutput<PlatformOutput>>,
}

impl ExportTx {
    pub fn new(
        base: PlatformBaseTx,
        destination_chain: Id,
        mut export_outs: Vec<TransferableOutput<PlatformOutput>>,
    ) -> Self {
        sort_outputs(&mut export_outs);
        ExportTx {
            base,
            destination_chain,
            export_outs,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        Ok(ExportTx {
            base: BaseTx::read_from(reader)?,
            destination_chain: Id::read_from(reader)?,
            export_outs: read_outputs(reader)?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.base.write_to(writer);
        self.destination_chain.write_to(writer);
        write_outputs(&self.export_outs, writer);
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Every transaction the P-chain codec can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum Transaction {
    AddValidator(AddValidatorTx),
    AddSubnetValidator(AddSubnetValidatorTx),
    AddDelegator(AddDelegatorTx),
    CreateSubnet(CreateSubnetTx),
    Import(ImportTx),
    Export(ExportTx),
}

impl Transaction {
    pub fn base(&self) -> &PlatformBaseTx {
        match self {
            Transaction::AddValidator(tx) => &tx.base,
            Transaction::AddSubnetValidator(tx) => &tx.base,
            Transaction::AddDelegator(tx) => &tx.base,
            Transaction::CreateSubnet(tx) => &tx.base,
            Transaction::Import(tx) => &tx.base,
            Transaction::Export(tx) => &tx.base,
        }
    }

    /// Outputs created besides the base outputs.
    fn extra_outs(&self) -> &[TransferableOutput<PlatformOutput>] {
        match self {
            Transaction::AddValidator(tx) => &tx.stake_outs,
            Transaction::AddDelegator(tx) => &tx.stake_outs,
            Transaction::Export(tx) => &tx.export_outs,
            _ => &[],
        }
    }
}

impl TxKind for Transaction {
    type Credential = PlatformCredential;

    fn type_id(&self) -> u32 {
        match self {
            Transaction::AddValidator(_) => ADD_VALIDATOR_TX_ID,
            Transaction::AddSubnetValidator(_) => ADD_SUBNET_VALIDATOR_TX_ID,
            Transaction::AddDelegator(_) => ADD_DELEGATOR_TX_ID,
            Transaction::CreateSubnet(_) => CREATE_SUBNET_TX_ID,
            Transaction::Import(_) => IMPORT_TX_ID,
            Transaction::Export(_) => EXPORT_TX_ID,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Transaction::AddValidator(_) => "AddValidatorTx",
            Transaction::AddSubnetValidator(_) => "AddSubnetValidatorTx",
            Transaction::AddDelegator(_) => "AddDelegatorTx",
            Transaction::CreateSubnet(_) => "CreateSubnetTx",
            Transaction::Import(_) => "ImportTx",
            Transaction::Export(_) => "ExportTx",
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            Transaction::AddValidator(tx) => tx.write_to(writer),
            Transaction::AddSubnetValidator(tx) => tx.write_to(writer),
            Transaction::AddDelegator(tx) => tx.write_to(writer),
            Transaction::CreateSubnet(tx) => tx.write_to(writer),
            Transaction::Import(tx) => tx.write_to(writer),
            Transaction::Export(tx) => tx.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            ADD_VALIDATOR_TX_ID => Ok(Transaction::AddValidator(AddValidatorTx::read_from(reader)?)),
            ADD_SUBNET_VALIDATOR_TX_ID => {
                Ok(Transaction::AddSubnetValidator(AddSubnetValidatorTx::read_from(reader)?))
            }
            ADD_DELEGATOR_TX_ID => Ok(Transaction::AddDelegator(AddDelegatorTx::read_from(reader)?)),
            CREATE_SUBNET_TX_ID => Ok(Transaction::CreateSubnet(CreateSubnetTx::read_from(reader)?)),
            IMPORT_TX_ID => Ok(Transaction::Import(ImportTx::read_from(reader)?)),
            EXPORT_TX_ID => Ok(Transaction::Export(ExportTx::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "transaction", type_id }),
        }
    }

    fn signing_slots(&self) -> Result<Vec<SigningSlot>, TransactionError> {
        match self {
            // the subnet auth credential needs the subnet owners' keys
            Transaction::AddSubnetValidator(_) => Err(TransactionError::Unimplemented(
                "signing AddSubnetValidatorTx".to_string(),
            )),
            Transaction::Import(tx) => {
                let mut slots = tx.base.signing_slots(SECP_CREDENTIAL_ID);
                slots.extend(input_signing_slots(&tx.import_ins, SECP_CREDENTIAL_ID));
                Ok(slots)
            }
            other => Ok(other.base().signing_slots(SECP_CREDENTIAL_ID)),
        }
    }

    fn input_total(&self, asset_id: &Id) -> u64 {
        let base = self.base().input_total(asset_id);
        match self {
            Transaction::Import(tx) => base.saturating_add(inputs_total(&tx.import_ins, asset_id)),
            _ => base,
        }
    }

    fn output_total(&self, asset_id: &Id) -> u64 {
        self.base()
            .output_total(asset_id)
            .saturating_add(outputs_total(self.extra_outs(), asset_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avax_transaction::output::TransferOutput;
    use avax_transaction::Address;

    fn base() -> PlatformBaseTx {
        BaseTx::new(12345, Id::default(), vec![], vec![], vec![]).unwrap()
    }

    fn stake(amount: u64) -> TransferableOutput<PlatformOutput> {
        TransferableOutput::new(
            Id::new([3; 32]),
            PlatformOutput::SecpTransfer(TransferOutput::new(amount, vec![Address::new([1; 20])], 0, 1)),
        )
    }

    #[test]
    fn test_validator_times() {
        assert!(Validator::new(NodeId::default(), 10, 20, 1).is_ok());
        assert!(matches!(
            Validator::new(NodeId::default(), 20, 20, 1),
            Err(TransactionError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_delegation_fee_bounds() {
        let validator = Validator::new(NodeId::new([9; 20]), 1, 2, 100).unwrap();
        let owners = OutputOwners::new(vec![Address::new([1; 20])], 0, 1);
        let tx = AddValidatorTx::new(base(), validator.clone(), vec![stake(100)], owners.clone(), 20_000).unwrap();
        assert!((tx.delegation_fee() - 2.0).abs() < f64::EPSILON);
        assert!(AddValidatorTx::new(base(), validator.clone(), vec![stake(100)], owners.clone(), 1_000_000).is_ok());
        assert!(matches!(
            AddValidatorTx::new(base(), validator, vec![stake(100)], owners, 1_000_001),
            Err(TransactionError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_stake_must_match_weight() {
        let validator = Validator::new(NodeId::new([9; 20]), 1, 2, 100).unwrap();
        let owners = OutputOwners::new(vec![], 0, 0);
        assert!(matches!(
            AddDelegatorTx::new(base(), validator, vec![stake(60), stake(30)], owners),
            Err(TransactionError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_add_delegator_layout() {
        let validator = Validator::new(NodeId::new([9; 20]), 1, 2, 100).unwrap();
        let owners = OutputOwners::new(vec![Address::new([5; 20])], 0, 1);
        let tx = AddDelegatorTx::new(base(), validator, vec![stake(40), stake(60)], owners).unwrap();
        assert_eq!(tx.stake_outs[0].output.amount(), Some(40));

        let mut writer = AvaxWriter::new();
        tx.write_to(&mut writer);
        let bytes = writer.into_bytes();
        // network(4) blockchain(32) outs(4) ins(4) memo(4)
        let validator_at = 48;
        assert_eq!(&bytes[validator_at..validator_at + 20], &[9; 20]);
        let owner_at = bytes.len() - (4 + 16 + 20);
        assert_eq!(&bytes[owner_at..owner_at + 4], &[0, 0, 0, 11]);

        let mut reader = AvaxReader::new(&bytes);
        assert_eq!(AddDelegatorTx::read_from(&mut reader).unwrap(), tx);
    }

    #[test]
    fn test_subnet_auth_roundtrip() {
        let auth = SubnetAuth::new(vec![0, 2]);
        let mut writer = AvaxWriter::new();
        auth.write_to(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes, [0, 0, 0, 10, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 2]);
        let mut reader = AvaxReader::new(&bytes);
        assert_eq!(SubnetAuth::read_from(&mut reader).unwrap(), auth);
    }

    #[test]
    fn test_create_subnet_threshold() {
        let owners = OutputOwners::new(vec![Address::new([1; 20])], 0, 2);
        assert!(matches!(
            CreateSubnetTx::new(base(), owners),
            Err(TransactionError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_subnet_validator_signing_unimplemented() {
        let tx = Transaction::AddSubnetValidator(AddSubnetValidatorTx::new(
            base(),
            Validator::new(NodeId::default(), 1, 2, 1).unwrap(),
            Id::new([4; 32]),
            SubnetAuth::new(vec![0]),
        ));
        assert!(matches!(tx.signing_slots(), Err(TransactionError::Unimplemented(_))));
    }
}
