//! P-chain transaction builders.
//!
//! Staking builders run selection with `stakeable` set so locked funds can
//! back the stake; every other builder only spends unlocked UTXOs. Each
//! build finishes with the Goose Egg check against the network's AVAX
//! asset.

use std::collections::BTreeMap;

use avax_transaction::input::{TransferInput, TransferableInput};
use avax_transaction::output::{OutputOwners, TransferOutput, TransferableOutput};
use avax_transaction::{Address, BaseTx, BuildOptions, Id, NetworkConfig, NodeId, TransactionError};
use log::debug;

use crate::inputs::PlatformInput;
use crate::outputs::PlatformOutput;
use crate::selection::{get_minimum_spendable, Selection};
use crate::tx::{AddDelegatorTx, AddValidatorTx, CreateSubnetTx, ExportTx, ImportTx, Transaction, Validator};
use crate::{UnsignedTx, Utxo, UtxoSet};

/// What to stake, where, for how long and who collects the rewards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorParams {
    pub node_id: NodeId,
    pub start_time: u64,
    pub end_time: u64,
    pub stake_amount: u64,
    /// Owners of the unlocked stake once the staking period ends.
    pub stake_to: Vec<Address>,
    pub reward_addresses: Vec<Address>,
    pub reward_locktime: u64,
    pub reward_threshold: u32,
}

impl ValidatorParams {
    fn rewards_owner(&self) -> Result<OutputOwners, TransactionError> {
        OutputOwners::check_spendable(&self.reward_addresses, self.reward_threshold, "reward")?;
        Ok(OutputOwners::new(
            self.reward_addresses.clone(),
            self.reward_locktime,
            self.reward_threshold,
        ))
    }
}

/// Builders over a set of P-chain UTXOs.
#[allow(clippy::too_many_arguments)]
pub trait PlatformBuilder {
    /// Import `atomics` exported from `source_chain` to `to`, taking the fee
    /// from imported AVAX first.
    fn build_import_tx(
        &self,
        net: &NetworkConfig,
        atomics: &[Utxo],
        source_chain: Id,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;

    /// Export `amount` AVAX to `to` on `destination_chain`.
    fn build_export_tx(
        &self,
        net: &NetworkConfig,
        amount: u64,
        destination_chain: Id,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;

    /// Stake on `params.node_id` as a primary network validator.
    ///
    /// `delegation_shares` is the cut of delegator rewards in millionths.
    fn build_add_validator_tx(
        &self,
        net: &NetworkConfig,
        params: &ValidatorParams,
        delegation_shares: u32,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;

    /// Delegate stake to the validator `params.node_id`.
    fn build_add_delegator_tx(
        &self,
        net: &NetworkConfig,
        params: &ValidatorParams,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;

    /// Create a subnet owned by `subnet_owners`.
    fn build_create_subnet_tx(
        &self,
        net: &NetworkConfig,
        subnet_owners: &[Address],
        subnet_threshold: u32,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;
}

#[allow(clippy::too_many_arguments)]
fn select(
    utxos: &UtxoSet,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    asset_id: Id,
    amount: u64,
    burn: u64,
    opts: &BuildOptions,
    stakeable: bool,
) -> Result<Selection, TransactionError> {
    let mut aad = Selection::new(to.to_vec(), from.to_vec(), change.to_vec());
    if amount > 0 || burn > 0 {
        aad.add_asset_amount(asset_id, amount, burn);
    }
    get_minimum_spendable(utxos, &mut aad, opts.as_of, opts.locktime, opts.threshold, stakeable)?;
    Ok(aad)
}

fn finish(net: &NetworkConfig, tx: Transaction) -> Result<UnsignedTx, TransactionError> {
    let unsigned = UnsignedTx::new(tx);
    unsigned.check_goose_egg(&net.avax_asset_id, None)?;
    Ok(unsigned)
}

/// Check the staking window and amount.
fn staking_terms(
    net: &NetworkConfig,
    params: &ValidatorParams,
    min_stake: u64,
    opts: &BuildOptions,
) -> Result<Validator, TransactionError> {
    if params.stake_amount < min_stake {
        return Err(TransactionError::InvalidTransaction(format!(
            "stake amount {} is below the minimum of {}",
            params.stake_amount, min_stake
        )));
    }
    if params.start_time <= opts.as_of {
        return Err(TransactionError::InvalidTransaction(format!(
            "start time {} must be in the future",
            params.start_time
        )));
    }
    debug!("staking {} on {} from network {}", params.stake_amount, params.node_id, net.network_id);
    Validator::new(params.node_id, params.start_time, params.end_time, params.stake_amount)
}

#[allow(clippy::too_many_arguments)]
impl PlatformBuilder for UtxoSet {
    fn build_import_tx(
        &self,
        net: &NetworkConfig,
        atomics: &[Utxo],
        source_chain: Id,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        if source_chain == net.p_chain_id {
            return Err(TransactionError::InvalidTransaction(
                "cannot import from the destination chain".to_string(),
            ));
        }
        opts.check_destinations(to)?;
        let fee = opts.fee_or(net.tx_fee);
        let mut import_ins = Vec::new();
        let mut imported: BTreeMap<Id, u64> = BTreeMap::new();
        for utxo in atomics {
            let PlatformOutput::SecpTransfer(out) = &utxo.output else {
                continue;
            };
            if !out.owners.meets_threshold(from, opts.as_of) {
                continue;
            }
            let input = TransferInput::spending(out.amount, &out.owners, from, opts.as_of);
            import_ins.push(TransferableInput::new(
                utxo.txid,
                utxo.output_idx,
                utxo.asset_id,
                PlatformInput::SecpTransfer(input),
            ));
            let total = imported.entry(utxo.asset_id).or_insert(0);
            *total = total.saturating_add(out.amount);
        }
        if import_ins.is_empty() {
            return Err(TransactionError::InsufficientFunds(
                "no spendable atomic utxos to import".to_string(),
            ));
        }

        let mut fee_remaining = fee;
        let mut outs = Vec::new();
        for (asset_id, mut amount) in imported {
            if asset_id == net.avax_asset_id {
                let paid = fee_remaining.min(amount);
                fee_remaining -= paid;
                amount -= paid;
            }
            if amount > 0 {
                let out = TransferOutput::new(amount, to.to_vec(), opts.locktime, opts.threshold);
                outs.push(TransferableOutput::new(asset_id, PlatformOutput::SecpTransfer(out)));
            }
        }

        let aad = select(self, to, from, change, net.avax_asset_id, 0, fee_remaining, opts, false)?;
        let (ins, fee_outs) = aad.into_inputs_and_all_outputs();
        outs.extend(fee_outs);
        debug!("import tx: {} atomic inputs, {} fee inputs", import_ins.len(), ins.len());
        let base = BaseTx::new(net.network_id, net.p_chain_id, outs, ins, opts.memo.clone())?;
        finish(net, Transaction::Import(ImportTx::new(base, source_chain, import_ins)))
    }

    fn build_export_tx(
        &self,
        net: &NetworkConfig,
        amount: u64,
        destination_chain: Id,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        if amount == 0 {
            return Err(TransactionError::InvalidTransaction("amount must be positive".to_string()));
        }
        if destination_chain == net.p_chain_id {
            return Err(TransactionError::InvalidTransaction(
                "cannot export to the source chain".to_string(),
            ));
        }
        opts.check_destinations(to)?;
        let fee = opts.fee_or(net.tx_fee);
        let aad = select(self, to, from, change, net.avax_asset_id, amount, fee, opts, false)?;
        let (ins, export_outs, change_outs) = aad.into_parts();
        let base = BaseTx::new(net.network_id, net.p_chain_id, change_outs, ins, opts.memo.clone())?;
        finish(net, Transaction::Export(ExportTx::new(base, destination_chain, export_outs)))
    }

    fn build_add_validator_tx(
        &self,
        net: &NetworkConfig,
        params: &ValidatorParams,
        delegation_shares: u32,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        let validator = staking_terms(net, params, net.min_validator_stake, opts)?;
        if delegation_shares < net.min_delegation_fee {
            return Err(TransactionError::InvalidTransaction(format!(
                "delegation fee of {} shares is below the minimum of {}",
                delegation_shares, net.min_delegation_fee
            )));
        }
        let rewards_owner = params.rewards_owner()?;
        let fee = opts.fee_or(net.tx_fee);
        let aad = select(
            self,
            &params.stake_to,
            from,
            change,
            net.avax_asset_id,
            params.stake_amount,
            fee,
            opts,
            true,
        )?;
        let (ins, stake_outs, change_outs) = aad.into_parts();
        let base = BaseTx::new(net.network_id, net.p_chain_id, change_outs, ins, opts.memo.clone())?;
        let tx = AddValidatorTx::new(base, validator, stake_outs, rewards_owner, delegation_shares)?;
        finish(net, Transaction::AddValidator(tx))
    }

    fn build_add_delegator_tx(
        &self,
        net: &NetworkConfig,
        params: &ValidatorParams,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        let validator = staking_terms(net, params, net.min_delegator_stake, opts)?;
        let rewards_owner = params.rewards_owner()?;
        let fee = opts.fee_or(net.tx_fee);
        let aad = select(
            self,
            &params.stake_to,
            from,
            change,
            net.avax_asset_id,
            params.stake_amount,
            fee,
            opts,
            true,
        )?;
        let (ins, stake_outs, change_outs) = aad.into_parts();
        let base = BaseTx::new(net.network_id, net.p_chain_id, change_outs, ins, opts.memo.clone())?;
        let tx = AddDelegatorTx::new(base, validator, stake_outs, rewards_owner)?;
        finish(net, Transaction::AddDelegator(tx))
    }

    fn build_create_subnet_tx(
        &self,
        net: &NetworkConfig,
        subnet_owners: &[Address],
        subnet_threshold: u32,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        let owners = OutputOwners::new(subnet_owners.to_vec(), 0, subnet_threshold);
        let fee = opts.fee_or(net.create_subnet_tx_fee);
        let aad = select(self, &[], from, change, net.avax_asset_id, 0, fee, opts, false)?;
        let (ins, outs) = aad.into_inputs_and_all_outputs();
        let base = BaseTx::new(net.network_id, net.p_chain_id, outs, ins, opts.memo.clone())?;
        finish(net, Transaction::CreateSubnet(CreateSubnetTx::new(base, owners)?))
    }
}
