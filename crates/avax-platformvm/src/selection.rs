//! Stake-aware UTXO selection.
//!
//! Staking may consume stakeable-locked funds. When `stakeable` is set the
//! locked UTXOs are spent first, latest unlock first, and re-locked into
//! the stake outputs under their original owners; locked funds beyond the
//! stake come back as locked change. Unlocked funds pay the burn, fill the
//! rest of the stake and produce ordinary change.

use std::collections::BTreeMap;

use avax_transaction::asset_amount::AssetAmountDestination;
use avax_transaction::input::{TransferInput, TransferableInput};
use avax_transaction::output::{OutputKind, OutputOwners, TransferOutput, TransferableOutput};
use avax_transaction::{Address, Id, TransactionError};
use log::{debug, trace};

use crate::inputs::{PlatformInput, StakeableLockIn};
use crate::outputs::{PlatformOutput, StakeableLockOut};
use crate::{Utxo, UtxoSet};

/// Ledgers plus the inputs and outputs chosen for a P-chain build.
pub type Selection = AssetAmountDestination<PlatformInput, PlatformOutput>;

/// UTXOs in spending order.
///
/// Without `stakeable`, still-locked UTXOs are skipped entirely.
fn consumable(utxos: &UtxoSet, as_of: u64, stakeable: bool) -> Vec<&Utxo> {
    let mut locked: Vec<(&Utxo, u64)> = Vec::new();
    let mut unlocked: Vec<&Utxo> = Vec::new();
    for utxo in utxos.get_all_utxos() {
        match &utxo.output {
            PlatformOutput::StakeableLock(out) if out.is_locked(as_of) => {
                if stakeable {
                    locked.push((utxo, out.stakeable_locktime));
                }
            }
            PlatformOutput::SecpOwner(_) => {}
            _ => unlocked.push(utxo),
        }
    }
    locked.sort_by(|a, b| b.1.cmp(&a.1));
    locked.into_iter().map(|(u, _)| u).chain(unlocked).collect()
}

/// Select UTXOs until every ledger in `aad` is finished, then emit the
/// destination and change outputs.
///
/// # Arguments
/// * `aad` - Ledgers and addresses; receives inputs, outputs and change.
/// * `as_of` - Time at which locktimes are evaluated.
/// * `locktime` - Locktime of the unlocked destination outputs.
/// * `threshold` - Threshold of the unlocked destination outputs.
/// * `stakeable` - Whether stakeable-locked UTXOs may cover `amount`.
///
/// # Returns
/// `Ok(())`, or `InsufficientFunds` when the senders cannot cover every
/// tracked asset.
pub fn get_minimum_spendable(
    utxos: &UtxoSet,
    aad: &mut Selection,
    as_of: u64,
    locktime: u64,
    threshold: u32,
    stakeable: bool,
) -> Result<(), TransactionError> {
    // locked UTXOs consumed per asset, in spending order
    let mut relocked: BTreeMap<Id, Vec<StakeableLockOut>> = BTreeMap::new();

    for utxo in consumable(utxos, as_of, stakeable) {
        if aad.can_complete() {
            break;
        }
        let Some(out) = utxo.output.transfer_output() else {
            continue;
        };
        if !out.owners.meets_threshold(aad.senders(), as_of) {
            continue;
        }
        match aad.get_asset_amount(&utxo.asset_id) {
            Some(ledger) if !ledger.is_finished() => {}
            _ => continue,
        }

        let transfer = TransferInput::spending(out.amount, &out.owners, aad.senders(), as_of);
        let lock = match &utxo.output {
            PlatformOutput::StakeableLock(lock) if lock.is_locked(as_of) => Some(lock),
            _ => None,
        };
        if let Some(ledger) = aad.get_asset_amount_mut(&utxo.asset_id) {
            ledger.spend_amount(out.amount, lock.is_some())?;
        }
        let input = match lock {
            Some(lock) => {
                relocked.entry(utxo.asset_id).or_default().push(lock.clone());
                PlatformInput::StakeableLock(StakeableLockIn::new(lock.stakeable_locktime, transfer))
            }
            None => PlatformInput::SecpTransfer(transfer),
        };
        trace!("selected {} {} from utxo {}", input.type_name(), out.amount, utxo.utxo_id());
        aad.add_input(TransferableInput::new(utxo.txid, utxo.output_idx, utxo.asset_id, input));
    }

    if !aad.can_complete() {
        return Err(TransactionError::InsufficientFunds(
            "insufficient funds to create the transaction".to_string(),
        ));
    }

    let ledgers: Vec<_> = aad.get_amounts().into_iter().cloned().collect();
    if ledgers.iter().any(|l| l.unlocked_amount() > 0) {
        OutputOwners::check_spendable(aad.destinations(), threshold, "destination")?;
    }
    if ledgers.iter().any(|l| l.unlocked_change() > 0) {
        OutputOwners::check_spendable(aad.change_addresses(), 1, "change")?;
    }
    for ledger in ledgers {
        let asset_id = ledger.asset_id();
        let locked = relocked.remove(&asset_id).unwrap_or_default();

        // locked change is carved from the last locked UTXOs consumed
        let mut locked_change = ledger.locked_change();
        for lock in locked.iter().rev() {
            let inner = &lock.transfer_output;
            let change = locked_change.min(inner.amount);
            locked_change -= change;
            let staked = inner.amount - change;
            if change > 0 {
                aad.add_change(relock(asset_id, lock, change));
            }
            if staked > 0 {
                aad.add_output(relock(asset_id, lock, staked));
            }
        }

        let unlocked_change = ledger.unlocked_change();
        if unlocked_change > 0 {
            let out = TransferOutput::new(unlocked_change, aad.change_addresses().to_vec(), 0, 1);
            aad.add_change(TransferableOutput::new(asset_id, PlatformOutput::SecpTransfer(out)));
        }

        let unlocked_amount = ledger.unlocked_amount();
        if unlocked_amount > 0 {
            let out = TransferOutput::new(unlocked_amount, aad.destinations().to_vec(), locktime, threshold);
            aad.add_output(TransferableOutput::new(asset_id, PlatformOutput::SecpTransfer(out)));
        }
        debug!(
            "asset {}: spent {} ({} locked), change {}",
            asset_id,
            ledger.spent(),
            ledger.stakeable_lock_spent(),
            ledger.change()
        );
    }
    Ok(())
}

/// `amount` of a consumed locked UTXO, locked again under its owners.
fn relock(asset_id: Id, lock: &StakeableLockOut, amount: u64) -> TransferableOutput<PlatformOutput> {
    let owners = &lock.transfer_output.owners;
    let inner = TransferOutput::new(amount, owners.addresses().to_vec(), owners.locktime, owners.threshold);
    TransferableOutput::new(
        asset_id,
        PlatformOutput::StakeableLock(StakeableLockOut::new(lock.stakeable_locktime, inner)),
    )
}

/// Total stake-only balance `addresses` hold at `as_of`.
pub fn get_locked_balance(utxos: &UtxoSet, addresses: &[Address], asset_id: &Id, as_of: u64) -> u64 {
    utxos
        .get_all_utxos()
        .into_iter()
        .filter(|u| &u.asset_id == asset_id)
        .filter_map(|u| match &u.output {
            PlatformOutput::StakeableLock(lock) if lock.is_locked(as_of) => Some(lock),
            _ => None,
        })
        .filter(|lock| lock.transfer_output.owners.meets_threshold(addresses, as_of))
        .fold(0u64, |acc, lock| acc.saturating_add(lock.transfer_output.amount))
}
