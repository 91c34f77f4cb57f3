//! Per-asset spend ledgers used by UTXO selection.
//!
//! An [`AssetAmount`] tracks how much of one asset a transaction must move
//! (`amount`), destroy as a fee (`burn`), and how much has been consumed
//! so far. [`AssetAmountDestination`] groups the ledgers of every asset a
//! build touches together with the address lists and the inputs and
//! outputs accumulated while selecting UTXOs.

use std::collections::BTreeMap;

use crate::input::TransferableInput;
use crate::nbytes::{Address, Id};
use crate::output::TransferableOutput;
use crate::TransactionError;

/// Spend ledger for a single asset.
///
/// Stakeable-locked funds may only cover `amount` (the stake). Locked
/// funds consumed beyond `amount` are returned as locked change and do not
/// count towards `burn`. Once finished, `spent == amount + burn + change`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetAmount {
    asset_id: Id,
    amount: u64,
    burn: u64,
    spent: u64,
    stakeable_lock_spent: u64,
    change: u64,
    stakeable_lock_change: bool,
    finished: bool,
}

impl AssetAmount {
    /// A ledger that needs `amount` moved and `burn` destroyed.
    ///
    /// A ledger with nothing to move or burn starts finished.
    pub fn new(asset_id: Id, amount: u64, burn: u64) -> Self {
        AssetAmount {
            asset_id,
            amount,
            burn,
            spent: 0,
            stakeable_lock_spent: 0,
            change: 0,
            stakeable_lock_change: false,
            finished: amount == 0 && burn == 0,
        }
    }

    /// Record that a UTXO worth `amt` was consumed.
    ///
    /// # Arguments
    /// * `amt` - Value of the consumed UTXO.
    /// * `stakeable_locked` - Whether the UTXO is stakeable-locked.
    ///
    /// # Returns
    /// Whether the ledger is now finished. Spending on a finished ledger
    /// fails with `InsufficientFunds` and changes nothing.
    pub fn spend_amount(&mut self, amt: u64, stakeable_locked: bool) -> Result<bool, TransactionError> {
        if self.finished {
            return Err(TransactionError::InsufficientFunds(
                "attempted to spend excess funds".to_string(),
            ));
        }
        self.spent = self.spent.saturating_add(amt);
        if stakeable_locked {
            self.stakeable_lock_spent = self.stakeable_lock_spent.saturating_add(amt);
        }
        let target = self.amount.saturating_add(self.burn);
        let usable = self.spent - self.locked_excess();
        if usable >= target {
            self.change = self.spent - target;
            self.stakeable_lock_change = self.locked_excess() > 0;
            self.finished = true;
        }
        Ok(self.finished)
    }

    /// Locked funds consumed beyond what the stake can absorb.
    fn locked_excess(&self) -> u64 {
        self.stakeable_lock_spent.saturating_sub(self.amount)
    }

    pub fn asset_id(&self) -> Id {
        self.asset_id
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn burn(&self) -> u64 {
        self.burn
    }

    pub fn spent(&self) -> u64 {
        self.spent
    }

    pub fn stakeable_lock_spent(&self) -> u64 {
        self.stakeable_lock_spent
    }

    pub fn change(&self) -> u64 {
        self.change
    }

    pub fn stakeable_lock_change(&self) -> bool {
        self.stakeable_lock_change
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Part of `change` that must stay stakeable-locked.
    pub fn locked_change(&self) -> u64 {
        if self.finished {
            self.locked_excess()
        } else {
            0
        }
    }

    /// Part of `change` that is freely spendable.
    pub fn unlocked_change(&self) -> u64 {
        self.change - self.locked_change()
    }

    /// Part of `amount` covered by stakeable-locked funds.
    pub fn locked_amount(&self) -> u64 {
        self.stakeable_lock_spent.min(self.amount)
    }

    /// Part of `amount` covered by unlocked funds.
    pub fn unlocked_amount(&self) -> u64 {
        self.amount - self.locked_amount()
    }
}

/// The ledgers, addresses and selected inputs/outputs of one build.
#[derive(Clone, Debug)]
pub struct AssetAmountDestination<I, O> {
    amounts: BTreeMap<Id, AssetAmount>,
    destinations: Vec<Address>,
    senders: Vec<Address>,
    change_addresses: Vec<Address>,
    inputs: Vec<TransferableInput<I>>,
    outputs: Vec<TransferableOutput<O>>,
    change: Vec<TransferableOutput<O>>,
}

impl<I, O> AssetAmountDestination<I, O> {
    pub fn new(destinations: Vec<Address>, senders: Vec<Address>, change_addresses: Vec<Address>) -> Self {
        AssetAmountDestination {
            amounts: BTreeMap::new(),
            destinations,
            senders,
            change_addresses,
            inputs: Vec::new(),
            outputs: Vec::new(),
            change: Vec::new(),
        }
    }

    /// Track an asset. Adding the same asset twice merges the targets.
    pub fn add_asset_amount(&mut self, asset_id: Id, amount: u64, burn: u64) {
        let entry = self
            .amounts
            .entry(asset_id)
            .or_insert_with(|| AssetAmount::new(asset_id, 0, 0));
        let merged_amount = entry.amount.saturating_add(amount);
        let merged_burn = entry.burn.saturating_add(burn);
        *entry = AssetAmount::new(asset_id, merged_amount, merged_burn);
    }

    pub fn asset_exists(&self, asset_id: &Id) -> bool {
        self.amounts.contains_key(asset_id)
    }

    pub fn get_asset_amount(&self, asset_id: &Id) -> Option<&AssetAmount> {
        self.amounts.get(asset_id)
    }

    pub fn get_asset_amount_mut(&mut self, asset_id: &Id) -> Option<&mut AssetAmount> {
        self.amounts.get_mut(asset_id)
    }

    /// Ledgers in asset ID order.
    pub fn get_amounts(&self) -> Vec<&AssetAmount> {
        self.amounts.values().collect()
    }

    /// True once every tracked ledger is finished.
    pub fn can_complete(&self) -> bool {
        self.amounts.values().all(AssetAmount::is_finished)
    }

    pub fn destinations(&self) -> &[Address] {
        &self.destinations
    }

    pub fn senders(&self) -> &[Address] {
        &self.senders
    }

    pub fn change_addresses(&self) -> &[Address] {
        &self.change_addresses
    }

    pub fn add_input(&mut self, input: TransferableInput<I>) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TransferableOutput<O>) {
        self.outputs.push(output);
    }

    pub fn add_change(&mut self, output: TransferableOutput<O>) {
        self.change.push(output);
    }

    pub fn inputs(&self) -> &[TransferableInput<I>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransferableOutput<O>] {
        &self.outputs
    }

    pub fn change_outputs(&self) -> &[TransferableOutput<O>] {
        &self.change
    }

    /// Consume the destination, returning `(inputs, outputs, change)`.
    pub fn into_parts(
        self,
    ) -> (
        Vec<TransferableInput<I>>,
        Vec<TransferableOutput<O>>,
        Vec<TransferableOutput<O>>,
    ) {
        (self.inputs, self.outputs, self.change)
    }

    /// Consume the destination, returning inputs and outputs plus change.
    pub fn into_inputs_and_all_outputs(self) -> (Vec<TransferableInput<I>>, Vec<TransferableOutput<O>>) {
        let (inputs, mut outputs, change) = self.into_parts();
        outputs.extend(change);
        (inputs, outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> Id {
        Id::new([7; 32])
    }

    #[test]
    fn test_exact_spend_has_no_change() {
        let mut aa = AssetAmount::new(asset(), 100, 10);
        assert!(!aa.spend_amount(60, false).unwrap());
        assert!(aa.spend_amount(50, false).unwrap());
        assert_eq!(aa.change(), 0);
        assert_eq!(aa.spent(), aa.amount() + aa.burn() + aa.change());
    }

    #[test]
    fn test_overshoot_becomes_change() {
        let mut aa = AssetAmount::new(asset(), 100, 10);
        assert!(aa.spend_amount(500, false).unwrap());
        assert_eq!(aa.change(), 390);
        assert!(!aa.stakeable_lock_change());
        assert_eq!(aa.unlocked_change(), 390);
    }

    #[test]
    fn test_finished_ledger_rejects_further_spends() {
        let mut aa = AssetAmount::new(asset(), 10, 0);
        assert!(aa.spend_amount(10, false).unwrap());
        let before = aa.clone();
        assert!(matches!(
            aa.spend_amount(1, false),
            Err(TransactionError::InsufficientFunds(_))
        ));
        assert_eq!(aa, before);
    }

    #[test]
    fn test_zero_amount_burn_only() {
        let mut aa = AssetAmount::new(asset(), 0, 1_000_000);
        assert!(!aa.is_finished());
        assert!(aa.spend_amount(1_500_000, false).unwrap());
        assert_eq!(aa.change(), 500_000);

        assert!(AssetAmount::new(asset(), 0, 0).is_finished());
    }

    #[test]
    fn test_locked_funds_cannot_pay_burn() {
        let mut aa = AssetAmount::new(asset(), 100, 10);
        // 150 locked covers the stake but the excess 50 stays locked
        assert!(!aa.spend_amount(150, true).unwrap());
        assert!(aa.spend_amount(10, false).unwrap());
        assert_eq!(aa.change(), 50);
        assert!(aa.stakeable_lock_change());
        assert_eq!(aa.locked_change(), 50);
        assert_eq!(aa.unlocked_change(), 0);
        assert_eq!(aa.locked_amount(), 100);
        assert_eq!(aa.unlocked_amount(), 0);
        assert_eq!(aa.spent(), aa.amount() + aa.burn() + aa.change());
    }

    #[test]
    fn test_mixed_locked_and_unlocked_change() {
        let mut aa = AssetAmount::new(asset(), 100, 10);
        assert!(!aa.spend_amount(40, true).unwrap());
        assert!(aa.spend_amount(100, false).unwrap());
        assert_eq!(aa.change(), 30);
        assert_eq!(aa.locked_change(), 0);
        assert_eq!(aa.unlocked_change(), 30);
        assert_eq!(aa.locked_amount(), 40);
        assert_eq!(aa.unlocked_amount(), 60);
    }

    #[test]
    fn test_destination_can_complete() {
        let mut aad: AssetAmountDestination<(), ()> = AssetAmountDestination::new(vec![], vec![], vec![]);
        assert!(aad.can_complete());
        aad.add_asset_amount(asset(), 10, 0);
        aad.add_asset_amount(Id::new([8; 32]), 0, 5);
        assert!(!aad.can_complete());
        aad.get_asset_amount_mut(&asset()).unwrap().spend_amount(10, false).unwrap();
        assert!(!aad.can_complete());
        aad.get_asset_amount_mut(&Id::new([8; 32])).unwrap().spend_amount(5, false).unwrap();
        assert!(aad.can_complete());
    }

    #[test]
    fn test_add_asset_amount_merges() {
        let mut aad: AssetAmountDestination<(), ()> = AssetAmountDestination::new(vec![], vec![], vec![]);
        aad.add_asset_amount(asset(), 10, 0);
        aad.add_asset_amount(asset(), 0, 3);
        let aa = aad.get_asset_amount(&asset()).unwrap();
        assert_eq!((aa.amount(), aa.burn()), (10, 3));
        assert_eq!(aad.get_amounts().len(), 1);
    }
}
