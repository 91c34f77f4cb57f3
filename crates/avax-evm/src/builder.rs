//! C-chain atomic transaction builders.
//!
//! Imports sweep every atomic UTXO the senders can spend and credit one
//! EVM output per asset, paying the fee out of the imported AVAX. Exports
//! debit an [`EvmAccount`] at its current nonce.

use std::collections::BTreeMap;

use avax_transaction::input::{TransferInput, TransferableInput};
use avax_transaction::output::{TransferOutput, TransferableOutput};
use avax_transaction::{Address, BuildOptions, Id, NetworkConfig, TransactionError};
use log::debug;

use crate::atomic::{AtomicInput, AtomicOutput};
use crate::evm_io::{EvmInput, EvmOutput};
use crate::tx::{ExportTx, ImportTx, Transaction};
use crate::{UnsignedTx, UtxoSet};

/// Builders over the atomic UTXOs exported to the C-chain.
pub trait EvmBuilder {
    /// Import every atomic UTXO `from` can spend into the account `to`.
    fn build_import_tx(
        &self,
        net: &NetworkConfig,
        to: Address,
        from: &[Address],
        source_chain: Id,
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;
}

fn finish(net: &NetworkConfig, tx: Transaction) -> Result<UnsignedTx, TransactionError> {
    let unsigned = UnsignedTx::new(tx);
    unsigned.check_goose_egg(&net.avax_asset_id, None)?;
    Ok(unsigned)
}

impl EvmBuilder for UtxoSet {
    fn build_import_tx(
        &self,
        net: &NetworkConfig,
        to: Address,
        from: &[Address],
        source_chain: Id,
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        if source_chain == net.c_chain_id {
            return Err(TransactionError::InvalidTransaction(
                "cannot import from the destination chain".to_string(),
            ));
        }
        let fee = opts.fee_or(net.tx_fee);
        let mut fee_paid = 0u64;
        let mut import_ins = Vec::new();
        let mut credited: BTreeMap<Id, u64> = BTreeMap::new();
        for utxo in self.get_all_utxos() {
            let AtomicOutput::SecpTransfer(out) = &utxo.output;
            if !out.owners.meets_threshold(from, opts.as_of) {
                continue;
            }
            let mut amount = out.amount;
            if utxo.asset_id == net.avax_asset_id && fee_paid < fee {
                let paid = (fee - fee_paid).min(amount);
                fee_paid += paid;
                amount -= paid;
            }
            let input = TransferInput::spending(out.amount, &out.owners, from, opts.as_of);
            import_ins.push(TransferableInput::new(
                utxo.txid,
                utxo.output_idx,
                utxo.asset_id,
                AtomicInput::SecpTransfer(input),
            ));
            let total = credited.entry(utxo.asset_id).or_insert(0);
            *total = total.saturating_add(amount);
        }
        if fee_paid < fee {
            return Err(TransactionError::InsufficientFunds(format!(
                "imported AVAX covers {} of the {} fee",
                fee_paid, fee
            )));
        }

        let outs: Vec<EvmOutput> = credited
            .into_iter()
            .filter(|(_, amount)| *amount > 0)
            .map(|(asset_id, amount)| EvmOutput::new(to, amount, asset_id))
            .collect();
        debug!("c-chain import: {} atomic inputs, {} evm outputs", import_ins.len(), outs.len());
        let tx = ImportTx::new(net.network_id, net.c_chain_id, source_chain, import_ins, outs)?;
        finish(net, Transaction::Import(tx))
    }
}

/// An EVM account as seen by an export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvmAccount {
    /// Account address in the EVM state.
    pub address: Address,
    /// Keychain address of the key controlling the account.
    pub signer: Address,
    pub nonce: u64,
    balances: BTreeMap<Id, u64>,
}

impl EvmAccount {
    pub fn new(address: Address, signer: Address, nonce: u64) -> Self {
        EvmAccount {
            address,
            signer,
            nonce,
            balances: BTreeMap::new(),
        }
    }

    pub fn with_balance(mut self, asset_id: Id, amount: u64) -> Self {
        self.balances.insert(asset_id, amount);
        self
    }

    pub fn balance(&self, asset_id: &Id) -> u64 {
        self.balances.get(asset_id).copied().unwrap_or(0)
    }

    fn debit(&self, asset_id: Id, amount: u64) -> Result<EvmInput, TransactionError> {
        let balance = self.balance(&asset_id);
        if balance < amount {
            return Err(TransactionError::InsufficientFunds(format!(
                "account holds {} of asset {}, needs {}",
                balance, asset_id, amount
            )));
        }
        Ok(EvmInput::new(self.address, amount, asset_id, self.nonce).with_signer(self.signer))
    }

    /// Export `amount` of `asset_id` to `to` on `destination_chain`.
    ///
    /// The fee is always debited in AVAX, folded into the same input when
    /// the exported asset is AVAX.
    pub fn build_export_tx(
        &self,
        net: &NetworkConfig,
        asset_id: Id,
        amount: u64,
        destination_chain: Id,
        to: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        if amount == 0 {
            return Err(TransactionError::InvalidTransaction("amount must be positive".to_string()));
        }
        if destination_chain == net.c_chain_id {
            return Err(TransactionError::InvalidTransaction(
                "cannot export to the source chain".to_string(),
            ));
        }
        opts.check_destinations(to)?;
        let fee = opts.fee_or(net.tx_fee);
        let ins = if asset_id == net.avax_asset_id {
            let total = amount.checked_add(fee).ok_or_else(|| {
                TransactionError::InvalidTransaction("amount plus fee overflows".to_string())
            })?;
            vec![self.debit(asset_id, total)?]
        } else {
            vec![self.debit(asset_id, amount)?, self.debit(net.avax_asset_id, fee)?]
        };
        let out = TransferOutput::new(amount, to.to_vec(), opts.locktime, opts.threshold);
        let export_outs = vec![TransferableOutput::new(asset_id, AtomicOutput::SecpTransfer(out))];
        debug!("c-chain export of {} {} at nonce {}", amount, asset_id, self.nonce);
        let tx = ExportTx::new(net.network_id, net.c_chain_id, destination_chain, ins, export_outs)?;
        finish(net, Transaction::Export(tx))
    }
}
