//! X-chain transaction builders.
//!
//! Each builder selects UTXOs from the set with
//! `UtxoSet::get_minimum_spendable`, assembles the unsigned transaction and
//! runs the Goose Egg check against the network's AVAX asset. Fees default
//! to the `NetworkConfig` values and can be overridden per build with
//! `BuildOptions::fee`.

use std::collections::BTreeMap;

use avax_transaction::asset_amount::AssetAmountDestination;
use avax_transaction::input::{spender_sig_idxs, TransferInput, TransferableInput};
use avax_transaction::output::{MintOutput, TransferOutput, TransferableOutput};
use avax_transaction::utxo::AmountOutputKind;
use avax_transaction::{Address, BaseTx, BuildOptions, Id, NetworkConfig, TransactionError};
use log::debug;

use crate::inputs::AvmInput;
use crate::operations::{Operation, SecpMintOperation, TransferableOperation, UtxoId};
use crate::outputs::AvmOutput;
use crate::tx::{CreateAssetTx, ExportTx, ImportTx, InitialState, OperationTx, Transaction};
use crate::{UnsignedTx, Utxo, UtxoSet};

/// Description of a new asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateAssetParams {
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
    pub initial_states: Vec<InitialState>,
}

/// Builders over a set of X-chain UTXOs.
///
/// `from` lists the addresses whose UTXOs may be spent, `change` receives
/// leftover value and `to` receives the transferred amount.
#[allow(clippy::too_many_arguments)]
pub trait AvmBuilder {
    /// Send `amount` of `asset_id` to `to`, paying the flat transaction fee.
    fn build_base_tx(
        &self,
        net: &NetworkConfig,
        asset_id: Id,
        amount: u64,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;

    /// Import `atomics` exported from `source_chain` to `to`.
    ///
    /// The fee is taken from imported AVAX first and from this set for
    /// whatever remains.
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

    /// Export `amount` of `asset_id` to `to` on `destination_chain`.
    fn build_export_tx(
        &self,
        net: &NetworkConfig,
        asset_id: Id,
        amount: u64,
        destination_chain: Id,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;

    /// Create an asset, paying the asset creation fee.
    fn build_create_asset_tx(
        &self,
        net: &NetworkConfig,
        params: &CreateAssetParams,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;

    /// Spend the secp mint UTXO `mint_utxo_id`, replacing it with
    /// `mint_output` and minting `transfer_output`.
    fn build_secp_mint_tx(
        &self,
        net: &NetworkConfig,
        mint_utxo_id: &str,
        mint_output: MintOutput,
        transfer_output: TransferOutput,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError>;
}

type Selection = AssetAmountDestination<AvmInput, AvmOutput>;

/// Run selection for `(asset, amount, burn)` targets.
fn select(
    utxos: &UtxoSet,
    to: &[Address],
    from: &[Address],
    change: &[Address],
    targets: &[(Id, u64, u64)],
    opts: &BuildOptions,
) -> Result<Selection, TransactionError> {
    let mut aad = AssetAmountDestination::new(to.to_vec(), from.to_vec(), change.to_vec());
    for &(asset_id, amount, burn) in targets {
        if amount > 0 || burn > 0 {
            aad.add_asset_amount(asset_id, amount, burn);
        }
    }
    utxos.get_minimum_spendable(&mut aad, opts.as_of, opts.locktime, opts.threshold)?;
    Ok(aad)
}

/// Targets for moving `amount` of `asset_id` while burning `fee` AVAX.
fn amount_and_fee(asset_id: Id, amount: u64, fee_asset: Id, fee: u64) -> Vec<(Id, u64, u64)> {
    if asset_id == fee_asset {
        vec![(asset_id, amount, fee)]
    } else {
        vec![(asset_id, amount, 0), (fee_asset, 0, fee)]
    }
}

fn check_destinations(amount: u64, to: &[Address], opts: &BuildOptions) -> Result<(), TransactionError> {
    if amount == 0 {
        return Err(TransactionError::InvalidTransaction("amount must be positive".to_string()));
    }
    opts.check_destinations(to)
}

fn finish(net: &NetworkConfig, tx: Transaction) -> Result<UnsignedTx, TransactionError> {
    let unsigned = UnsignedTx::new(tx);
    unsigned.check_goose_egg(&net.avax_asset_id, None)?;
    Ok(unsigned)
}

#[allow(clippy::too_many_arguments)]
impl AvmBuilder for UtxoSet {
    fn build_base_tx(
        &self,
        net: &NetworkConfig,
        asset_id: Id,
        amount: u64,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        check_destinations(amount, to, opts)?;
        let fee = opts.fee_or(net.tx_fee);
        let targets = amount_and_fee(asset_id, amount, net.avax_asset_id, fee);
        let (ins, outs) = select(self, to, from, change, &targets, opts)?.into_inputs_and_all_outputs();
        debug!("base tx: {} inputs, {} outputs, fee {}", ins.len(), outs.len(), fee);
        let base = BaseTx::new(net.network_id, net.x_chain_id, outs, ins, opts.memo.clone())?;
        finish(net, Transaction::Base(base))
    }

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
        if source_chain == net.x_chain_id {
            return Err(TransactionError::InvalidTransaction(
                "cannot import from the destination chain".to_string(),
            ));
        }
        opts.check_destinations(to)?;
        let fee = opts.fee_or(net.tx_fee);
        let mut import_ins = Vec::new();
        let mut imported: BTreeMap<Id, u64> = BTreeMap::new();
        for utxo in atomics {
            let Some(out) = utxo.output.as_transfer() else {
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
                AvmInput::SecpTransfer(input),
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
        for (asset_id, total) in imported {
            let mut amount = total;
            if asset_id == net.avax_asset_id {
                let paid = fee_remaining.min(amount);
                fee_remaining -= paid;
                amount -= paid;
            }
            if amount > 0 {
                let out = TransferOutput::new(amount, to.to_vec(), opts.locktime, opts.threshold);
                outs.push(TransferableOutput::new(asset_id, AvmOutput::SecpTransfer(out)));
            }
        }

        let targets = [(net.avax_asset_id, 0, fee_remaining)];
        let (ins, fee_outs) = select(self, to, from, change, &targets, opts)?.into_inputs_and_all_outputs();
        outs.extend(fee_outs);
        debug!(
            "import tx: {} atomic inputs, {} fee inputs, {} left to cover from local utxos",
            import_ins.len(),
            ins.len(),
            fee_remaining
        );
        let base = BaseTx::new(net.network_id, net.x_chain_id, outs, ins, opts.memo.clone())?;
        finish(net, Transaction::Import(ImportTx::new(base, source_chain, import_ins)))
    }

    fn build_export_tx(
        &self,
        net: &NetworkConfig,
        asset_id: Id,
        amount: u64,
        destination_chain: Id,
        to: &[Address],
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        check_destinations(amount, to, opts)?;
        if destination_chain == net.x_chain_id {
            return Err(TransactionError::InvalidTransaction(
                "cannot export to the source chain".to_string(),
            ));
        }
        let fee = opts.fee_or(net.tx_fee);
        let targets = amount_and_fee(asset_id, amount, net.avax_asset_id, fee);
        let (ins, export_outs, change_outs) = select(self, to, from, change, &targets, opts)?.into_parts();
        let base = BaseTx::new(net.network_id, net.x_chain_id, change_outs, ins, opts.memo.clone())?;
        finish(net, Transaction::Export(ExportTx::new(base, destination_chain, export_outs)))
    }

    fn build_create_asset_tx(
        &self,
        net: &NetworkConfig,
        params: &CreateAssetParams,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        let fee = opts.fee_or(net.create_asset_tx_fee);
        let targets = [(net.avax_asset_id, 0, fee)];
        let (ins, outs) = select(self, &[], from, change, &targets, opts)?.into_inputs_and_all_outputs();
        let base = BaseTx::new(net.network_id, net.x_chain_id, outs, ins, opts.memo.clone())?;
        let tx = CreateAssetTx::new(
            base,
            &params.name,
            &params.symbol,
            params.denomination,
            params.initial_states.clone(),
        )?;
        debug!("create asset tx for {} ({})", tx.name, tx.symbol);
        finish(net, Transaction::CreateAsset(tx))
    }

    fn build_secp_mint_tx(
        &self,
        net: &NetworkConfig,
        mint_utxo_id: &str,
        mint_output: MintOutput,
        transfer_output: TransferOutput,
        from: &[Address],
        change: &[Address],
        opts: &BuildOptions,
    ) -> Result<UnsignedTx, TransactionError> {
        let utxo = self.get_utxo(mint_utxo_id).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!("utxo {} not found", mint_utxo_id))
        })?;
        let AvmOutput::SecpMint(minter) = &utxo.output else {
            return Err(TransactionError::InvalidTransaction(format!(
                "utxo {} is not a secp mint output",
                mint_utxo_id
            )));
        };
        let sig_idxs = spender_sig_idxs(&minter.owners, from, opts.as_of);
        if !minter.owners.meets_threshold(from, opts.as_of) {
            return Err(TransactionError::InvalidTransaction(
                "minting addresses do not meet the mint output threshold".to_string(),
            ));
        }

        let fee = opts.fee_or(net.tx_fee);
        let targets = [(net.avax_asset_id, 0, fee)];
        let (ins, outs) = select(self, &[], from, change, &targets, opts)?.into_inputs_and_all_outputs();
        let base = BaseTx::new(net.network_id, net.x_chain_id, outs, ins, opts.memo.clone())?;

        let op = TransferableOperation::new(
            utxo.asset_id,
            vec![UtxoId::new(utxo.txid, utxo.output_idx)],
            Operation::SecpMint(SecpMintOperation {
                sig_idxs,
                mint_output,
                transfer_output,
            }),
        );
        debug!("secp mint of {} from {}", op.operation.type_name(), mint_utxo_id);
        finish(net, Transaction::Operation(OperationTx::new(base, vec![op])))
    }
}
