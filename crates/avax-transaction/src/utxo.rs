//! UTXOs and the UTXO set builders select from.
//!
//! A `Utxo<O>` is an output of a previous transaction still available for
//! spending, identified by `cb58(txid || output_idx)`. `UtxoSet<O>` keeps
//! UTXOs keyed by that ID together with an index from owner address to the
//! UTXOs it owns, and runs the minimum-spendable selection for amount
//! transfers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use avax_primitives::base58::{cb58_decode, cb58_encode};
use avax_primitives::util::{AvaxReader, AvaxWriter};
use log::debug;

use crate::asset_amount::AssetAmountDestination;
use crate::constants::CODEC_VERSION;
use crate::input::{utxo_ref, InputKind, TransferInput, TransferableInput};
use crate::nbytes::{Address, Id};
use crate::output::{OutputKind, OutputOwners, TransferOutput, TransferableOutput};
use crate::tx::{expect_end, read_codec_id};
use crate::TransactionError;

/// An output variant set that includes the secp256k1 transfer output.
pub trait AmountOutputKind: OutputKind {
    fn from_transfer(output: TransferOutput) -> Self;

    /// The transfer output, if this is one.
    fn as_transfer(&self) -> Option<&TransferOutput>;
}

/// An input variant set that includes the secp256k1 transfer input.
pub trait AmountInputKind: InputKind {
    fn from_transfer(input: TransferInput) -> Self;
}

// ---------------------------------------------------------------------------
// Utxo
// ---------------------------------------------------------------------------

/// An unspent output.
///
/// Wire: `codec_id(u16) || txid || output_idx(u32) || asset_id || type_id(u32) || body`.
#[derive(Clone, Debug, PartialEq)]
pub struct Utxo<O> {
    pub codec_id: u16,
    pub txid: Id,
    pub output_idx: u32,
    pub asset_id: Id,
    pub output: O,
}

impl<O: OutputKind> Utxo<O> {
    pub fn new(txid: Id, output_idx: u32, asset_id: Id, output: O) -> Self {
        Utxo {
            codec_id: CODEC_VERSION,
            txid,
            output_idx,
            asset_id,
            output,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let codec_id = read_codec_id(reader)?;
        let txid = Id::read_from(reader)?;
        let output_idx = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;
        let asset_id = Id::read_from(reader)?;
        let output = O::read_from(reader)?;
        Ok(Utxo {
            codec_id,
            txid,
            output_idx,
            asset_id,
            output,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u16_be(self.codec_id);
        self.txid.write_to(writer);
        writer.write_u32_be(self.output_idx);
        self.asset_id.write_to(writer);
        self.output.write_to(writer);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = AvaxWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = AvaxReader::new(bytes);
        let utxo = Self::read_from(&mut reader)?;
        expect_end(&reader, "utxo")?;
        Ok(utxo)
    }

    /// `cb58(txid || output_idx)`.
    pub fn utxo_id(&self) -> String {
        cb58_encode(&utxo_ref(&self.txid, self.output_idx))
    }

    /// The output tagged with its asset, as it appears in a transaction.
    pub fn transferable_output(&self) -> TransferableOutput<O> {
        TransferableOutput::new(self.asset_id, self.output.clone())
    }
}

impl<O: OutputKind> fmt::Display for Utxo<O> {
    /// cb58 of the serialized UTXO.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cb58_encode(&self.to_bytes()))
    }
}

impl<O: OutputKind> FromStr for Utxo<O> {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(&cb58_decode(s)?)
    }
}

// ---------------------------------------------------------------------------
// UtxoSet
// ---------------------------------------------------------------------------

/// UTXOs keyed by UTXO ID, with an owner address index.
#[derive(Clone, Debug)]
pub struct UtxoSet<O> {
    utxos: BTreeMap<String, Utxo<O>>,
    address_utxos: BTreeMap<Address, BTreeSet<String>>,
}

impl<O> Default for UtxoSet<O> {
    fn default() -> Self {
        UtxoSet {
            utxos: BTreeMap::new(),
            address_utxos: BTreeMap::new(),
        }
    }
}

impl<O: OutputKind> UtxoSet<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a UTXO; an existing UTXO with the same ID is only replaced when
    /// `overwrite` is set. Returns whether the set changed.
    pub fn add(&mut self, utxo: Utxo<O>, overwrite: bool) -> bool {
        let id = utxo.utxo_id();
        if self.utxos.contains_key(&id) && !overwrite {
            return false;
        }
        self.remove(&id);
        for addr in utxo.output.owners().addresses() {
            self.address_utxos.entry(*addr).or_default().insert(id.clone());
        }
        self.utxos.insert(id, utxo);
        true
    }

    /// Parse a cb58 UTXO and add it.
    pub fn add_str(&mut self, s: &str, overwrite: bool) -> Result<bool, TransactionError> {
        Ok(self.add(s.parse()?, overwrite))
    }

    /// Add many UTXOs, returning how many were added.
    pub fn add_array(&mut self, utxos: Vec<Utxo<O>>, overwrite: bool) -> usize {
        let mut added = 0;
        for utxo in utxos {
            if self.add(utxo, overwrite) {
                added += 1;
            }
        }
        added
    }

    pub fn remove(&mut self, utxo_id: &str) -> Option<Utxo<O>> {
        let utxo = self.utxos.remove(utxo_id)?;
        for addr in utxo.output.owners().addresses() {
            if let Some(ids) = self.address_utxos.get_mut(addr) {
                ids.remove(utxo_id);
                if ids.is_empty() {
                    self.address_utxos.remove(addr);
                }
            }
        }
        Some(utxo)
    }

    pub fn includes(&self, utxo_id: &str) -> bool {
        self.utxos.contains_key(utxo_id)
    }

    pub fn get_utxo(&self, utxo_id: &str) -> Option<&Utxo<O>> {
        self.utxos.get(utxo_id)
    }

    /// All UTXOs in UTXO ID order.
    pub fn get_all_utxos(&self) -> Vec<&Utxo<O>> {
        self.utxos.values().collect()
    }

    pub fn get_all_utxo_ids(&self) -> Vec<String> {
        self.utxos.keys().cloned().collect()
    }

    /// IDs of the UTXOs any of `addresses` co-owns.
    pub fn get_utxo_ids(&self, addresses: &[Address]) -> Vec<String> {
        let mut ids = BTreeSet::new();
        for addr in addresses {
            if let Some(owned) = self.address_utxos.get(addr) {
                ids.extend(owned.iter().cloned());
            }
        }
        ids.into_iter().collect()
    }

    /// Every address that co-owns at least one UTXO.
    pub fn get_addresses(&self) -> Vec<Address> {
        self.address_utxos.keys().copied().collect()
    }

    /// Distinct asset IDs, optionally restricted to UTXOs `addresses` co-own.
    pub fn get_asset_ids(&self, addresses: Option<&[Address]>) -> Vec<Id> {
        let ids: BTreeSet<Id> = match addresses {
            Some(addrs) => self
                .get_utxo_ids(addrs)
                .iter()
                .filter_map(|id| self.utxos.get(id))
                .map(|u| u.asset_id)
                .collect(),
            None => self.utxos.values().map(|u| u.asset_id).collect(),
        };
        ids.into_iter().collect()
    }

    /// Amount of `asset_id` that `addresses` can spend at `as_of`.
    pub fn get_balance(&self, addresses: &[Address], asset_id: &Id, as_of: u64) -> u64 {
        self.get_utxo_ids(addresses)
            .iter()
            .filter_map(|id| self.utxos.get(id))
            .filter(|u| &u.asset_id == asset_id)
            .filter(|u| u.output.owners().meets_threshold(addresses, as_of))
            .fold(0u64, |acc, u| acc.saturating_add(u.output.amount().unwrap_or(0)))
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// UTXOs in either set.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for utxo in other.utxos.values() {
            out.add(utxo.clone(), false);
        }
        out
    }

    /// UTXOs in both sets.
    pub fn intersection(&self, other: &Self) -> Self {
        self.filtered(|id| other.includes(id))
    }

    /// UTXOs in this set but not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.filtered(|id| !other.includes(id))
    }

    fn filtered(&self, keep: impl Fn(&str) -> bool) -> Self {
        let mut out = Self::new();
        for (id, utxo) in &self.utxos {
            if keep(id) {
                out.add(utxo.clone(), false);
            }
        }
        out
    }
}

impl<O: AmountOutputKind> UtxoSet<O> {
    /// Select transfer UTXOs until every ledger in `aad` is finished, then
    /// emit the destination and change outputs.
    ///
    /// # Arguments
    /// * `aad` - Ledgers and addresses; receives inputs, outputs and change.
    /// * `as_of` - Time at which UTXO locktimes are evaluated.
    /// * `locktime` - Locktime of the destination outputs.
    /// * `threshold` - Threshold of the destination outputs.
    ///
    /// # Returns
    /// `Ok(())`, `InsufficientFunds` when the senders cannot cover every
    /// tracked asset, or `InvalidTransaction` when value would go to an
    /// empty destination or change address list.
    pub fn get_minimum_spendable<I: AmountInputKind>(
        &self,
        aad: &mut AssetAmountDestination<I, O>,
        as_of: u64,
        locktime: u64,
        threshold: u32,
    ) -> Result<(), TransactionError> {
        for utxo in self.utxos.values() {
            if aad.can_complete() {
                break;
            }
            let Some(out) = utxo.output.as_transfer() else {
                continue;
            };
            if !out.owners.meets_threshold(aad.senders(), as_of) {
                continue;
            }
            let Some(amount) = aad.get_asset_amount_mut(&utxo.asset_id) else {
                continue;
            };
            if amount.is_finished() {
                continue;
            }
            amount.spend_amount(out.amount, false)?;
            let input = TransferInput::spending(out.amount, &out.owners, aad.senders(), as_of);
            debug!("selected utxo {} for {}", utxo.utxo_id(), out.amount);
            aad.add_input(TransferableInput::new(
                utxo.txid,
                utxo.output_idx,
                utxo.asset_id,
                I::from_transfer(input),
            ));
        }

        if !aad.can_complete() {
            return Err(TransactionError::InsufficientFunds(
                "insufficient funds to create the transaction".to_string(),
            ));
        }

        let totals: Vec<(Id, u64, u64)> = aad
            .get_amounts()
            .iter()
            .map(|a| (a.asset_id(), a.amount(), a.change()))
            .collect();
        if totals.iter().any(|(_, amount, _)| *amount > 0) {
            OutputOwners::check_spendable(aad.destinations(), threshold, "destination")?;
        }
        if totals.iter().any(|(_, _, change)| *change > 0) {
            OutputOwners::check_spendable(aad.change_addresses(), 1, "change")?;
        }
        for (asset_id, amount, change) in totals {
            if amount > 0 {
                let out = TransferOutput::new(amount, aad.destinations().to_vec(), locktime, threshold);
                aad.add_output(TransferableOutput::new(asset_id, O::from_transfer(out)));
            }
            if change > 0 {
                let out = TransferOutput::new(change, aad.change_addresses().to_vec(), 0, 1);
                aad.add_change(TransferableOutput::new(asset_id, O::from_transfer(out)));
            }
        }
        Ok(())
    }
}
