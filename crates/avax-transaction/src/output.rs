//! Outputs: spending conditions composed with a typed payload.
//!
//! `OutputOwners` is the spend condition (locktime, threshold, sorted
//! owner addresses) embedded in every concrete output. Each VM defines a
//! closed enum of the outputs it understands and implements [`OutputKind`]
//! for it, so `TransferableOutput` and `Utxo` can dispatch on the 4-byte
//! type ID read from the wire.

use std::cmp::Ordering;
use std::fmt;

use avax_primitives::util::{AvaxReader, AvaxWriter};

use crate::nbytes::{Address, Id};
use crate::TransactionError;

// ---------------------------------------------------------------------------
// OutputOwners
// ---------------------------------------------------------------------------

/// Who may spend an output and from when.
///
/// # Wire format
///
/// | Field      | Size             |
/// |------------|------------------|
/// | locktime   | 8 bytes (BE)     |
/// | threshold  | 4 bytes (BE)     |
/// | num addrs  | 4 bytes (BE)     |
/// | addresses  | 20 bytes each    |
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OutputOwners {
    /// Unix time before which the output cannot be spent.
    pub locktime: u64,
    /// Number of distinct owner signatures required.
    pub threshold: u32,
    addresses: Vec<Address>,
}

impl OutputOwners {
    /// Create owners from an address list, which is sorted and deduplicated.
    pub fn new(mut addresses: Vec<Address>, locktime: u64, threshold: u32) -> Self {
        addresses.sort();
        addresses.dedup();
        OutputOwners {
            locktime,
            threshold,
            addresses,
        }
    }

    /// Reject an owner list that could never be spent: no addresses, or a
    /// threshold of zero or above the number of distinct addresses.
    ///
    /// `role` names the list in the error, e.g. "change".
    pub fn check_spendable(addresses: &[Address], threshold: u32, role: &str) -> Result<(), TransactionError> {
        let mut distinct = addresses.to_vec();
        distinct.sort();
        distinct.dedup();
        if distinct.is_empty() {
            return Err(TransactionError::InvalidTransaction(format!("no {} addresses", role)));
        }
        if threshold == 0 || threshold as usize > distinct.len() {
            return Err(TransactionError::InvalidTransaction(format!(
                "threshold {} cannot be met by {} {} addresses",
                threshold,
                distinct.len(),
                role
            )));
        }
        Ok(())
    }

    /// The owner addresses in serialized order.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Position of `addr` in the owner list, used as a signature index.
    pub fn get_address_idx(&self, addr: &Address) -> Option<u32> {
        self.addresses
            .iter()
            .position(|a| a == addr)
            .map(|i| i as u32)
    }

    /// Owner address at signature index `idx`.
    pub fn get_address(&self, idx: u32) -> Option<Address> {
        self.addresses.get(idx as usize).copied()
    }

    /// Whether `addrs` hold enough owner keys to spend at time `as_of`.
    pub fn meets_threshold(&self, addrs: &[Address], as_of: u64) -> bool {
        if self.locktime > as_of {
            return false;
        }
        let qualified = self.addresses.iter().filter(|a| addrs.contains(a)).count();
        qualified >= self.threshold as usize
    }

    /// The first `threshold` owners found in `addrs`, in owner order.
    ///
    /// Empty while the output is still time-locked.
    pub fn get_spenders(&self, addrs: &[Address], as_of: u64) -> Vec<Address> {
        if self.locktime > as_of {
            return Vec::new();
        }
        self.addresses
            .iter()
            .filter(|a| addrs.contains(a))
            .take(self.threshold as usize)
            .copied()
            .collect()
    }

    /// Deserialize owners from a reader.
    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let locktime = reader.read_u64_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading locktime: {}", e))
        })?;
        let threshold = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading threshold: {}", e))
        })?;
        let count = reader.read_count(Address::SIZE).map_err(|e| {
            TransactionError::SerializationError(format!("reading address count: {}", e))
        })?;
        let mut addresses = Vec::with_capacity(count);
        for _ in 0..count {
            addresses.push(Address::read_from(reader)?);
        }
        Ok(OutputOwners {
            locktime,
            threshold,
            addresses,
        })
    }

    /// Serialize owners into a writer.
    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u64_be(self.locktime);
        writer.write_u32_be(self.threshold);
        writer.write_u32_be(self.addresses.len() as u32);
        for addr in &self.addresses {
            addr.write_to(writer);
        }
    }

    /// Serialize owners to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = AvaxWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}

// ---------------------------------------------------------------------------
// Concrete secp256k1fx outputs
// ---------------------------------------------------------------------------

/// An amount of an asset locked to a set of owners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOutput {
    /// Amount in the asset's smallest denomination.
    pub amount: u64,
    /// Spend condition.
    pub owners: OutputOwners,
}

impl TransferOutput {
    /// Create a transfer output; the addresses are sorted.
    pub fn new(amount: u64, addresses: Vec<Address>, locktime: u64, threshold: u32) -> Self {
        TransferOutput {
            amount,
            owners: OutputOwners::new(addresses, locktime, threshold),
        }
    }

    /// Read `amount || owners`.
    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let amount = reader.read_u64_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading amount: {}", e))
        })?;
        let owners = OutputOwners::read_from(reader)?;
        Ok(TransferOutput { amount, owners })
    }

    /// Write `amount || owners`.
    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u64_be(self.amount);
        self.owners.write_to(writer);
    }
}

/// Authority to mint more of a variable-cap asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintOutput {
    /// Who may mint.
    pub owners: OutputOwners,
}

impl MintOutput {
    /// Create a mint output; the addresses are sorted.
    pub fn new(addresses: Vec<Address>, locktime: u64, threshold: u32) -> Self {
        MintOutput {
            owners: OutputOwners::new(addresses, locktime, threshold),
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        Ok(MintOutput {
            owners: OutputOwners::read_from(reader)?,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.owners.write_to(writer);
    }
}

// ---------------------------------------------------------------------------
// OutputKind
// ---------------------------------------------------------------------------

/// A VM's closed set of output variants.
///
/// `read_body` is the central type-ID table: it must reject unknown IDs
/// with `TransactionError::UnknownType`.
pub trait OutputKind: Clone + fmt::Debug + PartialEq + Sized {
    /// Wire type ID of this variant.
    fn type_id(&self) -> u32;

    /// Write the body that follows the type ID.
    fn write_body(&self, writer: &mut AvaxWriter);

    /// Construct the variant registered for `type_id` and read its body.
    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError>;

    /// The spend condition of this output.
    fn owners(&self) -> &OutputOwners;

    /// Amount carried, for outputs that carry one.
    fn amount(&self) -> Option<u64> {
        None
    }

    /// Write `type_id || body`.
    fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.type_id());
        self.write_body(writer);
    }

    /// Read `type_id || body`.
    fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let type_id = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading output type id: {}", e))
        })?;
        Self::read_body(type_id, reader)
    }
}

// ---------------------------------------------------------------------------
// TransferableOutput
// ---------------------------------------------------------------------------

/// An output tagged with the asset it carries.
///
/// # Wire format
///
/// | Field      | Size             |
/// |------------|------------------|
/// | asset id   | 32 bytes         |
/// | type id    | 4 bytes (BE)     |
/// | body       | variable         |
#[derive(Clone, Debug, PartialEq)]
pub struct TransferableOutput<O> {
    /// Asset carried by the output.
    pub asset_id: Id,
    /// Typed output body.
    pub output: O,
}

impl<O: OutputKind> TransferableOutput<O> {
    pub fn new(asset_id: Id, output: O) -> Self {
        TransferableOutput { asset_id, output }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let asset_id = Id::read_from(reader)?;
        let output = O::read_from(reader)?;
        Ok(TransferableOutput { asset_id, output })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.asset_id.write_to(writer);
        self.output.write_to(writer);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = AvaxWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Parse exactly one output with no trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = AvaxReader::new(bytes);
        let out = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after output",
                reader.remaining()
            )));
        }
        Ok(out)
    }

    /// Canonical order: byte-lexicographic over the full serialized form.
    pub fn comparator(a: &Self, b: &Self) -> Ordering {
        a.to_bytes().cmp(&b.to_bytes())
    }
}

/// Sort outputs into canonical order.
pub fn sort_outputs<O: OutputKind>(outs: &mut [TransferableOutput<O>]) {
    outs.sort_by_cached_key(|o| o.to_bytes());
}

/// Borrow outputs in canonical order without reordering the slice.
pub fn sorted_outputs<O: OutputKind>(outs: &[TransferableOutput<O>]) -> Vec<&TransferableOutput<O>> {
    let mut keyed: Vec<(Vec<u8>, &TransferableOutput<O>)> =
        outs.iter().map(|o| (o.to_bytes(), o)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, o)| o).collect()
}
