//! Account-side inputs and outputs of atomic transactions.
//!
//! Unlike UTXO inputs these carry no type ID: an [`EvmOutput`] credits an
//! EVM account, an [`EvmInput`] debits one at a given nonce.

use std::cmp::Ordering;

use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_primitives::PrimitivesError;
use avax_transaction::input::SigIdx;
use avax_transaction::{Address, Id, TransactionError};

/// Parse a `0x`-prefixed (or bare) 40-character hex account address.
pub fn parse_evm_address(s: &str) -> Result<Address, TransactionError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(PrimitivesError::from)?;
    Address::from_bytes(&bytes)
}

/// `0x`-prefixed lowercase hex of an account address.
pub fn format_evm_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

fn read_err(what: &'static str) -> impl Fn(PrimitivesError) -> TransactionError {
    move |e| TransactionError::SerializationError(format!("reading {}: {}", what, e))
}

/// Value credited to an EVM account on import.
///
/// Wire: `address(20) || amount(u64) || asset_id(32)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvmOutput {
    pub address: Address,
    pub amount: u64,
    pub asset_id: Id,
}

impl EvmOutput {
    pub const SIZE: usize = Address::SIZE + 8 + Id::SIZE;

    pub fn new(address: Address, amount: u64, asset_id: Id) -> Self {
        EvmOutput {
            address,
            amount,
            asset_id,
        }
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let address = Address::read_from(reader)?;
        let amount = reader.read_u64_be().map_err(read_err("evm output amount"))?;
        let asset_id = Id::read_from(reader)?;
        Ok(EvmOutput {
            address,
            amount,
            asset_id,
        })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.address.write_to(writer);
        writer.write_u64_be(self.amount);
        self.asset_id.write_to(writer);
    }

    /// Canonical order: by address, then asset.
    pub fn comparator(a: &Self, b: &Self) -> Ordering {
        (a.address, a.asset_id).cmp(&(b.address, b.asset_id))
    }
}

/// Value debited from an EVM account on export.
///
/// Wire: `address(20) || amount(u64) || asset_id(32) || nonce(u64)`.
///
/// The account address is not the hash the keychain indexes keys by, so
/// the signer is carried in `sig_idxs` and never serialized. Every input
/// takes exactly one signature; a parsed input's slot has no owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvmInput {
    pub address: Address,
    pub amount: u64,
    pub asset_id: Id,
    pub nonce: u64,
    pub sig_idxs: Vec<SigIdx>,
}

impl EvmInput {
    pub const SIZE: usize = Address::SIZE + 8 + Id::SIZE + 8;

    pub fn new(address: Address, amount: u64, asset_id: Id, nonce: u64) -> Self {
        EvmInput {
            address,
            amount,
            asset_id,
            nonce,
            sig_idxs: vec![SigIdx::unresolved(0)],
        }
    }

    /// Name the keychain address that signs for this account.
    pub fn with_signer(mut self, signer: Address) -> Self {
        self.sig_idxs = vec![SigIdx::new(0, signer)];
        self
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let address = Address::read_from(reader)?;
        let amount = reader.read_u64_be().map_err(read_err("evm input amount"))?;
        let asset_id = Id::read_from(reader)?;
        let nonce = reader.read_u64_be().map_err(read_err("evm input nonce"))?;
        Ok(EvmInput::new(address, amount, asset_id, nonce))
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        self.address.write_to(writer);
        writer.write_u64_be(self.amount);
        self.asset_id.write_to(writer);
        writer.write_u64_be(self.nonce);
    }

    /// Canonical order: by address, then asset.
    pub fn comparator(a: &Self, b: &Self) -> Ordering {
        (a.address, a.asset_id).cmp(&(b.address, b.asset_id))
    }
}
