//! P-chain (PlatformVM) support.
//!
//! Staking, subnet and atomic transactions over the generic envelope of
//! `avax-transaction`, a stake-aware variant of UTXO selection that can
//! spend stakeable-locked funds, and builders for the common flows.

pub mod builder;
pub mod constants;
pub mod credentials;
pub mod inputs;
pub mod outputs;
pub mod selection;
pub mod serialize;
pub mod tx;

pub use builder::{PlatformBuilder, ValidatorParams};
pub use credentials::PlatformCredential;
pub use inputs::{PlatformInput, StakeableLockIn};
pub use outputs::{PlatformOutput, StakeableLockOut};
pub use selection::{get_locked_balance, get_minimum_spendable, Selection};
pub use tx::{
    AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx, CreateSubnetTx, ExportTx, ImportTx, SubnetAuth,
    Transaction, Validator,
};

/// An unsigned P-chain transaction.
pub type UnsignedTx = avax_transaction::UnsignedTx<Transaction>;
/// A signed P-chain transaction.
pub type Tx = avax_transaction::Tx<Transaction>;
/// A P-chain UTXO.
pub type Utxo = avax_transaction::Utxo<PlatformOutput>;
/// A set of P-chain UTXOs.
pub type UtxoSet = avax_transaction::UtxoSet<PlatformOutput>;
