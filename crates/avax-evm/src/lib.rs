//! C-chain (EVM) atomic transactions.
//!
//! Moves value between EVM accounts and the shared memory of the other
//! chains: `ImportTx` consumes atomic UTXOs and credits accounts,
//! `ExportTx` debits accounts and creates atomic UTXOs.

pub mod atomic;
pub mod builder;
pub mod constants;
pub mod credentials;
pub mod evm_io;
pub mod serialize;
pub mod tx;

pub use atomic::{AtomicInput, AtomicOutput};
pub use builder::{EvmAccount, EvmBuilder};
pub use credentials::EvmCredential;
pub use evm_io::{format_evm_address, parse_evm_address, EvmInput, EvmOutput};
pub use tx::{ExportTx, ImportTx, Transaction};

/// An unsigned C-chain atomic transaction.
pub type UnsignedTx = avax_transaction::UnsignedTx<Transaction>;
/// A signed C-chain atomic transaction.
pub type Tx = avax_transaction::Tx<Transaction>;
/// An atomic UTXO available for import.
pub type Utxo = avax_transaction::Utxo<AtomicOutput>;
/// The atomic UTXOs available for import.
pub type UtxoSet = avax_transaction::UtxoSet<AtomicOutput>;
