//! X-chain (AVM) support.
//!
//! Closed variant sets for the X-chain codec (outputs, inputs, operations,
//! credentials, transactions) plugged into the generic envelope of
//! `avax-transaction`, plus builders that select UTXOs and assemble
//! unsigned transactions.

pub mod builder;
pub mod constants;
pub mod credentials;
pub mod inputs;
pub mod operations;
pub mod outputs;
pub mod serialize;
pub mod tx;

pub use builder::{AvmBuilder, CreateAssetParams};
pub use credentials::AvmCredential;
pub use inputs::AvmInput;
pub use operations::{NftMintOperation, NftTransferOperation, Operation, SecpMintOperation, TransferableOperation, UtxoId};
pub use outputs::{AvmOutput, NftMintOutput, NftTransferOutput};
pub use tx::{CreateAssetTx, ExportTx, ImportTx, InitialState, OperationTx, Transaction};

/// An unsigned X-chain transaction.
pub type UnsignedTx = avax_transaction::UnsignedTx<Transaction>;
/// A signed X-chain transaction.
pub type Tx = avax_transaction::Tx<Transaction>;
/// An X-chain UTXO.
pub type Utxo = avax_transaction::Utxo<AvmOutput>;
/// A set of X-chain UTXOs.
pub type UtxoSet = avax_transaction::UtxoSet<AvmOutput>;

#[cfg(test)]
mod tests;
