/// Avalanche transaction codec, UTXO selection and signing.
///
/// Provides the pieces the X, P and C chain crates share: fixed-size byte
/// types, output owners, typed inputs/outputs/credentials, the base
/// transaction, unsigned and signed envelopes, the keychain, the UTXO set
/// with minimum-spendable selection, fee checks and the JSON serialization
/// form. Each chain crate supplies its own closed variant enums through the
/// `OutputKind`, `InputKind`, `CredentialKind` and `TxKind` traits.

pub mod asset_amount;
pub mod base_tx;
pub mod constants;
pub mod credential;
pub mod fee;
pub mod input;
pub mod keychain;
pub mod nbytes;
pub mod output;
pub mod serializable;
pub mod tx;
pub mod utxo;

mod error;
pub use error::TransactionError;
pub use asset_amount::{AssetAmount, AssetAmountDestination};
pub use base_tx::BaseTx;
pub use constants::{BuildOptions, NetworkConfig};
pub use credential::{Credential, CredentialKind};
pub use input::{InputKind, SigIdx, TransferInput, TransferableInput};
pub use keychain::{KeyChain, KeyPair};
pub use nbytes::{Address, Id, NodeId, Signature};
pub use output::{MintOutput, OutputKind, OutputOwners, TransferOutput, TransferableOutput};
pub use serializable::Serializable;
pub use tx::{SigningSlot, Tx, TxKind, UnsignedTx};
pub use utxo::{AmountInputKind, AmountOutputKind, Utxo, UtxoSet};

#[cfg(test)]
mod tests;
