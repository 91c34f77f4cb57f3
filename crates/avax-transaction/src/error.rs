/// Error types for transaction operations.
///
/// Shared by the X, P and C chain crates: every codec, selection and
/// signing failure surfaces as one of these variants.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid (rejected at construction time).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// An error occurred during binary/string serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// A type ID read from the wire has no registered variant.
    #[error("unknown {kind} type id: {type_id}")]
    UnknownType {
        /// What was being decoded, e.g. "output" or "transaction".
        kind: &'static str,
        /// The offending type ID.
        type_id: u32,
    },
    /// UTXO selection could not cover the requested amounts.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    /// A signature index references an address the keychain has no key for.
    #[error("no key for address {0}")]
    KeyNotFound(String),
    /// A signature slot has no owner address, as is the case for slots
    /// read from the wire.
    #[error("signature slot {index} has no owner address")]
    UnresolvedSigner {
        /// Index of the slot in the spent output's owner list.
        index: u32,
    },
    /// The fee is implausibly large compared to the outputs.
    #[error("goose egg check failed: fee {fee} exceeds output total {output_total}")]
    GooseEgg {
        /// Amount burned by the transaction.
        fee: u64,
        /// Total of the outputs in the fee asset.
        output_total: u64,
    },
    /// The operation is structurally defined but not supported.
    #[error("unimplemented: {0}")]
    Unimplemented(String),
    /// A JSON document did not have the expected shape.
    #[error("json error: {0}")]
    Json(String),
    /// An underlying primitives error (forwarded from `avax-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] avax_primitives::PrimitivesError),
}

impl From<serde_json::Error> for TransactionError {
    fn from(e: serde_json::Error) -> Self {
        TransactionError::Json(e.to_string())
    }
}
