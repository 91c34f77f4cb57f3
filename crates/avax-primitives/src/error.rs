/// Unified error type for all primitives operations.
///
/// Covers errors from hashing, EC operations, string encodings, and the
/// big-endian reader.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("invalid bech32: {0}")]
    InvalidBech32(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("{0}")]
    Other(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

impl From<bech32::Error> for PrimitivesError {
    fn from(e: bech32::Error) -> Self {
        PrimitivesError::InvalidBech32(e.to_string())
    }
}
