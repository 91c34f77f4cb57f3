/// Avalanche SDK - Cryptographic primitives, encodings, and codec helpers.
///
/// This crate provides the foundational building blocks for the Avalanche SDK:
/// - Hash functions (SHA-256, RIPEMD-160, Hash160)
/// - Base58 and cb58 (checksummed Base58) encoding
/// - Big-endian reader/writer used by every transaction codec
/// - String encoders/decoders for the JSON serialization form
/// - secp256k1 keys and 65-byte recoverable signatures

pub mod hash;
pub mod util;
pub mod base58;
pub mod serialization;
pub mod ec;

mod error;
pub use error::PrimitivesError;
