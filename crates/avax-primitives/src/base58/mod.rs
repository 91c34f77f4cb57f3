//! Base58 and cb58 (checksummed Base58) encoding.
//!
//! cb58 is how Avalanche renders addresses, IDs, UTXOs and signed
//! transactions: `base58(payload || sha256d(payload)[0..4])`.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the cb58 checksum suffix in bytes.
pub const CHECKSUM_LEN: usize = 4;

/// Encode a byte slice to a Base58 string.
///
/// Uses Bitcoin's Base58 alphabet (no 0, O, I, l). Leading zero bytes
/// are encoded as leading '1' characters.
///
/// # Arguments
/// * `data` - The bytes to encode.
///
/// # Returns
/// A Base58-encoded string.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// # Arguments
/// * `s` - The Base58 string to decode.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error for invalid characters.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Compute the 4-byte checksum appended by cb58.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = sha256d(data);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Append the cb58 checksum to a payload without Base58-encoding it.
pub fn add_checksum(data: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum(data));
    payload
}

/// Check and strip the trailing cb58 checksum of a raw buffer.
///
/// # Returns
/// The payload without its checksum, `ChecksumMismatch` if the suffix is
/// wrong, or `InvalidBase58` if the buffer is shorter than a checksum.
pub fn validate_checksum(data: &[u8]) -> Result<Vec<u8>, PrimitivesError> {
    if data.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string()
        ));
    }
    let (payload, sum) = data.split_at(data.len() - CHECKSUM_LEN);
    if sum != checksum(payload) {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

/// Encode a byte slice as cb58.
///
/// # Arguments
/// * `data` - The payload bytes.
///
/// # Returns
/// `base58(data || sha256d(data)[0..4])`.
pub fn cb58_encode(data: &[u8]) -> String {
    encode(&add_checksum(data))
}

/// Decode a cb58 string, verifying the 4-byte checksum.
///
/// # Arguments
/// * `s` - The cb58 string to decode.
///
/// # Returns
/// `Ok(Vec<u8>)` of the payload (without checksum) on success, or an
/// error for invalid encoding or checksum mismatch.
pub fn cb58_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    validate_checksum(&decoded)
}

/// Decode a cb58 string whose payload must be exactly `len` bytes.
pub fn cb58_decode_fixed(s: &str, len: usize) -> Result<Vec<u8>, PrimitivesError> {
    let payload = cb58_decode(s)?;
    if payload.len() != len {
        return Err(PrimitivesError::InvalidLength {
            expected: len,
            got: payload.len(),
        });
    }
    Ok(payload)
}
