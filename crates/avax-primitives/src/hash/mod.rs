//! Hash functions used by the codec.
//!
//! SHA-256 produces signing digests and transaction IDs, double SHA-256
//! the cb58 checksum, and Hash160 derives an address from a compressed
//! public key.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice. The first four bytes are the cb58 checksum.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160 of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// `ripemd160(sha256(data))`.
///
/// Applied to a 33-byte compressed public key this is the 20-byte
/// address.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        let cases: [(&str, Vec<u8>, &str); 5] = [
            (
                "sha256 empty",
                sha256(b"").to_vec(),
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            ),
            (
                "sha256",
                sha256(b"avax").to_vec(),
                "354681270fbca0ff257acb211f8d373a56e74dd0712e1811aa4d53175e0b7232",
            ),
            (
                "sha256d",
                sha256d(b"avax").to_vec(),
                "fa0920fb36e30d807e8bb16aed53d624d5220485525c768a60a60d499ab8d7dc",
            ),
            ("ripemd160", ripemd160(b"avax").to_vec(), "b9a2118537f1813d5fb0b75b5e66c86c7265e123"),
            ("hash160", hash160(b"avax").to_vec(), "e4cedf4a24b7a891d31f0a3df2ebf5fa05af188b"),
        ];
        for (name, got, want) in cases {
            assert_eq!(hex::encode(got), want, "{}", name);
        }
    }
}
